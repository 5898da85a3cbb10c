// ── Substation selection ──

use crate::error::CoreError;
use crate::model::Substation;

/// Longest owner label accepted in a filter.
pub const MAX_OWNER_LEN: usize = 128;

/// Candidate-set predicate applied before aggregation.
///
/// Both axes are optional and combine with AND. Construct through
/// [`SubstationFilter::new`] so malformed owner labels are rejected before
/// any store is touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstationFilter {
    owner: Option<String>,
    coords_required: bool,
}

impl SubstationFilter {
    /// No filtering on either axis.
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a filter. An empty owner label means "any owner".
    pub fn new(owner: Option<&str>, coords_required: bool) -> Result<Self, CoreError> {
        let owner = match owner {
            None | Some("") => None,
            Some(label) => {
                validate_owner(label)?;
                Some(label.to_owned())
            }
        };
        Ok(Self {
            owner,
            coords_required,
        })
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn coords_required(&self) -> bool {
        self.coords_required
    }

    /// Exact, case-sensitive owner match plus the coordinates check.
    pub fn matches(&self, substation: &Substation) -> bool {
        let owner_ok = self
            .owner
            .as_deref()
            .is_none_or(|wanted| substation.owner.as_deref() == Some(wanted));
        let coords_ok = !self.coords_required || substation.has_coordinates();
        owner_ok && coords_ok
    }
}

fn validate_owner(label: &str) -> Result<(), CoreError> {
    if label.chars().count() > MAX_OWNER_LEN {
        return Err(CoreError::InvalidFilter {
            field: "bo_affectee".into(),
            reason: format!("longer than {MAX_OWNER_LEN} characters"),
        });
    }
    if label.chars().any(char::is_control) {
        return Err(CoreError::InvalidFilter {
            field: "bo_affectee".into(),
            reason: "contains control characters".into(),
        });
    }
    Ok(())
}
