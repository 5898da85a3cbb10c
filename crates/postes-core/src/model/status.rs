// ── Concentrator lifecycle status ──

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumString;

/// Lifecycle state of a concentrator (`etat`).
///
/// The known states are the ones the field application writes. Any other
/// value is kept verbatim in [`DeviceStatus::Unrecognized`] so it can be
/// counted and echoed back without loss. Parsing never fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeviceStatus {
    #[strum(serialize = "en_livraison")]
    EnLivraison,
    #[strum(serialize = "en_stock")]
    EnStock,
    #[strum(serialize = "a_tester")]
    ATester,
    #[strum(serialize = "pose")]
    Pose,
    #[strum(serialize = "retour_constructeur")]
    RetourConstructeur,
    #[strum(serialize = "hs")]
    HorsService,
    #[strum(default)]
    Unrecognized(String),
}

impl DeviceStatus {
    /// Wire representation, identical to the stored `etat` value.
    pub fn as_str(&self) -> &str {
        match self {
            Self::EnLivraison => "en_livraison",
            Self::EnStock => "en_stock",
            Self::ATester => "a_tester",
            Self::Pose => "pose",
            Self::RetourConstructeur => "retour_constructeur",
            Self::HorsService => "hs",
            Self::Unrecognized(raw) => raw,
        }
    }

    pub fn parse(raw: &str) -> Self {
        // `Unrecognized` is the strum default, so this cannot fail.
        raw.parse()
            .unwrap_or_else(|_| Self::Unrecognized(raw.to_owned()))
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for DeviceStatus {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<DeviceStatus> for String {
    fn from(status: DeviceStatus) -> Self {
        match status {
            DeviceStatus::Unrecognized(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_parse() {
        assert_eq!(DeviceStatus::parse("pose"), DeviceStatus::Pose);
        assert_eq!(DeviceStatus::parse("a_tester"), DeviceStatus::ATester);
        assert_eq!(DeviceStatus::parse("hs"), DeviceStatus::HorsService);
        assert_eq!(
            DeviceStatus::parse("retour_constructeur"),
            DeviceStatus::RetourConstructeur
        );
    }

    #[test]
    fn unknown_status_is_kept_verbatim() {
        let status = DeviceStatus::parse("rebut");
        assert_eq!(status, DeviceStatus::Unrecognized("rebut".into()));
        assert_eq!(status.as_str(), "rebut");
        assert!(!status.is_recognized());
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(
            DeviceStatus::parse("POSE"),
            DeviceStatus::Unrecognized("POSE".into())
        );
    }

    #[test]
    fn serde_uses_wire_strings() {
        let json = serde_json::to_string(&DeviceStatus::ATester).unwrap();
        assert_eq!(json, "\"a_tester\"");

        let back: DeviceStatus = serde_json::from_str("\"en_labo\"").unwrap();
        assert_eq!(back.to_string(), "en_labo");
        assert_eq!(serde_json::to_string(&back).unwrap(), "\"en_labo\"");
    }
}
