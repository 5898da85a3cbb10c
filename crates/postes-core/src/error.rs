// ── Core error types ──
//
// User-facing errors from postes-core. Consumers never see SQL errors or
// join failures directly: backend failures are folded into
// `StoreUnavailable` with the backend tag and the underlying message.

use thiserror::Error;

use crate::model::SubstationId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lookup errors ────────────────────────────────────────────────
    #[error("Substation not found: {id}")]
    SubstationNotFound { id: SubstationId },

    // ── Input errors (raised before any store access) ────────────────
    #[error("Invalid substation id: {value}")]
    InvalidId { value: String },

    #[error("Invalid filter {field}: {reason}")]
    InvalidFilter { field: String, reason: String },

    #[error("Invalid inventory: {message}")]
    InvalidInventory { message: String },

    // ── Store errors ─────────────────────────────────────────────────
    #[error("Inventory store unavailable ({backend}): {reason}")]
    StoreUnavailable {
        backend: &'static str,
        reason: String,
    },
}

impl CoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SubstationNotFound { .. })
    }

    pub(crate) fn store(backend: &'static str, reason: impl ToString) -> Self {
        Self::StoreUnavailable {
            backend,
            reason: reason.to_string(),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::store("sqlite", err)
    }
}
