//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use postes_config::ConfigError;
use postes_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const STORE: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Store ────────────────────────────────────────────────────────

    #[error("Inventory store unavailable ({backend}): {reason}")]
    #[diagnostic(
        code(postes::store_unavailable),
        help("Check that the inventory file or database exists and is readable.")
    )]
    StoreUnavailable { backend: String, reason: String },

    #[error("No inventory configured")]
    #[diagnostic(
        code(postes::no_inventory),
        help(
            "Pass --inventory <file> or --database <file>,\n\
             or set [store] backend and path in {path}\n\
             Create one with: postes config init"
        )
    )]
    NoInventory { path: String },

    #[error("Database file not found: {path}")]
    #[diagnostic(
        code(postes::no_database),
        help("Create it with: postes import <inventory-file> --database {path}")
    )]
    NoDatabase { path: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(postes::not_found),
        help("Run: postes {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(postes::validation))]
    Validation { field: String, reason: String },

    #[error("Invalid inventory {path}: {reason}")]
    #[diagnostic(
        code(postes::invalid_inventory),
        help("Inventory files hold `postes` and `concentrateurs` arrays (JSON, YAML or TOML).")
    )]
    InvalidInventory { path: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration file already exists: {path}")]
    #[diagnostic(
        code(postes::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(postes::config))]
    Config(#[from] ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(postes::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(postes::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to render TOML: {0}")]
    #[diagnostic(code(postes::toml))]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::StoreUnavailable { .. } | Self::NoDatabase { .. } => exit_code::STORE,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::InvalidInventory { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SubstationNotFound { id } => CliError::NotFound {
                resource_type: "substation".into(),
                identifier: id.to_string(),
                list_command: "list".into(),
            },

            CoreError::InvalidId { value } => CliError::Validation {
                field: "id_poste".into(),
                reason: format!("'{value}' is not a positive integer"),
            },

            CoreError::InvalidFilter { field, reason } => CliError::Validation { field, reason },

            CoreError::InvalidInventory { message } => CliError::InvalidInventory {
                path: "(document)".into(),
                reason: message,
            },

            CoreError::StoreUnavailable { backend, reason } => CliError::StoreUnavailable {
                backend: backend.into(),
                reason,
            },
        }
    }
}
