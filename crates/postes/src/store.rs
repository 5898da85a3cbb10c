//! Inventory resolution: CLI flags first, then the config file.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use postes_config::{Config, StoreBackend};
use postes_core::{Engine, InventoryDocument, InventoryStore, MemoryStore, SqliteStore};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Build an engine over the store selected by `--database`, `--inventory`
/// or the `[store]` config section, in that order.
pub fn open_engine(global: &GlobalOpts, cfg: &Config) -> Result<Engine, CliError> {
    let store: Arc<dyn InventoryStore> = if let Some(ref db) = global.database {
        Arc::new(open_database(db)?)
    } else if let Some(ref file) = global.inventory {
        Arc::new(load_memory(file)?)
    } else {
        let path = cfg.store_path().map_err(|_| CliError::NoInventory {
            path: postes_config::config_path().display().to_string(),
        })?;
        match cfg.store.backend {
            StoreBackend::Memory => Arc::new(load_memory(path)?),
            StoreBackend::Sqlite => Arc::new(open_database(path)?),
        }
    };

    debug!(backend = store.backend_tag(), "inventory store ready");
    Ok(Engine::new(store))
}

/// Open an existing SQLite inventory. Read commands never create one.
pub fn open_database(path: &Path) -> Result<SqliteStore, CliError> {
    if !path.exists() {
        return Err(CliError::NoDatabase {
            path: path.display().to_string(),
        });
    }
    Ok(SqliteStore::open(path)?)
}

fn load_memory(path: &Path) -> Result<MemoryStore, CliError> {
    let doc = load_document(path)?;
    MemoryStore::from_document(doc).map_err(|e| invalid(path, e))
}

/// Parse an inventory file, picking the format from its extension.
pub fn load_document(path: &Path) -> Result<InventoryDocument, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| CliError::StoreUnavailable {
        backend: "memory".into(),
        reason: format!("cannot read {}: {e}", path.display()),
    })?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let doc: InventoryDocument = match ext.as_deref() {
        Some("json") | None => serde_json::from_str(&text).map_err(|e| invalid(path, e))?,
        Some("yaml" | "yml") => serde_yaml::from_str(&text).map_err(|e| invalid(path, e))?,
        Some("toml") => toml::from_str(&text).map_err(|e| invalid(path, e))?,
        Some(other) => {
            return Err(CliError::Validation {
                field: "inventory".into(),
                reason: format!("unsupported file extension '.{other}' (expected json, yaml or toml)"),
            });
        }
    };
    debug!(path = %path.display(), "inventory file parsed");
    Ok(doc)
}

fn invalid(path: &Path, err: impl std::fmt::Display) -> CliError {
    CliError::InvalidInventory {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn parses_each_supported_format() {
        let dir = tempfile::tempdir().unwrap();
        let json = write(
            &dir,
            "inv.json",
            r#"{"postes":[{"id_poste":1,"code_poste":"P1"}],"concentrateurs":[]}"#,
        );
        let yaml = write(
            &dir,
            "inv.yaml",
            "postes:\n  - id_poste: 1\n    code_poste: P1\n    bo_affectee: BO1\n",
        );
        let toml = write(
            &dir,
            "inv.toml",
            "[[postes]]\nid_poste = 1\ncode_poste = \"P1\"\n\n[[concentrateurs]]\nnumero_serie = \"A\"\noperateur = \"EDF\"\netat = \"pose\"\nposte_id = 1\n",
        );

        assert_eq!(load_document(&json).unwrap().postes.len(), 1);
        assert_eq!(
            load_document(&yaml).unwrap().postes[0].owner.as_deref(),
            Some("BO1")
        );
        assert_eq!(load_document(&toml).unwrap().concentrateurs.len(), 1);
    }

    #[test]
    fn rejects_unknown_extension_and_bad_ids() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write(&dir, "inv.csv", "id_poste\n1\n");
        assert!(matches!(
            load_document(&csv),
            Err(CliError::Validation { .. })
        ));

        let bad = write(&dir, "bad.json", r#"{"postes":[{"id_poste":0,"code_poste":"P"}]}"#);
        assert!(matches!(
            load_document(&bad),
            Err(CliError::InvalidInventory { .. })
        ));
    }

    #[test]
    fn missing_database_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.sqlite");
        assert!(matches!(
            open_database(&path),
            Err(CliError::NoDatabase { .. })
        ));
        assert!(!path.exists());
    }
}
