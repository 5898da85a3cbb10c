//! `postes import`: load an inventory file into a SQLite database.

use tracing::info;

use postes_config::{Config, StoreBackend};
use postes_core::SqliteStore;

use crate::cli::{GlobalOpts, ImportArgs};
use crate::error::CliError;
use crate::store;

pub async fn handle(args: ImportArgs, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    let target = match (&global.database, cfg.store.backend, &cfg.store.path) {
        (Some(db), _, _) => db.clone(),
        (None, StoreBackend::Sqlite, Some(path)) => path.clone(),
        _ => {
            return Err(CliError::Validation {
                field: "database".into(),
                reason: "import needs a target: pass --database <file>".into(),
            });
        }
    };

    let doc = store::load_document(&args.file)?;
    doc.validate().map_err(|e| CliError::InvalidInventory {
        path: args.file.display().to_string(),
        reason: e.to_string(),
    })?;
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let db = SqliteStore::open(&target)?;
    let report = db.import(doc).await?;

    info!(
        source = %args.file.display(),
        target = %target.display(),
        "import finished"
    );
    if !global.quiet {
        eprintln!(
            "Imported {} substations and {} concentrators into {}",
            report.substations,
            report.devices,
            target.display()
        );
    }
    Ok(())
}
