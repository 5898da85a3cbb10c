// ── SQLite inventory store ──
//
// Substations live in `postes_electriques`, concentrators in
// `concentrateurs`. Store order is rowid order. Every read runs on a
// blocking thread as one statement, or as one read transaction when it
// needs several, so each result is a single consistent read of the
// database.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use tracing::{debug, info};

use super::{InventoryStore, StatusTally};
use crate::engine::SubstationFilter;
use crate::error::CoreError;
use crate::model::{
    Coordinates, Device, DeviceStatus, InventoryDocument, SerialNumber, Substation, SubstationId,
};

const BACKEND: &str = "sqlite";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS postes_electriques (
        id_poste     INTEGER PRIMARY KEY,
        code_poste   TEXT NOT NULL UNIQUE,
        nom_poste    TEXT,
        localisation TEXT,
        bo_affectee  TEXT,
        latitude     REAL,
        longitude    REAL
    );
    CREATE TABLE IF NOT EXISTS concentrateurs (
        numero_serie TEXT PRIMARY KEY,
        modele       TEXT,
        operateur    TEXT NOT NULL,
        etat         TEXT NOT NULL,
        poste_id     INTEGER,
        date_pose    TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_concentrateurs_poste_etat
        ON concentrateurs (poste_id, etat);
";

const SUBSTATION_COLUMNS: &str =
    "id_poste, code_poste, nom_poste, localisation, bo_affectee, latitude, longitude";

const DEVICE_COLUMNS: &str = "numero_serie, modele, operateur, etat, poste_id, date_pose";

/// Ids bound per grouped-count statement. Stays under the smallest
/// `SQLITE_MAX_VARIABLE_NUMBER` any SQLite build ships with.
const IDS_PER_STATEMENT: usize = 999;

/// Row counts written by [`SqliteStore::import`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub substations: usize,
    pub devices: usize,
}

/// SQLite-backed [`InventoryStore`].
///
/// Cheaply cloneable; clones share one connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database file and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened sqlite inventory");
        Self::with_connection(conn)
    }

    /// Private in-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self, CoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, CoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Replace the whole inventory with `doc` in one transaction.
    pub async fn import(&self, doc: InventoryDocument) -> Result<ImportReport, CoreError> {
        doc.validate()?;
        let report = self
            .run(move |conn| {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM concentrateurs", [])?;
                tx.execute("DELETE FROM postes_electriques", [])?;
                {
                    let mut insert_poste = tx.prepare(&format!(
                        "INSERT INTO postes_electriques ({SUBSTATION_COLUMNS})
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                    ))?;
                    for s in &doc.postes {
                        insert_poste.execute(params![
                            s.id.get(),
                            s.code,
                            s.name,
                            s.location,
                            s.owner,
                            s.latitude(),
                            s.longitude(),
                        ])?;
                    }

                    let mut insert_device = tx.prepare(&format!(
                        "INSERT INTO concentrateurs ({DEVICE_COLUMNS})
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
                    ))?;
                    for d in &doc.concentrateurs {
                        insert_device.execute(params![
                            d.serial.as_str(),
                            d.model,
                            d.operator,
                            d.status.as_str(),
                            d.poste_id.map(SubstationId::get),
                            d.date_pose,
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(ImportReport {
                    substations: doc.postes.len(),
                    devices: doc.concentrateurs.len(),
                })
            })
            .await?;

        info!(
            substations = report.substations,
            devices = report.devices,
            "sqlite inventory imported"
        );
        Ok(report)
    }

    /// Run `f` against the connection on the blocking pool.
    async fn run<F, R>(&self, f: F) -> Result<R, CoreError>
    where
        F: FnOnce(&mut Connection) -> Result<R, CoreError> + Send + 'static,
        R: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| CoreError::store(BACKEND, "connection mutex poisoned"))?;
            f(&mut *guard)
        })
        .await
        .map_err(|e| CoreError::store(BACKEND, e))?
    }
}

// ── Row mapping ─────────────────────────────────────────────────────

type SubstationRow = (
    i64,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<f64>,
    Option<f64>,
);

type DeviceRow = (
    String,
    Option<String>,
    String,
    String,
    Option<i64>,
    Option<DateTime<Utc>>,
);

fn read_substation(row: &rusqlite::Row<'_>) -> rusqlite::Result<SubstationRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn read_device(row: &rusqlite::Row<'_>) -> rusqlite::Result<DeviceRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn substation_from_row(row: SubstationRow) -> Result<Substation, CoreError> {
    let (id, code, name, location, owner, latitude, longitude) = row;
    let id = SubstationId::new(id).map_err(|_| CoreError::InvalidInventory {
        message: format!("stored substation has invalid id {id}"),
    })?;
    Ok(Substation {
        id,
        code,
        name,
        location,
        owner,
        coordinates: Coordinates::from_parts(latitude, longitude),
    })
}

fn device_from_row(row: DeviceRow) -> Device {
    let (serial, model, operator, status, poste_id, date_pose) = row;
    Device {
        serial: SerialNumber::new(serial),
        model,
        operator,
        status: DeviceStatus::parse(&status),
        // A non-positive reference points at no substation.
        poste_id: poste_id.and_then(|raw| SubstationId::new(raw).ok()),
        date_pose,
    }
}

/// `?1, ?2, ... ?n`
fn placeholders(n: usize) -> String {
    (1..=n).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ")
}

#[async_trait]
impl InventoryStore for SqliteStore {
    fn backend_tag(&self) -> &'static str {
        BACKEND
    }

    async fn list_substations(
        &self,
        filter: &SubstationFilter,
    ) -> Result<Vec<Substation>, CoreError> {
        let owner = filter.owner().map(str::to_owned);
        let coords_required = filter.coords_required();

        self.run(move |conn| {
            let mut clauses: Vec<&str> = Vec::new();
            if owner.is_some() {
                clauses.push("bo_affectee = ?1");
            }
            if coords_required {
                clauses.push("latitude IS NOT NULL AND longitude IS NOT NULL");
            }
            let where_clause = if clauses.is_empty() {
                String::new()
            } else {
                format!(" WHERE {}", clauses.join(" AND "))
            };

            let sql = format!(
                "SELECT {SUBSTATION_COLUMNS} FROM postes_electriques{where_clause} ORDER BY rowid"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(owner.iter()), read_substation)?
                .collect::<Result<Vec<_>, _>>()?;
            rows.into_iter().map(substation_from_row).collect()
        })
        .await
    }

    async fn get_substation(&self, id: SubstationId) -> Result<Option<Substation>, CoreError> {
        self.run(move |conn| {
            let row = conn
                .query_row(
                    &format!(
                        "SELECT {SUBSTATION_COLUMNS} FROM postes_electriques WHERE id_poste = ?1"
                    ),
                    [id.get()],
                    read_substation,
                )
                .optional()?;
            row.map(substation_from_row).transpose()
        })
        .await
    }

    async fn count_devices(
        &self,
        id: SubstationId,
        status: Option<&DeviceStatus>,
    ) -> Result<u64, CoreError> {
        let status = status.map(|s| s.as_str().to_owned());
        self.run(move |conn| {
            let count: i64 = match status {
                Some(etat) => conn.query_row(
                    "SELECT COUNT(*) FROM concentrateurs WHERE poste_id = ?1 AND etat = ?2",
                    params![id.get(), etat],
                    |row| row.get(0),
                )?,
                None => conn.query_row(
                    "SELECT COUNT(*) FROM concentrateurs WHERE poste_id = ?1",
                    [id.get()],
                    |row| row.get(0),
                )?,
            };
            Ok(u64::try_from(count).unwrap_or_default())
        })
        .await
    }

    async fn tally_devices(&self, ids: &[SubstationId]) -> Result<Vec<StatusTally>, CoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw_ids: Vec<i64> = ids.iter().map(|id| id.get()).collect();

        self.run(move |conn| {
            let tx = conn.transaction()?;
            let mut rows: Vec<(i64, String, i64)> = Vec::new();
            for chunk in raw_ids.chunks(IDS_PER_STATEMENT) {
                let sql = format!(
                    "SELECT poste_id, etat, COUNT(*) FROM concentrateurs
                     WHERE poste_id IN ({})
                     GROUP BY poste_id, etat",
                    placeholders(chunk.len())
                );
                let mut stmt = tx.prepare_cached(&sql)?;
                let part = stmt
                    .query_map(params_from_iter(chunk.iter()), |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, i64>(2)?,
                        ))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                rows.extend(part);
            }
            tx.commit()?;
            debug!(ids = raw_ids.len(), rows = rows.len(), "sqlite devices tallied");

            rows.sort_unstable_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
            rows.into_iter()
                .map(|(poste_id, etat, count)| {
                    Ok(StatusTally {
                        substation_id: SubstationId::new(poste_id)?,
                        status: DeviceStatus::parse(&etat),
                        count: u64::try_from(count).unwrap_or_default(),
                    })
                })
                .collect()
        })
        .await
    }

    async fn list_devices(&self, id: SubstationId) -> Result<Vec<Device>, CoreError> {
        self.run(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {DEVICE_COLUMNS} FROM concentrateurs WHERE poste_id = ?1 ORDER BY rowid"
            ))?;
            let rows = stmt
                .query_map([id.get()], read_device)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows.into_iter().map(device_from_row).collect())
        })
        .await
    }
}
