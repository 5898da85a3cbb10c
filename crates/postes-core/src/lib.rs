//! Substation inventory model, stores and concentrator aggregation.
//!
//! This crate owns the read side of the substation ("poste") inventory:
//!
//! - **[`Engine`]**: Facade answering the read requests: filtered
//!   substation listings with per-substation device counts, single
//!   substation detail, per-substation device listings, and the distinct
//!   owner (BO) labels. Listings cost one substation read plus one grouped
//!   tally regardless of how many substations match.
//!
//! - **[`InventoryStore`]**: Async read seam the engine runs against.
//!   [`MemoryStore`] keeps the inventory in lock-free snapshot collections;
//!   [`SqliteStore`] reads a SQLite database and can import a document.
//!
//! - **Domain model** ([`model`]): `Substation`, `Device`, `DeviceStatus`
//!   and the validated id newtypes.

pub mod engine;
pub mod error;
pub mod model;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use engine::{
    DeviceEntry, Engine, FleetSummary, Marker, StatusCounts, SubstationDevices,
    SubstationFilter, SubstationRef, SubstationView,
};
pub use error::CoreError;
pub use store::{ImportReport, InventoryStore, MemoryStore, SqliteStore, StatusTally};

pub use model::{
    Coordinates, Device, DeviceStatus, InventoryDocument, SerialNumber, Substation, SubstationId,
};
