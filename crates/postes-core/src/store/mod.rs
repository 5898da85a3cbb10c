// ── Inventory store ──
//
// The read seam between the aggregation engine and whatever holds the
// inventory. Two backends ship with the crate: an in-memory store built on
// lock-free collections, and a SQLite store.

mod collection;
mod memory;
mod sqlite;

use async_trait::async_trait;

use crate::engine::SubstationFilter;
use crate::error::CoreError;
use crate::model::{Device, DeviceStatus, Substation, SubstationId};

pub use memory::MemoryStore;
pub use sqlite::{ImportReport, SqliteStore};

/// One row of a grouped device count: how many devices at `substation_id`
/// carry `status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTally {
    pub substation_id: SubstationId,
    pub status: DeviceStatus,
    pub count: u64,
}

/// Read operations the engine needs from an inventory backend.
///
/// Every method is a single logical read. Implementations must not retry
/// and must report failures as [`CoreError::StoreUnavailable`].
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Short backend name for logs and errors.
    fn backend_tag(&self) -> &'static str;

    /// Substations matching `filter`, in store order.
    async fn list_substations(
        &self,
        filter: &SubstationFilter,
    ) -> Result<Vec<Substation>, CoreError>;

    async fn get_substation(&self, id: SubstationId) -> Result<Option<Substation>, CoreError>;

    /// Devices at `id`, optionally restricted to one status. `None` counts all.
    async fn count_devices(
        &self,
        id: SubstationId,
        status: Option<&DeviceStatus>,
    ) -> Result<u64, CoreError>;

    /// Grouped count keyed by (substation, status) over the given ids.
    ///
    /// Substations without devices produce no rows. Ids not present in the
    /// store are ignored.
    async fn tally_devices(&self, ids: &[SubstationId]) -> Result<Vec<StatusTally>, CoreError>;

    /// Devices assigned to `id`, in store order.
    async fn list_devices(&self, id: SubstationId) -> Result<Vec<Device>, CoreError>;
}
