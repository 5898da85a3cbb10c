// ── Aggregation engine ──
//
// Read-only facade over an `InventoryStore`. Each call issues a bounded
// number of store reads: listings take one substation read plus one grouped
// tally, never one count per substation.

mod aggregate;
mod filter;
mod response;

use std::sync::Arc;

use tracing::debug;

use crate::error::CoreError;
use crate::model::{Substation, SubstationId};
use crate::store::InventoryStore;

pub use aggregate::{StatusCounts, fold_tallies};
pub use filter::{MAX_OWNER_LEN, SubstationFilter};
pub use response::{
    DeviceEntry, FleetSummary, Marker, SubstationDevices, SubstationRef, SubstationView,
};

/// Builds substation views and device listings from a store.
#[derive(Clone)]
pub struct Engine {
    store: Arc<dyn InventoryStore>,
}

impl Engine {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    pub fn backend_tag(&self) -> &'static str {
        self.store.backend_tag()
    }

    /// Substations matching `filter`, each with its device counts, in store
    /// order. An empty match is an empty list.
    pub async fn list(&self, filter: &SubstationFilter) -> Result<Vec<SubstationView>, CoreError> {
        let substations = self.store.list_substations(filter).await?;
        if substations.is_empty() {
            debug!(backend = self.backend_tag(), "no substation matched");
            return Ok(Vec::new());
        }

        let ids: Vec<SubstationId> = substations.iter().map(|s| s.id).collect();
        let tallies = self.store.tally_devices(&ids).await?;
        let mut counts = fold_tallies(&ids, &tallies);

        debug!(
            backend = self.backend_tag(),
            substations = substations.len(),
            tally_rows = tallies.len(),
            "assembled substation listing"
        );

        Ok(substations
            .into_iter()
            .map(|s| {
                let c = counts.remove(&s.id).unwrap_or_default();
                SubstationView::assemble(s, c)
            })
            .collect())
    }

    /// One substation with its counts. Fails with
    /// [`CoreError::SubstationNotFound`] when the id is unknown.
    pub async fn substation(&self, id: SubstationId) -> Result<SubstationView, CoreError> {
        let substation = self.require(id).await?;
        let tallies = self.store.tally_devices(&[id]).await?;
        let c = fold_tallies(&[id], &tallies).remove(&id).unwrap_or_default();
        Ok(SubstationView::assemble(substation, c))
    }

    /// Every device assigned to `id`, in store order.
    pub async fn substation_devices(&self, id: SubstationId) -> Result<SubstationDevices, CoreError> {
        let substation = self.require(id).await?;
        let devices = self.store.list_devices(id).await?;
        debug!(
            backend = self.backend_tag(),
            %id,
            devices = devices.len(),
            "listed substation devices"
        );
        Ok(SubstationDevices::assemble(substation, devices))
    }

    /// Distinct non-empty owner labels, in first-seen store order.
    pub async fn owners(&self) -> Result<Vec<String>, CoreError> {
        let substations = self.store.list_substations(&SubstationFilter::all()).await?;
        let mut owners: Vec<String> = Vec::new();
        for owner in substations.into_iter().filter_map(|s| s.owner) {
            if !owner.is_empty() && !owners.contains(&owner) {
                owners.push(owner);
            }
        }
        Ok(owners)
    }

    /// Totals over the substations matching `filter`.
    pub async fn summary(&self, filter: &SubstationFilter) -> Result<FleetSummary, CoreError> {
        let views = self.list(filter).await?;
        Ok(FleetSummary::from_views(&views))
    }

    async fn require(&self, id: SubstationId) -> Result<Substation, CoreError> {
        match self.store.get_substation(id).await? {
            Some(s) => Ok(s),
            None => {
                debug!(backend = self.backend_tag(), %id, "substation not found");
                Err(CoreError::SubstationNotFound { id })
            }
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("backend", &self.backend_tag())
            .finish()
    }
}
