// ── In-memory inventory store ──
//
// Two lock-free collections (substations by id, devices by serial). Each
// read works from one published snapshot, so counts computed in a single
// call are never torn by a concurrent load.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tracing::debug;

use super::collection::EntityCollection;
use super::{InventoryStore, StatusTally};
use crate::engine::SubstationFilter;
use crate::error::CoreError;
use crate::model::{
    Device, DeviceStatus, InventoryDocument, SerialNumber, Substation, SubstationId,
};

/// In-memory [`InventoryStore`]. Store order is insertion order.
pub struct MemoryStore {
    substations: EntityCollection<SubstationId, Substation>,
    devices: EntityCollection<SerialNumber, Device>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            substations: EntityCollection::new(),
            devices: EntityCollection::new(),
        }
    }

    /// Build a store seeded from a validated document.
    pub fn from_document(doc: InventoryDocument) -> Result<Self, CoreError> {
        let store = Self::new();
        store.load(doc)?;
        Ok(store)
    }

    /// Replace the store contents with `doc`.
    ///
    /// Upserts every incoming entity first, then prunes keys absent from the
    /// document, so readers never see a transient empty store.
    pub fn load(&self, doc: InventoryDocument) -> Result<(), CoreError> {
        doc.validate()?;

        let incoming_ids: HashSet<SubstationId> = doc.postes.iter().map(|s| s.id).collect();
        for substation in doc.postes {
            self.substations.upsert(substation.id, substation);
        }
        for existing in self.substations.keys() {
            if !incoming_ids.contains(&existing) {
                self.substations.remove(&existing);
            }
        }

        let incoming_serials: HashSet<SerialNumber> = doc
            .concentrateurs
            .iter()
            .map(|d| d.serial.clone())
            .collect();
        for device in doc.concentrateurs {
            self.devices.upsert(device.serial.clone(), device);
        }
        for existing in self.devices.keys() {
            if !incoming_serials.contains(&existing) {
                self.devices.remove(&existing);
            }
        }

        debug!(
            substations = self.substations.len(),
            devices = self.devices.len(),
            "memory store loaded"
        );
        Ok(())
    }

    pub fn substation_count(&self) -> usize {
        self.substations.len()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn list_substations(
        &self,
        filter: &SubstationFilter,
    ) -> Result<Vec<Substation>, CoreError> {
        let snap = self.substations.snapshot();
        Ok(snap
            .iter()
            .filter(|s| filter.matches(s))
            .map(|s| s.as_ref().clone())
            .collect())
    }

    async fn get_substation(&self, id: SubstationId) -> Result<Option<Substation>, CoreError> {
        Ok(self.substations.get(&id).map(|s| s.as_ref().clone()))
    }

    async fn count_devices(
        &self,
        id: SubstationId,
        status: Option<&DeviceStatus>,
    ) -> Result<u64, CoreError> {
        let snap = self.devices.snapshot();
        let count = snap
            .iter()
            .filter(|d| d.belongs_to(id))
            .filter(|d| status.is_none_or(|s| d.status == *s))
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn tally_devices(&self, ids: &[SubstationId]) -> Result<Vec<StatusTally>, CoreError> {
        let wanted: HashSet<SubstationId> = ids.iter().copied().collect();
        let snap = self.devices.snapshot();

        let mut groups: HashMap<(SubstationId, &DeviceStatus), u64> = HashMap::new();
        for device in snap.iter() {
            let Some(poste_id) = device.poste_id else {
                continue;
            };
            if wanted.contains(&poste_id) {
                *groups.entry((poste_id, &device.status)).or_default() += 1;
            }
        }

        let mut tallies: Vec<StatusTally> = groups
            .into_iter()
            .map(|((substation_id, status), count)| StatusTally {
                substation_id,
                status: status.clone(),
                count,
            })
            .collect();
        tallies.sort_by(|a, b| {
            a.substation_id
                .cmp(&b.substation_id)
                .then_with(|| a.status.as_str().cmp(b.status.as_str()))
        });
        Ok(tallies)
    }

    async fn list_devices(&self, id: SubstationId) -> Result<Vec<Device>, CoreError> {
        let snap = self.devices.snapshot();
        Ok(snap
            .iter()
            .filter(|d| d.belongs_to(id))
            .map(|d| d.as_ref().clone())
            .collect())
    }
}
