// ── Inventory domain model ──
//
// Canonical substation and concentrator types shared by the stores, the
// aggregation engine and the CLI.

pub mod device;
pub mod ids;
pub mod status;
pub mod substation;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ── Re-exports ──────────────────────────────────────────────────────

pub use device::Device;
pub use ids::{SerialNumber, SubstationId};
pub use status::DeviceStatus;
pub use substation::{Coordinates, Substation};

/// A full inventory snapshot, as exchanged in seed files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryDocument {
    #[serde(default)]
    pub postes: Vec<Substation>,
    #[serde(default)]
    pub concentrateurs: Vec<Device>,
}

impl InventoryDocument {
    /// Check key uniqueness: substation ids, substation codes and serials.
    ///
    /// Devices pointing at unknown substations are accepted; they are simply
    /// never counted against any substation.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut ids = HashSet::new();
        let mut codes = HashSet::new();
        for poste in &self.postes {
            if !ids.insert(poste.id) {
                return Err(CoreError::InvalidInventory {
                    message: format!("duplicate substation id {}", poste.id),
                });
            }
            if !codes.insert(poste.code.as_str()) {
                return Err(CoreError::InvalidInventory {
                    message: format!("duplicate substation code '{}'", poste.code),
                });
            }
        }

        let mut serials = HashSet::new();
        for device in &self.concentrateurs {
            if !serials.insert(&device.serial) {
                return Err(CoreError::InvalidInventory {
                    message: format!("duplicate serial number '{}'", device.serial),
                });
            }
        }
        Ok(())
    }
}
