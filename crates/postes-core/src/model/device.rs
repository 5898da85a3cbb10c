// ── Concentrator domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{SerialNumber, SubstationId};
use super::status::DeviceStatus;

/// A power-line-communication concentrator ("concentrateur").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(rename = "numero_serie")]
    pub serial: SerialNumber,
    #[serde(rename = "modele", default)]
    pub model: Option<String>,
    #[serde(rename = "operateur")]
    pub operator: String,
    #[serde(rename = "etat")]
    pub status: DeviceStatus,
    /// Substation the unit is assigned to, if any.
    #[serde(default)]
    pub poste_id: Option<SubstationId>,
    /// Installation timestamp, set once the unit is installed.
    #[serde(default)]
    pub date_pose: Option<DateTime<Utc>>,
}

impl Device {
    pub fn new(
        serial: impl Into<SerialNumber>,
        operator: impl Into<String>,
        status: DeviceStatus,
    ) -> Self {
        Self {
            serial: serial.into(),
            model: None,
            operator: operator.into(),
            status,
            poste_id: None,
            date_pose: None,
        }
    }

    pub fn belongs_to(&self, id: SubstationId) -> bool {
        self.poste_id == Some(id)
    }
}
