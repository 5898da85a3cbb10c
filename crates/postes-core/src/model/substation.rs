// ── Substation domain type ──

use serde::{Deserialize, Serialize};

use super::ids::SubstationId;

/// A geographic position. Latitude and longitude only ever travel together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Pair two independently nullable columns. A half-filled pair is
    /// treated as "no coordinates".
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Self {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

/// An electrical substation ("poste électrique").
///
/// Serialized with the inventory's column names (`id_poste`, `code_poste`,
/// ...). Coordinates are flattened back into two nullable fields on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SubstationRecord", into = "SubstationRecord")]
pub struct Substation {
    pub id: SubstationId,
    /// Business identifier, unique across the inventory.
    pub code: String,
    pub name: Option<String>,
    pub location: Option<String>,
    /// Business owner ("BO") the substation is assigned to.
    pub owner: Option<String>,
    pub coordinates: Option<Coordinates>,
}

impl Substation {
    pub fn new(id: SubstationId, code: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            name: None,
            location: None,
            owner: None,
            coordinates: None,
        }
    }

    pub fn has_coordinates(&self) -> bool {
        self.coordinates.is_some()
    }

    pub fn latitude(&self) -> Option<f64> {
        self.coordinates.map(|c| c.latitude)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.coordinates.map(|c| c.longitude)
    }
}

/// Row shape of a substation as stored and exchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SubstationRecord {
    pub id_poste: SubstationId,
    pub code_poste: String,
    #[serde(default)]
    pub nom_poste: Option<String>,
    #[serde(default)]
    pub localisation: Option<String>,
    #[serde(default)]
    pub bo_affectee: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl From<SubstationRecord> for Substation {
    fn from(r: SubstationRecord) -> Self {
        Self {
            id: r.id_poste,
            code: r.code_poste,
            name: r.nom_poste,
            location: r.localisation,
            owner: r.bo_affectee,
            coordinates: Coordinates::from_parts(r.latitude, r.longitude),
        }
    }
}

impl From<Substation> for SubstationRecord {
    fn from(s: Substation) -> Self {
        Self {
            id_poste: s.id,
            code_poste: s.code,
            nom_poste: s.name,
            localisation: s.location,
            bo_affectee: s.owner,
            latitude: s.coordinates.map(|c| c.latitude),
            longitude: s.coordinates.map(|c| c.longitude),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coordinates_require_both_parts() {
        assert!(Coordinates::from_parts(Some(43.1), Some(5.3)).is_some());
        assert!(Coordinates::from_parts(Some(43.1), None).is_none());
        assert!(Coordinates::from_parts(None, Some(5.3)).is_none());
        assert!(Coordinates::from_parts(None, None).is_none());
    }

    #[test]
    fn partial_coordinates_deserialize_as_none() {
        let s: Substation = serde_json::from_value(json!({
            "id_poste": 9,
            "code_poste": "AJA-09",
            "latitude": 41.9
        }))
        .unwrap();
        assert!(!s.has_coordinates());
        assert_eq!(s.latitude(), None);
    }

    #[test]
    fn serializes_with_column_names() {
        let mut s = Substation::new(SubstationId::new(1).unwrap(), "BAS-01");
        s.owner = Some("BO1".into());
        s.coordinates = Coordinates::from_parts(Some(42.7), Some(9.45));

        let value = serde_json::to_value(&s).unwrap();
        assert_eq!(value["id_poste"], 1);
        assert_eq!(value["code_poste"], "BAS-01");
        assert_eq!(value["bo_affectee"], "BO1");
        assert_eq!(value["latitude"], 42.7);
        assert!(value["nom_poste"].is_null());
    }
}
