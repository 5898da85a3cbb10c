// ── Response shapes ──
//
// Pure mappings from domain records plus counts to the records handed to
// the presentation layer. Optional source fields stay `None`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::aggregate::StatusCounts;
use crate::model::{Device, DeviceStatus, SerialNumber, Substation, SubstationId};

/// A substation enriched with its device counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubstationView {
    pub id_poste: SubstationId,
    pub code_poste: String,
    pub nom_poste: Option<String>,
    pub localisation: Option<String>,
    pub bo_affectee: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub nb_concentrateurs: u64,
    pub nb_concentrateurs_pose: u64,
    pub nb_concentrateurs_a_tester: u64,
    #[serde(skip)]
    counts: StatusCounts,
}

impl SubstationView {
    pub fn assemble(substation: Substation, counts: StatusCounts) -> Self {
        Self {
            id_poste: substation.id,
            latitude: substation.latitude(),
            longitude: substation.longitude(),
            code_poste: substation.code,
            nom_poste: substation.name,
            localisation: substation.location,
            bo_affectee: substation.owner,
            nb_concentrateurs: counts.total,
            nb_concentrateurs_pose: counts.pose,
            nb_concentrateurs_a_tester: counts.a_tester,
            counts,
        }
    }

    /// The full breakdown the three headline counts were taken from.
    pub fn counts(&self) -> &StatusCounts {
        &self.counts
    }

    pub fn marker(&self) -> Marker {
        Marker::classify(&self.counts)
    }
}

/// Map marker state for a substation, most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    /// At least one concentrator waits for a test.
    ATester,
    /// At least one concentrator is installed.
    EnService,
    /// Concentrators are assigned, none installed or pending test.
    AvecConcentrateurs,
    SansConcentrateur,
}

impl Marker {
    pub fn classify(counts: &StatusCounts) -> Self {
        if counts.a_tester > 0 {
            Self::ATester
        } else if counts.pose > 0 {
            Self::EnService
        } else if counts.total > 0 {
            Self::AvecConcentrateurs
        } else {
            Self::SansConcentrateur
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ATester => "À tester",
            Self::EnService => "En service",
            Self::AvecConcentrateurs => "Avec concentrateurs",
            Self::SansConcentrateur => "Sans concentrateur",
        }
    }
}

/// Identity header of a device listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubstationRef {
    pub id_poste: SubstationId,
    pub code_poste: String,
    pub nom_poste: Option<String>,
}

/// One device line of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceEntry {
    pub numero_serie: SerialNumber,
    pub modele: Option<String>,
    pub operateur: String,
    pub etat: DeviceStatus,
    pub date_pose: Option<DateTime<Utc>>,
}

impl From<Device> for DeviceEntry {
    fn from(d: Device) -> Self {
        Self {
            numero_serie: d.serial,
            modele: d.model,
            operateur: d.operator,
            etat: d.status,
            date_pose: d.date_pose,
        }
    }
}

/// A substation with every device assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubstationDevices {
    pub poste: SubstationRef,
    pub concentrateurs: Vec<DeviceEntry>,
}

impl SubstationDevices {
    pub fn assemble(substation: Substation, devices: Vec<Device>) -> Self {
        Self {
            poste: SubstationRef {
                id_poste: substation.id,
                code_poste: substation.code,
                nom_poste: substation.name,
            },
            concentrateurs: devices.into_iter().map(DeviceEntry::from).collect(),
        }
    }
}

/// Totals across a filtered set of substations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FleetSummary {
    pub nb_postes: u64,
    pub nb_postes_geolocalises: u64,
    pub nb_concentrateurs: u64,
    pub nb_concentrateurs_pose: u64,
    pub nb_concentrateurs_a_tester: u64,
    pub nb_concentrateurs_autres: u64,
    pub par_etat: std::collections::BTreeMap<String, u64>,
}

impl FleetSummary {
    pub fn from_views(views: &[SubstationView]) -> Self {
        let mut totals = StatusCounts::default();
        let mut geolocated = 0u64;
        for view in views {
            totals += view.counts();
            if view.latitude.is_some() && view.longitude.is_some() {
                geolocated += 1;
            }
        }
        Self {
            nb_postes: u64::try_from(views.len()).unwrap_or(u64::MAX),
            nb_postes_geolocalises: geolocated,
            nb_concentrateurs: totals.total,
            nb_concentrateurs_pose: totals.pose,
            nb_concentrateurs_a_tester: totals.a_tester,
            nb_concentrateurs_autres: totals.other(),
            par_etat: totals.by_status,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Coordinates;
    use serde_json::json;

    fn counts(entries: &[(&str, u64)]) -> StatusCounts {
        let mut c = StatusCounts::default();
        for (status, n) in entries {
            c.record(&DeviceStatus::parse(status), *n);
        }
        c
    }

    #[test]
    fn view_keeps_absent_fields_absent() {
        let s = Substation::new(SubstationId::new(2).unwrap(), "P2");
        let view = SubstationView::assemble(s, StatusCounts::default());

        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({
                "id_poste": 2,
                "code_poste": "P2",
                "nom_poste": null,
                "localisation": null,
                "bo_affectee": null,
                "latitude": null,
                "longitude": null,
                "nb_concentrateurs": 0,
                "nb_concentrateurs_pose": 0,
                "nb_concentrateurs_a_tester": 0
            })
        );
    }

    #[test]
    fn view_carries_coordinates_and_counts() {
        let mut s = Substation::new(SubstationId::new(1).unwrap(), "P1");
        s.coordinates = Some(Coordinates {
            latitude: 43.1,
            longitude: 5.3,
        });
        let view = SubstationView::assemble(s, counts(&[("pose", 1), ("a_tester", 1), ("rebut", 1)]));

        assert_eq!(view.latitude, Some(43.1));
        assert_eq!(view.longitude, Some(5.3));
        assert_eq!(view.nb_concentrateurs, 3);
        assert_eq!(view.counts().other(), 1);
    }

    #[test]
    fn marker_priority() {
        assert_eq!(Marker::classify(&counts(&[("pose", 3), ("a_tester", 1)])), Marker::ATester);
        assert_eq!(Marker::classify(&counts(&[("pose", 3)])), Marker::EnService);
        assert_eq!(
            Marker::classify(&counts(&[("en_stock", 1)])),
            Marker::AvecConcentrateurs
        );
        assert_eq!(Marker::classify(&StatusCounts::default()), Marker::SansConcentrateur);
    }

    #[test]
    fn device_entry_keeps_raw_status() {
        let mut d = Device::new("C", "EDF", DeviceStatus::parse("rebut"));
        d.model = Some("G3".into());
        let entry = DeviceEntry::from(d);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["etat"], "rebut");
        assert_eq!(value["modele"], "G3");
        assert!(value["date_pose"].is_null());
    }
}
