// ── Per-substation device counts ──
//
// Folds grouped (substation, status) rows into one `StatusCounts` per
// substation in a single pass.

use std::collections::{BTreeMap, HashMap};
use std::ops::AddAssign;

use serde::Serialize;

use crate::model::{DeviceStatus, SubstationId};
use crate::store::StatusTally;

/// Device counts for one substation (or a sum over several).
///
/// Invariant: `total == pose + a_tester + other()`, and `by_status` sums
/// to `total`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: u64,
    pub pose: u64,
    pub a_tester: u64,
    /// Full breakdown keyed by wire status, including unrecognized values.
    pub by_status: BTreeMap<String, u64>,
}

impl StatusCounts {
    pub fn record(&mut self, status: &DeviceStatus, count: u64) {
        self.total += count;
        match status {
            DeviceStatus::Pose => self.pose += count,
            DeviceStatus::ATester => self.a_tester += count,
            _ => {}
        }
        *self.by_status.entry(status.as_str().to_owned()).or_default() += count;
    }

    /// Devices whose status is neither `pose` nor `a_tester`.
    pub fn other(&self) -> u64 {
        self.total - self.pose - self.a_tester
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl AddAssign<&StatusCounts> for StatusCounts {
    fn add_assign(&mut self, rhs: &StatusCounts) {
        self.total += rhs.total;
        self.pose += rhs.pose;
        self.a_tester += rhs.a_tester;
        for (status, count) in &rhs.by_status {
            *self.by_status.entry(status.clone()).or_default() += count;
        }
    }
}

/// Fold grouped rows into counts for every id in `ids`.
///
/// Every requested id gets an entry, zeroed when it has no devices. Rows for
/// ids that were not requested are dropped, so a device is only ever counted
/// against the substation it references.
pub fn fold_tallies(
    ids: &[SubstationId],
    tallies: &[StatusTally],
) -> HashMap<SubstationId, StatusCounts> {
    let mut counts: HashMap<SubstationId, StatusCounts> = ids
        .iter()
        .map(|id| (*id, StatusCounts::default()))
        .collect();

    for tally in tallies {
        if let Some(entry) = counts.get_mut(&tally.substation_id) {
            entry.record(&tally.status, tally.count);
        }
    }
    counts
}
