//! Overlap detection between a target trip and its sibling trips.

use fleetlog_core::{RecordId, TripRecord};
use serde::{Deserialize, Serialize};

use crate::mileage::MileageRange;

/// A sibling record whose mileage parsed cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MileageCandidate {
    pub id: RecordId,
    pub name: String,
    pub range: MileageRange,
}

impl MileageCandidate {
    pub fn new(id: RecordId, name: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            id,
            name: name.into(),
            range: MileageRange::new(start, end),
        }
    }

    /// Candidate for `record`, or `None` when either mileage field is unusable.
    pub fn from_record(record: &TripRecord) -> Option<Self> {
        let range = MileageRange::parse(
            record.start_mileage.as_deref(),
            record.end_mileage.as_deref(),
        )?;
        Some(Self {
            id: record.id,
            name: record.name.clone(),
            range,
        })
    }
}

/// Candidates for every record with parseable mileage, in input order.
///
/// Records with bad mileage are dropped without being reported.
pub fn candidate_pool(records: &[TripRecord]) -> Vec<MileageCandidate> {
    records.iter().filter_map(MileageCandidate::from_record).collect()
}

/// Candidates whose range intersects `[target_start, target_end)`.
///
/// Returns nothing when either target bound is missing. Input order is kept so
/// alert text is stable across runs.
pub fn find_overlaps(
    target_start: Option<i64>,
    target_end: Option<i64>,
    candidates: &[MileageCandidate],
) -> Vec<MileageCandidate> {
    let (Some(start), Some(end)) = (target_start, target_end) else {
        return Vec::new();
    };
    let target = MileageRange::new(start, end);

    candidates
        .iter()
        .filter(|c| target.overlaps(&c.range))
        .cloned()
        .collect()
}
