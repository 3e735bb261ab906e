//! Gap detection against the previous trip of the same vehicle.
//!
//! "Previous" is the submitted record for the vehicle with the largest id
//! other than the target. This follows creation order, not travel dates.

use fleetlog_core::{FleetResult, RecordId, TripRecord, TripStatus};
use fleetlog_storage::TripStore;

use crate::mileage::parse_mileage;

/// Odometer distance from the previous record's end to the target's start.
///
/// Negative when the target starts before the previous trip ended.
pub fn gap_between(target_start: Option<i64>, previous: Option<&TripRecord>) -> Option<i64> {
    let start = target_start?;
    let previous_end = parse_mileage(previous?.end_mileage.as_deref())?;
    Some(start.saturating_sub(previous_end))
}

/// Look up the previous record in `store` and compute the gap to it.
pub fn find_gap(
    store: &dyn TripStore,
    vehicle: &str,
    target_id: RecordId,
    target_start: Option<i64>,
) -> FleetResult<Option<i64>> {
    if target_start.is_none() {
        return Ok(None);
    }
    let previous = store.trip_query_latest(vehicle, TripStatus::Submitted, Some(target_id))?;
    Ok(gap_between(target_start, previous.as_ref()))
}

/// Whether `gap` is large enough to report. Zero and negative gaps never are.
pub fn is_unexplained(gap: Option<i64>, threshold: i64) -> bool {
    matches!(gap, Some(g) if g > threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetlog_core::TripForm;
    use fleetlog_storage::InMemoryTripStore;

    fn submitted(id: i64, vehicle: &str, start: &str, end: &str) -> TripRecord {
        let form = TripForm {
            vehicle: vehicle.to_string(),
            start_mileage: Some(start.to_string()),
            end_mileage: Some(end.to_string()),
            ..TripForm::default()
        };
        TripRecord::from_form(RecordId::new(id), form, TripStatus::Submitted, chrono::Utc::now())
    }

    #[test]
    fn test_gap_threshold_is_strict() {
        let prev = submitted(1, "2022 RAM", "400", "500");
        assert_eq!(gap_between(Some(506), Some(&prev)), Some(6));
        assert!(is_unexplained(gap_between(Some(506), Some(&prev)), 5));
        assert_eq!(gap_between(Some(505), Some(&prev)), Some(5));
        assert!(!is_unexplained(gap_between(Some(505), Some(&prev)), 5));
    }

    #[test]
    fn test_negative_gap_not_flagged() {
        let prev = submitted(1, "2022 RAM", "400", "500");
        let gap = gap_between(Some(490), Some(&prev));
        assert_eq!(gap, Some(-10));
        assert!(!is_unexplained(gap, 5));
    }

    #[test]
    fn test_no_gap_without_inputs() {
        let mut prev = submitted(1, "2022 RAM", "400", "500");
        assert_eq!(gap_between(None, Some(&prev)), None);
        assert_eq!(gap_between(Some(600), None), None);

        prev.end_mileage = Some("n/a".to_string());
        assert_eq!(gap_between(Some(600), Some(&prev)), None);
        assert!(!is_unexplained(None, 5));
    }

    #[test]
    fn test_find_gap_uses_largest_other_id() {
        let store = InMemoryTripStore::new();
        store.insert_record(submitted(3, "2022 RAM", "100", "900")).unwrap();
        store.insert_record(submitted(7, "2022 RAM", "100", "500")).unwrap();
        store.insert_record(submitted(9, "2012 F250", "100", "5000")).unwrap();
        store.insert_record(submitted(12, "2022 RAM", "510", "600")).unwrap();

        let gap = find_gap(&store, "2022 RAM", RecordId::new(12), Some(510)).unwrap();
        assert_eq!(gap, Some(10));
    }

    #[test]
    fn test_find_gap_previous_may_have_larger_id() {
        // An older record resubmitted out of order still compares against the
        // newest other record.
        let store = InMemoryTripStore::new();
        store.insert_record(submitted(4, "2022 RAM", "100", "200")).unwrap();
        store.insert_record(submitted(8, "2022 RAM", "300", "400")).unwrap();

        let gap = find_gap(&store, "2022 RAM", RecordId::new(4), Some(100)).unwrap();
        assert_eq!(gap, Some(-300));
    }

    #[test]
    fn test_find_gap_without_previous() {
        let store = InMemoryTripStore::new();
        store.insert_record(submitted(1, "2022 RAM", "100", "200")).unwrap();
        assert_eq!(
            find_gap(&store, "2022 RAM", RecordId::new(1), Some(100)).unwrap(),
            None
        );
    }
}
