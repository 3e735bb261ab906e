//! End-to-end audit scenarios against the in-memory store.

use fleetlog_audit::{AuditOutcome, MileageAuditor, SkipReason};
use fleetlog_core::{AuditConfig, NotifyError, RecordId, TripStatus};
use fleetlog_storage::TripStore;
use fleetlog_test_utils::assertions::assert_alert_issues;
use fleetlog_test_utils::fixtures::{audit_config, store_with, submitted_trip, TripRecordBuilder};
use fleetlog_test_utils::generators::arb_range;
use fleetlog_test_utils::{FailingNotifier, FailingStore, RecordingNotifier};
use proptest::prelude::*;
use std::sync::Arc;

fn auditor_over(
    records: Vec<fleetlog_core::TripRecord>,
) -> (Arc<RecordingNotifier>, MileageAuditor) {
    let store = Arc::new(store_with(records));
    let notifier = Arc::new(RecordingNotifier::new());
    let auditor = MileageAuditor::new(store, notifier.clone(), audit_config());
    (notifier, auditor)
}

#[tokio::test]
async fn test_lone_submission_sends_nothing() {
    let (notifier, auditor) = auditor_over(vec![submitted_trip(10, "1000", "1100")]);

    let outcome = auditor.audit(RecordId::new(10)).await;
    assert!(matches!(outcome, Some(AuditOutcome::Clean(_))));
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn test_overlap_with_earlier_trip_alerts() {
    let (notifier, auditor) = auditor_over(vec![
        TripRecordBuilder::new(5)
            .name("Kim")
            .mileage("1100", "1200")
            .submitted()
            .build(),
        submitted_trip(10, "1150", "1250"),
    ]);

    auditor.audit(RecordId::new(10)).await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "fleet-admin@example.org");
    assert_eq!(
        sent[0].subject,
        "[Vehicle Mileage Check] 2022 RAM - Submitted Record #10"
    );
    assert_alert_issues(
        &sent[0],
        &["Overlapping mileage range detected with 1 other record(s)."],
    );
    assert!(sent[0]
        .body
        .contains("  - Record ID: 5, Name: Kim, Start mileage: 1100, End mileage: 1200"));
}

#[tokio::test]
async fn test_zero_width_trip_inside_earlier_range_alerts() {
    let (notifier, auditor) = auditor_over(vec![
        submitted_trip(5, "1000", "1200"),
        submitted_trip(10, "1100", "1100"),
    ]);

    let outcome = auditor.audit(RecordId::new(10)).await;
    assert!(matches!(outcome, Some(AuditOutcome::Alerted(_))));

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_alert_issues(
        &sent[0],
        &["Overlapping mileage range detected with 1 other record(s)."],
    );
}

#[tokio::test]
async fn test_zero_width_trip_at_range_end_is_clean() {
    let (notifier, auditor) = auditor_over(vec![
        submitted_trip(5, "1000", "1200"),
        submitted_trip(10, "1200", "1200"),
    ]);

    let outcome = auditor.audit(RecordId::new(10)).await;
    assert!(matches!(outcome, Some(AuditOutcome::Clean(_))));
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn test_gap_to_previous_trip_alerts() {
    let (notifier, auditor) = auditor_over(vec![
        submitted_trip(5, "1100", "1200"),
        submitted_trip(10, "1210", "1300"),
    ]);

    auditor.audit(RecordId::new(10)).await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_alert_issues(&sent[0], &["Gap > 5 miles detected to the previous record."]);
    assert!(!sent[0].body.contains("Overlapping record(s):"));
}

#[tokio::test]
async fn test_gap_at_threshold_is_clean() {
    let (notifier, auditor) = auditor_over(vec![
        submitted_trip(5, "1,100", "1,200"),
        submitted_trip(10, "1,205", "1,300"),
    ]);

    auditor.audit(RecordId::new(10)).await;
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn test_all_findings_in_detection_order() {
    let (notifier, auditor) = auditor_over(vec![
        submitted_trip(3, "900", "1000"),
        submitted_trip(5, "1100", "1200"),
        submitted_trip(10, "1150", "1120"),
    ]);

    auditor.audit(RecordId::new(10)).await;

    // A reversed range still parses, so the overlap check runs against it.
    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_alert_issues(
        &sent[0],
        &[
            "End mileage < start mileage (1150 -> 1120).",
            "Overlapping mileage range detected with 1 other record(s).",
        ],
    );

    let (notifier, auditor) = auditor_over(vec![
        submitted_trip(3, "1000", "1100"),
        submitted_trip(5, "900", "1000"),
        submitted_trip(10, "1050", "1150"),
    ]);
    auditor.audit(RecordId::new(10)).await;
    assert_alert_issues(
        &notifier.sent()[0],
        &[
            "Overlapping mileage range detected with 1 other record(s).",
            "Gap > 5 miles detected to the previous record.",
        ],
    );
}

#[tokio::test]
async fn test_missing_mileage_reported() {
    let (notifier, auditor) = auditor_over(vec![TripRecordBuilder::new(10)
        .start(Some("1000"))
        .end(None)
        .submitted()
        .build()]);

    auditor.audit(RecordId::new(10)).await;
    assert_alert_issues(
        &notifier.sent()[0],
        &["Invalid or missing mileage on submitted record."],
    );
}

#[tokio::test]
async fn test_malformed_siblings_are_ignored() {
    let (notifier, auditor) = auditor_over(vec![
        submitted_trip(4, "1,000", "1,100"),
        TripRecordBuilder::new(5)
            .mileage("eleven hundred", "1200")
            .submitted()
            .build(),
        submitted_trip(10, "1100", "1150"),
    ]);

    // Record 5 is skipped for overlap; as the previous record its end is
    // still readable, and 1100 - 1200 is negative.
    auditor.audit(RecordId::new(10)).await;
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn test_draft_record_is_noop() {
    let (notifier, auditor) = auditor_over(vec![
        submitted_trip(5, "1100", "1200"),
        TripRecordBuilder::new(10).mileage("1150", "abc").build(),
    ]);

    let outcome = auditor.audit(RecordId::new(10)).await;
    assert_eq!(outcome, Some(AuditOutcome::Skipped(SkipReason::NotSubmitted)));
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn test_unknown_record_is_noop() {
    let (notifier, auditor) = auditor_over(vec![]);
    let outcome = auditor.audit(RecordId::new(77)).await;
    assert_eq!(outcome, Some(AuditOutcome::Skipped(SkipReason::NotFound)));
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn test_blank_vehicle_is_noop() {
    let (notifier, auditor) = auditor_over(vec![TripRecordBuilder::new(10)
        .vehicle("  ")
        .mileage("5", "1")
        .submitted()
        .build()]);
    let outcome = auditor.audit(RecordId::new(10)).await;
    assert_eq!(outcome, Some(AuditOutcome::Skipped(SkipReason::BlankVehicle)));
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn test_rerun_produces_identical_alert() {
    let (notifier, auditor) = auditor_over(vec![
        submitted_trip(5, "1100", "1200"),
        submitted_trip(8, "1180", "1190"),
        submitted_trip(10, "1150", "1250"),
    ]);

    auditor.audit(RecordId::new(10)).await;
    auditor.audit(RecordId::new(10)).await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], sent[1]);
    assert_alert_issues(
        &sent[0],
        &["Overlapping mileage range detected with 2 other record(s)."],
    );
}

#[tokio::test]
async fn test_notifier_failure_does_not_propagate() {
    let store = Arc::new(store_with(vec![
        submitted_trip(5, "1100", "1200"),
        submitted_trip(10, "1150", "1250"),
    ]));
    let notifier = Arc::new(FailingNotifier::default());
    let auditor = MileageAuditor::new(store, notifier.clone(), audit_config());

    let outcome = auditor.audit(RecordId::new(10)).await;
    assert!(matches!(
        outcome,
        Some(AuditOutcome::AlertFailed {
            error: NotifyError::Transport { .. },
            ..
        })
    ));
    assert_eq!(notifier.attempts(), 1);
}

#[tokio::test]
async fn test_store_failure_is_swallowed() {
    let notifier = Arc::new(RecordingNotifier::new());
    let auditor = MileageAuditor::new(Arc::new(FailingStore), notifier.clone(), audit_config());

    assert!(auditor.run(RecordId::new(1)).await.is_err());
    assert_eq!(auditor.audit(RecordId::new(1)).await, None);
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn test_unconfigured_recipient_sends_nothing() {
    let store = Arc::new(store_with(vec![submitted_trip(10, "", "")]));
    let notifier = Arc::new(RecordingNotifier::new());
    let auditor = MileageAuditor::new(store, notifier.clone(), AuditConfig::default());

    let outcome = auditor.audit(RecordId::new(10)).await;
    assert!(matches!(outcome, Some(AuditOutcome::AlertNotConfigured(_))));
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn test_audit_never_mutates_store() {
    let store = Arc::new(store_with(vec![
        submitted_trip(5, "1100", "1200"),
        submitted_trip(10, "1150", "1250"),
    ]));
    let before = store.trip_get(RecordId::new(10)).unwrap();
    let auditor = MileageAuditor::new(
        store.clone(),
        Arc::new(RecordingNotifier::new()),
        audit_config(),
    );

    auditor.audit(RecordId::new(10)).await;
    assert_eq!(store.trip_get(RecordId::new(10)).unwrap(), before);
    assert_eq!(store.len().unwrap(), 2);
}

// ============================================================================
// PROPERTY TESTS
// ============================================================================

proptest! {
    /// The overlap count in the report equals a brute-force count over the
    /// submitted siblings of the same vehicle.
    #[test]
    fn prop_overlap_count_matches_brute_force(
        siblings in prop::collection::vec((arb_range(), any::<bool>()), 0..12),
        target in arb_range(),
    ) {
        let mut records = Vec::new();
        for (i, ((s, e), submitted)) in siblings.iter().enumerate() {
            let status = if *submitted { TripStatus::Submitted } else { TripStatus::Draft };
            records.push(
                TripRecordBuilder::new(i as i64 + 1)
                    .mileage(&s.to_string(), &e.to_string())
                    .status(status)
                    .build(),
            );
        }
        let target_id = siblings.len() as i64 + 1;
        records.push(
            TripRecordBuilder::new(target_id)
                .mileage(&target.0.to_string(), &target.1.to_string())
                .submitted()
                .build(),
        );

        let (_, auditor) = auditor_over(records);
        let expected = siblings
            .iter()
            .filter(|((s, e), submitted)| *submitted && target.0 < *e && target.1 > *s)
            .count();

        match auditor.evaluate(RecordId::new(target_id)).unwrap() {
            fleetlog_audit::AuditEvaluation::Assessed(report) => {
                prop_assert_eq!(report.overlaps.len(), expected);
            }
            other => prop_assert!(false, "unexpected evaluation: {:?}", other),
        }
    }

    /// Evaluation is a pure function of store contents.
    #[test]
    fn prop_evaluate_is_repeatable(
        siblings in prop::collection::vec(arb_range(), 0..8),
        target in arb_range(),
    ) {
        let mut records: Vec<_> = siblings
            .iter()
            .enumerate()
            .map(|(i, (s, e))| submitted_trip(i as i64 + 1, &s.to_string(), &e.to_string()))
            .collect();
        let target_id = siblings.len() as i64 + 1;
        records.push(submitted_trip(target_id, &target.0.to_string(), &target.1.to_string()));

        let (_, auditor) = auditor_over(records);
        let first = auditor.evaluate(RecordId::new(target_id)).unwrap();
        let second = auditor.evaluate(RecordId::new(target_id)).unwrap();
        prop_assert_eq!(first, second);
    }
}
