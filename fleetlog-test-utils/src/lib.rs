//! FLEETLOG Test Utilities
//!
//! Shared test infrastructure for the FLEETLOG workspace:
//! - Notifier doubles that record, refuse or stall alerts
//! - A store that fails every call
//! - Proptest generators for trip data
//! - Fixtures for common audit scenarios

pub use fleetlog_audit::{AlertMessage, Notifier};
pub use fleetlog_core::{
    AuditConfig, FleetError, FleetResult, NotifyError, RecordId, StorageError, TripForm,
    TripRecord, TripStatus,
};
pub use fleetlog_storage::{InMemoryTripStore, TripFilter, TripStore, TripUpdate};

use async_trait::async_trait;
use std::sync::Mutex;

// ============================================================================
// NOTIFIER DOUBLES
// ============================================================================

/// Notifier that keeps every alert it is given.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<AlertMessage>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alerts received so far, in order.
    pub fn sent(&self) -> Vec<AlertMessage> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().map(|v| v.len()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut v) = self.sent.lock() {
            v.clear();
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, alert: &AlertMessage) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .map_err(|_| NotifyError::Transport {
                reason: "recording notifier lock poisoned".to_string(),
            })?
            .push(alert.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Notifier that rejects every alert and counts attempts.
#[derive(Debug)]
pub struct FailingNotifier {
    error: NotifyError,
    attempts: Mutex<usize>,
}

impl FailingNotifier {
    pub fn new(error: NotifyError) -> Self {
        Self {
            error,
            attempts: Mutex::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.lock().map(|n| *n).unwrap_or_default()
    }
}

impl Default for FailingNotifier {
    fn default() -> Self {
        Self::new(NotifyError::Transport {
            reason: "relay unreachable".to_string(),
        })
    }
}

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _alert: &AlertMessage) -> Result<(), NotifyError> {
        if let Ok(mut n) = self.attempts.lock() {
            *n += 1;
        }
        Err(self.error.clone())
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Notifier whose delivery never completes, like a relay that hangs.
#[derive(Debug, Default)]
pub struct StalledNotifier {
    calls: Mutex<usize>,
}

impl StalledNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliveries started so far.
    pub fn calls(&self) -> usize {
        self.calls.lock().map(|n| *n).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for StalledNotifier {
    async fn send(&self, _alert: &AlertMessage) -> Result<(), NotifyError> {
        if let Ok(mut n) = self.calls.lock() {
            *n += 1;
        }
        std::future::pending().await
    }

    fn name(&self) -> &'static str {
        "stalled"
    }
}

// ============================================================================
// STORE DOUBLES
// ============================================================================

/// Store whose every operation fails with a query error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStore;

impl FailingStore {
    fn fail<T>() -> FleetResult<T> {
        Err(StorageError::QueryFailed {
            reason: "store offline".to_string(),
        }
        .into())
    }
}

impl TripStore for FailingStore {
    fn trip_create(&self, _form: TripForm, _status: TripStatus) -> FleetResult<TripRecord> {
        Self::fail()
    }

    fn trip_get(&self, _id: RecordId) -> FleetResult<Option<TripRecord>> {
        Self::fail()
    }

    fn trip_update(&self, _id: RecordId, _update: TripUpdate) -> FleetResult<TripRecord> {
        Self::fail()
    }

    fn trip_delete(&self, _id: RecordId) -> FleetResult<()> {
        Self::fail()
    }

    fn trip_query(
        &self,
        _vehicle: &str,
        _status: TripStatus,
        _exclude: Option<RecordId>,
    ) -> FleetResult<Vec<TripRecord>> {
        Self::fail()
    }

    fn trip_query_latest(
        &self,
        _vehicle: &str,
        _status: TripStatus,
        _exclude: Option<RecordId>,
    ) -> FleetResult<Option<TripRecord>> {
        Self::fail()
    }

    fn trip_latest_by_status(&self, _status: TripStatus) -> FleetResult<Option<TripRecord>> {
        Self::fail()
    }

    fn trip_list(&self, _filter: &TripFilter) -> FleetResult<Vec<TripRecord>> {
        Self::fail()
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for trip data.

    use super::*;
    use proptest::prelude::*;

    pub const FLEET: [&str; 3] = ["2022 RAM", "2012 F250", "2016 AWD Equinox"];

    pub fn arb_status() -> impl Strategy<Value = TripStatus> {
        prop_oneof![Just(TripStatus::Draft), Just(TripStatus::Submitted)]
    }

    pub fn arb_vehicle() -> impl Strategy<Value = String> {
        prop::sample::select(FLEET.to_vec()).prop_map(str::to_string)
    }

    /// Odometer text as users type it: plain, comma-grouped, padded, or junk.
    pub fn arb_mileage_text() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            4 => (0i64..300_000).prop_map(|n| Some(n.to_string())),
            2 => (1_000i64..300_000).prop_map(|n| Some(fleetlog_core::format_mileage(&n.to_string()))),
            1 => (0i64..300_000).prop_map(|n| Some(format!("  {} ", n))),
            1 => Just(None),
            1 => Just(Some(String::new())),
            1 => "[a-z]{1,6}".prop_map(Some),
        ]
    }

    /// A submitted range `[start, start + len)` on a small odometer window so
    /// overlaps are common.
    pub fn arb_range() -> impl Strategy<Value = (i64, i64)> {
        (0i64..2_000, 0i64..400).prop_map(|(start, len)| (start, start + len))
    }

    pub fn arb_trip_form() -> impl Strategy<Value = TripForm> {
        (
            "[A-Z][a-z]{2,8}",
            arb_vehicle(),
            arb_mileage_text(),
            arb_mileage_text(),
        )
            .prop_map(|(name, vehicle, start_mileage, end_mileage)| TripForm {
                email: format!("{}@example.org", name.to_lowercase()),
                name,
                vehicle,
                start_mileage,
                end_mileage,
                ..TripForm::default()
            })
    }

    pub fn arb_trip_record() -> impl Strategy<Value = TripRecord> {
        (1i64..10_000, arb_trip_form(), arb_status()).prop_map(|(id, form, status)| {
            TripRecord::from_form(RecordId::new(id), form, status, chrono::Utc::now())
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built records and stores for audit scenarios.

    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    /// Fixed submission time so alert bodies are reproducible.
    pub fn fixed_time() -> fleetlog_core::Timestamp {
        Utc.with_ymd_and_hms(2024, 5, 14, 16, 45, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// Builder for trip records with explicit ids.
    #[derive(Debug, Clone)]
    pub struct TripRecordBuilder {
        id: RecordId,
        form: TripForm,
        status: TripStatus,
    }

    impl TripRecordBuilder {
        pub fn new(id: i64) -> Self {
            Self {
                id: RecordId::new(id),
                form: TripForm {
                    name: format!("Driver {}", id),
                    phone: "555-0100".to_string(),
                    email: format!("driver{}@example.org", id),
                    vehicle: "2022 RAM".to_string(),
                    dep_date: NaiveDate::from_ymd_opt(2024, 5, 13),
                    ret_date: NaiveDate::from_ymd_opt(2024, 5, 14),
                    destination: "Field site".to_string(),
                    purpose: "Survey".to_string(),
                    project: "North Basin".to_string(),
                    ..TripForm::default()
                },
                status: TripStatus::Draft,
            }
        }

        pub fn name(mut self, name: &str) -> Self {
            self.form.name = name.to_string();
            self
        }

        pub fn email(mut self, email: &str) -> Self {
            self.form.email = email.to_string();
            self
        }

        pub fn vehicle(mut self, vehicle: &str) -> Self {
            self.form.vehicle = vehicle.to_string();
            self
        }

        pub fn mileage(mut self, start: &str, end: &str) -> Self {
            self.form.start_mileage = Some(start.to_string());
            self.form.end_mileage = Some(end.to_string());
            self
        }

        pub fn start(mut self, start: Option<&str>) -> Self {
            self.form.start_mileage = start.map(str::to_string);
            self
        }

        pub fn end(mut self, end: Option<&str>) -> Self {
            self.form.end_mileage = end.map(str::to_string);
            self
        }

        pub fn status(mut self, status: TripStatus) -> Self {
            self.status = status;
            self
        }

        pub fn submitted(self) -> Self {
            self.status(TripStatus::Submitted)
        }

        pub fn form(&self) -> TripForm {
            self.form.clone()
        }

        pub fn build(self) -> TripRecord {
            TripRecord::from_form(self.id, self.form, self.status, fixed_time())
        }
    }

    /// Submitted "2022 RAM" record with the given range.
    pub fn submitted_trip(id: i64, start: &str, end: &str) -> TripRecord {
        TripRecordBuilder::new(id).mileage(start, end).submitted().build()
    }

    /// In-memory store pre-loaded with `records`.
    pub fn store_with(records: impl IntoIterator<Item = TripRecord>) -> InMemoryTripStore {
        let store = InMemoryTripStore::new();
        for record in records {
            if let Err(e) = store.insert_record(record) {
                panic!("fixture insert failed: {}", e);
            }
        }
        store
    }

    pub fn audit_config() -> AuditConfig {
        AuditConfig::with_recipient("fleet-admin@example.org")
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertion helpers for FLEETLOG results.

    use super::*;

    /// Assert that a result is a storage error.
    pub fn assert_storage_error<T: std::fmt::Debug>(result: &FleetResult<T>) {
        match result {
            Err(FleetError::Storage(_)) => {}
            other => panic!("Expected storage error, got {:?}", other),
        }
    }

    /// Assert that a result is a not-found storage error for `id`.
    pub fn assert_not_found<T: std::fmt::Debug>(result: &FleetResult<T>, id: RecordId) {
        match result {
            Err(FleetError::Storage(StorageError::NotFound { id: got })) if *got == id => {}
            other => panic!("Expected NotFound for {}, got {:?}", id, other),
        }
    }

    /// Assert that an alert lists exactly `issues` in its findings.
    pub fn assert_alert_issues(alert: &AlertMessage, issues: &[&str]) {
        let findings: Vec<&str> = alert
            .body
            .split("Findings:\n")
            .nth(1)
            .unwrap_or_default()
            .lines()
            .take_while(|l| l.starts_with("  - "))
            .map(|l| l.trim_start_matches("  - "))
            .collect();
        assert_eq!(findings, issues, "alert findings mismatch");
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let record = TripRecordBuilder::new(4).build();
        assert_eq!(record.id, RecordId::new(4));
        assert_eq!(record.status, TripStatus::Draft);
        assert_eq!(record.vehicle, "2022 RAM");
        assert_eq!(record.submitted_time, Some(fixed_time()));
    }

    #[test]
    fn test_failing_store_fails_everything() {
        let store = FailingStore;
        assertions::assert_storage_error(&store.trip_get(RecordId::new(1)));
        assertions::assert_storage_error(&store.trip_list(&TripFilter::default()));
    }

    #[test]
    fn test_store_with_keeps_ids() {
        let store = store_with([submitted_trip(5, "1", "2"), submitted_trip(9, "3", "4")]);
        assert!(store.trip_get(RecordId::new(9)).unwrap().is_some());
        assertions::assert_not_found(
            &store.trip_delete(RecordId::new(6)),
            RecordId::new(6),
        );
    }
}
