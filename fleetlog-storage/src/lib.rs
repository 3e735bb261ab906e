//! FLEETLOG Storage - Trip Store Trait, In-Memory and SQLite Implementations
//!
//! Defines the record store the submission workflow writes to and the
//! mileage audit reads from. Queries are by vehicle + status with ordering by
//! record id; nothing here interprets mileage.
//!
//! `open_store` picks a backend from a `DATABASE_URL` style string.

mod sqlite;

pub use sqlite::SqliteTripStore;

use chrono::{NaiveDate, Utc};
use fleetlog_core::{
    ConfigError, FleetResult, RecordId, StorageError, TripForm, TripRecord, TripStatus,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

// ============================================================================
// UPDATE / FILTER TYPES
// ============================================================================

/// Update payload for trip records.
#[derive(Debug, Clone, Default)]
pub struct TripUpdate {
    /// Replacement form contents (drafts only)
    pub form: Option<TripForm>,
    /// New lifecycle status
    pub status: Option<TripStatus>,
    /// Reviewer note
    pub admin_comment: Option<String>,
}

impl TripUpdate {
    /// Update that replaces the form and sets the status in one step.
    pub fn edit(form: TripForm, status: TripStatus) -> Self {
        Self {
            form: Some(form),
            status: Some(status),
            admin_comment: None,
        }
    }
}

/// Apply `update` to `record` in place. Nothing changes when a check fails.
pub(crate) fn apply_update(record: &mut TripRecord, update: TripUpdate) -> FleetResult<()> {
    let id = record.id;
    if let Some(next) = update.status {
        if !record.status.can_transition_to(next) {
            return Err(StorageError::InvalidTransition {
                id,
                from: record.status,
                to: next,
            }
            .into());
        }
    }
    if update.form.is_some() && record.is_submitted() {
        return Err(StorageError::ReadOnly { id }.into());
    }

    if let Some(form) = update.form {
        record.apply_form(form, Utc::now());
    }
    if let Some(status) = update.status {
        record.status = status;
    }
    if let Some(comment) = update.admin_comment {
        record.admin_comment = comment;
    }
    Ok(())
}

/// Listing filter used by the review screens.
///
/// Vehicle, status and email match exactly (the vehicle after trimming the
/// filter value, email ignoring case); the free text fields match as
/// case-insensitive substrings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripFilter {
    pub vehicle: Option<String>,
    pub status: Option<TripStatus>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub project: Option<String>,
    pub purpose: Option<String>,
    pub dep_date_from: Option<NaiveDate>,
    pub dep_date_to: Option<NaiveDate>,
}

impl TripFilter {
    /// Whether `record` passes every populated criterion.
    pub fn matches(&self, record: &TripRecord) -> bool {
        fn contains(haystack: &str, needle: &Option<String>) -> bool {
            match needle.as_deref().map(str::trim) {
                Some(n) if !n.is_empty() => haystack.to_lowercase().contains(&n.to_lowercase()),
                _ => true,
            }
        }

        if let Some(vehicle) = &self.vehicle {
            if record.vehicle != vehicle.trim() {
                return false;
            }
        }
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(email) = &self.email {
            if !record.is_owned_by(email) {
                return false;
            }
        }
        if let Some(from) = self.dep_date_from {
            if record.dep_date.map_or(true, |d| d < from) {
                return false;
            }
        }
        if let Some(to) = self.dep_date_to {
            if record.dep_date.map_or(true, |d| d > to) {
                return false;
            }
        }

        contains(&record.name, &self.name)
            && contains(&record.project, &self.project)
            && contains(&record.purpose, &self.purpose)
    }
}

// ============================================================================
// STORE TRAIT
// ============================================================================

/// Storage trait for trip records.
pub trait TripStore: Send + Sync {
    /// Create a record from a form, assigning the next identifier.
    fn trip_create(&self, form: TripForm, status: TripStatus) -> FleetResult<TripRecord>;

    /// Get a record by id.
    fn trip_get(&self, id: RecordId) -> FleetResult<Option<TripRecord>>;

    /// Apply an update and return the stored result.
    fn trip_update(&self, id: RecordId, update: TripUpdate) -> FleetResult<TripRecord>;

    /// Delete a record.
    fn trip_delete(&self, id: RecordId) -> FleetResult<()>;

    /// Records for `vehicle` in `status`, optionally excluding one id.
    /// The target name is trimmed; stored names compare exactly. Ordered by
    /// id ascending.
    fn trip_query(
        &self,
        vehicle: &str,
        status: TripStatus,
        exclude: Option<RecordId>,
    ) -> FleetResult<Vec<TripRecord>>;

    /// The record with the largest id among `trip_query` results.
    fn trip_query_latest(
        &self,
        vehicle: &str,
        status: TripStatus,
        exclude: Option<RecordId>,
    ) -> FleetResult<Option<TripRecord>>;

    /// The record with the largest id in `status`, across all vehicles.
    fn trip_latest_by_status(&self, status: TripStatus) -> FleetResult<Option<TripRecord>>;

    /// Records passing `filter`, ordered by id descending.
    fn trip_list(&self, filter: &TripFilter) -> FleetResult<Vec<TripRecord>>;
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

#[derive(Debug)]
struct StoreInner {
    records: BTreeMap<RecordId, TripRecord>,
    next_id: i64,
}

impl Default for StoreInner {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: 1,
        }
    }
}

/// In-memory trip store.
///
/// Records are kept in id order, which makes "latest" lookups a reverse scan.
/// Clones share the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTripStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl InMemoryTripStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> FleetResult<RwLockReadGuard<'_, StoreInner>> {
        self.inner
            .read()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    fn write(&self) -> FleetResult<RwLockWriteGuard<'_, StoreInner>> {
        self.inner
            .write()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    /// Insert a fully-formed record, keeping its id.
    ///
    /// Later `trip_create` calls continue numbering above the largest id seen.
    pub fn insert_record(&self, record: TripRecord) -> FleetResult<()> {
        let mut inner = self.write()?;
        if inner.records.contains_key(&record.id) {
            return Err(StorageError::InsertFailed {
                reason: format!("record {} already exists", record.id),
            }
            .into());
        }
        inner.next_id = inner.next_id.max(record.id.get() + 1);
        inner.records.insert(record.id, record);
        Ok(())
    }

    /// Number of stored records.
    pub fn len(&self) -> FleetResult<usize> {
        Ok(self.read()?.records.len())
    }

    pub fn is_empty(&self) -> FleetResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Remove every record and restart numbering.
    pub fn clear(&self) -> FleetResult<()> {
        *self.write()? = StoreInner::default();
        Ok(())
    }
}

impl TripStore for InMemoryTripStore {
    fn trip_create(&self, form: TripForm, status: TripStatus) -> FleetResult<TripRecord> {
        let mut inner = self.write()?;
        let id = RecordId::new(inner.next_id);
        inner.next_id += 1;

        let record = TripRecord::from_form(id, form, status, Utc::now());
        inner.records.insert(id, record.clone());
        tracing::debug!(record_id = %id, status = %status, "Trip record created");
        Ok(record)
    }

    fn trip_get(&self, id: RecordId) -> FleetResult<Option<TripRecord>> {
        Ok(self.read()?.records.get(&id).cloned())
    }

    fn trip_update(&self, id: RecordId, update: TripUpdate) -> FleetResult<TripRecord> {
        let mut inner = self.write()?;
        let record = inner
            .records
            .get_mut(&id)
            .ok_or(StorageError::NotFound { id })?;

        apply_update(record, update)?;
        Ok(record.clone())
    }

    fn trip_delete(&self, id: RecordId) -> FleetResult<()> {
        let mut inner = self.write()?;
        inner
            .records
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound { id }.into())
    }

    fn trip_query(
        &self,
        vehicle: &str,
        status: TripStatus,
        exclude: Option<RecordId>,
    ) -> FleetResult<Vec<TripRecord>> {
        let inner = self.read()?;
        Ok(inner
            .records
            .values()
            .filter(|r| r.vehicle == vehicle.trim() && r.status == status && Some(r.id) != exclude)
            .cloned()
            .collect())
    }

    fn trip_query_latest(
        &self,
        vehicle: &str,
        status: TripStatus,
        exclude: Option<RecordId>,
    ) -> FleetResult<Option<TripRecord>> {
        let inner = self.read()?;
        Ok(inner
            .records
            .values()
            .rev()
            .find(|r| r.vehicle == vehicle.trim() && r.status == status && Some(r.id) != exclude)
            .cloned())
    }

    fn trip_latest_by_status(&self, status: TripStatus) -> FleetResult<Option<TripRecord>> {
        let inner = self.read()?;
        Ok(inner
            .records
            .values()
            .rev()
            .find(|r| r.status == status)
            .cloned())
    }

    fn trip_list(&self, filter: &TripFilter) -> FleetResult<Vec<TripRecord>> {
        let inner = self.read()?;
        Ok(inner
            .records
            .values()
            .rev()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }
}

// ============================================================================
// STORE SELECTION
// ============================================================================

/// Store location used when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:///fleetlog.db";

/// Backend named by a database URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// Process-local, lost on restart (`memory://`)
    Memory,
    /// Private SQLite database in memory (`sqlite::memory:`)
    SqliteMemory,
    /// SQLite database file
    SqliteFile(PathBuf),
}

impl StoreLocation {
    /// Parse a `DATABASE_URL` value.
    ///
    /// `sqlite:///rel.db` and `sqlite:////abs/path.db` follow the usual three
    /// and four slash forms; `sqlite://path`, `sqlite:path` and a bare path
    /// are also accepted.
    pub fn parse(url: &str) -> FleetResult<Self> {
        let url = url.trim();
        let invalid = |reason: &str| ConfigError::InvalidValue {
            field: "DATABASE_URL".to_string(),
            value: url.to_string(),
            reason: reason.to_string(),
        };

        match url {
            "" => return Self::parse(DEFAULT_DATABASE_URL),
            "memory" | "memory://" => return Ok(Self::Memory),
            "sqlite::memory:" | "sqlite://:memory:" => return Ok(Self::SqliteMemory),
            _ => {}
        }

        let path = if let Some(rest) = url.strip_prefix("sqlite:///") {
            rest
        } else if let Some(rest) = url.strip_prefix("sqlite://") {
            rest
        } else if let Some(rest) = url.strip_prefix("sqlite:") {
            rest
        } else if url.contains("://") {
            return Err(invalid("only sqlite:// and memory:// stores are supported").into());
        } else {
            url
        };

        if path.is_empty() {
            return Err(invalid("missing database file path").into());
        }
        Ok(Self::SqliteFile(PathBuf::from(path)))
    }
}

/// Record store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub database_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

impl StoreConfig {
    /// Read `DATABASE_URL`, falling back to a `fleetlog.db` file.
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
        }
    }

    /// Open the configured store.
    pub fn open(&self) -> FleetResult<Arc<dyn TripStore>> {
        let location = StoreLocation::parse(&self.database_url)?;
        let store: Arc<dyn TripStore> = match &location {
            StoreLocation::Memory => {
                tracing::warn!("Using in-memory trip store; records are lost on restart");
                Arc::new(InMemoryTripStore::new())
            }
            StoreLocation::SqliteMemory => Arc::new(SqliteTripStore::open_in_memory()?),
            StoreLocation::SqliteFile(path) => Arc::new(SqliteTripStore::open(path)?),
        };
        tracing::info!(location = ?location, "Trip store opened");
        Ok(store)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use fleetlog_core::FleetError;

    fn make_form(vehicle: &str, start: &str, end: &str) -> TripForm {
        TripForm {
            name: "Test Driver".to_string(),
            email: "driver@example.org".to_string(),
            vehicle: vehicle.to_string(),
            start_mileage: Some(start.to_string()),
            end_mileage: Some(end.to_string()),
            ..TripForm::default()
        }
    }

    fn make_record(id: i64, vehicle: &str, status: TripStatus) -> TripRecord {
        TripRecord::from_form(
            RecordId::new(id),
            make_form(vehicle, "100", "200"),
            status,
            Utc::now(),
        )
    }

    #[test]
    fn test_create_assigns_increasing_ids() {
        let store = InMemoryTripStore::new();
        let a = store
            .trip_create(make_form("2022 RAM", "1", "2"), TripStatus::Draft)
            .unwrap();
        let b = store
            .trip_create(make_form("2022 RAM", "2", "3"), TripStatus::Submitted)
            .unwrap();

        assert_eq!(a.id, RecordId::new(1));
        assert_eq!(b.id, RecordId::new(2));
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn test_get_missing_returns_none() {
        let store = InMemoryTripStore::new();
        assert!(store.trip_get(RecordId::new(99)).unwrap().is_none());
    }

    #[test]
    fn test_insert_record_duplicate() {
        let store = InMemoryTripStore::new();
        store
            .insert_record(make_record(5, "2022 RAM", TripStatus::Submitted))
            .unwrap();
        let result = store.insert_record(make_record(5, "2022 RAM", TripStatus::Draft));
        assert!(matches!(
            result,
            Err(FleetError::Storage(StorageError::InsertFailed { .. }))
        ));
    }

    #[test]
    fn test_insert_record_bumps_counter() {
        let store = InMemoryTripStore::new();
        store
            .insert_record(make_record(10, "2022 RAM", TripStatus::Submitted))
            .unwrap();
        let next = store
            .trip_create(make_form("2022 RAM", "1", "2"), TripStatus::Draft)
            .unwrap();
        assert_eq!(next.id, RecordId::new(11));
    }

    #[test]
    fn test_query_filters_vehicle_status_and_exclusion() {
        let store = InMemoryTripStore::new();
        store.insert_record(make_record(1, "2022 RAM", TripStatus::Submitted)).unwrap();
        store.insert_record(make_record(2, "2022 RAM", TripStatus::Draft)).unwrap();
        store.insert_record(make_record(3, "2012 F250", TripStatus::Submitted)).unwrap();
        store.insert_record(make_record(4, "2022 RAM", TripStatus::Submitted)).unwrap();

        let ids: Vec<i64> = store
            .trip_query("2022 RAM", TripStatus::Submitted, Some(RecordId::new(4)))
            .unwrap()
            .iter()
            .map(|r| r.id.get())
            .collect();
        assert_eq!(ids, vec![1]);

        let all: Vec<i64> = store
            .trip_query("2022 RAM", TripStatus::Submitted, None)
            .unwrap()
            .iter()
            .map(|r| r.id.get())
            .collect();
        assert_eq!(all, vec![1, 4]);
    }

    #[test]
    fn test_query_trims_target_but_not_stored_vehicle() {
        let store = InMemoryTripStore::new();
        store.insert_record(make_record(1, "2022 RAM", TripStatus::Submitted)).unwrap();
        store.insert_record(make_record(2, "2022 RAM ", TripStatus::Submitted)).unwrap();

        let ids: Vec<i64> = store
            .trip_query(" 2022 RAM ", TripStatus::Submitted, None)
            .unwrap()
            .iter()
            .map(|r| r.id.get())
            .collect();
        assert_eq!(ids, vec![1]);

        let latest = store
            .trip_query_latest("2022 RAM", TripStatus::Submitted, None)
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, RecordId::new(1));

        assert!(store
            .trip_query("2022 ram", TripStatus::Submitted, None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_filter_vehicle_compares_stored_name_exactly() {
        let padded = make_record(1, " 2022 RAM", TripStatus::Submitted);
        let filter = TripFilter {
            vehicle: Some("2022 RAM ".to_string()),
            ..TripFilter::default()
        };
        assert!(!filter.matches(&padded));
        assert!(filter.matches(&make_record(2, "2022 RAM", TripStatus::Submitted)));
    }

    #[test]
    fn test_query_latest_picks_largest_id() {
        let store = InMemoryTripStore::new();
        store.insert_record(make_record(3, "2022 RAM", TripStatus::Submitted)).unwrap();
        store.insert_record(make_record(8, "2022 RAM", TripStatus::Submitted)).unwrap();
        store.insert_record(make_record(9, "2022 RAM", TripStatus::Draft)).unwrap();
        store.insert_record(make_record(12, "2022 RAM", TripStatus::Submitted)).unwrap();

        let latest = store
            .trip_query_latest("2022 RAM", TripStatus::Submitted, Some(RecordId::new(12)))
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, RecordId::new(8));

        assert!(store
            .trip_query_latest("2016 AWD Equinox", TripStatus::Submitted, None)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_latest_by_status_spans_vehicles() {
        let store = InMemoryTripStore::new();
        store.insert_record(make_record(1, "2022 RAM", TripStatus::Submitted)).unwrap();
        store.insert_record(make_record(2, "2012 F250", TripStatus::Submitted)).unwrap();
        store.insert_record(make_record(3, "2012 F250", TripStatus::Draft)).unwrap();

        let latest = store
            .trip_latest_by_status(TripStatus::Submitted)
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, RecordId::new(2));
    }

    #[test]
    fn test_update_draft_then_submit() {
        let store = InMemoryTripStore::new();
        let draft = store
            .trip_create(make_form("2022 RAM", "100", "150"), TripStatus::Draft)
            .unwrap();

        let updated = store
            .trip_update(
                draft.id,
                TripUpdate::edit(make_form("2022 RAM", "100", "175"), TripStatus::Submitted),
            )
            .unwrap();

        assert_eq!(updated.status, TripStatus::Submitted);
        assert_eq!(updated.end_mileage.as_deref(), Some("175"));
    }

    #[test]
    fn test_update_submitted_form_is_rejected() {
        let store = InMemoryTripStore::new();
        let rec = store
            .trip_create(make_form("2022 RAM", "100", "150"), TripStatus::Submitted)
            .unwrap();

        let result = store.trip_update(
            rec.id,
            TripUpdate::edit(make_form("2022 RAM", "0", "1"), TripStatus::Submitted),
        );
        assert!(matches!(
            result,
            Err(FleetError::Storage(StorageError::ReadOnly { .. }))
        ));
        let unchanged = store.trip_get(rec.id).unwrap().unwrap();
        assert_eq!(unchanged.start_mileage.as_deref(), Some("100"));
    }

    #[test]
    fn test_update_cannot_return_to_draft() {
        let store = InMemoryTripStore::new();
        let rec = store
            .trip_create(make_form("2022 RAM", "100", "150"), TripStatus::Submitted)
            .unwrap();

        let result = store.trip_update(
            rec.id,
            TripUpdate {
                status: Some(TripStatus::Draft),
                ..TripUpdate::default()
            },
        );
        assert!(matches!(
            result,
            Err(FleetError::Storage(StorageError::InvalidTransition { .. }))
        ));
    }

    #[test]
    fn test_admin_comment_on_submitted_record() {
        let store = InMemoryTripStore::new();
        let rec = store
            .trip_create(make_form("2022 RAM", "100", "150"), TripStatus::Submitted)
            .unwrap();

        let updated = store
            .trip_update(
                rec.id,
                TripUpdate {
                    admin_comment: Some("verified".to_string()),
                    ..TripUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.admin_comment, "verified");
    }

    #[test]
    fn test_update_missing_record() {
        let store = InMemoryTripStore::new();
        let result = store.trip_update(RecordId::new(1), TripUpdate::default());
        assert!(matches!(
            result,
            Err(FleetError::Storage(StorageError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_delete() {
        let store = InMemoryTripStore::new();
        store.insert_record(make_record(1, "2022 RAM", TripStatus::Draft)).unwrap();
        store.trip_delete(RecordId::new(1)).unwrap();
        assert!(store.is_empty().unwrap());
        assert!(store.trip_delete(RecordId::new(1)).is_err());
    }

    #[test]
    fn test_list_with_filter_orders_newest_first() {
        let store = InMemoryTripStore::new();
        let mut a = make_record(1, "2022 RAM", TripStatus::Submitted);
        a.project = "Wetlands Survey".to_string();
        let mut b = make_record(2, "2022 RAM", TripStatus::Submitted);
        b.project = "wetlands follow-up".to_string();
        let c = make_record(3, "2012 F250", TripStatus::Submitted);
        store.insert_record(a).unwrap();
        store.insert_record(b).unwrap();
        store.insert_record(c).unwrap();

        let filter = TripFilter {
            vehicle: Some("2022 RAM".to_string()),
            project: Some("WETLANDS".to_string()),
            ..TripFilter::default()
        };
        let ids: Vec<i64> = store
            .trip_list(&filter)
            .unwrap()
            .iter()
            .map(|r| r.id.get())
            .collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_filter_departure_range() {
        let mut record = make_record(1, "2022 RAM", TripStatus::Submitted);
        record.dep_date = NaiveDate::from_ymd_opt(2024, 5, 10);

        let inside = TripFilter {
            dep_date_from: NaiveDate::from_ymd_opt(2024, 5, 1),
            dep_date_to: NaiveDate::from_ymd_opt(2024, 5, 31),
            ..TripFilter::default()
        };
        assert!(inside.matches(&record));

        let after = TripFilter {
            dep_date_from: NaiveDate::from_ymd_opt(2024, 6, 1),
            ..TripFilter::default()
        };
        assert!(!after.matches(&record));

        record.dep_date = None;
        assert!(!inside.matches(&record));
    }

    #[test]
    fn test_store_location_parse() {
        assert_eq!(
            StoreLocation::parse("sqlite:///vehicle_log.db").unwrap(),
            StoreLocation::SqliteFile(PathBuf::from("vehicle_log.db"))
        );
        assert_eq!(
            StoreLocation::parse("sqlite:////var/lib/fleetlog/fleetlog.db").unwrap(),
            StoreLocation::SqliteFile(PathBuf::from("/var/lib/fleetlog/fleetlog.db"))
        );
        assert_eq!(
            StoreLocation::parse("sqlite://data/fleet.db").unwrap(),
            StoreLocation::SqliteFile(PathBuf::from("data/fleet.db"))
        );
        assert_eq!(
            StoreLocation::parse("trips.db").unwrap(),
            StoreLocation::SqliteFile(PathBuf::from("trips.db"))
        );
        assert_eq!(
            StoreLocation::parse("  ").unwrap(),
            StoreLocation::SqliteFile(PathBuf::from("fleetlog.db"))
        );
        assert_eq!(StoreLocation::parse("memory://").unwrap(), StoreLocation::Memory);
        assert_eq!(
            StoreLocation::parse("sqlite::memory:").unwrap(),
            StoreLocation::SqliteMemory
        );
    }

    #[test]
    fn test_store_location_rejects_unsupported() {
        for url in ["postgresql://fleet@db/fleetlog", "sqlite:///"] {
            assert!(matches!(
                StoreLocation::parse(url),
                Err(FleetError::Config(ConfigError::InvalidValue { .. }))
            ));
        }
    }

    #[test]
    fn test_store_config_opens_working_store() {
        let config = StoreConfig {
            database_url: "sqlite::memory:".to_string(),
        };
        let store = config.open().unwrap();
        let rec = store
            .trip_create(make_form("2022 RAM", "1", "2"), TripStatus::Submitted)
            .unwrap();
        assert_eq!(store.trip_get(rec.id).unwrap().unwrap().vehicle, "2022 RAM");
    }

    #[test]
    fn test_clear_restarts_numbering() {
        let store = InMemoryTripStore::new();
        store.insert_record(make_record(7, "2022 RAM", TripStatus::Draft)).unwrap();
        store.clear().unwrap();
        let rec = store
            .trip_create(make_form("2022 RAM", "1", "2"), TripStatus::Draft)
            .unwrap();
        assert_eq!(rec.id, RecordId::new(1));
    }
}
