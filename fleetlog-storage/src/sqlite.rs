//! SQLite-backed trip store.
//!
//! One table, one row per trip record. Dates are stored as `YYYY-MM-DD`
//! text and the submission time as RFC 3339 text. `AUTOINCREMENT` keeps
//! ids from being reused after a delete or a restart.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use fleetlog_core::{
    FleetResult, RecordId, StorageError, TripForm, TripRecord, TripStatus,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::{apply_update, TripFilter, TripStore, TripUpdate};

/// Bumped whenever the table layout changes.
const SCHEMA_VERSION: i32 = 1;

const SELECT_COLUMNS: &str = "SELECT id, name, phone, email, vehicle, dep_date, ret_date, \
     start_mileage, end_mileage, destination, purpose, project, comments, \
     submitted_time, admin_comment, status FROM trip_records";

/// Trip store persisted in a SQLite database.
///
/// `rusqlite::Connection` is not `Sync`, so access goes through a mutex.
/// Clones share the same connection.
#[derive(Debug, Clone)]
pub struct SqliteTripStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTripStore {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> FleetResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| StorageError::Unavailable {
            reason: format!("cannot open {}: {}", path.display(), e),
        })?;
        Self::init(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> FleetResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| StorageError::Unavailable {
            reason: e.to_string(),
        })?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> FleetResult<Self> {
        migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> FleetResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    fn query_many(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> FleetResult<Vec<TripRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql).map_err(query_failed)?;
        let rows = stmt.query_map(params, row_to_record).map_err(query_failed)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(query_failed)
    }

    fn query_one(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> FleetResult<Option<TripRecord>> {
        let conn = self.lock()?;
        conn.query_row(sql, params, row_to_record)
            .optional()
            .map_err(query_failed)
    }
}

fn migrate(conn: &Connection) -> FleetResult<()> {
    let unavailable = |e: rusqlite::Error| StorageError::Unavailable {
        reason: format!("schema setup failed: {}", e),
    };

    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(unavailable)?;
    if version > SCHEMA_VERSION {
        return Err(StorageError::Unavailable {
            reason: format!(
                "database schema version {} is newer than supported version {}",
                version, SCHEMA_VERSION
            ),
        }
        .into());
    }
    if version == SCHEMA_VERSION {
        return Ok(());
    }

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS trip_records (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            name           TEXT NOT NULL,
            phone          TEXT NOT NULL,
            email          TEXT NOT NULL,
            vehicle        TEXT NOT NULL,
            dep_date       TEXT,
            ret_date       TEXT,
            start_mileage  TEXT,
            end_mileage    TEXT,
            destination    TEXT NOT NULL,
            purpose        TEXT NOT NULL,
            project        TEXT NOT NULL,
            comments       TEXT NOT NULL,
            submitted_time TEXT,
            admin_comment  TEXT NOT NULL DEFAULT '',
            status         TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_trip_records_vehicle_status
            ON trip_records (vehicle, status, id);
        PRAGMA user_version = 1;",
    )
    .map_err(unavailable)?;

    tracing::info!(schema_version = SCHEMA_VERSION, "Trip record schema ready");
    Ok(())
}

fn query_failed(e: rusqlite::Error) -> fleetlog_core::FleetError {
    StorageError::QueryFailed {
        reason: e.to_string(),
    }
    .into()
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<TripRecord> {
    let status: String = row.get(15)?;
    let status = TripStatus::from_db_str(&status)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(15, Type::Text, Box::new(e)))?;

    Ok(TripRecord {
        id: RecordId::new(row.get(0)?),
        name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        vehicle: row.get(4)?,
        dep_date: row.get(5)?,
        ret_date: row.get(6)?,
        start_mileage: row.get(7)?,
        end_mileage: row.get(8)?,
        destination: row.get(9)?,
        purpose: row.get(10)?,
        project: row.get(11)?,
        comments: row.get(12)?,
        submitted_time: row.get(13)?,
        admin_comment: row.get(14)?,
        status,
    })
}

impl TripStore for SqliteTripStore {
    fn trip_create(&self, form: TripForm, status: TripStatus) -> FleetResult<TripRecord> {
        let conn = self.lock()?;
        // Placeholder id; the real one comes back from SQLite.
        let mut record = TripRecord::from_form(RecordId::new(0), form, status, Utc::now());

        conn.execute(
            "INSERT INTO trip_records (name, phone, email, vehicle, dep_date, ret_date,
                start_mileage, end_mileage, destination, purpose, project, comments,
                submitted_time, admin_comment, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                record.name,
                record.phone,
                record.email,
                record.vehicle,
                record.dep_date,
                record.ret_date,
                record.start_mileage,
                record.end_mileage,
                record.destination,
                record.purpose,
                record.project,
                record.comments,
                record.submitted_time,
                record.admin_comment,
                record.status.as_db_str(),
            ],
        )
        .map_err(|e| StorageError::InsertFailed {
            reason: e.to_string(),
        })?;

        record.id = RecordId::new(conn.last_insert_rowid());
        tracing::debug!(record_id = %record.id, status = %status, "Trip record created");
        Ok(record)
    }

    fn trip_get(&self, id: RecordId) -> FleetResult<Option<TripRecord>> {
        self.query_one(&format!("{} WHERE id = ?1", SELECT_COLUMNS), params![id.get()])
    }

    fn trip_update(&self, id: RecordId, update: TripUpdate) -> FleetResult<TripRecord> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(|e| StorageError::UpdateFailed {
            id,
            reason: e.to_string(),
        })?;

        let mut record = tx
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id.get()],
                row_to_record,
            )
            .optional()
            .map_err(query_failed)?
            .ok_or(StorageError::NotFound { id })?;

        apply_update(&mut record, update)?;

        let update_failed = |e: rusqlite::Error| StorageError::UpdateFailed {
            id,
            reason: e.to_string(),
        };
        tx.execute(
            "UPDATE trip_records SET name = ?2, phone = ?3, vehicle = ?4, dep_date = ?5,
                ret_date = ?6, start_mileage = ?7, end_mileage = ?8, destination = ?9,
                purpose = ?10, project = ?11, comments = ?12, submitted_time = ?13,
                admin_comment = ?14, status = ?15
             WHERE id = ?1",
            params![
                id.get(),
                record.name,
                record.phone,
                record.vehicle,
                record.dep_date,
                record.ret_date,
                record.start_mileage,
                record.end_mileage,
                record.destination,
                record.purpose,
                record.project,
                record.comments,
                record.submitted_time,
                record.admin_comment,
                record.status.as_db_str(),
            ],
        )
        .map_err(update_failed)?;
        tx.commit().map_err(update_failed)?;

        Ok(record)
    }

    fn trip_delete(&self, id: RecordId) -> FleetResult<()> {
        let conn = self.lock()?;
        let removed = conn
            .execute("DELETE FROM trip_records WHERE id = ?1", params![id.get()])
            .map_err(query_failed)?;
        if removed == 0 {
            return Err(StorageError::NotFound { id }.into());
        }
        Ok(())
    }

    fn trip_query(
        &self,
        vehicle: &str,
        status: TripStatus,
        exclude: Option<RecordId>,
    ) -> FleetResult<Vec<TripRecord>> {
        self.query_many(
            &format!(
                "{} WHERE vehicle = ?1 AND status = ?2 AND (?3 IS NULL OR id <> ?3) ORDER BY id ASC",
                SELECT_COLUMNS
            ),
            params![vehicle.trim(), status.as_db_str(), exclude.map(RecordId::get)],
        )
    }

    fn trip_query_latest(
        &self,
        vehicle: &str,
        status: TripStatus,
        exclude: Option<RecordId>,
    ) -> FleetResult<Option<TripRecord>> {
        self.query_one(
            &format!(
                "{} WHERE vehicle = ?1 AND status = ?2 AND (?3 IS NULL OR id <> ?3) \
                 ORDER BY id DESC LIMIT 1",
                SELECT_COLUMNS
            ),
            params![vehicle.trim(), status.as_db_str(), exclude.map(RecordId::get)],
        )
    }

    fn trip_latest_by_status(&self, status: TripStatus) -> FleetResult<Option<TripRecord>> {
        self.query_one(
            &format!("{} WHERE status = ?1 ORDER BY id DESC LIMIT 1", SELECT_COLUMNS),
            params![status.as_db_str()],
        )
    }

    fn trip_list(&self, filter: &TripFilter) -> FleetResult<Vec<TripRecord>> {
        // Vehicle and status narrow in SQL; the text and date criteria run in Rust.
        let records = self.query_many(
            &format!(
                "{} WHERE (?1 IS NULL OR vehicle = ?1) AND (?2 IS NULL OR status = ?2) \
                 ORDER BY id DESC",
                SELECT_COLUMNS
            ),
            params![
                filter.vehicle.as_deref().map(str::trim),
                filter.status.map(|s| s.as_db_str()),
            ],
        )?;
        Ok(records.into_iter().filter(|r| filter.matches(r)).collect())
    }
}
