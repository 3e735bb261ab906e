//! FLEETLOG Core - Trip Record Types
//!
//! Plain data structures shared by every other crate: the trip record, its
//! lifecycle status, the editable form payload, errors and configuration.
//! Detection logic lives in fleetlog-audit.

pub mod config;
pub mod error;

pub use config::{AuditConfig, DEFAULT_GAP_THRESHOLD_MILES, DEFAULT_SUBJECT_PREFIX};
pub use error::{
    ConfigError, FleetError, FleetResult, NotifyError, StorageError, ValidationError,
};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Store-assigned trip record identifier.
///
/// Identifiers are handed out from a monotonic counter, so a larger id always
/// means a later-created record. The audit relies on that ordering to find the
/// "previous" trip for a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl RecordId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

// ============================================================================
// ENUMS
// ============================================================================

/// Lifecycle status of a trip record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    /// Saved by the user, still editable
    #[default]
    Draft,
    /// Finalized by the user; participates in mileage audits
    Submitted,
}

impl TripStatus {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            TripStatus::Draft => "draft",
            TripStatus::Submitted => "submitted",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, TripStatusParseError> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(TripStatus::Draft),
            "submitted" => Ok(TripStatus::Submitted),
            _ => Err(TripStatusParseError(s.to_string())),
        }
    }

    /// Whether a record in this status may move to `next`.
    ///
    /// Submission is one-way: a submitted record never returns to draft.
    pub fn can_transition_to(&self, next: TripStatus) -> bool {
        !matches!((self, next), (TripStatus::Submitted, TripStatus::Draft))
    }

    /// Rank used when listing a user's records (submitted before draft).
    pub fn sort_rank(&self) -> u8 {
        match self {
            TripStatus::Draft => 0,
            TripStatus::Submitted => 1,
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for TripStatus {
    type Err = TripStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid trip status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripStatusParseError(pub String);

impl fmt::Display for TripStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid trip status: {}", self.0)
    }
}

impl std::error::Error for TripStatusParseError {}

// ============================================================================
// TRIP ENTITIES
// ============================================================================

/// The user-editable portion of a trip record.
///
/// Mileage fields stay free text here; they are only interpreted by the audit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TripForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub vehicle: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub dep_date: Option<NaiveDate>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub ret_date: Option<NaiveDate>,
    pub start_mileage: Option<String>,
    pub end_mileage: Option<String>,
    pub destination: String,
    pub purpose: String,
    pub project: String,
    pub comments: String,
}

/// A logged vehicle trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TripRecord {
    pub id: RecordId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub vehicle: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub dep_date: Option<NaiveDate>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub ret_date: Option<NaiveDate>,
    pub start_mileage: Option<String>,
    pub end_mileage: Option<String>,
    pub destination: String,
    pub purpose: String,
    pub project: String,
    pub comments: String,
    /// Last time the user saved or submitted the form
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub submitted_time: Option<Timestamp>,
    /// Reviewer note, reset whenever the user edits the form
    pub admin_comment: String,
    pub status: TripStatus,
}

impl TripRecord {
    /// Build a record from a form payload.
    pub fn from_form(id: RecordId, form: TripForm, status: TripStatus, now: Timestamp) -> Self {
        Self {
            id,
            name: form.name,
            phone: form.phone,
            email: form.email,
            vehicle: form.vehicle,
            dep_date: form.dep_date,
            ret_date: form.ret_date,
            start_mileage: form.start_mileage,
            end_mileage: form.end_mileage,
            destination: form.destination,
            purpose: form.purpose,
            project: form.project,
            comments: form.comments,
            submitted_time: Some(now),
            admin_comment: String::new(),
            status,
        }
    }

    /// Overwrite the user-editable fields. The owner email is kept.
    pub fn apply_form(&mut self, form: TripForm, now: Timestamp) {
        self.name = form.name;
        self.phone = form.phone;
        self.vehicle = form.vehicle;
        self.dep_date = form.dep_date;
        self.ret_date = form.ret_date;
        self.start_mileage = form.start_mileage;
        self.end_mileage = form.end_mileage;
        self.destination = form.destination;
        self.purpose = form.purpose;
        self.project = form.project;
        self.comments = form.comments;
        self.submitted_time = Some(now);
        self.admin_comment.clear();
    }

    pub fn is_submitted(&self) -> bool {
        self.status == TripStatus::Submitted
    }

    /// Vehicle name with surrounding whitespace removed.
    pub fn vehicle_key(&self) -> &str {
        self.vehicle.trim()
    }

    /// Whether this record belongs to `email` (case-insensitive).
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.email.trim().eq_ignore_ascii_case(email.trim())
    }
}

// ============================================================================
// FORM HELPERS
// ============================================================================

/// Date format accepted from form inputs.
pub const FORM_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` form date. Blank input means "not provided".
pub fn parse_date_or_none(value: Option<&str>) -> Result<Option<NaiveDate>, ValidationError> {
    let s = value.unwrap_or("").trim();
    if s.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(s, FORM_DATE_FORMAT)
        .map(Some)
        .map_err(|e| ValidationError::InvalidValue {
            field: "date".to_string(),
            reason: format!("expected YYYY-MM-DD, got {:?}: {}", s, e),
        })
}

/// Render a mileage value with thousands separators for display.
///
/// Text that is not a whole number is returned unchanged.
pub fn format_mileage(value: &str) -> String {
    let trimmed = value.trim();
    let Ok(n) = trimmed.parse::<i64>() else {
        return trimmed.to_string();
    };

    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================
