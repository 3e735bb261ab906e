//! Error types for FLEETLOG operations

use crate::{RecordId, TripStatus};
use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Trip record not found: {id}")]
    NotFound { id: RecordId },

    #[error("Insert failed for trip record: {reason}")]
    InsertFailed { reason: String },

    #[error("Update failed for trip record {id}: {reason}")]
    UpdateFailed { id: RecordId, reason: String },

    #[error("Trip record {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: RecordId,
        from: TripStatus,
        to: TripStatus,
    },

    #[error("Trip record {id} is submitted and can no longer be edited")]
    ReadOnly { id: RecordId },

    #[error("Query failed: {reason}")]
    QueryFailed { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Record store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Alert delivery errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("No alert transport configured")]
    NotConfigured,

    #[error("Alert payload could not be built: {reason}")]
    Payload { reason: String },

    #[error("Alert transport failed: {reason}")]
    Transport { reason: String },

    #[error("Alert relay rejected delivery with status {status} after {attempts} attempt(s)")]
    Rejected { status: u16, attempts: u32 },
}

/// Master error type for all FLEETLOG errors.
#[derive(Debug, Clone, Error)]
pub enum FleetError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Notify error: {0}")]
    Notify(#[from] NotifyError),
}

/// Result type alias for FLEETLOG operations.
pub type FleetResult<T> = Result<T, FleetError>;

// =============================================================================
// TESTS
// =============================================================================
