//! Audit configuration.
//!
//! The alert recipient is an explicit value handed to the auditor at
//! construction time. `from_env` is the only place the process environment is
//! read, so tests build the struct directly.

use crate::error::{ConfigError, FleetResult};

/// Gap (in miles) to the previous trip above which a record is flagged.
pub const DEFAULT_GAP_THRESHOLD_MILES: i64 = 5;

/// Subject prefix for mileage alerts.
pub const DEFAULT_SUBJECT_PREFIX: &str = "[Vehicle Mileage Check]";

/// Settings for the mileage consistency audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    /// Who receives mileage alerts. `None` disables dispatch.
    pub alert_recipient: Option<String>,
    /// Sender address for alerts; falls back to the recipient.
    pub alert_sender: Option<String>,
    /// Gaps strictly greater than this are reported.
    pub gap_threshold_miles: i64,
    /// Prefix placed before the vehicle name in alert subjects.
    pub subject_prefix: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            alert_recipient: None,
            alert_sender: None,
            gap_threshold_miles: DEFAULT_GAP_THRESHOLD_MILES,
            subject_prefix: DEFAULT_SUBJECT_PREFIX.to_string(),
        }
    }
}

impl AuditConfig {
    /// Config with a recipient and every other value at its default.
    pub fn with_recipient(recipient: impl Into<String>) -> Self {
        Self {
            alert_recipient: normalize_address(Some(recipient.into())),
            ..Self::default()
        }
    }

    /// Create AuditConfig from environment variables.
    ///
    /// Environment variables:
    /// - `FLEETLOG_ALERT_EMAIL`: Alert recipient (empty = alerts disabled)
    /// - `FLEETLOG_ALERT_SENDER`: Sender address (default: recipient)
    /// - `FLEETLOG_GAP_THRESHOLD_MILES`: Gap threshold (default: 5)
    /// - `FLEETLOG_ALERT_SUBJECT_PREFIX`: Subject prefix (default: "[Vehicle Mileage Check]")
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            alert_recipient: normalize_address(std::env::var("FLEETLOG_ALERT_EMAIL").ok()),
            alert_sender: normalize_address(std::env::var("FLEETLOG_ALERT_SENDER").ok()),
            gap_threshold_miles: std::env::var("FLEETLOG_GAP_THRESHOLD_MILES")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.gap_threshold_miles),
            subject_prefix: std::env::var("FLEETLOG_ALERT_SUBJECT_PREFIX")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.subject_prefix),
        }
    }

    /// Reject values the auditor cannot work with.
    pub fn validate(&self) -> FleetResult<()> {
        if self.gap_threshold_miles < 0 {
            return Err(ConfigError::InvalidValue {
                field: "gap_threshold_miles".to_string(),
                value: self.gap_threshold_miles.to_string(),
                reason: "must be zero or positive".to_string(),
            }
            .into());
        }

        for (field, value) in [
            ("alert_recipient", &self.alert_recipient),
            ("alert_sender", &self.alert_sender),
        ] {
            if let Some(address) = value {
                if !address.contains('@') {
                    return Err(ConfigError::InvalidValue {
                        field: field.to_string(),
                        value: address.clone(),
                        reason: "not an email address".to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(())
    }

    /// Sender used for outgoing alerts.
    pub fn sender(&self) -> Option<&str> {
        self.alert_sender
            .as_deref()
            .or(self.alert_recipient.as_deref())
    }
}

fn normalize_address(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
