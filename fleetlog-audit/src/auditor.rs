//! Audit orchestration.
//!
//! [`MileageAuditor::evaluate`] reads the store and returns findings without
//! any side effects. [`MileageAuditor::run`] adds best-effort dispatch, and
//! [`MileageAuditor::audit`] is the boundary used by the submission flow: it
//! never returns an error.

use fleetlog_core::{AuditConfig, FleetResult, NotifyError, RecordId, TripStatus};
use fleetlog_storage::TripStore;
use serde::Serialize;
use std::sync::Arc;

use crate::gap::find_gap;
use crate::mileage::parse_mileage;
use crate::notifier::{AlertMessage, Notifier};
use crate::overlap::candidate_pool;
use crate::report::{assess, AuditReport};

/// Why an audit did not look at a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NotFound,
    NotSubmitted,
    BlankVehicle,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NotFound => "not_found",
            SkipReason::NotSubmitted => "not_submitted",
            SkipReason::BlankVehicle => "blank_vehicle",
        }
    }
}

/// Result of the read-only evaluation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEvaluation {
    Skipped(SkipReason),
    Assessed(AuditReport),
}

/// What happened during a full audit run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome {
    Skipped(SkipReason),
    /// No findings; the notifier was not contacted.
    Clean(AuditReport),
    Alerted(AuditReport),
    /// Findings exist but no recipient is configured.
    AlertNotConfigured(AuditReport),
    AlertFailed {
        report: AuditReport,
        error: NotifyError,
    },
}

impl AuditOutcome {
    pub fn report(&self) -> Option<&AuditReport> {
        match self {
            AuditOutcome::Skipped(_) => None,
            AuditOutcome::Clean(report)
            | AuditOutcome::Alerted(report)
            | AuditOutcome::AlertNotConfigured(report)
            | AuditOutcome::AlertFailed { report, .. } => Some(report),
        }
    }

    pub fn alert_sent(&self) -> bool {
        matches!(self, AuditOutcome::Alerted(_))
    }
}

/// Checks submitted trips against their siblings and raises alerts.
#[derive(Clone)]
pub struct MileageAuditor {
    store: Arc<dyn TripStore>,
    notifier: Arc<dyn Notifier>,
    config: AuditConfig,
}

impl std::fmt::Debug for MileageAuditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MileageAuditor")
            .field("notifier", &self.notifier.name())
            .field("config", &self.config)
            .finish()
    }
}

impl MileageAuditor {
    pub fn new(
        store: Arc<dyn TripStore>,
        notifier: Arc<dyn Notifier>,
        config: AuditConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Load the record and its siblings and collect findings.
    ///
    /// Missing, draft, and vehicle-less records are skipped rather than
    /// treated as errors. Only store failures are returned as `Err`.
    pub fn evaluate(&self, id: RecordId) -> FleetResult<AuditEvaluation> {
        let Some(target) = self.store.trip_get(id)? else {
            return Ok(AuditEvaluation::Skipped(SkipReason::NotFound));
        };
        if target.status != TripStatus::Submitted {
            return Ok(AuditEvaluation::Skipped(SkipReason::NotSubmitted));
        }
        let vehicle = target.vehicle_key();
        if vehicle.is_empty() {
            return Ok(AuditEvaluation::Skipped(SkipReason::BlankVehicle));
        }

        let start = parse_mileage(target.start_mileage.as_deref());
        let end = parse_mileage(target.end_mileage.as_deref());

        let siblings = self
            .store
            .trip_query(vehicle, TripStatus::Submitted, Some(id))?;
        let pool = candidate_pool(&siblings);
        let gap = find_gap(self.store.as_ref(), vehicle, id, start)?;

        Ok(AuditEvaluation::Assessed(assess(
            &target,
            start,
            end,
            &pool,
            gap,
            self.config.gap_threshold_miles,
        )))
    }

    /// The alert for `report`, or `None` when no recipient is configured.
    pub fn build_alert(&self, report: &AuditReport) -> Option<AlertMessage> {
        let recipient = self.config.alert_recipient.clone()?;
        Some(AlertMessage {
            recipient,
            sender: self.config.sender().map(str::to_string),
            subject: report.subject(&self.config.subject_prefix),
            body: report.body(),
        })
    }

    /// Evaluate and dispatch. Notifier failures are part of the outcome;
    /// store failures are returned.
    pub async fn run(&self, id: RecordId) -> FleetResult<AuditOutcome> {
        let report = match self.evaluate(id)? {
            AuditEvaluation::Skipped(reason) => {
                tracing::debug!(record_id = %id, reason = ?reason, "Mileage audit skipped");
                return Ok(AuditOutcome::Skipped(reason));
            }
            AuditEvaluation::Assessed(report) => report,
        };

        if !report.has_issues() {
            tracing::debug!(record_id = %id, "Mileage audit clean");
            return Ok(AuditOutcome::Clean(report));
        }

        tracing::warn!(
            record_id = %id,
            vehicle = %report.record.vehicle_key(),
            issues = ?report.issue_messages(),
            "Mileage audit found issues"
        );

        let Some(alert) = self.build_alert(&report) else {
            tracing::warn!(
                record_id = %id,
                "Mileage audit found issues but no alert recipient is configured"
            );
            return Ok(AuditOutcome::AlertNotConfigured(report));
        };

        match self.notifier.send(&alert).await {
            Ok(()) => {
                tracing::info!(
                    record_id = %id,
                    notifier = self.notifier.name(),
                    recipient = %alert.recipient,
                    "Mileage alert dispatched"
                );
                Ok(AuditOutcome::Alerted(report))
            }
            Err(error) => {
                tracing::error!(
                    record_id = %id,
                    notifier = self.notifier.name(),
                    error = %error,
                    "Mileage alert dispatch failed"
                );
                Ok(AuditOutcome::AlertFailed { report, error })
            }
        }
    }

    /// Fire-and-forget audit used by the submission flow.
    ///
    /// Every failure is logged and dropped; the caller always proceeds.
    pub async fn audit(&self, id: RecordId) -> Option<AuditOutcome> {
        match self.run(id).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::error!(record_id = %id, error = %e, "Mileage audit failed");
                None
            }
        }
    }
}
