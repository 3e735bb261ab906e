//! FLEETLOG Mileage Audit
//!
//! Reconciles a newly submitted trip against the other submitted trips of the
//! same vehicle:
//! - Overlap: odometer ranges that intersect another trip's range
//! - Gap: unexplained distance since the previous trip
//!
//! Findings are rendered into a single alert and handed to a [`Notifier`].
//! Detection is synchronous and side-effect free; only dispatch is async.

pub mod auditor;
pub mod gap;
pub mod mileage;
pub mod notifier;
pub mod overlap;
pub mod report;

pub use auditor::{AuditEvaluation, AuditOutcome, MileageAuditor, SkipReason};
pub use gap::{find_gap, gap_between, is_unexplained};
pub use mileage::{parse_mileage, MileageRange};
pub use notifier::{
    build_notifier, sign_payload, AlertMessage, LogNotifier, Notifier, NotifierConfig,
    WebhookNotifier,
};
pub use overlap::{candidate_pool, find_overlaps, MileageCandidate};
pub use report::{assess, assess_default, AuditIssue, AuditReport};
