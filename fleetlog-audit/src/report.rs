//! Audit findings and alert text.

use fleetlog_core::{TripRecord, DEFAULT_GAP_THRESHOLD_MILES};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};

use crate::gap::is_unexplained;
use crate::overlap::{find_overlaps, MileageCandidate};

/// One finding about a submitted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditIssue {
    /// Start or end mileage missing or unparseable
    InvalidMileage,
    /// End reading below start reading
    ReversedMileage { start: i64, end: i64 },
    /// Range intersects other submitted trips
    Overlap { count: usize },
    /// Unexplained distance since the previous trip
    Gap { gap: i64, threshold: i64 },
}

impl fmt::Display for AuditIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditIssue::InvalidMileage => {
                write!(f, "Invalid or missing mileage on submitted record.")
            }
            AuditIssue::ReversedMileage { start, end } => {
                write!(f, "End mileage < start mileage ({} -> {}).", start, end)
            }
            AuditIssue::Overlap { count } => write!(
                f,
                "Overlapping mileage range detected with {} other record(s).",
                count
            ),
            AuditIssue::Gap { threshold, .. } => write!(
                f,
                "Gap > {} miles detected to the previous record.",
                threshold
            ),
        }
    }
}

/// Everything the audit learned about one submitted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub record: TripRecord,
    pub start: Option<i64>,
    pub end: Option<i64>,
    /// Findings in detection order: validity, overlap, gap
    pub issues: Vec<AuditIssue>,
    pub overlaps: Vec<MileageCandidate>,
    pub gap: Option<i64>,
}

impl AuditReport {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Issue strings in detection order.
    pub fn issue_messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }

    /// `{prefix} {vehicle} - Submitted Record #{id}`
    pub fn subject(&self, prefix: &str) -> String {
        format!(
            "{} {} - Submitted Record #{}",
            prefix,
            self.record.vehicle_key(),
            self.record.id
        )
    }

    /// Plain-text alert body. Depends only on the report, so re-running an
    /// audit over unchanged data yields the same text.
    pub fn body(&self) -> String {
        let r = &self.record;
        let mut out = String::new();

        // Writing to a String cannot fail.
        let _ = writeln!(out, "Mileage audit detected potential issues.");
        let _ = writeln!(out);
        let _ = writeln!(out, "Submitted record:");
        let _ = writeln!(out, "  - Record ID: {}", r.id);
        let _ = writeln!(out, "    Name: {}", r.name);
        let _ = writeln!(out, "    User Email: {}", r.email);
        let _ = writeln!(out, "    Vehicle: {}", r.vehicle);
        let _ = writeln!(out, "    Departure date: {}", display_opt(r.dep_date));
        let _ = writeln!(out, "    Return date: {}", display_opt(r.ret_date));
        let _ = writeln!(out, "    Start mileage: {}", display_opt(self.start));
        let _ = writeln!(out, "    End mileage: {}", display_opt(self.end));
        let _ = writeln!(
            out,
            "    Submitted Time: {}",
            display_opt(r.submitted_time.map(|t| t.format("%m-%d-%Y")))
        );
        let _ = writeln!(out);

        let _ = writeln!(out, "Findings:");
        for issue in &self.issues {
            let _ = writeln!(out, "  - {}", issue);
        }

        if !self.overlaps.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Overlapping record(s):");
            for c in &self.overlaps {
                let _ = writeln!(
                    out,
                    "  - Record ID: {}, Name: {}, Start mileage: {}, End mileage: {}",
                    c.id, c.name, c.range.start, c.range.end
                );
            }
        }

        out
    }
}

fn display_opt<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Collect findings for `target` from already-loaded inputs.
///
/// `pool` holds the sibling candidates (same vehicle, submitted, parseable,
/// target excluded) and `gap` the distance to the previous record. No I/O.
pub fn assess(
    target: &TripRecord,
    start: Option<i64>,
    end: Option<i64>,
    pool: &[MileageCandidate],
    gap: Option<i64>,
    gap_threshold: i64,
) -> AuditReport {
    let mut issues = Vec::new();

    match (start, end) {
        (Some(s), Some(e)) if e < s => {
            issues.push(AuditIssue::ReversedMileage { start: s, end: e })
        }
        (Some(_), Some(_)) => {}
        _ => issues.push(AuditIssue::InvalidMileage),
    }

    let overlaps = find_overlaps(start, end, pool);
    if !overlaps.is_empty() {
        issues.push(AuditIssue::Overlap {
            count: overlaps.len(),
        });
    }

    match gap {
        Some(g) if is_unexplained(gap, gap_threshold) => issues.push(AuditIssue::Gap {
            gap: g,
            threshold: gap_threshold,
        }),
        _ => {}
    }

    AuditReport {
        record: target.clone(),
        start,
        end,
        issues,
        overlaps,
        gap,
    }
}

/// `assess` with the default gap threshold.
pub fn assess_default(
    target: &TripRecord,
    start: Option<i64>,
    end: Option<i64>,
    pool: &[MileageCandidate],
    gap: Option<i64>,
) -> AuditReport {
    assess(target, start, end, pool, gap, DEFAULT_GAP_THRESHOLD_MILES)
}
