//! Odometer text normalization.

use serde::{Deserialize, Serialize};

/// Parse a free-text odometer reading.
///
/// Surrounding whitespace and thousands-separator commas are removed before a
/// base-10 parse. Anything that still fails to parse yields `None`. No bounds
/// are enforced: `"-5"` is `Some(-5)`.
pub fn parse_mileage(value: Option<&str>) -> Option<i64> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.replace(',', "").parse::<i64>().ok()
}

/// A half-open odometer interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MileageRange {
    pub start: i64,
    pub end: i64,
}

impl MileageRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Range for a pair of raw fields; `None` unless both parse.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Option<Self> {
        Some(Self::new(parse_mileage(start)?, parse_mileage(end)?))
    }

    /// Half-open intersection test. Ranges that only touch at an endpoint do
    /// not overlap; a zero-width range counts when strictly inside the other.
    pub fn overlaps(&self, other: &MileageRange) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn is_reversed(&self) -> bool {
        self.end < self.start
    }
}
