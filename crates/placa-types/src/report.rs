//! Periodic aggregate report types
//!
//! An [`OcrPeriodReport`] is derived on demand from a set of detection
//! records; it is never stored as mutable state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::DetectionErrorKind;

/// Closed date range, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl ReportRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.from && instant <= self.to
    }
}

/// Per-error-kind slice of a period report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBreakdownEntry {
    pub kind: DetectionErrorKind,
    pub count: usize,
    /// Mean confidence over entries of this kind that carried one
    #[serde(default)]
    pub avg_confidence: Option<f64>,
    /// First raw text seen for this kind, as a debugging sample
    #[serde(default)]
    pub example_text: Option<String>,
}

/// Per-hour slice of a period report, keyed `HH:00`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyBucket {
    pub hour: String,
    pub count: usize,
    pub accuracy_percent: f64,
    #[serde(default)]
    pub avg_confidence: Option<f64>,
}

/// Aggregate over a closed date range of detection records
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrPeriodReport {
    pub total_detected: usize,
    pub total_validated: usize,
    pub total_errored: usize,
    /// validated / detected * 100, zero when nothing was detected
    pub accuracy_percent: f64,
    /// Mean confidence over records that carried one
    #[serde(default)]
    pub avg_confidence: Option<f64>,
    #[serde(default)]
    pub avg_processing_time_ms: Option<f64>,
    pub error_breakdown: Vec<ErrorBreakdownEntry>,
    pub hourly_buckets: Vec<HourlyBucket>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_is_inclusive() {
        let from = "2026-08-01T00:00:00Z".parse().unwrap();
        let to = "2026-08-01T23:59:59Z".parse().unwrap();
        let range = ReportRange::new(from, to);

        assert!(range.contains(from));
        assert!(range.contains(to));
        assert!(!range.contains("2026-08-02T00:00:00Z".parse().unwrap()));
    }
}
