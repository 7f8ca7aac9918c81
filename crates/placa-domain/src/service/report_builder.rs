//! Period report aggregation
//!
//! A commutative fold over detection records: counts and sums only, so
//! partial accumulators built in parallel can be merged before the final
//! report is rendered. Performs no I/O.

use std::collections::{BTreeMap, HashMap};

use chrono::Timelike;
use placa_types::{
    DetectionErrorKind, ErrorBreakdownEntry, HourlyBucket, OcrPeriodReport, PlateDetectionRecord,
    ReportRange,
};

/// Running sums for an optional metric; absent values are excluded from
/// both numerator and denominator, never counted as zero.
#[derive(Debug, Clone, Copy, Default)]
struct MeanAcc {
    sum: f64,
    count: usize,
}

impl MeanAcc {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn merge(&mut self, other: MeanAcc) {
        self.sum += other.sum;
        self.count += other.count;
    }

    fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

#[derive(Debug, Clone, Default)]
struct ErrorGroup {
    count: usize,
    confidence: MeanAcc,
    example_text: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct HourAcc {
    count: usize,
    validated: usize,
    confidence: MeanAcc,
}

/// Accumulator for one period report
#[derive(Debug, Clone, Default)]
pub struct ReportAccumulator {
    total_detected: usize,
    total_validated: usize,
    total_errored: usize,
    confidence: MeanAcc,
    processing: MeanAcc,
    errors: HashMap<DetectionErrorKind, ErrorGroup>,
    hours: BTreeMap<u32, HourAcc>,
}

impl ReportAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into the accumulator
    pub fn fold(&mut self, record: &PlateDetectionRecord) {
        self.total_detected += 1;
        if record.is_validated() {
            self.total_validated += 1;
        }
        if record.is_errored() {
            self.total_errored += 1;
        }

        self.confidence.push(record.confidence);
        self.processing.push(Some(record.processing_time_ms as f64));

        if let Some(kind) = record.error_kind {
            let group = self.errors.entry(kind).or_default();
            group.count += 1;
            group.confidence.push(record.confidence);
            if group.example_text.is_none() {
                group.example_text = record.raw_text.clone();
            }
        }

        let hour = self.hours.entry(record.detected_at.hour()).or_default();
        hour.count += 1;
        if record.is_validated() {
            hour.validated += 1;
        }
        hour.confidence.push(record.confidence);
    }

    /// Combine a partial accumulator computed elsewhere.
    ///
    /// Counts and sums are commutative; the example text keeps the left
    /// side's sample when both carry one.
    pub fn merge(&mut self, other: ReportAccumulator) {
        self.total_detected += other.total_detected;
        self.total_validated += other.total_validated;
        self.total_errored += other.total_errored;
        self.confidence.merge(other.confidence);
        self.processing.merge(other.processing);

        for (kind, group) in other.errors {
            let entry = self.errors.entry(kind).or_default();
            entry.count += group.count;
            entry.confidence.merge(group.confidence);
            if entry.example_text.is_none() {
                entry.example_text = group.example_text;
            }
        }

        for (hour, acc) in other.hours {
            let entry = self.hours.entry(hour).or_default();
            entry.count += acc.count;
            entry.validated += acc.validated;
            entry.confidence.merge(acc.confidence);
        }
    }

    /// Render the accumulated state into a report
    pub fn finish(self) -> OcrPeriodReport {
        let accuracy_percent = ratio_percent(self.total_validated, self.total_detected);

        let mut error_breakdown: Vec<ErrorBreakdownEntry> = self
            .errors
            .into_iter()
            .map(|(kind, group)| ErrorBreakdownEntry {
                kind,
                count: group.count,
                avg_confidence: group.confidence.mean(),
                example_text: group.example_text,
            })
            .collect();
        error_breakdown.sort_by(|a, b| b.count.cmp(&a.count));

        let hourly_buckets = self
            .hours
            .into_iter()
            .map(|(hour, acc)| HourlyBucket {
                hour: format!("{:02}:00", hour),
                count: acc.count,
                accuracy_percent: ratio_percent(acc.validated, acc.count),
                avg_confidence: acc.confidence.mean(),
            })
            .collect();

        OcrPeriodReport {
            total_detected: self.total_detected,
            total_validated: self.total_validated,
            total_errored: self.total_errored,
            accuracy_percent,
            avg_confidence: self.confidence.mean(),
            avg_processing_time_ms: self.processing.mean(),
            error_breakdown,
            hourly_buckets,
        }
    }
}

fn ratio_percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Aggregate the records falling inside the closed range into a report
pub fn aggregate<'a, I>(records: I, range: &ReportRange) -> OcrPeriodReport
where
    I: IntoIterator<Item = &'a PlateDetectionRecord>,
{
    let mut acc = ReportAccumulator::new();
    for record in records {
        if range.contains(record.detected_at) {
            acc.fold(record);
        }
    }
    acc.finish()
}
