//! Report service - period aggregation over the detection history

use std::path::Path;

use chrono::{NaiveDate, NaiveTime};

use crate::config::Config;
use placa_domain::aggregate;
use placa_store::DetectionStore;
use placa_types::{Error, OcrPeriodReport, PlateDetectionRecord, ReportRange, Result};

/// Expand a date pair into the closed range covering both whole days
pub fn day_range(from: NaiveDate, to: NaiveDate) -> Result<ReportRange> {
    if from > to {
        return Err(Error::InvalidRange(format!("{} is after {}", from, to)));
    }

    Ok(ReportRange::new(
        from.and_time(NaiveTime::MIN).and_utc(),
        to.and_time(NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap())
            .and_utc(),
    ))
}

/// Build the period report for the given range from the detection history
pub fn period_report(config: &Config, range: &ReportRange) -> Result<OcrPeriodReport> {
    let store = DetectionStore::open(config.store_dir()?)?;
    let records = store.query_range(range);
    Ok(aggregate(records.iter(), range))
}

/// Records in range, oldest first, for listing and export
pub fn records_in_range(config: &Config, range: &ReportRange) -> Result<Vec<PlateDetectionRecord>> {
    let store = DetectionStore::open(config.store_dir()?)?;
    Ok(store.query_range(range))
}

/// Export detection records as CSV
pub fn export_records_csv(records: &[PlateDetectionRecord], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| Error::Export(e.to_string()))?;

    writer
        .write_record([
            "id",
            "plate",
            "status",
            "error_kind",
            "confidence",
            "detected_at",
            "processing_time_ms",
            "engine",
            "raw_text",
            "was_corrected",
            "source_id",
        ])
        .map_err(|e| Error::Export(e.to_string()))?;

    for record in records {
        let confidence = record
            .confidence
            .map(|c| format!("{:.3}", c))
            .unwrap_or_default();
        let detected_at = record.detected_at.to_rfc3339();
        let processing = record.processing_time_ms.to_string();

        writer
            .write_record([
                record.id.as_str(),
                record.plate.as_deref().unwrap_or(""),
                record.status.label(),
                record.error_kind.map(|k| k.label()).unwrap_or(""),
                confidence.as_str(),
                detected_at.as_str(),
                processing.as_str(),
                record.engine.as_deref().unwrap_or(""),
                record.raw_text.as_deref().unwrap_or(""),
                if record.was_corrected { "true" } else { "false" },
                record.source_id.as_deref().unwrap_or(""),
            ])
            .map_err(|e| Error::Export(e.to_string()))?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use placa_types::{CaptureMeta, DetectionStatus};
    use tempfile::tempdir;

    #[test]
    fn test_day_range_covers_whole_days() {
        let from = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 8, 2).unwrap();
        let range = day_range(from, to).unwrap();

        assert!(range.contains("2026-08-01T00:00:00Z".parse().unwrap()));
        assert!(range.contains("2026-08-02T23:59:59Z".parse().unwrap()));
        assert!(!range.contains("2026-08-03T00:00:00Z".parse().unwrap()));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let from = NaiveDate::from_ymd_opt(2026, 8, 2).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        assert!(day_range(from, to).is_err());
    }

    #[test]
    fn test_csv_export() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("records.csv");

        let mut record = PlateDetectionRecord::from_meta(&CaptureMeta::default(), Utc::now());
        record.plate = Some("ABC1D23".to_string());
        record.status = DetectionStatus::Validated;
        record.confidence = Some(0.91);
        record.raw_text = Some("A8C1D23".to_string());
        record.was_corrected = true;

        export_records_csv(&[record], &out).unwrap();

        let content = std::fs::read_to_string(&out).unwrap();
        assert!(content.starts_with("id,plate,status"));
        assert!(content.contains("ABC1D23"));
        assert!(content.contains("validated"));
        assert!(content.contains("0.910"));
    }
}
