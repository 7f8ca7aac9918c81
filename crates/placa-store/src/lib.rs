//! Persistent store for detection records
//!
//! An append-only event log: records are written once and never mutated.
//! Retries produce new records. Backed by a single JSON file under the
//! data directory.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use placa_domain::repository::DetectionHistory;
use placa_types::{Error, PlateDetectionRecord, ReportRange, Result};

/// File-backed detection history
pub struct DetectionStore {
    store_path: PathBuf,
    records: Vec<PlateDetectionRecord>,
}

impl DetectionStore {
    /// Create or load a store under the given directory
    pub fn open(store_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&store_dir)?;
        let store_path = store_dir.join("detections.json");

        let records = if store_path.exists() {
            let file = File::open(&store_path)?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader).unwrap_or_default()
        } else {
            Vec::new()
        };

        Ok(Self {
            store_path,
            records,
        })
    }

    fn save(&self) -> Result<()> {
        let file = File::create(&self.store_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.records)?;
        Ok(())
    }

    /// Append one record and persist
    pub fn append(&mut self, record: PlateDetectionRecord) -> Result<()> {
        self.records.push(record);
        self.save()
    }

    /// All records, newest first
    pub fn all_records(&self) -> Vec<&PlateDetectionRecord> {
        let mut records: Vec<_> = self.records.iter().collect();
        records.sort_by(|a, b| b.detected_at.cmp(&a.detected_at));
        records
    }

    /// Records inside the closed range, oldest first
    pub fn query_range(&self, range: &ReportRange) -> Vec<PlateDetectionRecord> {
        let mut records: Vec<_> = self
            .records
            .iter()
            .filter(|r| range.contains(r.detected_at))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.detected_at.cmp(&b.detected_at));
        records
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }
}

impl DetectionHistory for DetectionStore {
    fn append(&mut self, record: PlateDetectionRecord) -> std::result::Result<(), Error> {
        DetectionStore::append(self, record)
    }

    fn find_all(&self) -> std::result::Result<Vec<PlateDetectionRecord>, Error> {
        Ok(self.all_records().into_iter().cloned().collect())
    }

    fn find_in_range(
        &self,
        range: &ReportRange,
    ) -> std::result::Result<Vec<PlateDetectionRecord>, Error> {
        Ok(self.query_range(range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use placa_types::{CaptureMeta, DetectionStatus};
    use tempfile::tempdir;

    fn record_at(time: &str) -> PlateDetectionRecord {
        let mut record = PlateDetectionRecord::from_meta(&CaptureMeta::default(), Utc::now());
        record.detected_at = time.parse::<DateTime<Utc>>().unwrap();
        record.status = DetectionStatus::Validated;
        record.plate = Some("ABC1D23".to_string());
        record
    }

    #[test]
    fn test_open_empty_store() {
        let dir = tempdir().unwrap();
        let store = DetectionStore::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_append_and_reload() {
        let dir = tempdir().unwrap();

        let mut store = DetectionStore::open(dir.path().to_path_buf()).unwrap();
        store.append(record_at("2026-08-01T10:00:00Z")).unwrap();
        store.append(record_at("2026-08-01T11:00:00Z")).unwrap();
        assert_eq!(store.count(), 2);

        // Reload from disk
        let reloaded = DetectionStore::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(reloaded.count(), 2);
        assert_eq!(
            reloaded.all_records()[0].plate.as_deref(),
            Some("ABC1D23")
        );
    }

    #[test]
    fn test_all_records_newest_first() {
        let dir = tempdir().unwrap();
        let mut store = DetectionStore::open(dir.path().to_path_buf()).unwrap();
        store.append(record_at("2026-08-01T10:00:00Z")).unwrap();
        store.append(record_at("2026-08-03T10:00:00Z")).unwrap();
        store.append(record_at("2026-08-02T10:00:00Z")).unwrap();

        let records = store.all_records();
        assert_eq!(records[0].detected_at, "2026-08-03T10:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(records[2].detected_at, "2026-08-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn test_query_range_is_inclusive_and_sorted() {
        let dir = tempdir().unwrap();
        let mut store = DetectionStore::open(dir.path().to_path_buf()).unwrap();
        store.append(record_at("2026-08-01T23:59:59Z")).unwrap();
        store.append(record_at("2026-08-01T00:00:00Z")).unwrap();
        store.append(record_at("2026-08-02T00:00:01Z")).unwrap();

        let range = ReportRange::new(
            "2026-08-01T00:00:00Z".parse().unwrap(),
            "2026-08-01T23:59:59Z".parse().unwrap(),
        );

        let hits = store.query_range(&range);
        assert_eq!(hits.len(), 2);
        assert!(hits[0].detected_at < hits[1].detected_at);
    }
}
