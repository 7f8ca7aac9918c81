//! Repository trait definitions for data persistence

use placa_types::{Error, PlateDetectionRecord, ReportRange};

/// Repository for detection records (append-only event log)
pub trait DetectionHistory {
    /// Append one detection record
    fn append(&mut self, record: PlateDetectionRecord) -> Result<(), Error>;

    /// All records, newest first
    fn find_all(&self) -> Result<Vec<PlateDetectionRecord>, Error>;

    /// Records whose detection time falls inside the closed range,
    /// oldest first
    fn find_in_range(&self, range: &ReportRange) -> Result<Vec<PlateDetectionRecord>, Error>;
}
