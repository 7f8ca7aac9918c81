//! Application service layer for placa-scan
//!
//! Use cases wiring configuration, image validation, capture metadata,
//! the recognizer and the detection history together.

pub mod config;
pub mod detection_service;
pub mod exif_reader;
pub mod report_service;
pub mod scanner;

pub use config::Config;
pub use detection_service::{
    build_recognizer, detect_plate_image, recognize_image, DetectOptions, DetectionServiceError,
};
pub use report_service::{day_range, export_records_csv, period_report, records_in_range};
