//! Domain services

pub mod corrector;
pub mod report_builder;

pub use corrector::{correct, CorrectedCandidate};
pub use report_builder::{aggregate, ReportAccumulator};
