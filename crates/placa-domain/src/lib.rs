//! Domain layer: plate grammar, OCR correction, report aggregation
//!
//! Everything here is a pure function of its inputs; no I/O, no global
//! mutable state.

pub mod constants;
pub mod model;
pub mod repository;
pub mod service;

pub use model::plate;
pub use service::{aggregate, correct, CorrectedCandidate, ReportAccumulator};
