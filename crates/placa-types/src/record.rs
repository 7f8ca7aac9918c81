//! Detection record model
//!
//! A `PlateDetectionRecord` is produced once per processed image and never
//! mutated afterwards; a retry produces a new record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Terminal status of a single plate detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DetectionStatus {
    /// Grammar-valid plate at or above the acceptance threshold
    Validated,
    /// Grammar-valid plate below the threshold, queued for manual review
    Pending,
    /// No grammar-valid plate recoverable from the recognized text
    Rejected,
    /// No recognition engine produced any text
    EngineFailure,
}

impl DetectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DetectionStatus::Validated => "validated",
            DetectionStatus::Pending => "pending",
            DetectionStatus::Rejected => "rejected",
            DetectionStatus::EngineFailure => "engine_failure",
        }
    }
}

/// Failure taxonomy for detections that did not validate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DetectionErrorKind {
    /// Every configured engine failed, timed out, or returned nothing
    EngineUnavailable,
    /// The corrector found no validating window in the text
    NoPlateFound,
    /// Valid plate, confidence below the acceptance threshold
    LowConfidence,
    /// Reserved: ambiguous correction. No current code path produces it.
    UndefinedCharacter,
}

impl DetectionErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            DetectionErrorKind::EngineUnavailable => "ENGINE_UNAVAILABLE",
            DetectionErrorKind::NoPlateFound => "NO_PLATE_FOUND",
            DetectionErrorKind::LowConfidence => "LOW_CONFIDENCE",
            DetectionErrorKind::UndefinedCharacter => "CHARACTER_INDEFINIDO",
        }
    }
}

/// Pixel rectangle of the plate region within the source frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Capture-side metadata handed in with the image region
#[derive(Debug, Clone, Default)]
pub struct CaptureMeta {
    /// Identifier of the capturing source (camera, lane, gate)
    pub source_id: Option<String>,
    /// When the frame was captured; defaults to processing time when absent
    pub captured_at: Option<DateTime<Utc>>,
    /// GPS position of the capture, if known
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Plate region within the original frame, if localization ran upstream
    pub bounding_box: Option<BoundingBox>,
    /// Upstream estimate of frame quality, 0.0-1.0
    pub image_quality: Option<f64>,
}

/// Raw output of a single recognition-engine invocation
///
/// Immutable; discarded once folded into a [`PlateDetectionRecord`].
#[derive(Debug, Clone)]
pub struct RawOcrReading {
    /// Name of the engine that produced the text
    pub engine: String,
    /// Text exactly as recognized, before any correction
    pub raw_text: String,
    /// Engine-reported confidence, 0.0-1.0, if the engine provides one
    pub confidence: Option<f64>,
    /// Wall-clock time of the engine call
    pub processing_time_ms: u64,
    /// When the reading was produced
    pub captured_at: DateTime<Utc>,
}

/// One detection event, created per processed image
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateDetectionRecord {
    /// Unique record id
    pub id: String,

    /// Recovered plate. Present only for Validated and Pending records,
    /// and then always grammar-valid (LLLDLDD, length 7).
    #[serde(default)]
    pub plate: Option<String>,

    /// Engine-reported confidence for the winning reading
    #[serde(default)]
    pub confidence: Option<f64>,

    /// When the detection was recorded
    pub detected_at: DateTime<Utc>,

    /// Terminal status of this detection
    pub status: DetectionStatus,

    /// Failure classification, when the detection did not auto-validate
    #[serde(default)]
    pub error_kind: Option<DetectionErrorKind>,

    /// Total wall-clock time spent processing the image
    pub processing_time_ms: u64,

    /// Name of the engine that supplied the winning text
    #[serde(default)]
    pub engine: Option<String>,

    /// Raw recognized text before correction
    #[serde(default)]
    pub raw_text: Option<String>,

    /// Whether the plate was repaired by the corrector
    #[serde(default)]
    pub was_corrected: bool,

    /// Plate region within the source frame
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,

    /// Upstream frame-quality estimate, 0.0-1.0
    #[serde(default)]
    pub image_quality: Option<f64>,

    /// Capturing source identifier
    #[serde(default)]
    pub source_id: Option<String>,

    /// Capture GPS position
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl PlateDetectionRecord {
    /// New record skeleton with a fresh id and the capture metadata applied.
    /// Status fields are filled in by the recognizer.
    pub fn from_meta(meta: &CaptureMeta, detected_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            plate: None,
            confidence: None,
            detected_at: meta.captured_at.unwrap_or(detected_at),
            status: DetectionStatus::EngineFailure,
            error_kind: None,
            processing_time_ms: 0,
            engine: None,
            raw_text: None,
            was_corrected: false,
            bounding_box: meta.bounding_box,
            image_quality: meta.image_quality,
            source_id: meta.source_id.clone(),
            latitude: meta.latitude,
            longitude: meta.longitude,
        }
    }

    pub fn is_validated(&self) -> bool {
        self.status == DetectionStatus::Validated
    }

    /// Rejected and engine-failure records count as errored
    pub fn is_errored(&self) -> bool {
        matches!(
            self.status,
            DetectionStatus::Rejected | DetectionStatus::EngineFailure
        )
    }
}
