//! Detection service - core use case for plate detection
//!
//! This service orchestrates the complete detection workflow:
//! 1. Validate the input image
//! 2. Recover capture metadata (EXIF datetime, GPS)
//! 3. Run the multi-engine recognizer
//! 4. Append the resulting record to the detection history

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::exif_reader::FrameMetadata;
use crate::scanner::validate_image;
use placa_store::DetectionStore;
use placa_types::{CaptureMeta, Error, PlateDetectionRecord};
use placa_vision::{CommandEngine, PlateRecognizer, RecognizerConfig};

/// Errors specific to the detection service
#[derive(Debug, Error)]
pub enum DetectionServiceError {
    #[error("Image validation failed: {0}")]
    InvalidImage(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Detection failed: {0}")]
    Failed(String),
}

impl From<Error> for DetectionServiceError {
    fn from(err: Error) -> Self {
        match err {
            Error::FileNotFound(msg) | Error::InvalidImageFormat(msg) => {
                DetectionServiceError::InvalidImage(msg)
            }
            Error::Image(e) => DetectionServiceError::InvalidImage(e.to_string()),
            Error::Store(e) => DetectionServiceError::StoreError(e),
            Error::Config(e) => DetectionServiceError::ConfigError(e.to_string()),
            Error::Io(e) => DetectionServiceError::Failed(e.to_string()),
            _ => DetectionServiceError::Failed(err.to_string()),
        }
    }
}

/// Options for a detection run
#[derive(Debug, Clone)]
pub struct DetectOptions {
    /// Capturing source identifier recorded on the result
    pub source_id: Option<String>,

    /// Upstream frame-quality estimate, 0.0-1.0
    pub image_quality: Option<f64>,

    /// Whether to append the record to the detection history
    pub store_result: bool,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            source_id: None,
            image_quality: None,
            store_result: true,
        }
    }
}

impl DetectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source_id: String) -> Self {
        self.source_id = Some(source_id);
        self
    }

    pub fn with_image_quality(mut self, quality: f64) -> Self {
        self.image_quality = Some(quality);
        self
    }

    pub fn with_store(mut self, enabled: bool) -> Self {
        self.store_result = enabled;
        self
    }
}

/// Build the recognizer described by the configuration.
///
/// The specialized plate engine runs first, the general OCR command as
/// fallback. Either may be absent; with neither configured every run ends
/// in an engine-failure record.
pub fn build_recognizer(config: &Config) -> PlateRecognizer {
    let recognizer_config = RecognizerConfig::default()
        .with_threshold(config.confidence_threshold)
        .with_timeout_ms(config.engine_timeout_ms)
        .with_preprocess(config.preprocess_fallback);

    let mut recognizer = PlateRecognizer::new(recognizer_config);

    if let Some(ref command) = config.plate_engine_command {
        recognizer = recognizer.with_engine(Arc::new(CommandEngine::new("plate", command)));
    }
    if let Some(ref command) = config.ocr_engine_command {
        recognizer = recognizer.with_engine(Arc::new(CommandEngine::new("ocr", command)));
    }

    recognizer
}

/// Build capture metadata for an image file
pub fn read_capture_meta(image_path: &Path, options: &DetectOptions) -> CaptureMeta {
    let frame = FrameMetadata::from_file(image_path);

    CaptureMeta {
        source_id: options.source_id.clone(),
        captured_at: FrameMetadata::captured_at_or_file_time(image_path),
        latitude: frame.as_ref().and_then(|m| m.latitude),
        longitude: frame.as_ref().and_then(|m| m.longitude),
        bounding_box: None,
        image_quality: options.image_quality,
    }
}

/// Run recognition for one image with an already-built recognizer.
///
/// Used directly by batch workers so the history store stays behind a
/// single writer.
pub fn recognize_image(
    image_path: &Path,
    recognizer: &PlateRecognizer,
    options: &DetectOptions,
) -> Result<PlateDetectionRecord, DetectionServiceError> {
    validate_image(image_path)?;

    let meta = read_capture_meta(image_path, options);
    let bytes = std::fs::read(image_path).map_err(|e| Error::Io(e))?;

    debug!(image = %image_path.display(), "processing region");
    Ok(recognizer.process(&bytes, &meta))
}

/// Main entry point: detect a plate in a single image
pub fn detect_plate_image(
    image_path: &Path,
    config: &Config,
    options: &DetectOptions,
) -> Result<PlateDetectionRecord, DetectionServiceError> {
    let recognizer = build_recognizer(config);
    let record = recognize_image(image_path, &recognizer, options)?;

    if options.store_result {
        let mut store = DetectionStore::open(config.store_dir()?)?;
        store.append(record.clone())?;
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_options_builder() {
        let options = DetectOptions::new()
            .with_source("gate-01".to_string())
            .with_image_quality(0.9)
            .with_store(false);

        assert_eq!(options.source_id.as_deref(), Some("gate-01"));
        assert_eq!(options.image_quality, Some(0.9));
        assert!(!options.store_result);
    }

    #[test]
    fn test_recognizer_engine_wiring() {
        let mut config = Config::default();
        assert_eq!(build_recognizer(&config).engine_count(), 0);

        config.plate_engine_command = Some("plate-ocr".to_string());
        assert_eq!(build_recognizer(&config).engine_count(), 1);

        config.ocr_engine_command = Some("tesseract".to_string());
        assert_eq!(build_recognizer(&config).engine_count(), 2);
    }

    #[test]
    fn test_missing_image_is_invalid() {
        let config = Config::default();
        let err = detect_plate_image(
            Path::new("/no/such/frame.jpg"),
            &config,
            &DetectOptions::new().with_store(false),
        )
        .unwrap_err();
        assert!(matches!(err, DetectionServiceError::InvalidImage(_)));
    }
}
