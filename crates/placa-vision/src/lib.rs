//! Vision layer - recognition-engine orchestration for plate detection
//!
//! This crate provides:
//! - The pluggable [`RecognitionEngine`] capability and its command-backed
//!   implementation
//! - Image normalization for the fallback OCR pass
//! - The [`PlateRecognizer`] orchestrator that turns one image region into
//!   one [`PlateDetectionRecord`]

pub mod engine;
pub mod preprocess;

pub use engine::{CommandEngine, EngineReading, RecognitionEngine};

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};

use placa_domain::correct;
use placa_types::{
    CaptureMeta, DetectionErrorKind, DetectionStatus, PlateDetectionRecord, RawOcrReading,
};

/// Orchestrator tuning knobs
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    /// Minimum engine confidence for automatic validation
    pub confidence_threshold: f64,
    /// Upper bound on a single engine call
    pub engine_timeout_ms: u64,
    /// Normalize the region before handing it to fallback engines
    pub preprocess_fallback: bool,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.60,
            engine_timeout_ms: 10_000,
            preprocess_fallback: true,
        }
    }
}

impl RecognizerConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.engine_timeout_ms = timeout_ms;
        self
    }

    pub fn with_preprocess(mut self, enabled: bool) -> Self {
        self.preprocess_fallback = enabled;
        self
    }
}

/// Multi-engine plate recognizer.
///
/// Engines are tried in registration order: the first is expected to be the
/// specialized plate engine and gets the raw region; later engines get the
/// normalized region. The first engine that yields non-empty text wins.
pub struct PlateRecognizer {
    engines: Vec<Arc<dyn RecognitionEngine>>,
    config: RecognizerConfig,
}

impl PlateRecognizer {
    pub fn new(config: RecognizerConfig) -> Self {
        Self {
            engines: Vec::new(),
            config,
        }
    }

    pub fn with_engine(mut self, engine: Arc<dyn RecognitionEngine>) -> Self {
        self.engines.push(engine);
        self
    }

    pub fn engine_count(&self) -> usize {
        self.engines.len()
    }

    /// Process one image region into a detection record.
    ///
    /// Every failure mode is converted into fields on the returned record;
    /// this function does not return errors and does not panic, so batch
    /// callers can keep going when individual frames fail.
    pub fn process(&self, image: &[u8], meta: &CaptureMeta) -> PlateDetectionRecord {
        let started = Instant::now();
        let mut record = PlateDetectionRecord::from_meta(meta, Utc::now());

        match self.acquire_reading(image) {
            None => {
                record.status = DetectionStatus::EngineFailure;
                record.error_kind = Some(DetectionErrorKind::EngineUnavailable);
                warn!(source = ?record.source_id, "no engine produced text for region");
            }
            Some(reading) => {
                record.engine = Some(reading.engine.clone());
                record.raw_text = Some(reading.raw_text.clone());
                record.confidence = reading.confidence;

                match correct(&reading.raw_text) {
                    None => {
                        record.status = DetectionStatus::Rejected;
                        record.error_kind = Some(DetectionErrorKind::NoPlateFound);
                        debug!(raw = %reading.raw_text, "no valid plate window in text");
                    }
                    Some(candidate) => {
                        record.was_corrected = candidate.was_corrected;
                        record.plate = Some(candidate.text);

                        match reading.confidence {
                            Some(conf) if conf >= self.config.confidence_threshold => {
                                record.status = DetectionStatus::Validated;
                            }
                            _ => {
                                // Unscored reads cannot clear the threshold
                                // either; both go to the review queue.
                                record.status = DetectionStatus::Pending;
                                record.error_kind = Some(DetectionErrorKind::LowConfidence);
                            }
                        }

                        info!(
                            plate = record.plate.as_deref().unwrap_or(""),
                            status = record.status.label(),
                            corrected = record.was_corrected,
                            engine = %reading.engine,
                            "plate extracted"
                        );
                    }
                }
            }
        }

        record.processing_time_ms = started.elapsed().as_millis() as u64;
        record
    }

    /// Try each engine in order until one yields non-empty text
    fn acquire_reading(&self, image: &[u8]) -> Option<RawOcrReading> {
        if self.engines.is_empty() {
            warn!("no recognition engines configured");
            return None;
        }

        let timeout = Duration::from_millis(self.config.engine_timeout_ms);
        let raw = Arc::new(image.to_vec());
        let mut normalized: Option<Arc<Vec<u8>>> = None;

        for (index, engine) in self.engines.iter().enumerate() {
            let bytes = if index == 0 || !self.config.preprocess_fallback {
                raw.clone()
            } else {
                self.normalized_region(&raw, &mut normalized)
            };

            let call_started = Instant::now();
            match engine::recognize_bounded(engine.clone(), bytes, timeout) {
                Ok(reading) if !reading.text.trim().is_empty() => {
                    return Some(RawOcrReading {
                        engine: engine.name().to_string(),
                        raw_text: reading.text,
                        confidence: reading.confidence.map(|c| c.clamp(0.0, 1.0)),
                        processing_time_ms: call_started.elapsed().as_millis() as u64,
                        captured_at: Utc::now(),
                    });
                }
                Ok(_) => {
                    debug!(engine = engine.name(), "engine returned empty text");
                }
                Err(e) => {
                    warn!(engine = engine.name(), error = %e, "engine call failed");
                }
            }
        }

        None
    }

    /// Normalize the region once, reusing it for every fallback engine.
    /// Falls back to the raw bytes when the region cannot be decoded.
    fn normalized_region(
        &self,
        raw: &Arc<Vec<u8>>,
        cache: &mut Option<Arc<Vec<u8>>>,
    ) -> Arc<Vec<u8>> {
        if let Some(ready) = cache {
            return ready.clone();
        }

        let bytes = match preprocess::enhance_for_ocr(raw) {
            Ok(enhanced) => Arc::new(enhanced),
            Err(e) => {
                warn!(error = %e, "preprocessing failed, using raw region");
                raw.clone()
            }
        };
        *cache = Some(bytes.clone());
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placa_types::{EngineError, Result};

    struct FixedEngine {
        name: &'static str,
        reading: Option<EngineReading>,
    }

    impl FixedEngine {
        fn ok(name: &'static str, text: &str, confidence: Option<f64>) -> Arc<Self> {
            Arc::new(Self {
                name,
                reading: Some(EngineReading {
                    text: text.to_string(),
                    confidence,
                }),
            })
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                reading: None,
            })
        }
    }

    impl RecognitionEngine for FixedEngine {
        fn name(&self) -> &str {
            self.name
        }

        fn recognize(&self, _image: &[u8]) -> Result<EngineReading> {
            match &self.reading {
                Some(r) => Ok(r.clone()),
                None => Err(EngineError::EmptyOutput.into()),
            }
        }
    }

    fn recognizer_without_preprocess() -> RecognizerConfig {
        // Stub engines receive arbitrary bytes, not decodable images
        RecognizerConfig::default().with_preprocess(false)
    }

    #[test]
    fn test_primary_engine_validates() {
        let recognizer = PlateRecognizer::new(recognizer_without_preprocess())
            .with_engine(FixedEngine::ok("plate", "ABC1D23", Some(0.95)));

        let record = recognizer.process(b"img", &CaptureMeta::default());
        assert_eq!(record.status, DetectionStatus::Validated);
        assert_eq!(record.plate.as_deref(), Some("ABC1D23"));
        assert_eq!(record.engine.as_deref(), Some("plate"));
        assert!(record.error_kind.is_none());
    }

    #[test]
    fn test_fallback_engine_wins_when_primary_fails() {
        let recognizer = PlateRecognizer::new(recognizer_without_preprocess())
            .with_engine(FixedEngine::failing("plate"))
            .with_engine(FixedEngine::ok("ocr", "x A8C1D23", Some(0.80)));

        let record = recognizer.process(b"img", &CaptureMeta::default());
        assert_eq!(record.status, DetectionStatus::Validated);
        assert_eq!(record.plate.as_deref(), Some("ABC1D23"));
        assert!(record.was_corrected);
        assert_eq!(record.engine.as_deref(), Some("ocr"));
    }

    #[test]
    fn test_all_engines_failing_is_engine_failure() {
        let recognizer = PlateRecognizer::new(recognizer_without_preprocess())
            .with_engine(FixedEngine::failing("plate"))
            .with_engine(FixedEngine::failing("ocr"));

        let record = recognizer.process(b"img", &CaptureMeta::default());
        assert_eq!(record.status, DetectionStatus::EngineFailure);
        assert_eq!(
            record.error_kind,
            Some(DetectionErrorKind::EngineUnavailable)
        );
        assert!(record.plate.is_none());
    }

    #[test]
    fn test_no_engines_is_engine_failure() {
        let recognizer = PlateRecognizer::new(recognizer_without_preprocess());
        let record = recognizer.process(b"img", &CaptureMeta::default());
        assert_eq!(record.status, DetectionStatus::EngineFailure);
    }

    #[test]
    fn test_unrecoverable_text_is_rejected() {
        let recognizer = PlateRecognizer::new(recognizer_without_preprocess())
            .with_engine(FixedEngine::ok("plate", "????", Some(0.9)));

        let record = recognizer.process(b"img", &CaptureMeta::default());
        assert_eq!(record.status, DetectionStatus::Rejected);
        assert_eq!(record.error_kind, Some(DetectionErrorKind::NoPlateFound));
        assert!(record.plate.is_none());
        assert_eq!(record.raw_text.as_deref(), Some("????"));
    }

    #[test]
    fn test_low_confidence_goes_to_pending() {
        let recognizer = PlateRecognizer::new(recognizer_without_preprocess())
            .with_engine(FixedEngine::ok("plate", "ABC1D23", Some(0.42)));

        let record = recognizer.process(b"img", &CaptureMeta::default());
        assert_eq!(record.status, DetectionStatus::Pending);
        assert_eq!(record.error_kind, Some(DetectionErrorKind::LowConfidence));
        // The plate is still present, queued for review
        assert_eq!(record.plate.as_deref(), Some("ABC1D23"));
    }

    #[test]
    fn test_unscored_valid_plate_goes_to_pending() {
        let recognizer = PlateRecognizer::new(recognizer_without_preprocess())
            .with_engine(FixedEngine::ok("ocr", "ABC1D23", None));

        let record = recognizer.process(b"img", &CaptureMeta::default());
        assert_eq!(record.status, DetectionStatus::Pending);
    }

    #[test]
    fn test_threshold_boundary_validates() {
        let recognizer = PlateRecognizer::new(recognizer_without_preprocess())
            .with_engine(FixedEngine::ok("plate", "ABC1D23", Some(0.60)));

        let record = recognizer.process(b"img", &CaptureMeta::default());
        assert_eq!(record.status, DetectionStatus::Validated);
    }

    #[test]
    fn test_empty_text_falls_through_to_next_engine() {
        let recognizer = PlateRecognizer::new(recognizer_without_preprocess())
            .with_engine(FixedEngine::ok("plate", "   ", Some(0.9)))
            .with_engine(FixedEngine::ok("ocr", "ABC1D23", Some(0.9)));

        let record = recognizer.process(b"img", &CaptureMeta::default());
        assert_eq!(record.status, DetectionStatus::Validated);
        assert_eq!(record.engine.as_deref(), Some("ocr"));
    }

    #[test]
    fn test_capture_meta_propagates() {
        let meta = CaptureMeta {
            source_id: Some("cam-12".to_string()),
            image_quality: Some(0.7),
            ..Default::default()
        };
        let recognizer = PlateRecognizer::new(recognizer_without_preprocess())
            .with_engine(FixedEngine::ok("plate", "ABC1D23", Some(0.9)));

        let record = recognizer.process(b"img", &meta);
        assert_eq!(record.source_id.as_deref(), Some("cam-12"));
        assert_eq!(record.image_quality, Some(0.7));
    }
}
