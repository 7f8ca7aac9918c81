//! Recognition-engine capabilities
//!
//! Engines are interchangeable: anything that can turn an image region into
//! text plus an optional confidence. The built-in implementation shells out
//! to a configured external command, which is how both the specialized
//! plate recognizer and the general-purpose OCR fallback are wired in
//! deployments.

use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use placa_types::{EngineError, Result};

/// Text plus optional confidence from a single engine call
#[derive(Debug, Clone)]
pub struct EngineReading {
    pub text: String,
    /// 0.0-1.0, absent when the engine does not score its output
    pub confidence: Option<f64>,
}

/// A pluggable recognition capability: `recognize(image) -> (text, confidence)`
pub trait RecognitionEngine: Send + Sync {
    /// Short engine name recorded on detection results
    fn name(&self) -> &str;

    /// Recognize text in the given encoded image region
    fn recognize(&self, image: &[u8]) -> Result<EngineReading>;
}

/// JSON shape emitted by well-behaved engine commands
#[derive(Debug, Deserialize)]
struct EngineResponse {
    #[serde(alias = "plate")]
    text: Option<String>,
    confidence: Option<f64>,
}

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Engine backed by an external command.
///
/// The image is written to a temp file and the command is invoked as
/// `<command...> --image <path>`. Stdout is parsed as JSON
/// (`{"text": ..., "confidence": ...}`, markdown fences tolerated) and
/// falls back to treating the whole stdout as plain recognized text.
pub struct CommandEngine {
    name: String,
    command: String,
}

impl CommandEngine {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
        }
    }

    fn temp_image_path(&self) -> PathBuf {
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("placa_scan_{}_{}.img", std::process::id(), seq))
    }
}

impl RecognitionEngine for CommandEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn recognize(&self, image: &[u8]) -> Result<EngineReading> {
        let mut parts = match shell_words::split(&self.command) {
            Ok(parts) if !parts.is_empty() => parts,
            _ => {
                return Err(EngineError::InvalidCommand(self.command.clone()).into());
            }
        };

        let image_path = self.temp_image_path();
        std::fs::write(&image_path, image)?;

        let program = parts.remove(0);
        let mut cmd = Command::new(&program);
        cmd.args(&parts);
        cmd.arg("--image");
        cmd.arg(&image_path);

        debug!(engine = %self.name, program = %program, "invoking engine command");

        let output = cmd.output();
        let _ = std::fs::remove_file(&image_path);

        let output = output.map_err(|e| EngineError::Launch(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Launch(stderr.trim().to_string()).into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Err(EngineError::EmptyOutput.into());
        }

        Ok(parse_engine_output(&stdout))
    }
}

/// Parse engine stdout: structured JSON when available, raw text otherwise
fn parse_engine_output(stdout: &str) -> EngineReading {
    let json_str = extract_json_from_response(stdout);
    if let Ok(parsed) = serde_json::from_str::<EngineResponse>(&json_str) {
        return EngineReading {
            text: parsed.text.unwrap_or_default(),
            confidence: parsed.confidence.map(|c| c.clamp(0.0, 1.0)),
        };
    }

    EngineReading {
        text: stdout.trim().to_string(),
        confidence: None,
    }
}

/// Extract JSON from engine output (handles markdown code blocks)
pub fn extract_json_from_response(response: &str) -> String {
    let response = response.trim();

    if response.starts_with("```") {
        if let Some(end) = response.rfind("```") {
            let start = response.find('\n').map(|i| i + 1).unwrap_or(3);
            if start < end {
                return response[start..end].trim().to_string();
            }
        }
    }

    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if start < end {
                return response[start..=end].to_string();
            }
        }
    }

    response.to_string()
}

/// Run one engine call, bounded by the timeout.
///
/// A call exceeding the timeout is reported as [`EngineError::Timeout`];
/// the spawned call may still finish afterwards, but its result is dropped.
pub fn recognize_bounded(
    engine: Arc<dyn RecognitionEngine>,
    image: Arc<Vec<u8>>,
    timeout: Duration,
) -> Result<EngineReading> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let name = engine.name().to_string();

    thread::spawn(move || {
        let _ = tx.send(engine.recognize(image.as_slice()));
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(_) => {
            warn!(engine = %name, timeout_ms = timeout.as_millis() as u64, "engine call timed out");
            Err(EngineError::Timeout(timeout.as_millis() as u64).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_markdown() {
        let response = "```json\n{\"text\": \"ABC1D23\"}\n```";
        assert_eq!(extract_json_from_response(response), "{\"text\": \"ABC1D23\"}");
    }

    #[test]
    fn test_extract_json_plain() {
        let response = "{\"text\": \"ABC1D23\"}";
        assert_eq!(extract_json_from_response(response), "{\"text\": \"ABC1D23\"}");
    }

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let response = "result: {\"text\": \"ABC1D23\"} done";
        assert_eq!(extract_json_from_response(response), "{\"text\": \"ABC1D23\"}");
    }

    #[test]
    fn test_parse_structured_output() {
        let reading = parse_engine_output("{\"text\": \"ABC1D23\", \"confidence\": 0.92}");
        assert_eq!(reading.text, "ABC1D23");
        assert_eq!(reading.confidence, Some(0.92));
    }

    #[test]
    fn test_parse_plate_alias() {
        let reading = parse_engine_output("{\"plate\": \"ABC1D23\", \"confidence\": 1.4}");
        assert_eq!(reading.text, "ABC1D23");
        // Out-of-range confidence is clamped
        assert_eq!(reading.confidence, Some(1.0));
    }

    #[test]
    fn test_parse_plain_text_output() {
        let reading = parse_engine_output("ABC 1D23\n");
        assert_eq!(reading.text, "ABC 1D23");
        assert!(reading.confidence.is_none());
    }

    #[test]
    fn test_invalid_command_rejected() {
        let engine = CommandEngine::new("bad", "");
        assert!(engine.recognize(b"img").is_err());
    }

    struct SlowEngine;

    impl RecognitionEngine for SlowEngine {
        fn name(&self) -> &str {
            "slow"
        }

        fn recognize(&self, _image: &[u8]) -> Result<EngineReading> {
            thread::sleep(Duration::from_millis(200));
            Ok(EngineReading {
                text: "ABC1D23".to_string(),
                confidence: Some(0.9),
            })
        }
    }

    #[test]
    fn test_bounded_call_times_out() {
        let result = recognize_bounded(
            Arc::new(SlowEngine),
            Arc::new(b"img".to_vec()),
            Duration::from_millis(20),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_bounded_call_passes_result_through() {
        let result = recognize_bounded(
            Arc::new(SlowEngine),
            Arc::new(b"img".to_vec()),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(result.text, "ABC1D23");
    }
}
