//! Configuration management for placa-scan
//!
//! Config stored at: ~/.config/placa-scan/config.json

use placa_types::{ConfigError, OutputFormat, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Command for the specialized plate-recognition engine
    #[serde(default)]
    pub plate_engine_command: Option<String>,

    /// Command for the general-purpose OCR fallback engine
    #[serde(default)]
    pub ocr_engine_command: Option<String>,

    /// Minimum confidence for automatic validation (0.0-1.0)
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Upper bound on a single engine call, in milliseconds
    #[serde(default = "default_engine_timeout_ms")]
    pub engine_timeout_ms: u64,

    /// Normalize regions before the fallback engine
    #[serde(default = "default_true")]
    pub preprocess_fallback: bool,

    /// Default output format (json, table)
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,

    /// Detection store directory override
    #[serde(default)]
    pub store_dir: Option<PathBuf>,
}

fn default_confidence_threshold() -> f64 {
    0.60
}

fn default_engine_timeout_ms() -> u64 {
    10_000
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plate_engine_command: None,
            ocr_engine_command: None,
            confidence_threshold: default_confidence_threshold(),
            engine_timeout_ms: default_engine_timeout_ms(),
            preprocess_fallback: true,
            output_format: default_output_format(),
            store_dir: None,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("placa-scan");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Get the detection store directory
    pub fn store_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.store_dir {
            return Ok(dir.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or(ConfigError::NotFound)?
            .join("placa-scan");
        Ok(data_dir)
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Placa Scan Configuration")?;
        writeln!(f, "========================")?;
        writeln!(f)?;
        writeln!(
            f,
            "Plate engine:    {}",
            self.plate_engine_command.as_deref().unwrap_or("(not set)")
        )?;
        writeln!(
            f,
            "OCR fallback:    {}",
            self.ocr_engine_command.as_deref().unwrap_or("(not set)")
        )?;
        writeln!(f, "Threshold:       {:.2}", self.confidence_threshold)?;
        writeln!(f, "Engine timeout:  {} ms", self.engine_timeout_ms)?;
        writeln!(f, "Preprocess:      {}", self.preprocess_fallback)?;
        writeln!(f, "Output format:   {}", self.output_format)?;
        writeln!(
            f,
            "Store dir:       {}",
            self.store_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(error)".to_string())
        )?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:     {}", path.display())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.plate_engine_command.is_none());
        assert!((config.confidence_threshold - 0.60).abs() < f64::EPSILON);
        assert_eq!(config.engine_timeout_ms, 10_000);
        assert!(config.preprocess_fallback);
        assert_eq!(config.output_format, OutputFormat::Table);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert!((config.confidence_threshold - 0.60).abs() < f64::EPSILON);
        assert!(config.preprocess_fallback);
    }

    #[test]
    fn test_roundtrip() {
        let mut config = Config::default();
        config.plate_engine_command = Some("plate-ocr --model fast".to_string());
        config.confidence_threshold = 0.75;

        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(
            back.plate_engine_command.as_deref(),
            Some("plate-ocr --model fast")
        );
        assert!((back.confidence_threshold - 0.75).abs() < f64::EPSILON);
    }
}
