//! Error types for placa-scan

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

/// Recognition-engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No recognition engine configured")]
    NotConfigured,

    #[error("Engine command is invalid: {0}")]
    InvalidCommand(String),

    #[error("Engine process failed: {0}")]
    Launch(String),

    #[error("Engine produced no usable output")]
    EmptyOutput,

    #[error("Engine call exceeded {0} ms")]
    Timeout(u64),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Detection failed: {0}")]
    Detection(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid image format: {0}")]
    InvalidImageFormat(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),
}

pub type Result<T> = std::result::Result<T, Error>;
