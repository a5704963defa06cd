//! Error types for the Thumbprint media pipeline.
//!
//! Media errors map one-to-one onto the stages that can fail: classification,
//! the external transcoder, still-image decoding and thumbnail encoding.
//! Transcoder failures keep the exit status so callers can tell "tool missing"
//! apart from "tool ran and failed".

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Thumbprint operations.
#[derive(Error, Debug)]
pub enum ThumbprintError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Media pipeline errors
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Media pipeline errors.
#[derive(Error, Debug)]
pub enum MediaError {
    /// Content is not a recognized media type, or is out of scope (audio)
    #[error("Unsupported content: {0}")]
    UnsupportedContent(String),

    /// The external transcoder was not found when the capability was probed
    #[error("Transcoder `{program}` not found in PATH")]
    ToolNotFound { program: String },

    /// Input or output stream handed to the transcoder is unusable
    #[error("Invalid stream: {0}")]
    InvalidStream(String),

    /// The transcoder ran but exited with an error or produced no frame
    #[error("Transcoder `{program}` failed ({}): {stderr}", describe_status(.status))]
    TranscodeFailed {
        program: String,
        status: Option<i32>,
        stderr: String,
    },

    /// A still-image decoder rejected the bytes
    #[error("Decode failed: {0}")]
    DecodeFailed(String),

    /// Thumbnail encoding failed
    #[error("Encode failed: {0}")]
    Encode(String),

    /// Reading a media file from disk failed
    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn describe_status(status: &Option<i32>) -> String {
    match *status {
        Some(code) => format!("exit status {code}"),
        None => "terminated without exit status".to_string(),
    }
}

/// Convenience type alias for Thumbprint results.
pub type Result<T> = std::result::Result<T, ThumbprintError>;

/// Convenience type alias for media-pipeline results.
pub type MediaResult<T> = std::result::Result<T, MediaError>;
