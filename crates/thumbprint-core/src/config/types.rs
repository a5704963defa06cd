//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Perceptual hash settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HashConfig {
    /// Edge length of the square the image is reduced to before hashing.
    /// The hash is `resolution² / 8` bytes long.
    pub resolution: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self { resolution: 16 }
    }
}

/// Native thumbnail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Longest edge of the thumbnail, used when the caller passes 0
    pub max_dimension: u32,

    /// JPEG quality (1-100)
    pub quality: u8,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_dimension: 64,
            quality: 50,
        }
    }
}

/// External transcoder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscoderConfig {
    /// Program name, resolved against PATH once at start-up
    pub program: String,

    /// Value passed as `-q:v` (ffmpeg's JPEG quality scale, lower is better)
    pub quality: u32,

    /// Scale used by the external thumbnail route when none is requested
    pub default_scale: u32,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            quality: 10,
            default_scale: 512,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: pretty, json
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
