//! Thumbprint Core - media classification, thumbnails and perceptual hashes.
//!
//! Takes raw media bytes (still images, video, anything an ffmpeg-compatible
//! transcoder can read) and produces either a bounded-size JPEG thumbnail or a
//! fixed-length perceptual hash for near-duplicate detection.
//!
//! # Architecture
//!
//! ```text
//! bytes → sniff + classify → native decode ─────────┐
//!                          └→ transcoder → decode ──┴→ raster → thumbnail | phash
//! ```
//!
//! Every operation is synchronous and holds no shared mutable state. The
//! only process-wide fact, whether the transcoder exists, is probed once when
//! the [`MediaProcessor`] is built and injected into it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use thumbprint_core::{Config, MediaProcessor};
//!
//! fn main() -> thumbprint_core::Result<()> {
//!     let config = Config::load()?;
//!     let processor = MediaProcessor::new(&config)?;
//!
//!     let bytes = std::fs::read("./clip.mp4")?;
//!     let phash = processor.hash(&bytes, 16)?;
//!     println!("{phash}");
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, MediaError, MediaResult, Result, ThumbprintError};
pub use output::{OutputFormat, OutputWriter, Record};
pub use pipeline::{
    classify, classify_path, is_hashable, DecodedImage, HashSpec, MediaClass, MediaProcessor,
    PerceptualHash, ToolAvailability, TranscodeRequest, Transcoder,
};
pub use types::{ClassifiedPath, HashedPath, MediaRecord};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_processor_from_default_config() {
        let processor = MediaProcessor::new(&Config::default()).unwrap();
        assert_eq!(processor.classify(".PNG"), MediaClass::NativeImage);
    }
}
