//! Media processing pipeline components.
//!
//! - **classify**: Map file extensions to capability tiers
//! - **transcode**: Extract still frames through an external process
//! - **normalize**: Sniff content and decode it into a raster image
//! - **thumbnail**: Generate JPEG thumbnails
//! - **hash**: Generate mean-threshold perceptual hashes
//! - **processor**: Orchestrates the stages above

pub mod classify;
pub mod hash;
pub mod normalize;
pub mod processor;
pub mod thumbnail;
pub mod transcode;

// Re-exports for convenient access
pub use classify::{classify, classify_path, is_hashable, MediaClass};
pub use hash::{HashSpec, Hasher, PerceptualHash};
pub use normalize::{DecodedImage, ImageNormalizer};
pub use processor::MediaProcessor;
pub use thumbnail::{target_dimensions, ThumbnailGenerator};
pub use transcode::{
    ProcessOutput, ProcessRunner, SystemRunner, ToolAvailability, TranscodeRequest, Transcoder,
};
