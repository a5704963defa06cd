//! Serializable summaries of processed media.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::pipeline::MediaClass;

/// Summary of one file run through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Path to the source file
    pub file_path: PathBuf,

    /// Class implied by the file name's extension
    pub name_class: MediaClass,

    /// Class implied by the sniffed content
    pub content_class: MediaClass,

    /// Extension detected from the content (e.g. ".png")
    pub detected_extension: String,

    /// Decoded width in pixels
    pub width: u32,

    /// Decoded height in pixels
    pub height: u32,

    /// File size in bytes
    pub file_size: u64,

    /// Hex-encoded perceptual hash
    pub perceptual_hash: String,

    /// Size of the encoded JPEG thumbnail in bytes
    pub thumbnail_size: usize,
}

/// Classification result for a single path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedPath {
    pub file_path: PathBuf,
    pub class: MediaClass,
}

/// Perceptual hash of a single path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashedPath {
    pub file_path: PathBuf,
    pub perceptual_hash: String,
}
