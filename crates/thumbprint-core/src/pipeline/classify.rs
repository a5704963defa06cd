//! Extension-based media classification.
//!
//! One canonical table of four disjoint extension sets. Classification runs
//! before any bytes are decoded so unsupported files fail without spawning
//! the transcoder.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Still images the built-in decoders handle directly.
const NATIVE_IMAGE: &[&str] = &[".jpg", ".jpeg", ".jfif", ".png", ".gif"];

/// Still images that must be normalized through the transcoder.
const EXTENDED_IMAGE: &[&str] = &[".bmp", ".tif", ".tiff", ".webp", ".jxl"];

const VIDEO: &[&str] = &[".mp4", ".m4v", ".webm", ".mkv", ".avi", ".mov"];

const AUDIO: &[&str] = &[".mp3", ".ogg", ".flac", ".wav", ".opus"];

/// Capability tier of a media file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaClass {
    /// Not a recognized media type
    NotMedia,
    /// Decodable by the built-in still-image codecs
    NativeImage,
    /// Still image that needs the external transcoder
    ExtendedImage,
    /// Video container; the first frame is extracted by the transcoder
    Video,
    /// Audio container; recognized but never rasterized
    Audio,
}

impl MediaClass {
    /// Whether this class can be turned into a raster image at all.
    pub fn is_rasterizable(self) -> bool {
        matches!(self, Self::NativeImage | Self::ExtendedImage | Self::Video)
    }

    /// Whether rasterizing this class goes through the external transcoder.
    pub fn needs_transcode(self) -> bool {
        matches!(self, Self::ExtendedImage | Self::Video)
    }

    /// Short lowercase name, as used in CLI and JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotMedia => "not_media",
            Self::NativeImage => "native_image",
            Self::ExtendedImage => "extended_image",
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a dotted file extension (e.g. `".JPG"`).
///
/// Only case is normalized: an extension without its leading dot is
/// `NotMedia`, matching what path-derived extensions look like.
pub fn classify(extension: &str) -> MediaClass {
    let ext = extension.to_lowercase();
    let ext = ext.as_str();

    if NATIVE_IMAGE.contains(&ext) {
        MediaClass::NativeImage
    } else if EXTENDED_IMAGE.contains(&ext) {
        MediaClass::ExtendedImage
    } else if VIDEO.contains(&ext) {
        MediaClass::Video
    } else if AUDIO.contains(&ext) {
        MediaClass::Audio
    } else {
        MediaClass::NotMedia
    }
}

/// Classify a file by its path's extension.
pub fn classify_path(path: &Path) -> MediaClass {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| classify(&format!(".{ext}")))
        .unwrap_or(MediaClass::NotMedia)
}

/// Whether the file at `path` can be hashed without the transcoder.
pub fn is_hashable(path: &Path) -> bool {
    classify_path(path) == MediaClass::NativeImage
}
