//! Native thumbnail generation with JPEG output.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::DynamicImage;

use crate::config::ThumbnailConfig;
use crate::error::{MediaError, MediaResult};

/// Compute thumbnail dimensions for a `width`×`height` source.
///
/// Sources that already fit are left alone. Otherwise the longer edge becomes
/// `max_dimension` and the shorter edge is scaled with truncating integer
/// division. The shorter edge never drops below 1.
pub fn target_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if width <= max_dimension && height <= max_dimension {
        return (width, height);
    }

    let (w, h, max) = (width as u64, height as u64, max_dimension as u64);
    let (new_w, new_h) = if w > h {
        (max, h * max / w)
    } else {
        (w * max / h, max)
    };
    (new_w.max(1) as u32, new_h.max(1) as u32)
}

/// Generates JPEG thumbnails from decoded images.
pub struct ThumbnailGenerator {
    config: ThumbnailConfig,
}

impl ThumbnailGenerator {
    /// Create a new thumbnail generator with the given configuration.
    pub fn new(config: ThumbnailConfig) -> Self {
        Self { config }
    }

    /// Scale `image` to fit `max_dimension` and encode it as JPEG.
    ///
    /// A `max_dimension` of 0 uses the configured default.
    pub fn generate(&self, image: &DynamicImage, max_dimension: u32) -> MediaResult<Vec<u8>> {
        let max_dimension = if max_dimension == 0 {
            self.config.max_dimension
        } else {
            max_dimension
        };

        let (width, height) = (image.width(), image.height());
        let (new_w, new_h) = target_dimensions(width, height, max_dimension);
        tracing::trace!(
            "Thumbnail {}x{} -> {}x{}",
            width,
            height,
            new_w,
            new_h
        );

        // JPEG has no alpha channel.
        let rgb = image.to_rgb8();
        let scaled = if (new_w, new_h) == (width, height) {
            rgb
        } else {
            imageops::resize(&rgb, new_w, new_h, FilterType::Triangle)
        };

        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, self.config.quality)
            .encode_image(&scaled)
            .map_err(|e| MediaError::Encode(e.to_string()))?;
        Ok(buffer)
    }
}

impl Default for ThumbnailGenerator {
    fn default() -> Self {
        Self::new(ThumbnailConfig::default())
    }
}
