//! Pipeline orchestration: classification, normalization, thumbnails and hashes.

use std::path::Path;

use crate::config::Config;
use crate::error::{ConfigError, MediaError, MediaResult, Result};
use crate::types::MediaRecord;

use super::classify::{classify, classify_path, MediaClass};
use super::hash::{HashSpec, Hasher, PerceptualHash};
use super::normalize::{DecodedImage, ImageNormalizer};
use super::thumbnail::ThumbnailGenerator;
use super::transcode::Transcoder;

/// Entry point for all media operations.
///
/// Holds no mutable state; one processor can serve concurrent callers.
pub struct MediaProcessor {
    normalizer: ImageNormalizer,
    thumbnail_gen: ThumbnailGenerator,
    hasher: Hasher,
}

impl MediaProcessor {
    /// Create a processor, probing PATH for the transcoder once.
    pub fn new(config: &Config) -> std::result::Result<Self, ConfigError> {
        Self::with_transcoder(config, Transcoder::detect(&config.transcoder))
    }

    /// Create a processor around an already-built transcoder.
    pub fn with_transcoder(
        config: &Config,
        transcoder: Transcoder,
    ) -> std::result::Result<Self, ConfigError> {
        let spec = HashSpec::new(config.hash.resolution)?;
        Ok(Self {
            normalizer: ImageNormalizer::new(transcoder),
            thumbnail_gen: ThumbnailGenerator::new(config.thumbnail.clone()),
            hasher: Hasher::new(spec),
        })
    }

    /// Classify a dotted extension.
    pub fn classify(&self, extension: &str) -> MediaClass {
        classify(extension)
    }

    /// Whether the transcoder was found at start-up.
    pub fn transcoder_available(&self) -> bool {
        self.normalizer.transcoder().is_available()
    }

    /// Decode any supported media into a raster image.
    pub fn normalize(&self, bytes: &[u8]) -> MediaResult<DecodedImage> {
        self.normalizer.normalize(bytes)
    }

    /// Decode everything `reader` yields.
    pub fn normalize_reader(&self, reader: &mut dyn std::io::Read) -> MediaResult<DecodedImage> {
        self.normalizer.normalize_reader(reader)
    }

    /// Read a file from disk and decode it.
    pub fn open_image(&self, path: &Path) -> MediaResult<DecodedImage> {
        let bytes = read_file(path)?;
        self.normalize(&bytes)
    }

    /// Decode `bytes` and produce a JPEG thumbnail no larger than `max_dimension`.
    ///
    /// A `max_dimension` of 0 uses the configured default.
    pub fn make_thumbnail(&self, bytes: &[u8], max_dimension: u32) -> MediaResult<Vec<u8>> {
        let decoded = self.normalize(bytes)?;
        self.thumbnail_gen.generate(&decoded.image, max_dimension)
    }

    /// Decode `bytes` and hash them at `resolution`.
    ///
    /// The resolution is validated before anything is decoded.
    pub fn hash(&self, bytes: &[u8], resolution: u32) -> Result<PerceptualHash> {
        let spec = HashSpec::new(resolution)?;
        let decoded = self.normalize(bytes)?;
        Ok(Hasher::new(spec).perceptual_hash(&decoded.image))
    }

    /// Hash an already-decoded image with the configured resolution.
    pub fn hash_image(&self, decoded: &DecodedImage) -> PerceptualHash {
        self.hasher.perceptual_hash(&decoded.image)
    }

    /// Thumbnail an already-decoded image.
    pub fn thumbnail_image(
        &self,
        decoded: &DecodedImage,
        max_dimension: u32,
    ) -> MediaResult<Vec<u8>> {
        self.thumbnail_gen.generate(&decoded.image, max_dimension)
    }

    /// Open a file and hash it with the configured resolution.
    pub fn hash_file(&self, path: &Path) -> MediaResult<PerceptualHash> {
        let decoded = self.open_image(path)?;
        Ok(self.hash_image(&decoded))
    }

    /// Thumbnail raw bytes through the transcoder, skipping native decode.
    ///
    /// Works on anything the transcoder understands. A `scale` of 0 uses the
    /// configured default scale.
    pub fn external_thumbnail(&self, bytes: &[u8], scale: u32) -> MediaResult<Vec<u8>> {
        self.normalizer.transcoder().thumbnail(bytes, scale)
    }

    /// Write an external thumbnail of `bytes` to `out_path`.
    pub fn write_thumbnail(&self, bytes: &[u8], out_path: &Path, scale: u32) -> MediaResult<()> {
        let thumb = self.external_thumbnail(bytes, scale)?;
        std::fs::write(out_path, thumb).map_err(|source| MediaError::Io {
            path: out_path.to_path_buf(),
            source,
        })
    }

    /// Decode a file once and produce its hash and thumbnail summary.
    pub fn process(&self, path: &Path, max_dimension: u32) -> MediaResult<MediaRecord> {
        let start = std::time::Instant::now();
        tracing::debug!("Processing: {:?}", path);

        let decoded = self.open_image(path)?;
        let decode_time = start.elapsed();
        tracing::trace!("  Decode: {:?}", decode_time);

        let phash_start = std::time::Instant::now();
        let phash = self.hash_image(&decoded);
        tracing::trace!("  Perceptual hash: {:?}", phash_start.elapsed());

        let thumb_start = std::time::Instant::now();
        let thumbnail = self.thumbnail_image(&decoded, max_dimension)?;
        tracing::trace!("  Thumbnail: {:?}", thumb_start.elapsed());

        tracing::debug!(
            "Processed {:?} in {:?} ({}x{})",
            path,
            start.elapsed(),
            decoded.width,
            decoded.height
        );

        Ok(MediaRecord {
            file_path: path.to_path_buf(),
            name_class: classify_path(path),
            content_class: decoded.class,
            detected_extension: decoded.extension.clone(),
            width: decoded.width,
            height: decoded.height,
            file_size: decoded.source_size,
            perceptual_hash: phash.to_hex(),
            thumbnail_size: thumbnail.len(),
        })
    }
}

fn read_file(path: &Path) -> MediaResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| MediaError::Io {
        path: path.to_path_buf(),
        source,
    })
}
