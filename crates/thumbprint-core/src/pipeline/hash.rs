//! Mean-threshold perceptual hashing for near-duplicate detection.
//!
//! The image is reduced to a `resolution`×`resolution` grid with
//! nearest-neighbor sampling, converted to 8-bit luma, and thresholded
//! against the mean luma. All arithmetic after sampling is integer, so the
//! same image yields the same bits on every platform.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use std::fmt;

use crate::error::ConfigError;

/// Validated hash resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashSpec {
    resolution: u32,
}

impl HashSpec {
    /// Accepts any non-zero resolution whose square packs into whole bytes.
    ///
    /// That means any multiple of 4, not only multiples of 8: a resolution
    /// of 4 yields a 2-byte hash and 12 yields 18 bytes. Everything else,
    /// including 0, is a `ValidationError`.
    pub fn new(resolution: u32) -> Result<Self, ConfigError> {
        if resolution == 0 {
            return Err(ConfigError::ValidationError(
                "hash.resolution must be > 0".into(),
            ));
        }
        if (resolution as u64 * resolution as u64) % 8 != 0 {
            return Err(ConfigError::ValidationError(format!(
                "hash.resolution must be a multiple of 4 so resolution² packs into bytes (got {resolution})"
            )));
        }
        Ok(Self { resolution })
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Number of bytes in a hash of this resolution.
    pub fn hash_len(&self) -> usize {
        (self.resolution as usize * self.resolution as usize) / 8
    }
}

impl Default for HashSpec {
    fn default() -> Self {
        Self { resolution: 16 }
    }
}

/// A fixed-length, bit-packed perceptual fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PerceptualHash(Vec<u8>);

impl PerceptualHash {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for PerceptualHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for PerceptualHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Produces perceptual hashes at a fixed resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hasher {
    spec: HashSpec,
}

impl Hasher {
    pub fn new(spec: HashSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> HashSpec {
        self.spec
    }

    /// Hash a decoded image.
    ///
    /// The image must have non-zero width and height.
    pub fn perceptual_hash(&self, image: &DynamicImage) -> PerceptualHash {
        debug_assert!(image.width() > 0 && image.height() > 0);

        let size = self.spec.resolution;
        let small = imageops::resize(&image.to_rgba8(), size, size, FilterType::Nearest);
        let luma = luma_values(&small);

        // Exact integer mean, truncated.
        let total: u64 = luma.iter().map(|&l| l as u64).sum();
        let mean = (total / luma.len() as u64) as u8;

        let mut hash = vec![0u8; self.spec.hash_len()];
        for (i, &l) in luma.iter().enumerate() {
            if l >= mean {
                hash[i / 8] |= 1 << (i % 8);
            }
        }
        PerceptualHash(hash)
    }
}

/// Row-major 8-bit luma of every pixel.
///
/// Uses the BT.601 weights in 16.16 fixed point. Alpha is premultiplied first,
/// so transparent areas count as black.
fn luma_values(image: &RgbaImage) -> Vec<u8> {
    image
        .pixels()
        .map(|p| {
            let [r, g, b, a] = p.0;
            let premul = |c: u8| (c as u32 * a as u32 + 127) / 255;
            let y = 19595 * premul(r) + 38470 * premul(g) + 7471 * premul(b) + (1 << 15);
            (y >> 16) as u8
        })
        .collect()
}
