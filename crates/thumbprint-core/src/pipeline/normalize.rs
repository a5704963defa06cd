//! Turning arbitrary media bytes into a decoded raster image.
//!
//! The content type is sniffed from magic bytes rather than trusted from a
//! file name. Native still images go straight to the built-in decoders;
//! everything else rasterizable is reduced to one JPEG frame by the
//! transcoder first.

use image::{DynamicImage, GenericImageView};
use std::io::{Cursor, Read};

use crate::error::{MediaError, MediaResult};

use super::classify::{classify, MediaClass};
use super::transcode::Transcoder;

/// A decoded image together with how it was obtained.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Class of the source content
    pub class: MediaClass,
    /// Dotted extension detected from the content
    pub extension: String,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Size of the source in bytes
    pub source_size: u64,
}

impl DecodedImage {
    /// Whether the image came out of the external transcoder.
    pub fn was_transcoded(&self) -> bool {
        self.class.needs_transcode()
    }
}

/// Detect the dotted extension of `bytes` from their magic numbers.
pub fn sniff_extension(bytes: &[u8]) -> Option<String> {
    infer::get(bytes).map(|kind| format!(".{}", kind.extension()))
}

/// Sniff and classify `bytes` in one step.
pub fn sniff_class(bytes: &[u8]) -> (Option<String>, MediaClass) {
    match sniff_extension(bytes) {
        Some(ext) => {
            let class = classify(&ext);
            (Some(ext), class)
        }
        None => (None, MediaClass::NotMedia),
    }
}

/// Decodes media into raster images, via the transcoder when needed.
pub struct ImageNormalizer {
    transcoder: Transcoder,
}

impl ImageNormalizer {
    pub fn new(transcoder: Transcoder) -> Self {
        Self { transcoder }
    }

    pub fn transcoder(&self) -> &Transcoder {
        &self.transcoder
    }

    /// Decode `bytes` into a raster image.
    pub fn normalize(&self, bytes: &[u8]) -> MediaResult<DecodedImage> {
        let (extension, class) = sniff_class(bytes);
        let extension = extension.unwrap_or_default();
        tracing::debug!("Sniffed {:?} as {}", extension, class);

        let image = match class {
            MediaClass::NativeImage => decode_native(bytes)?,
            MediaClass::ExtendedImage | MediaClass::Video => {
                let frame = self.transcoder.extract_frame(bytes)?;
                decode_native(&frame)?
            }
            MediaClass::Audio => {
                return Err(MediaError::UnsupportedContent(format!(
                    "{extension} is audio; no raster output"
                )));
            }
            MediaClass::NotMedia => {
                let detected = if extension.is_empty() {
                    "unrecognized content"
                } else {
                    extension.as_str()
                };
                return Err(MediaError::UnsupportedContent(detected.to_string()));
            }
        };

        let (width, height) = image.dimensions();
        Ok(DecodedImage {
            image,
            class,
            extension,
            width,
            height,
            source_size: bytes.len() as u64,
        })
    }

    /// Read `reader` to the end and decode it.
    pub fn normalize_reader(&self, reader: &mut dyn Read) -> MediaResult<DecodedImage> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| MediaError::InvalidStream(format!("cannot read input: {e}")))?;
        self.normalize(&bytes)
    }
}

/// Decode JPEG, PNG or GIF bytes with the built-in codecs.
pub fn decode_native(bytes: &[u8]) -> MediaResult<DynamicImage> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| MediaError::DecodeFailed(format!("cannot detect image format: {e}")))?;
    let image = reader
        .decode()
        .map_err(|e| MediaError::DecodeFailed(e.to_string()))?;

    if image.width() == 0 || image.height() == 0 {
        return Err(MediaError::DecodeFailed("image has zero area".into()));
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranscoderConfig;
    use crate::pipeline::transcode::tests::FakeRunner;
    use crate::pipeline::transcode::ToolAvailability;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::path::PathBuf;

    fn encoded(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 10, 10])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    /// Just enough of a BMP header for content sniffing.
    fn fake_bmp() -> Vec<u8> {
        let mut bmp = b"BM".to_vec();
        bmp.extend_from_slice(&[0u8; 52]);
        bmp
    }

    fn normalizer(runner: FakeRunner, availability: ToolAvailability) -> ImageNormalizer {
        ImageNormalizer::new(Transcoder::with_runner(
            &TranscoderConfig::default(),
            availability,
            Box::new(runner),
        ))
    }

    fn available() -> ToolAvailability {
        ToolAvailability::Available(PathBuf::from("/usr/bin/ffmpeg"))
    }

    #[test]
    fn test_sniff_extension() {
        assert_eq!(sniff_extension(&encoded(ImageFormat::Png, 2, 2)).as_deref(), Some(".png"));
        assert_eq!(sniff_extension(&encoded(ImageFormat::Jpeg, 2, 2)).as_deref(), Some(".jpg"));
        assert_eq!(sniff_extension(b"plain text, nothing to see"), None);
    }

    #[test]
    fn test_native_png_skips_transcoder() {
        let runner = FakeRunner::default();
        let n = normalizer(runner.clone(), available());

        let decoded = n.normalize(&encoded(ImageFormat::Png, 30, 20)).unwrap();
        assert_eq!((decoded.width, decoded.height), (30, 20));
        assert_eq!(decoded.class, MediaClass::NativeImage);
        assert!(!decoded.was_transcoded());
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn test_unknown_bytes_are_unsupported() {
        let runner = FakeRunner::default();
        let n = normalizer(runner.clone(), available());

        let err = n.normalize(&[0u8; 64]).unwrap_err();
        assert!(matches!(err, MediaError::UnsupportedContent(_)));
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn test_audio_is_unsupported() {
        // Minimal FLAC stream marker
        let mut flac = b"fLaC".to_vec();
        flac.extend_from_slice(&[0u8; 60]);
        let runner = FakeRunner::replying(encoded(ImageFormat::Jpeg, 4, 4));
        let n = normalizer(runner.clone(), available());

        let err = n.normalize(&flac).unwrap_err();
        assert!(matches!(err, MediaError::UnsupportedContent(_)));
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn test_extended_image_goes_through_transcoder() {
        let bmp = fake_bmp();
        let runner = FakeRunner::replying(encoded(ImageFormat::Jpeg, 8, 6));
        let n = normalizer(runner.clone(), available());

        let decoded = n.normalize(&bmp).unwrap();
        assert_eq!(decoded.class, MediaClass::ExtendedImage);
        assert_eq!((decoded.width, decoded.height), (8, 6));
        assert_eq!(runner.call_count(), 1);

        // Full resolution: no scale filter
        let calls = runner.calls.lock().unwrap();
        assert!(!calls[0].iter().any(|a| a == "-vf"));
    }

    #[test]
    fn test_extended_image_without_tool() {
        let bmp = fake_bmp();
        let n = normalizer(FakeRunner::default(), ToolAvailability::Missing);

        assert!(matches!(
            n.normalize(&bmp),
            Err(MediaError::ToolNotFound { .. })
        ));
    }

    #[test]
    fn test_garbage_frame_is_decode_failed() {
        let bmp = fake_bmp();
        let mut not_a_jpeg = vec![0xFF, 0xD8, 0xFF];
        not_a_jpeg.extend_from_slice(&[0u8; 32]);
        let n = normalizer(FakeRunner::replying(not_a_jpeg), available());

        assert!(matches!(
            n.normalize(&bmp),
            Err(MediaError::DecodeFailed(_))
        ));
    }

    #[test]
    fn test_normalize_reader() {
        let n = normalizer(FakeRunner::default(), available());
        let png = encoded(ImageFormat::Png, 5, 7);
        let decoded = n.normalize_reader(&mut png.as_slice()).unwrap();
        assert_eq!((decoded.width, decoded.height), (5, 7));
        assert_eq!(decoded.source_size, png.len() as u64);
    }
}
