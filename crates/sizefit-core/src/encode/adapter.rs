//! The encoder capability and its raster implementation.

use std::sync::Arc;

use tracing::trace;

use super::jpeg::{encode_jpeg, jpeg_quality};
use super::{EncodeError, EncodedImage, JPEG_MIME};
use crate::decode::{decode_image, resize_to_fit, FilterType};
use crate::params::EncodingParameters;

/// A lossy encoder driven by `(quality, max_dimension)`.
///
/// Implementations are pure: the same bytes, MIME type and parameters must
/// always produce the same output. They never retry, loop or look at a size
/// budget; that is the search loop's job.
pub trait Encoder: Send + Sync {
    /// Re-encode `bytes` (declared as `mime`) with `params`.
    fn encode(
        &self,
        bytes: &[u8],
        mime: &str,
        params: &EncodingParameters,
    ) -> Result<EncodedImage, EncodeError>;
}

impl<E: Encoder + ?Sized> Encoder for Arc<E> {
    fn encode(
        &self,
        bytes: &[u8],
        mime: &str,
        params: &EncodingParameters,
    ) -> Result<EncodedImage, EncodeError> {
        (**self).encode(bytes, mime, params)
    }
}

impl<E: Encoder + ?Sized> Encoder for Box<E> {
    fn encode(
        &self,
        bytes: &[u8],
        mime: &str,
        params: &EncodingParameters,
    ) -> Result<EncodedImage, EncodeError> {
        (**self).encode(bytes, mime, params)
    }
}

/// Whether a declared MIME type names a raster image.
///
/// Parameters (`; charset=...`) and case are ignored. Vector images are not
/// raster even though they live under `image/`.
pub fn is_raster_mime(mime: &str) -> bool {
    let essence = mime
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.strip_prefix("image/") {
        Some(subtype) => !subtype.is_empty() && subtype != "svg+xml",
        None => false,
    }
}

/// Decodes any supported raster input and re-encodes it as JPEG.
///
/// Pipeline per call: sniff + decode, apply EXIF orientation, flatten alpha,
/// downscale so the longer edge fits `max_dimension`, encode at `quality`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterEncoder {
    filter: FilterType,
}

impl RasterEncoder {
    /// Create an encoder that downscales with Lanczos3.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different interpolation filter when downscaling.
    pub fn with_filter(filter: FilterType) -> Self {
        Self { filter }
    }

    /// The interpolation filter used when downscaling.
    pub fn filter(&self) -> FilterType {
        self.filter
    }
}

impl Encoder for RasterEncoder {
    fn encode(
        &self,
        bytes: &[u8],
        mime: &str,
        params: &EncodingParameters,
    ) -> Result<EncodedImage, EncodeError> {
        if !is_raster_mime(mime) {
            return Err(EncodeError::UnsupportedFormat(mime.to_string()));
        }

        let decoded = decode_image(bytes)?;
        trace!(
            width = decoded.width,
            height = decoded.height,
            "decoded attempt input"
        );

        let resized = resize_to_fit(decoded, params.max_dimension, self.filter)?;
        let jpeg = encode_jpeg(&resized, jpeg_quality(params.quality))?;

        Ok(EncodedImage {
            bytes: jpeg,
            mime: JPEG_MIME.to_string(),
            width: resized.width,
            height: resized.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode_as(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, format).unwrap();
        buffer.into_inner()
    }

    fn checkerboard(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            if (x / 8 + y / 8) % 2 == 0 {
                Rgb([240, 240, 240])
            } else {
                Rgb([20, 60, 120])
            }
        }))
    }

    #[test]
    fn test_is_raster_mime() {
        assert!(is_raster_mime("image/jpeg"));
        assert!(is_raster_mime("image/png"));
        assert!(is_raster_mime("IMAGE/WebP"));
        assert!(is_raster_mime("image/gif; charset=binary"));
        assert!(!is_raster_mime("image/svg+xml"));
        assert!(!is_raster_mime("image/"));
        assert!(!is_raster_mime("application/pdf"));
        assert!(!is_raster_mime("text/plain"));
        assert!(!is_raster_mime(""));
    }

    #[test]
    fn test_rejects_non_raster_mime_before_decoding() {
        let png = encode_as(checkerboard(16, 16), ImageFormat::Png);
        let result = RasterEncoder::new().encode(&png, "application/octet-stream", &Default::default());
        assert!(matches!(result, Err(EncodeError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_mislabeled_binary_is_unsupported() {
        let bytes: Vec<u8> = (0..4096u32).map(|i| (i * 7 + 3) as u8).collect();
        let err = RasterEncoder::new()
            .encode(&bytes, "image/jpeg", &Default::default())
            .unwrap_err();
        assert!(err.is_unsupported_format(), "got {:?}", err);
    }

    #[test]
    fn test_png_becomes_jpeg() {
        let png = encode_as(checkerboard(40, 30), ImageFormat::Png);
        let out = RasterEncoder::new()
            .encode(&png, "image/png", &Default::default())
            .unwrap();

        assert_eq!(out.mime, JPEG_MIME);
        assert_eq!((out.width, out.height), (40, 30));
        assert_eq!(&out.bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_downscale_preserves_aspect_ratio() {
        let png = encode_as(checkerboard(400, 200), ImageFormat::Png);
        let params = EncodingParameters {
            quality: 0.8,
            max_dimension: 100,
        };
        let out = RasterEncoder::with_filter(FilterType::Bilinear)
            .encode(&png, "image/png", &params)
            .unwrap();

        assert_eq!((out.width, out.height), (100, 50));
        let reread = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!((reread.width(), reread.height()), (100, 50));
    }

    #[test]
    fn test_small_image_is_not_upscaled() {
        let png = encode_as(checkerboard(64, 80), ImageFormat::Png);
        let out = RasterEncoder::new()
            .encode(&png, "image/png", &Default::default())
            .unwrap();
        assert_eq!((out.width, out.height), (64, 80));
    }

    #[test]
    fn test_transparent_png_is_accepted() {
        let rgba = RgbaImage::from_pixel(20, 20, Rgba([255, 0, 0, 64]));
        let png = encode_as(DynamicImage::ImageRgba8(rgba), ImageFormat::Png);
        let out = RasterEncoder::new()
            .encode(&png, "image/png", &Default::default())
            .unwrap();
        assert_eq!(out.mime, JPEG_MIME);
    }

    #[test]
    fn test_reencoding_own_output() {
        let png = encode_as(checkerboard(300, 300), ImageFormat::Png);
        let encoder = RasterEncoder::new();
        let first = encoder.encode(&png, "image/png", &Default::default()).unwrap();

        let params = EncodingParameters {
            quality: 0.56,
            max_dimension: 150,
        };
        let second = encoder.encode(&first.bytes, &first.mime, &params).unwrap();
        assert_eq!((second.width, second.height), (150, 150));
        assert!(second.size() < first.size());
    }

    #[test]
    fn test_shared_encoder_through_arc() {
        let png = encode_as(checkerboard(16, 16), ImageFormat::Png);
        let shared: Arc<dyn Encoder> = Arc::new(RasterEncoder::new());
        assert!(shared.encode(&png, "image/png", &Default::default()).is_ok());
    }
}
