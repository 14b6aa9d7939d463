//! Core types for the encode stage.

use thiserror::Error;

use crate::decode::DecodeError;

/// MIME type of everything the raster encoder produces.
pub const JPEG_MIME: &str = "image/jpeg";

/// Errors that can occur while running a single encode attempt.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The input is not a raster image we can read.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// The input decoded badly.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// JPEG encoding failed
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),
}

impl EncodeError {
    /// Whether this error means the input can never be encoded, as opposed to
    /// the codec tripping over the data.
    pub fn is_unsupported_format(&self) -> bool {
        matches!(
            self,
            EncodeError::UnsupportedFormat(_) | EncodeError::Decode(DecodeError::InvalidFormat)
        )
    }
}

/// Output of one encode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Encoded file bytes.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub mime: String,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

impl EncodedImage {
    /// Size of the encoded output in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_classification() {
        assert!(EncodeError::UnsupportedFormat("text/plain".into()).is_unsupported_format());
        assert!(EncodeError::Decode(DecodeError::InvalidFormat).is_unsupported_format());
        assert!(!EncodeError::Decode(DecodeError::OutOfMemory).is_unsupported_format());
        assert!(!EncodeError::EncodingFailed("boom".into()).is_unsupported_format());
    }

    #[test]
    fn test_decode_error_is_transparent() {
        let err = EncodeError::from(DecodeError::InvalidFormat);
        assert_eq!(err.to_string(), "Invalid or unsupported image format");
    }
}
