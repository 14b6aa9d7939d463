//! The caller's input image.

use crate::decode::{probe_dimensions, DecodeError};

/// An image submitted for compression. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    bytes: Vec<u8>,
    mime: String,
    width: u32,
    height: u32,
}

impl SourceImage {
    /// Build from bytes and caller-known dimensions.
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            bytes,
            mime: mime.into(),
            width,
            height,
        }
    }

    /// Build from bytes, reading dimensions from the image header.
    ///
    /// # Errors
    ///
    /// Fails with `DecodeError::InvalidFormat` if the header is not a known
    /// raster format.
    pub fn from_bytes(bytes: Vec<u8>, mime: impl Into<String>) -> Result<Self, DecodeError> {
        let (width, height) = probe_dimensions(&bytes)?;
        Ok(Self::new(bytes, mime, width, height))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Declared MIME type, as given by the caller.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Size of the payload in bytes.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}
