//! Encoder adapter.
//!
//! This module provides:
//! - The [`Encoder`] capability the search loop drives
//! - [`RasterEncoder`], which turns any supported raster input into JPEG
//! - The JPEG backend with normalized quality mapping
//!
//! # Examples
//!
//! ```ignore
//! use sizefit_core::encode::{Encoder, RasterEncoder};
//! use sizefit_core::EncodingParameters;
//!
//! let bytes = std::fs::read("photo.png").unwrap();
//! let out = RasterEncoder::new()
//!     .encode(&bytes, "image/png", &EncodingParameters::default())
//!     .unwrap();
//! println!("Encoded {}x{} in {} bytes", out.width, out.height, out.size());
//! ```

mod adapter;
mod jpeg;
mod types;

pub use adapter::{is_raster_mime, Encoder, RasterEncoder};
pub use jpeg::{encode_jpeg, jpeg_quality};
pub use types::{EncodeError, EncodedImage, JPEG_MIME};
