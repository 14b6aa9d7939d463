//! Decode stage of the encoder adapter.
//!
//! This module provides functionality for:
//! - Sniffing and decoding any supported raster format (JPEG, PNG, GIF, BMP, WebP)
//! - Applying EXIF orientation so downstream output is upright
//! - Flattening transparency over white
//! - Downscaling to a maximum edge length
//!
//! # Architecture
//!
//! Decoding runs inside an attempt and is always synchronous. Callers that
//! need to keep an interactive thread free run attempts on a worker (see
//! `crate::worker`) or inside a Web Worker via the WASM bindings.

mod raster;
mod resize;
mod types;

pub use raster::{decode_image, get_orientation, probe_dimensions};
pub use resize::{fit_dimensions, resize_to_fit};
pub use types::{DecodeError, DecodedImage, FilterType, Orientation};
