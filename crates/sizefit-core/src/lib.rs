//! Sizefit Core - size-budgeted image compression
//!
//! This crate re-encodes raster images so they fit under a byte budget picked
//! from a small preset catalog, trading quality and resolution for size over a
//! bounded number of attempts.
//!
//! # Module Structure
//!
//! - `budget` - Preset catalog with nominal sizes and internal margins
//! - `params` - Encoding parameters and the decay policy between attempts
//! - `encode` - Encoder capability and the raster-to-JPEG adapter
//! - `decode` - Format sniffing, orientation, alpha flattening, downscaling
//! - `search` - The attempt loop and its outcomes
//! - `worker` - Thread pool for running compressions off the caller's thread
//! - `report` - Size formatting and result summaries
//!
//! # Usage
//!
//! ```ignore
//! use sizefit_core::{compress, CompressionOutcome, SourceImage};
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let source = SourceImage::from_bytes(bytes, "image/jpeg").unwrap();
//!
//! match compress(&source, "100kb") {
//!     CompressionOutcome::Success(image) => println!("{} bytes", image.size()),
//!     CompressionOutcome::BestEffort(image) => println!("over budget: {}", image.size()),
//!     CompressionOutcome::Failed(err) => eprintln!("{} ({})", err, err.reason()),
//! }
//! ```

pub mod budget;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod params;
pub mod report;
pub mod search;
pub mod source;
#[cfg(not(target_arch = "wasm32"))]
pub mod worker;

pub use budget::BudgetPreset;
pub use config::{CompressionConfig, ReencodeSource};
pub use encode::{Encoder, RasterEncoder};
pub use error::{CompressError, ConfigError, FailureReason};
pub use params::{DecayPolicy, EncodingParameters, ParameterController};
pub use report::{format_size, output_file_name, reduction_percent, CompressionSummary};
pub use search::{
    AttemptRecord, CancellationToken, CompressedImage, CompressionOutcome, Compressor, RunState,
};
pub use source::SourceImage;
#[cfg(not(target_arch = "wasm32"))]
pub use worker::{Completion, CompressionWorker, RunHandle, RunId};

/// Compress with the raster encoder and default configuration.
pub fn compress(image: &SourceImage, budget: &str) -> CompressionOutcome {
    Compressor::new(RasterEncoder::new()).compress(image, budget)
}
