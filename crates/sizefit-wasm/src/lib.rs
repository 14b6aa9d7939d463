//! Sizefit WASM - WebAssembly bindings for sizefit
//!
//! This crate exposes sizefit-core's budgeted compression to JavaScript.
//! Load it inside a Web Worker: a single run can take seconds on large
//! photos and must not block the page.
//!
//! # Module Structure
//!
//! - `compress` - Compression entry points and display helpers
//! - `types` - WASM-compatible result types
//!
//! # Usage
//!
//! ```typescript
//! import init, { compress_image } from '@sizefit/wasm';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = compress_image(bytes, file.type, '100kb');
//! if (result.status === 'failed') {
//!   console.log(`Failed: ${result.reason}`);
//! } else {
//!   const blob = new Blob([result.bytes()], { type: result.mime });
//! }
//! ```

use wasm_bindgen::prelude::*;

mod compress;
mod types;

pub use compress::{
    budget_presets, compress_image, compress_image_with_config, format_size, output_file_name,
};
pub use types::{JsBudgetPreset, JsCompressionResult};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
