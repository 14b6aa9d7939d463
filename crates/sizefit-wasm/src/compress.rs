//! Compression WASM bindings.
//!
//! These functions run a whole compression synchronously. Call them from a
//! Web Worker so the page's main thread stays responsive; post the result
//! back with `postMessage` (one message per run).
//!
//! # Functions
//!
//! - [`compress_image`] - Compress with the default configuration
//! - [`compress_image_with_config`] - Compress with overrides from a JS object
//! - [`budget_presets`] - List the budget catalog
//! - [`format_size`] - Human readable byte counts
//! - [`output_file_name`] - Download name for a compressed file
//!
//! # Example
//!
//! ```typescript
//! // worker.ts
//! import init, { compress_image } from '@sizefit/wasm';
//!
//! self.onmessage = async ({ data: { runId, bytes, mime, budget } }) => {
//!   await init();
//!   const result = compress_image(bytes, mime, budget);
//!   self.postMessage({ runId, status: result.status, bytes: result.bytes() });
//! };
//! ```

use sizefit_core::decode::probe_dimensions;
use sizefit_core::{
    report, BudgetPreset, CancellationToken, CompressError, CompressionConfig, CompressionOutcome,
    Compressor, RasterEncoder, SourceImage,
};
use wasm_bindgen::prelude::*;

use crate::types::{JsBudgetPreset, JsCompressionResult};

/// Compress an image to fit a budget preset (`"100kb"`, `"50kb"`, `"20kb"`).
///
/// Never throws: failures come back with `status === "failed"` and a
/// `reason` code.
///
/// # Arguments
///
/// * `bytes` - The original file bytes as a `Uint8Array`
/// * `mime` - The file's declared MIME type (`File.type`)
/// * `budget` - Budget label
#[wasm_bindgen]
pub fn compress_image(bytes: &[u8], mime: &str, budget: &str) -> JsCompressionResult {
    run(bytes, mime, budget, CompressionConfig::default())
}

/// Compress with configuration overrides.
///
/// `config` may be `undefined`/`null` or an object with any of
/// `initial: { quality, max_dimension }`,
/// `decay: { quality_factor, dimension_factor, quality_floor }`,
/// `max_attempts` and `source` (`"previous"` or `"original"`).
///
/// # Errors
///
/// Throws if `config` cannot be parsed or holds out-of-range values.
#[wasm_bindgen]
pub fn compress_image_with_config(
    bytes: &[u8],
    mime: &str,
    budget: &str,
    config: JsValue,
) -> Result<JsCompressionResult, JsValue> {
    let config = if config.is_undefined() || config.is_null() {
        CompressionConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
    };

    config
        .validate()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    Ok(run(bytes, mime, budget, config))
}

/// The budget catalog as `[{ label, nominal_bytes, margin_bytes }]`.
#[wasm_bindgen]
pub fn budget_presets() -> Result<JsValue, JsValue> {
    let presets: Vec<JsBudgetPreset> = BudgetPreset::all().into_iter().map(Into::into).collect();
    serde_wasm_bindgen::to_value(&presets).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Format a byte count for display, e.g. `97.66 KB`.
#[wasm_bindgen]
pub fn format_size(bytes: f64) -> String {
    report::format_size(bytes.max(0.0) as u64)
}

/// Download name for a compressed file, e.g. `compressed-50kb-holiday.jpg`.
///
/// # Errors
///
/// Throws if `budget` is not a known preset.
#[wasm_bindgen]
pub fn output_file_name(original_name: &str, budget: &str) -> Result<String, JsValue> {
    let preset = budget
        .parse::<BudgetPreset>()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(report::output_file_name(original_name, preset))
}

fn run(bytes: &[u8], mime: &str, budget: &str, config: CompressionConfig) -> JsCompressionResult {
    let outcome = match budget.parse::<BudgetPreset>() {
        Ok(preset) => encode(bytes, mime, preset, config),
        Err(err) => CompressionOutcome::Failed(err),
    };

    log_outcome(&outcome);
    JsCompressionResult::from_outcome(outcome, bytes.len())
}

fn encode(
    bytes: &[u8],
    mime: &str,
    budget: BudgetPreset,
    config: CompressionConfig,
) -> CompressionOutcome {
    let compressor = match Compressor::with_config(RasterEncoder::new(), config) {
        Ok(compressor) => compressor,
        Err(e) => return CompressionOutcome::Failed(CompressError::EncoderError(e.to_string())),
    };

    // Unreadable headers are left for the encoder to reject with a reason code.
    let (width, height) = probe_dimensions(bytes).unwrap_or((0, 0));
    let source = SourceImage::new(bytes.to_vec(), mime, width, height);
    compressor.run(&source, budget, &CancellationToken::new())
}

#[cfg(target_arch = "wasm32")]
fn log_outcome(outcome: &CompressionOutcome) {
    match outcome {
        CompressionOutcome::Failed(err) => {
            web_sys::console::error_1(&JsValue::from_str(&format!("Compression error: {}", err)));
        }
        CompressionOutcome::BestEffort(image) => {
            web_sys::console::warn_1(&JsValue::from_str(&format!(
                "Could not reach {} after {} attempts, returning {} bytes",
                image.budget,
                image.attempts_used(),
                image.size()
            )));
        }
        CompressionOutcome::Success(_) => {}
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn log_outcome(_outcome: &CompressionOutcome) {}

/// Tests that work on all targets.
///
/// `compress_image` returns a plain struct, so it can be exercised natively.
/// Functions taking or returning `JsValue` are covered in `wasm_tests`.
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn solid_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([90, 160, 40]));
        let mut buffer = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, image::ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_compress_image_success() {
        let png = solid_png(48, 32);
        let result = compress_image(&png, "image/png", "20kb");

        assert_eq!(result.status(), "succeeded");
        assert_eq!(result.attempts_used(), 1);
        assert_eq!((result.width(), result.height()), (48, 32));
        assert_eq!(&result.bytes()[0..2], &[0xFF, 0xD8]);
        assert_eq!(result.original_size(), png.len());
    }

    #[test]
    fn test_compress_image_invalid_budget() {
        let png = solid_png(8, 8);
        let result = compress_image(&png, "image/png", "30kb");
        assert_eq!(result.status(), "failed");
        assert_eq!(result.reason().as_deref(), Some("InvalidBudget"));
        assert_eq!(result.original_size(), png.len());
    }

    #[test]
    fn test_invalid_budget_wins_over_bad_payload() {
        // The label is checked before the bytes are looked at.
        let result = compress_image(b"just some text", "text/plain", "20KB");
        assert_eq!(result.reason().as_deref(), Some("InvalidBudget"));
        assert_eq!(result.message().as_deref(), Some("Invalid target size: 20KB"));
    }

    #[test]
    fn test_compress_image_not_an_image() {
        let result = compress_image(b"just some text", "text/plain", "50kb");
        assert_eq!(result.status(), "failed");
        assert_eq!(result.reason().as_deref(), Some("UnsupportedFormat"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(100_000.0), "97.66 KB");
        assert_eq!(format_size(-5.0), "0 B");
    }
}
