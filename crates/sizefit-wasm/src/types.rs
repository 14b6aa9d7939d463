//! WASM-compatible wrapper types for compression results.
//!
//! Every run, successful or not, comes back as a `JsCompressionResult` so the
//! UI can branch on `status` without catching exceptions.

use serde::Serialize;
use sizefit_core::{BudgetPreset, CompressionOutcome, CompressionSummary};
use wasm_bindgen::prelude::*;

/// Outcome of one compression run.
///
/// # Memory Management
///
/// The encoded bytes live in WASM memory. `bytes()` copies them into a
/// JavaScript `Uint8Array`; call it once and keep the copy.
#[wasm_bindgen]
pub struct JsCompressionResult {
    status: &'static str,
    reason: Option<String>,
    message: Option<String>,
    bytes: Vec<u8>,
    mime: Option<String>,
    width: u32,
    height: u32,
    attempts_used: u32,
    quality: f32,
    max_dimension: u32,
    budget: Option<BudgetPreset>,
    original_size: usize,
    within_label: bool,
    reduction_percent: i32,
    summary: Option<CompressionSummary>,
}

#[wasm_bindgen]
impl JsCompressionResult {
    /// `"succeeded"`, `"exhausted"` or `"failed"`.
    #[wasm_bindgen(getter)]
    pub fn status(&self) -> String {
        self.status.to_string()
    }

    /// Reason code for failed runs (`"InvalidBudget"`, `"UnsupportedFormat"`,
    /// `"EncoderError"`, `"Cancelled"`).
    #[wasm_bindgen(getter)]
    pub fn reason(&self) -> Option<String> {
        self.reason.clone()
    }

    /// Human readable failure detail.
    #[wasm_bindgen(getter)]
    pub fn message(&self) -> Option<String> {
        self.message.clone()
    }

    /// Encoded output as a `Uint8Array` (empty when failed).
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// MIME type of `bytes`, for building a `Blob`.
    #[wasm_bindgen(getter)]
    pub fn mime(&self) -> Option<String> {
        self.mime.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[wasm_bindgen(getter)]
    pub fn attempts_used(&self) -> u32 {
        self.attempts_used
    }

    /// Quality of the attempt that produced `bytes`.
    #[wasm_bindgen(getter)]
    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// Edge limit of the attempt that produced `bytes`.
    #[wasm_bindgen(getter)]
    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    /// Budget label the run targeted, if it was valid.
    #[wasm_bindgen(getter)]
    pub fn budget(&self) -> Option<String> {
        self.budget.map(|b| b.label().to_string())
    }

    #[wasm_bindgen(getter)]
    pub fn original_size(&self) -> usize {
        self.original_size
    }

    /// False when the output is bigger than the budget's nominal label; show
    /// a warning next to the result.
    #[wasm_bindgen(getter)]
    pub fn within_label(&self) -> bool {
        self.within_label
    }

    #[wasm_bindgen(getter)]
    pub fn reduction_percent(&self) -> i32 {
        self.reduction_percent
    }

    /// The result numbers as a plain object, or `undefined` for failed runs.
    pub fn summary(&self) -> Result<JsValue, JsValue> {
        match &self.summary {
            Some(summary) => serde_wasm_bindgen::to_value(summary)
                .map_err(|e| JsValue::from_str(&e.to_string())),
            None => Ok(JsValue::UNDEFINED),
        }
    }
}

impl JsCompressionResult {
    pub(crate) fn from_outcome(outcome: CompressionOutcome, original_size: usize) -> Self {
        let status = match &outcome {
            CompressionOutcome::Success(_) => "succeeded",
            CompressionOutcome::BestEffort(_) => "exhausted",
            CompressionOutcome::Failed(_) => "failed",
        };

        match outcome {
            CompressionOutcome::Success(image) | CompressionOutcome::BestEffort(image) => {
                let summary = CompressionSummary::new(original_size as u64, &image);
                let params = image.params().unwrap_or_default();
                Self {
                    status,
                    reason: None,
                    message: None,
                    width: image.width,
                    height: image.height,
                    attempts_used: summary.attempts_used,
                    quality: params.quality,
                    max_dimension: params.max_dimension,
                    budget: Some(image.budget),
                    mime: Some(image.mime),
                    bytes: image.bytes,
                    original_size,
                    within_label: summary.within_label,
                    reduction_percent: summary.reduction_percent as i32,
                    summary: Some(summary),
                }
            }
            CompressionOutcome::Failed(err) => Self {
                status,
                reason: Some(err.reason().to_string()),
                message: Some(err.to_string()),
                bytes: Vec::new(),
                mime: None,
                width: 0,
                height: 0,
                attempts_used: 0,
                quality: 0.0,
                max_dimension: 0,
                budget: None,
                original_size,
                within_label: false,
                reduction_percent: 0,
                summary: None,
            },
        }
    }
}

/// One entry of the budget catalog, serialized for JavaScript.
#[derive(Debug, Clone, Serialize)]
pub struct JsBudgetPreset {
    pub label: &'static str,
    pub nominal_bytes: usize,
    pub margin_bytes: usize,
}

impl From<BudgetPreset> for JsBudgetPreset {
    fn from(preset: BudgetPreset) -> Self {
        Self {
            label: preset.label(),
            nominal_bytes: preset.nominal_bytes(),
            margin_bytes: preset.margin_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sizefit_core::{AttemptRecord, CompressError, CompressedImage, EncodingParameters};

    fn compressed(size: usize, budget: BudgetPreset) -> CompressedImage {
        let params = EncodingParameters {
            quality: 0.56,
            max_dimension: 1536,
        };
        CompressedImage {
            bytes: vec![7; size],
            mime: "image/jpeg".to_string(),
            width: 1536,
            height: 1024,
            attempt: 2,
            budget,
            attempts: vec![
                AttemptRecord {
                    index: 1,
                    params: EncodingParameters::default(),
                    size: size * 2,
                    width: 1920,
                    height: 1280,
                },
                AttemptRecord {
                    index: 2,
                    params,
                    size,
                    width: 1536,
                    height: 1024,
                },
            ],
        }
    }

    #[test]
    fn test_success_result() {
        let outcome = CompressionOutcome::Success(compressed(90 * 1024, BudgetPreset::Kb100));
        let result = JsCompressionResult::from_outcome(outcome, 5 * 1024 * 1024);

        assert_eq!(result.status(), "succeeded");
        assert_eq!(result.reason(), None);
        assert_eq!(result.size(), 90 * 1024);
        assert_eq!(result.attempts_used(), 2);
        assert_eq!(result.max_dimension(), 1536);
        assert!((result.quality() - 0.56).abs() < 1e-6);
        assert_eq!(result.budget().as_deref(), Some("100kb"));
        assert_eq!(result.mime().as_deref(), Some("image/jpeg"));
        assert!(result.within_label());
        assert_eq!(result.reduction_percent(), 98);
    }

    #[test]
    fn test_best_effort_result() {
        let outcome = CompressionOutcome::BestEffort(compressed(25 * 1024, BudgetPreset::Kb20));
        let result = JsCompressionResult::from_outcome(outcome, 200 * 1024);

        assert_eq!(result.status(), "exhausted");
        assert_eq!(result.size(), 25 * 1024);
        assert!(!result.within_label());
        assert_eq!(result.bytes().len(), 25 * 1024);
    }

    #[test]
    fn test_failed_result() {
        let outcome = CompressionOutcome::Failed(CompressError::InvalidBudget("30kb".into()));
        let result = JsCompressionResult::from_outcome(outcome, 1234);

        assert_eq!(result.status(), "failed");
        assert_eq!(result.reason().as_deref(), Some("InvalidBudget"));
        assert_eq!(result.message().as_deref(), Some("Invalid target size: 30kb"));
        assert_eq!(result.size(), 0);
        assert_eq!(result.budget(), None);
        assert_eq!(result.original_size(), 1234);
    }

    #[test]
    fn test_budget_preset_conversion() {
        let preset = JsBudgetPreset::from(BudgetPreset::Kb50);
        assert_eq!(preset.label, "50kb");
        assert_eq!(preset.nominal_bytes, 50 * 1024);
        assert_eq!(preset.margin_bytes, 48 * 1024);
    }
}
