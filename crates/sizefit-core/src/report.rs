//! Presentation helpers for finished runs.

use serde::Serialize;

use crate::budget::BudgetPreset;
use crate::search::CompressedImage;

/// Human readable size with up to two decimals, e.g. `"97.66 KB"`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["B", "KB", "MB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

/// Percentage saved relative to the original, rounded to an integer.
///
/// Negative when the output grew. Zero for an empty original.
pub fn reduction_percent(original: u64, compressed: u64) -> i64 {
    if original == 0 {
        return 0;
    }
    ((1.0 - compressed as f64 / original as f64) * 100.0).round() as i64
}

/// Download name for a compressed file: `compressed-<label>-<stem>.jpg`.
pub fn output_file_name(original_name: &str, budget: BudgetPreset) -> String {
    let stem = match original_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => original_name,
    };
    format!("compressed-{}-{}.jpg", budget.label(), stem)
}

/// Numbers a UI shows next to the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompressionSummary {
    pub budget: BudgetPreset,
    pub original_bytes: u64,
    pub final_bytes: u64,
    pub reduction_percent: i64,
    pub attempts_used: u32,
    /// False when even the nominal label was exceeded.
    pub within_label: bool,
}

impl CompressionSummary {
    pub fn new(original_bytes: u64, image: &CompressedImage) -> Self {
        let final_bytes = image.size() as u64;
        Self {
            budget: image.budget,
            original_bytes,
            final_bytes,
            reduction_percent: reduction_percent(original_bytes, final_bytes),
            attempts_used: image.attempts_used(),
            within_label: image.budget.honors_label(image.size()),
        }
    }
}
