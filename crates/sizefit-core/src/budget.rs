//! The budget preset catalog.
//!
//! Each preset has a nominal, user-facing size and a slightly smaller
//! internal margin. Runs are judged against the margin so ordinary encoder
//! overshoot still lands under the nominal label.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CompressError;

const KIB: usize = 1024;

/// A size budget chosen from the fixed catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BudgetPreset {
    #[serde(rename = "100kb")]
    Kb100,
    #[serde(rename = "50kb")]
    Kb50,
    #[serde(rename = "20kb")]
    Kb20,
}

impl BudgetPreset {
    /// Every preset, largest first.
    pub const fn all() -> [BudgetPreset; 3] {
        [BudgetPreset::Kb100, BudgetPreset::Kb50, BudgetPreset::Kb20]
    }

    /// Canonical label, e.g. `"100kb"`.
    pub const fn label(self) -> &'static str {
        match self {
            BudgetPreset::Kb100 => "100kb",
            BudgetPreset::Kb50 => "50kb",
            BudgetPreset::Kb20 => "20kb",
        }
    }

    /// Size the label promises, in bytes.
    pub const fn nominal_bytes(self) -> usize {
        match self {
            BudgetPreset::Kb100 => 100 * KIB,
            BudgetPreset::Kb50 => 50 * KIB,
            BudgetPreset::Kb20 => 20 * KIB,
        }
    }

    /// The real pass/fail threshold used by the search loop.
    pub const fn margin_bytes(self) -> usize {
        match self {
            BudgetPreset::Kb100 => 98 * KIB,
            BudgetPreset::Kb50 => 48 * KIB,
            BudgetPreset::Kb20 => 19 * KIB,
        }
    }

    /// Whether `size` fits under the internal margin.
    pub const fn is_met_by(self, size: usize) -> bool {
        size <= self.margin_bytes()
    }

    /// Whether `size` fits under the nominal label, margin or not.
    pub const fn honors_label(self, size: usize) -> bool {
        size <= self.nominal_bytes()
    }
}

impl fmt::Display for BudgetPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BudgetPreset {
    type Err = CompressError;

    /// Parse an exact label such as `"50kb"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BudgetPreset::all()
            .into_iter()
            .find(|preset| preset.label() == s)
            .ok_or_else(|| CompressError::InvalidBudget(s.to_string()))
    }
}
