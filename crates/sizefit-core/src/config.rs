//! Per-run configuration.
//!
//! Nothing here is global: a `CompressionConfig` is built (usually via
//! `Default`) and handed to a `Compressor`, which copies it into every run.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::params::{DecayPolicy, EncodingParameters};

/// What each retry re-encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReencodeSource {
    /// Re-encode the previous attempt's output. Size reductions compound,
    /// and so does generation loss.
    #[default]
    Previous,
    /// Re-encode the caller's original bytes every time.
    Original,
}

/// Knobs for the search loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Parameters for the first attempt.
    pub initial: EncodingParameters,
    /// Decay applied after each over-budget attempt.
    pub decay: DecayPolicy,
    /// Hard cap on encode calls per run (baseline plus retries).
    pub max_attempts: u32,
    /// Input used by retries.
    pub source: ReencodeSource,
}

impl CompressionConfig {
    /// One baseline attempt plus three decayed retries.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

    /// Check every value is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let quality = self.initial.quality;
        if !(quality > 0.0 && quality <= 1.0) {
            return Err(ConfigError::Quality(quality));
        }

        if self.initial.max_dimension == 0 {
            return Err(ConfigError::ZeroDimension);
        }

        for (name, value) in [
            ("quality_factor", self.decay.quality_factor),
            ("dimension_factor", self.decay.dimension_factor),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::DecayFactor { name, value });
            }
        }

        let floor = self.decay.quality_floor;
        if !(floor > 0.0 && floor <= quality) {
            return Err(ConfigError::QualityFloor {
                floor,
                initial: quality,
            });
        }

        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }

        Ok(())
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            initial: EncodingParameters::default(),
            decay: DecayPolicy::default(),
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            source: ReencodeSource::default(),
        }
    }
}
