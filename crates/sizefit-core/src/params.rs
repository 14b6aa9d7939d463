//! Encoding parameters and the decay policy applied between attempts.

use serde::{Deserialize, Serialize};

/// Parameters for a single encode attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingParameters {
    /// Normalized quality in (0, 1].
    pub quality: f32,
    /// Longest allowed output edge in pixels.
    pub max_dimension: u32,
}

impl EncodingParameters {
    /// Default starting quality.
    pub const DEFAULT_QUALITY: f32 = 0.8;
    /// Default starting edge limit. Large enough that typical screenshots and
    /// phone exports are left alone on the first attempt.
    pub const DEFAULT_MAX_DIMENSION: u32 = 1920;
}

impl Default for EncodingParameters {
    fn default() -> Self {
        Self {
            quality: Self::DEFAULT_QUALITY,
            max_dimension: Self::DEFAULT_MAX_DIMENSION,
        }
    }
}

/// Multiplicative decay applied after each over-budget attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayPolicy {
    /// Factor applied to quality.
    pub quality_factor: f32,
    /// Factor applied to the maximum dimension (result is floored).
    pub dimension_factor: f32,
    /// Quality never decays below this value.
    pub quality_floor: f32,
}

impl Default for DecayPolicy {
    fn default() -> Self {
        Self {
            quality_factor: 0.7,
            dimension_factor: 0.8,
            quality_floor: 0.05,
        }
    }
}

impl DecayPolicy {
    /// Parameters for the next attempt.
    ///
    /// Both values are non-increasing. Quality stops at the floor (or stays
    /// where it is if it started below it); the edge keeps shrinking but
    /// never reaches zero.
    pub fn next(&self, current: EncodingParameters) -> EncodingParameters {
        let decayed_quality = (current.quality * self.quality_factor).max(self.quality_floor);
        let decayed_dimension = (current.max_dimension as f64 * self.dimension_factor as f64)
            .floor() as u32;

        EncodingParameters {
            quality: decayed_quality.min(current.quality),
            max_dimension: decayed_dimension.clamp(1, current.max_dimension.max(1)),
        }
    }
}

/// Owns the mutable parameter pair for one run.
///
/// Each run gets its own controller, so concurrent runs never share state.
#[derive(Debug, Clone)]
pub struct ParameterController {
    current: EncodingParameters,
    policy: DecayPolicy,
    decays: u32,
}

impl ParameterController {
    pub fn new(initial: EncodingParameters, policy: DecayPolicy) -> Self {
        Self {
            current: initial,
            policy,
            decays: 0,
        }
    }

    /// Parameters for the attempt about to run.
    pub fn current(&self) -> EncodingParameters {
        self.current
    }

    /// How many times decay has been applied in this run.
    pub fn decays(&self) -> u32 {
        self.decays
    }

    /// Apply one step of decay after a failed attempt.
    pub fn decay(&mut self) -> EncodingParameters {
        self.current = self.policy.next(self.current);
        self.decays += 1;
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = EncodingParameters::default();
        assert_eq!(params.quality, 0.8);
        assert_eq!(params.max_dimension, 1920);
    }

    #[test]
    fn test_decay_sequence_from_defaults() {
        let mut controller = ParameterController::new(Default::default(), Default::default());

        let second = controller.decay();
        assert!((second.quality - 0.56).abs() < 1e-6);
        assert_eq!(second.max_dimension, 1536);

        let third = controller.decay();
        assert!((third.quality - 0.392).abs() < 1e-6);
        assert_eq!(third.max_dimension, 1228);

        let fourth = controller.decay();
        assert!((fourth.quality - 0.2744).abs() < 1e-6);
        assert_eq!(fourth.max_dimension, 982);

        assert_eq!(controller.decays(), 3);
    }

    #[test]
    fn test_quality_stops_at_floor_while_dimension_shrinks() {
        let start = EncodingParameters {
            quality: 0.06,
            max_dimension: 500,
        };
        let mut controller = ParameterController::new(start, DecayPolicy::default());

        let next = controller.decay();
        assert_eq!(next.quality, 0.05);
        assert_eq!(next.max_dimension, 400);

        let next = controller.decay();
        assert_eq!(next.quality, 0.05);
        assert_eq!(next.max_dimension, 320);
    }

    #[test]
    fn test_quality_below_floor_is_not_raised() {
        let start = EncodingParameters {
            quality: 0.01,
            max_dimension: 10,
        };
        let next = DecayPolicy::default().next(start);
        assert_eq!(next.quality, 0.01);
    }

    #[test]
    fn test_dimension_never_reaches_zero() {
        let start = EncodingParameters {
            quality: 0.5,
            max_dimension: 1,
        };
        let next = DecayPolicy::default().next(start);
        assert_eq!(next.max_dimension, 1);
    }

    #[test]
    fn test_current_is_stable_without_decay() {
        let controller = ParameterController::new(Default::default(), Default::default());
        assert_eq!(controller.current(), EncodingParameters::default());
        assert_eq!(controller.current(), controller.current());
        assert_eq!(controller.decays(), 0);
    }
}
