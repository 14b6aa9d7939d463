//! The size-constrained search loop.
//!
//! A run moves through `Idle -> Attempting(1..=max) -> {Succeeded | Exhausted | Failed}`.
//! Each attempt calls the encoder once with the controller's current
//! parameters; an over-budget result decays the parameters and tries again
//! until the attempt cap is hit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, debug_span, info, trace, warn};

use crate::budget::BudgetPreset;
use crate::config::{CompressionConfig, ReencodeSource};
use crate::encode::{EncodedImage, Encoder};
use crate::error::{CompressError, ConfigError};
use crate::params::{EncodingParameters, ParameterController};
use crate::source::SourceImage;

/// Lifecycle of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    /// Attempt number, starting at 1.
    Attempting(u32),
    Succeeded,
    Exhausted,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunState::Succeeded | RunState::Exhausted | RunState::Failed
        )
    }

    fn can_advance_to(self, next: RunState) -> bool {
        match (self, next) {
            (RunState::Idle, RunState::Attempting(1)) => true,
            // Cancelled before the first attempt.
            (RunState::Idle, RunState::Failed) => true,
            (RunState::Attempting(i), RunState::Attempting(j)) => j == i + 1,
            (RunState::Attempting(_), next) => next.is_terminal(),
            _ => false,
        }
    }
}

/// Shared flag that stops a run before its next attempt.
///
/// An attempt already in progress always runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// What one attempt did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptRecord {
    /// Attempt number, starting at 1.
    pub index: u32,
    pub params: EncodingParameters,
    /// Encoded size in bytes.
    pub size: usize,
    pub width: u32,
    pub height: u32,
}

/// Final artifact of a successful or best-effort run.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub width: u32,
    pub height: u32,
    /// Which attempt produced `bytes`.
    pub attempt: u32,
    pub budget: BudgetPreset,
    /// Every attempt of the run, in order.
    pub attempts: Vec<AttemptRecord>,
}

impl CompressedImage {
    fn new(
        (attempt, encoded): (u32, EncodedImage),
        budget: BudgetPreset,
        attempts: Vec<AttemptRecord>,
    ) -> Self {
        Self {
            bytes: encoded.bytes,
            mime: encoded.mime,
            width: encoded.width,
            height: encoded.height,
            attempt,
            budget,
            attempts,
        }
    }

    /// Final size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Number of encode calls the run made.
    pub fn attempts_used(&self) -> u32 {
        self.attempts.len() as u32
    }

    /// Parameters of the attempt that produced the artifact.
    pub fn params(&self) -> Option<EncodingParameters> {
        self.attempts
            .iter()
            .find(|record| record.index == self.attempt)
            .map(|record| record.params)
    }
}

/// Terminal value of a run. Exactly one per run.
#[derive(Debug)]
pub enum CompressionOutcome {
    /// Final size is within the budget's internal margin.
    Success(CompressedImage),
    /// Attempts ran out; carries the smallest artifact produced anyway.
    BestEffort(CompressedImage),
    Failed(CompressError),
}

impl CompressionOutcome {
    /// The terminal state this outcome corresponds to.
    pub fn state(&self) -> RunState {
        match self {
            CompressionOutcome::Success(_) => RunState::Succeeded,
            CompressionOutcome::BestEffort(_) => RunState::Exhausted,
            CompressionOutcome::Failed(_) => RunState::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CompressionOutcome::Success(_))
    }

    /// The artifact, for both success and best effort.
    pub fn image(&self) -> Option<&CompressedImage> {
        match self {
            CompressionOutcome::Success(image) | CompressionOutcome::BestEffort(image) => {
                Some(image)
            }
            CompressionOutcome::Failed(_) => None,
        }
    }

    pub fn into_image(self) -> Option<CompressedImage> {
        match self {
            CompressionOutcome::Success(image) | CompressionOutcome::BestEffort(image) => {
                Some(image)
            }
            CompressionOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&CompressError> {
        match self {
            CompressionOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Drives an encoder until the output fits a budget.
#[derive(Debug, Clone)]
pub struct Compressor<E> {
    encoder: E,
    config: CompressionConfig,
}

impl<E: Encoder> Compressor<E> {
    /// Compressor with the default configuration.
    pub fn new(encoder: E) -> Self {
        Self {
            encoder,
            config: CompressionConfig::default(),
        }
    }

    pub fn with_config(encoder: E, config: CompressionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { encoder, config })
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Compress `image` to fit the preset named by `budget`.
    ///
    /// An unknown label fails before the encoder is touched.
    pub fn compress(&self, image: &SourceImage, budget: &str) -> CompressionOutcome {
        match budget.parse::<BudgetPreset>() {
            Ok(preset) => self.run(image, preset, &CancellationToken::new()),
            Err(err) => {
                warn!(error = %err, "rejected budget");
                CompressionOutcome::Failed(err)
            }
        }
    }

    /// Run the search loop, checking `cancel` before every attempt.
    pub fn run(
        &self,
        image: &SourceImage,
        budget: BudgetPreset,
        cancel: &CancellationToken,
    ) -> CompressionOutcome {
        self.drive(image, budget, cancel, &mut |_| {})
    }

    fn drive(
        &self,
        image: &SourceImage,
        budget: BudgetPreset,
        cancel: &CancellationToken,
        observer: &mut dyn FnMut(RunState),
    ) -> CompressionOutcome {
        let _span = debug_span!(
            "compress",
            budget = %budget,
            input_bytes = image.byte_len(),
            width = image.width(),
            height = image.height(),
        )
        .entered();

        let mut state = RunState::Idle;
        let mut controller = ParameterController::new(self.config.initial, self.config.decay);
        let mut history = Vec::with_capacity(self.config.max_attempts as usize);

        // `last` feeds the next attempt; `smaller` holds an earlier artifact
        // only while it is strictly smaller than `last`.
        let mut last: Option<(u32, EncodedImage)> = None;
        let mut smaller: Option<(u32, EncodedImage)> = None;

        for index in 1..=self.config.max_attempts {
            if cancel.is_cancelled() {
                advance(&mut state, RunState::Failed, observer);
                let err = CompressError::Cancelled {
                    attempts: index - 1,
                };
                info!(attempts = index - 1, "run cancelled");
                return CompressionOutcome::Failed(err);
            }

            advance(&mut state, RunState::Attempting(index), observer);
            let params = controller.current();

            let (input, mime) = match (self.config.source, last.as_ref()) {
                (ReencodeSource::Previous, Some((_, previous))) => {
                    (previous.bytes.as_slice(), previous.mime.as_str())
                }
                _ => (image.bytes(), image.mime()),
            };

            let encoded = match self.encoder.encode(input, mime, &params) {
                Ok(encoded) => encoded,
                Err(err) => {
                    let err = CompressError::from(err);
                    warn!(attempt = index, reason = %err.reason(), error = %err, "attempt failed");
                    advance(&mut state, RunState::Failed, observer);
                    return CompressionOutcome::Failed(err);
                }
            };

            let size = encoded.size();
            history.push(AttemptRecord {
                index,
                params,
                size,
                width: encoded.width,
                height: encoded.height,
            });
            debug!(
                attempt = index,
                quality = params.quality,
                max_dimension = params.max_dimension,
                size,
                margin = budget.margin_bytes(),
                "attempt finished"
            );

            if budget.is_met_by(size) {
                advance(&mut state, RunState::Succeeded, observer);
                info!(attempts = index, size, "fits budget");
                return CompressionOutcome::Success(CompressedImage::new(
                    (index, encoded),
                    budget,
                    history,
                ));
            }

            let best_so_far = match (smaller.take(), last.take()) {
                (Some(earlier), _) => Some(earlier),
                (None, previous) => previous,
            };
            smaller = best_so_far.filter(|(_, best)| best.size() < size);
            last = Some((index, encoded));

            if index < self.config.max_attempts {
                controller.decay();
            }
        }

        advance(&mut state, RunState::Exhausted, observer);

        match smaller.or(last) {
            Some(best) => {
                warn!(
                    attempts = history.len(),
                    size = best.1.size(),
                    margin = budget.margin_bytes(),
                    "attempts exhausted, returning best effort"
                );
                CompressionOutcome::BestEffort(CompressedImage::new(best, budget, history))
            }
            // Unreachable with a validated config (max_attempts >= 1).
            None => CompressionOutcome::Failed(CompressError::EncoderError(
                "no attempt was made".to_string(),
            )),
        }
    }
}

fn advance(state: &mut RunState, next: RunState, observer: &mut dyn FnMut(RunState)) {
    debug_assert!(
        state.can_advance_to(next),
        "illegal run transition {:?} -> {:?}",
        state,
        next
    );
    trace!(from = ?state, to = ?next, "run state");
    *state = next;
    observer(next);
}



#[cfg(test)]
mod proptests {
    use super::testing::*;
    use super::*;
    use proptest::prelude::*;

    fn preset_strategy() -> impl Strategy<Value = BudgetPreset> {
        prop::sample::select(BudgetPreset::all().to_vec())
    }

    proptest! {
        /// Any size sequence terminates within the cap, with monotone
        /// parameters and exactly one outcome.
        #[test]
        fn prop_search_invariants(
            sizes in prop::collection::vec(1usize..400_000, 1..8),
            preset in preset_strategy(),
        ) {
            let compressor = Compressor::new(ScriptedEncoder::sizes(&sizes));
            let outcome = compressor.compress(&photo(1024), preset.label());

            let calls = compressor.encoder().calls();
            prop_assert!(!calls.is_empty());
            prop_assert!(calls.len() <= CompressionConfig::DEFAULT_MAX_ATTEMPTS as usize);

            for pair in calls.windows(2) {
                prop_assert!(pair[1].params.quality <= pair[0].params.quality);
                prop_assert!(pair[1].params.max_dimension <= pair[0].params.max_dimension);
                prop_assert!(pair[1].params.quality >= 0.05);
            }

            match &outcome {
                CompressionOutcome::Success(image) => {
                    prop_assert!(image.size() <= preset.margin_bytes());
                    prop_assert_eq!(image.attempts_used() as usize, calls.len());
                }
                CompressionOutcome::BestEffort(image) => {
                    prop_assert_eq!(calls.len(), CompressionConfig::DEFAULT_MAX_ATTEMPTS as usize);
                    prop_assert!(image.attempts.iter().all(|a| a.size > preset.margin_bytes()));
                    let smallest = image.attempts.iter().map(|a| a.size).min().unwrap();
                    prop_assert_eq!(image.size(), smallest);
                }
                CompressionOutcome::Failed(err) => {
                    prop_assert!(false, "unexpected failure: {}", err);
                }
            }
            prop_assert!(outcome.state().is_terminal());
        }
    }
}
