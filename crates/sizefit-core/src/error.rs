//! Run-level errors and the reason codes surfaced to callers.

use std::fmt;

use thiserror::Error;

use crate::encode::EncodeError;

/// Why a run ended in `Failed`.
#[derive(Debug, Error)]
pub enum CompressError {
    /// The budget label is not in the preset catalog.
    #[error("Invalid target size: {0}")]
    InvalidBudget(String),

    /// The input is not an encodable raster image.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The encoder failed on otherwise acceptable input.
    #[error("Encoder error: {0}")]
    EncoderError(String),

    /// The run was cancelled before its next attempt started.
    #[error("Compression cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32 },

    /// The worker that owned the run went away before reporting.
    #[error("Compression worker is unavailable")]
    WorkerUnavailable,
}

impl CompressError {
    /// Stable reason code for user-facing messages.
    pub fn reason(&self) -> FailureReason {
        match self {
            CompressError::InvalidBudget(_) => FailureReason::InvalidBudget,
            CompressError::UnsupportedFormat(_) => FailureReason::UnsupportedFormat,
            CompressError::EncoderError(_) | CompressError::WorkerUnavailable => {
                FailureReason::EncoderError
            }
            CompressError::Cancelled { .. } => FailureReason::Cancelled,
        }
    }
}

impl From<EncodeError> for CompressError {
    fn from(err: EncodeError) -> Self {
        if err.is_unsupported_format() {
            CompressError::UnsupportedFormat(err.to_string())
        } else {
            CompressError::EncoderError(err.to_string())
        }
    }
}

/// Reason codes a UI can switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    InvalidBudget,
    UnsupportedFormat,
    EncoderError,
    Cancelled,
}

impl FailureReason {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureReason::InvalidBudget => "InvalidBudget",
            FailureReason::UnsupportedFormat => "UnsupportedFormat",
            FailureReason::EncoderError => "EncoderError",
            FailureReason::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invalid values in a `CompressionConfig`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Initial quality must be in (0, 1], got {0}")]
    Quality(f32),

    #[error("Initial maximum dimension must be non-zero")]
    ZeroDimension,

    #[error("Decay factor `{name}` must be in (0, 1], got {value}")]
    DecayFactor { name: &'static str, value: f32 },

    #[error("Quality floor must be in (0, {initial}], got {floor}")]
    QualityFloor { floor: f32, initial: f32 },

    #[error("At least one attempt is required")]
    ZeroAttempts,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodeError;

    #[test]
    fn test_reason_codes() {
        assert_eq!(
            CompressError::InvalidBudget("30kb".into()).reason(),
            FailureReason::InvalidBudget
        );
        assert_eq!(
            CompressError::WorkerUnavailable.reason(),
            FailureReason::EncoderError
        );
        assert_eq!(
            CompressError::Cancelled { attempts: 2 }.reason(),
            FailureReason::Cancelled
        );
    }

    #[test]
    fn test_encode_error_mapping() {
        let unsupported = CompressError::from(EncodeError::Decode(DecodeError::InvalidFormat));
        assert_eq!(unsupported.reason(), FailureReason::UnsupportedFormat);

        let mime = CompressError::from(EncodeError::UnsupportedFormat("text/plain".into()));
        assert_eq!(mime.reason(), FailureReason::UnsupportedFormat);

        let corrupt = CompressError::from(EncodeError::Decode(DecodeError::CorruptedFile(
            "unexpected EOF".into(),
        )));
        assert_eq!(corrupt.reason(), FailureReason::EncoderError);
        assert!(corrupt.to_string().contains("unexpected EOF"));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            CompressError::InvalidBudget("30kb".into()).to_string(),
            "Invalid target size: 30kb"
        );
        assert_eq!(FailureReason::UnsupportedFormat.to_string(), "UnsupportedFormat");
    }
}
