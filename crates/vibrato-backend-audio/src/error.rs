//! Error types for the audio backend.

use thiserror::Error;
use vibrato_spec::{BackendError, SpecError, ValidationError};

/// Result type for audio operations.
pub type AudioResult<T> = Result<T, AudioError>;

/// Errors that can occur while morphing envelopes or rendering stimuli.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The request failed precondition checks; nothing was rendered.
    #[error("invalid request: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },

    /// The mixed signal was identically zero and cannot be normalized.
    #[error("cannot normalize a silent signal of {num_samples} samples")]
    SilentSignal {
        /// Length of the silent signal.
        num_samples: usize,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal synthesis error.
    #[error("synthesis error: {message}")]
    Synthesis {
        /// Error message.
        message: String,
    },
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl AudioError {
    /// Creates an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a synthesis error.
    pub fn synthesis(message: impl Into<String>) -> Self {
        Self::Synthesis {
            message: message.into(),
        }
    }

    /// Returns the validation errors carried by this error, if any.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            AudioError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

impl From<ValidationError> for AudioError {
    fn from(error: ValidationError) -> Self {
        AudioError::Validation(vec![error])
    }
}

impl From<SpecError> for AudioError {
    fn from(error: SpecError) -> Self {
        match error {
            SpecError::ValidationFailed(errors) => AudioError::Validation(errors),
            SpecError::Invalid(error) => AudioError::Validation(vec![error]),
            SpecError::Io(error) => AudioError::Io(error),
            SpecError::JsonParse(error) => AudioError::synthesis(error.to_string()),
        }
    }
}

impl BackendError for AudioError {
    fn code(&self) -> &'static str {
        match self {
            AudioError::Validation(_) => "AUDIO_001",
            AudioError::InvalidParameter { .. } => "AUDIO_002",
            AudioError::SilentSignal { .. } => "AUDIO_003",
            AudioError::Io(_) => "AUDIO_004",
            AudioError::Synthesis { .. } => "AUDIO_005",
        }
    }

    fn category(&self) -> &'static str {
        "audio"
    }
}
