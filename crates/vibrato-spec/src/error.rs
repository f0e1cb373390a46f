//! Error types for envelope, request, and plan validation.

use thiserror::Error;

/// Error codes for precondition violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Envelope errors (E001-E003)
    /// E001: Envelope is not a non-empty rectangular frame x bin matrix
    MalformedEnvelope,
    /// E002: Envelope contains a negative or non-finite magnitude
    InvalidEnvelopeValue,
    /// E003: Pitch trace is empty or contains non-positive values
    InvalidPitchTrace,

    // Generator config errors (E010-E012)
    /// E010: Sample rate or pitch rate is zero
    InvalidSampleRate,
    /// E011: Random modulation rate limits are out of order or non-positive
    InvalidRateLimits,

    // Request errors (E020-E031)
    /// E020: Fundamental frequency is not positive
    InvalidFundamental,
    /// E021: FM depth is negative
    InvalidFmDepth,
    /// E022: Partial count is zero
    InvalidPartialCount,
    /// E023: Highest partial lies above the audio Nyquist frequency
    PartialsAboveNyquist,
    /// E024: Highest partial lies beyond the top analysis bin
    EnvelopeRangeExceeded,
    /// E025: Synthesis length is not positive
    InvalidLength,
    /// E026: Synthesis length is shorter than one resampled envelope frame
    LengthBelowFrame,
    /// E027: Modulation rate outside (0, pitch-rate Nyquist]
    InvalidModRate,
    /// E028: Modulation hold/fade negative or longer than the stimulus
    InvalidModTiming,
    /// E029: Audio fade negative or longer than the stimulus
    InvalidAudioFade,
    /// E030: Synthesis mode name is not recognised
    UnknownSynthMode,
    /// E031: Condition name is not recognised
    UnknownCondition,

    // Plan errors (E040-E041)
    /// E040: Experiment plan has an empty or zero-sized dimension
    InvalidPlan,
    /// E041: Morph settings are out of range
    InvalidMorphSettings,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::MalformedEnvelope => "E001",
            ErrorCode::InvalidEnvelopeValue => "E002",
            ErrorCode::InvalidPitchTrace => "E003",
            ErrorCode::InvalidSampleRate => "E010",
            ErrorCode::InvalidRateLimits => "E011",
            ErrorCode::InvalidFundamental => "E020",
            ErrorCode::InvalidFmDepth => "E021",
            ErrorCode::InvalidPartialCount => "E022",
            ErrorCode::PartialsAboveNyquist => "E023",
            ErrorCode::EnvelopeRangeExceeded => "E024",
            ErrorCode::InvalidLength => "E025",
            ErrorCode::LengthBelowFrame => "E026",
            ErrorCode::InvalidModRate => "E027",
            ErrorCode::InvalidModTiming => "E028",
            ErrorCode::InvalidAudioFade => "E029",
            ErrorCode::UnknownSynthMode => "E030",
            ErrorCode::UnknownCondition => "E031",
            ErrorCode::InvalidPlan => "E040",
            ErrorCode::InvalidMorphSettings => "E041",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A validation error with code, message, and optional field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Path to the problematic field (e.g., "stimulus.mod_rate").
    pub path: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Creates a new validation error with a field path.
    pub fn with_path(code: ErrorCode, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref path) = self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// Top-level error type for spec operations.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Validation failed with one or more errors.
    #[error("validation failed with {} error(s): {}", .0.len(), first_message(.0))]
    ValidationFailed(Vec<ValidationError>),

    /// A single invalid value.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn first_message(errors: &[ValidationError]) -> String {
    errors
        .first()
        .map(|e| e.to_string())
        .unwrap_or_default()
}

/// Result of validation.
///
/// Collects every violation rather than stopping at the first so callers can
/// report the whole list at once.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Creates a successful validation result.
    pub fn success() -> Self {
        Self::default()
    }

    /// Adds an error to the result.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Appends all errors of another result.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true if any error carries the given code.
    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// Converts to a Result, returning Err if there are errors.
    pub fn into_result(self) -> Result<(), SpecError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(SpecError::ValidationFailed(self.errors))
        }
    }
}

/// Common trait for backend errors.
///
/// Gives every backend error a stable code and a category so the command line
/// and test harness can report failures uniformly.
pub trait BackendError: std::error::Error {
    /// Get the error code for reporting (e.g. "AUDIO_001").
    fn code(&self) -> &'static str;

    /// Get a human-readable message describing the error.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Get the error category for grouping related errors.
    fn category(&self) -> &'static str;
}
