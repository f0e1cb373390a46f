//! Common numeric checks shared by request, config, and plan validation.

use crate::error::{ErrorCode, ValidationError};

/// Validate that a value is finite and positive (> 0).
///
/// # Example
/// ```
/// use vibrato_spec::validation::common::validate_positive;
/// use vibrato_spec::ErrorCode;
///
/// assert!(validate_positive(ErrorCode::InvalidLength, "length", 1.0).is_ok());
/// assert!(validate_positive(ErrorCode::InvalidLength, "length", 0.0).is_err());
/// ```
pub fn validate_positive(code: ErrorCode, path: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::with_path(
            code,
            format!("must be finite and positive, got {}", value),
            path,
        ));
    }
    Ok(())
}

/// Validate that a value is finite and non-negative (>= 0).
pub fn validate_non_negative(
    code: ErrorCode,
    path: &str,
    value: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::with_path(
            code,
            format!("must be finite and non-negative, got {}", value),
            path,
        ));
    }
    Ok(())
}

/// Validate that a value is finite and within `[min, max]`.
pub fn validate_range(
    code: ErrorCode,
    path: &str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ValidationError::with_path(
            code,
            format!("must be in [{}, {}], got {}", min, max, value),
            path,
        ));
    }
    Ok(())
}
