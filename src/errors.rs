//! Error types and validation functions for long-memory analysis.
//!
//! Every fallible operation in the crate returns [`LongMemoryResult`]. Domain
//! violations are reported immediately; numerical trouble inside an optimizer
//! objective is absorbed by the optimizer layer and only surfaces here when a
//! final, user-visible computation cannot be completed.

use thiserror::Error;

/// Error types for long-memory generation and estimation.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum LongMemoryError {
    /// Insufficient data for the requested operation.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum required data points
        required: usize,
        /// Actual number of data points provided
        actual: usize,
    },

    /// Parameter outside its valid domain.
    #[error("Invalid parameter: {parameter} = {value}, expected {constraint}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value provided
        value: f64,
        /// Valid range or constraint description
        constraint: String,
    },

    /// Frequency band exponents out of order or out of range.
    #[error("Invalid frequency band: lower exponent {lower} must be below upper exponent {upper} within [0, 1]")]
    InvalidBand {
        /// Lower band exponent `l`
        lower: f64,
        /// Upper band exponent `m`
        upper: f64,
    },

    /// Integer differencing order without a defined meaning.
    #[error("Unsupported integer differencing order {order}: only 0 and 1 are defined")]
    UnsupportedIntegerOrder {
        /// The rejected order
        order: i64,
    },

    /// Numerical computation error due to instability.
    #[error("Numerical computation failed: {reason}")]
    NumericalError {
        /// Detailed reason for numerical failure
        reason: String,
        /// Operation that failed
        operation: Option<String>,
    },

    /// Covariance matrix is not positive definite.
    #[error("Covariance matrix is not positive definite in {operation}")]
    NotPositiveDefinite {
        /// Operation that required the factorization
        operation: String,
    },

    /// The numerical optimizer could not be set up or run.
    #[error("Optimization failed: {reason}")]
    OptimizationFailed {
        /// Reason reported by the optimizer backend
        reason: String,
    },

    /// FFT computation error.
    #[error("FFT computation failed: input size {size} not supported")]
    FftError {
        /// Input size that caused the FFT failure
        size: usize,
    },
}

/// Result type for long-memory operations.
pub type LongMemoryResult<T> = Result<T, LongMemoryError>;

impl From<argmin::core::Error> for LongMemoryError {
    fn from(err: argmin::core::Error) -> Self {
        LongMemoryError::OptimizationFailed {
            reason: err.to_string(),
        }
    }
}

/// Validates that data has sufficient length for analysis.
///
/// # Example
/// ```rust
/// use long_memory::errors::validate_data_length;
///
/// let data = vec![1.0, 2.0, 3.0];
/// assert!(validate_data_length(&data, 2, "test").is_ok());
/// assert!(validate_data_length(&data, 5, "test").is_err());
/// ```
pub fn validate_data_length(
    data: &[f64],
    min_required: usize,
    operation: &str,
) -> LongMemoryResult<()> {
    if data.len() < min_required {
        log::debug!(
            "{} rejected series of length {} (needs {})",
            operation,
            data.len(),
            min_required
        );
        Err(LongMemoryError::InsufficientData {
            required: min_required,
            actual: data.len(),
        })
    } else {
        Ok(())
    }
}

/// Validates that a parameter is finite and strictly inside `(min, max)`.
///
/// Either bound may be infinite for a one-sided constraint.
///
/// # Example
/// ```rust
/// use long_memory::errors::validate_parameter;
///
/// assert!(validate_parameter(0.3, -0.5, 0.5, "d").is_ok());
/// assert!(validate_parameter(0.5, -0.5, 0.5, "d").is_err());
/// assert!(validate_parameter(2.0, 0.0, f64::INFINITY, "p").is_ok());
/// ```
pub fn validate_parameter(value: f64, min: f64, max: f64, name: &str) -> LongMemoryResult<()> {
    if !value.is_finite() {
        return Err(LongMemoryError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: "must be finite".to_string(),
        });
    }

    if min.is_nan() || max.is_nan() || min >= max {
        return Err(LongMemoryError::NumericalError {
            reason: format!(
                "Invalid bounds for parameter {}: min={}, max={}",
                name, min, max
            ),
            operation: None,
        });
    }

    if value <= min || value >= max {
        Err(LongMemoryError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: format!("must lie in ({}, {})", min, max),
        })
    } else {
        Ok(())
    }
}

/// Validates that a value is finite and not NaN.
pub fn validate_finite(value: f64, name: &str) -> LongMemoryResult<()> {
    if !value.is_finite() {
        Err(LongMemoryError::NumericalError {
            reason: format!("{} is not finite: {}", name, value),
            operation: None,
        })
    } else {
        Ok(())
    }
}

/// Validates that all values in a slice are finite.
///
/// Returns on the first non-finite value.
///
/// # Example
/// ```rust
/// use long_memory::errors::validate_all_finite;
///
/// assert!(validate_all_finite(&[1.0, 2.0, 3.0], "x").is_ok());
/// assert!(validate_all_finite(&[1.0, f64::NAN, 3.0], "x").is_err());
/// ```
pub fn validate_all_finite(data: &[f64], name: &str) -> LongMemoryResult<()> {
    if let Some((i, &value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(LongMemoryError::NumericalError {
            reason: format!(
                "{} contains non-finite value at index {}: {}",
                name, i, value
            ),
            operation: None,
        });
    }
    Ok(())
}

/// Rejects allocation requests above 1 GiB.
///
/// The T×T covariance matrix grows quadratically in the sample length, so
/// this guard is checked before any dense matrix or FFT buffer is built.
pub fn validate_allocation_size(size: usize, operation: &str) -> LongMemoryResult<()> {
    const MAX_SAFE_ALLOCATION: usize = 1 << 30;

    if size > MAX_SAFE_ALLOCATION {
        return Err(LongMemoryError::NumericalError {
            reason: format!(
                "Attempted allocation of {} bytes ({:.2} GB) in '{}' exceeds safety limit of {} bytes",
                size,
                size as f64 / (1024.0 * 1024.0 * 1024.0),
                operation,
                MAX_SAFE_ALLOCATION
            ),
            operation: Some(operation.to_string()),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_data_length_insufficient() {
        let data = vec![1.0, 2.0];
        match validate_data_length(&data, 5, "test_operation") {
            Err(LongMemoryError::InsufficientData { required, actual }) => {
                assert_eq!(required, 5);
                assert_eq!(actual, 2);
            }
            other => panic!("Expected InsufficientData, got {:?}", other),
        }
        assert!(validate_data_length(&data, 2, "test_operation").is_ok());
    }

    #[test]
    fn test_validate_parameter_bounds() {
        assert!(validate_parameter(0.0, -0.5, 0.5, "d").is_ok());
        assert!(validate_parameter(0.5, -0.5, 0.5, "d").is_err());
        assert!(validate_parameter(-0.5, -0.5, 0.5, "d").is_err());
        assert!(validate_parameter(-1e6, f64::NEG_INFINITY, 0.5, "d").is_ok());
        assert!(validate_parameter(f64::INFINITY, 0.0, f64::INFINITY, "p").is_err());

        match validate_parameter(0.7, -0.5, 0.5, "d") {
            Err(LongMemoryError::InvalidParameter {
                parameter, value, ..
            }) => {
                assert_eq!(parameter, "d");
                assert_eq!(value, 0.7);
            }
            other => panic!("Expected InvalidParameter, got {:?}", other),
        }

        assert!(matches!(
            validate_parameter(f64::NAN, 0.0, 1.0, "p"),
            Err(LongMemoryError::InvalidParameter { .. })
        ));
        assert!(matches!(
            validate_parameter(0.5, 1.0, 0.0, "p"),
            Err(LongMemoryError::NumericalError { .. })
        ));
    }

    #[test]
    fn test_validate_all_finite_reports_index() {
        let data = vec![1.0, 2.0, f64::INFINITY];
        match validate_all_finite(&data, "series") {
            Err(LongMemoryError::NumericalError { reason, .. }) => {
                assert!(reason.contains("index 2"), "reason was: {}", reason);
            }
            other => panic!("Expected NumericalError, got {:?}", other),
        }
        assert!(validate_all_finite(&[], "empty").is_ok());
        assert!(validate_finite(f64::NAN, "x").is_err());
    }

    #[test]
    fn test_allocation_guard() {
        assert!(validate_allocation_size(1024, "small").is_ok());
        assert!(validate_allocation_size(1 << 31, "huge").is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = LongMemoryError::InvalidBand {
            lower: 0.6,
            upper: 0.5,
        };
        assert!(err.to_string().contains("0.6"));

        let err = LongMemoryError::UnsupportedIntegerOrder { order: 2 };
        assert_eq!(
            err.to_string(),
            "Unsupported integer differencing order 2: only 0 and 1 are defined"
        );
    }
}
