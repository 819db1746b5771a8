//! Heterogeneous autoregressive (HAR) regression.
//!
//! Each observation is regressed on a constant and on the means of the
//! series over several trailing windows that end one step earlier. With the
//! default windows {1, 5, 22} on daily data these are the familiar daily,
//! weekly and monthly components.

use crate::errors::{validate_all_finite, LongMemoryError, LongMemoryResult};
use crate::linear_algebra::multiple_regression;
use crate::math_utils::trailing_means;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default trailing-window lengths.
pub const DEFAULT_HAR_LAGS: [usize; 3] = [1, 5, 22];

/// Fitted HAR regression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HarEstimate {
    /// Constant term
    pub intercept: f64,
    /// One coefficient per window, in the order of `lags`
    pub coefficients: Vec<f64>,
    /// Window lengths used
    pub lags: Vec<usize>,
    /// Observations entering the regression
    pub observations: usize,
}

/// OLS fit of `x_t = β₀ + Σ_i β_i · mean(x_{t-h_i}, ..., x_{t-1}) + e_t`.
///
/// Regression starts at the first `t` for which the longest window is
/// complete.
///
/// # Example
/// ```rust
/// use long_memory::har::{har_estimate, DEFAULT_HAR_LAGS};
///
/// let x: Vec<f64> = (0..300).map(|i| ((i * 37) % 23) as f64 + (i as f64 * 0.1).sin()).collect();
/// let fit = har_estimate(&x, &DEFAULT_HAR_LAGS).unwrap();
/// assert_eq!(fit.coefficients.len(), 3);
/// assert_eq!(fit.observations, 300 - 22);
/// ```
pub fn har_estimate(data: &[f64], lags: &[usize]) -> LongMemoryResult<HarEstimate> {
    if lags.is_empty() {
        return Err(LongMemoryError::InvalidParameter {
            parameter: "lags".to_string(),
            value: 0.0,
            constraint: "at least one window is required".to_string(),
        });
    }
    for (i, &lag) in lags.iter().enumerate() {
        if lag == 0 || lags[..i].contains(&lag) {
            return Err(LongMemoryError::InvalidParameter {
                parameter: "lags".to_string(),
                value: lag as f64,
                constraint: "windows must be positive and distinct".to_string(),
            });
        }
    }
    validate_all_finite(data, "series")?;

    let max_lag = lags.iter().copied().max().unwrap_or(1);
    let required = max_lag + lags.len() + 2;
    if data.len() < required {
        return Err(LongMemoryError::InsufficientData {
            required,
            actual: data.len(),
        });
    }

    let response = data[max_lag..].to_vec();
    let mut regressors = Vec::with_capacity(lags.len() + 1);
    regressors.push(vec![1.0; response.len()]);
    for &lag in lags {
        let means = trailing_means(data, lag);
        // Window ending at t - 1 for each response index t
        let column = (max_lag..data.len())
            .map(|t| means[t - 1].unwrap_or(0.0))
            .collect();
        regressors.push(column);
    }

    let beta = multiple_regression(&regressors, &response)?;
    log::debug!("HAR fit on {} observations with lags {:?}", response.len(), lags);

    Ok(HarEstimate {
        intercept: beta[0],
        coefficients: beta[1..].to_vec(),
        lags: lags.to_vec(),
        observations: response.len(),
    })
}
