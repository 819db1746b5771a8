//! Autocovariance sequences and Toeplitz covariance matrices for FI(d) and
//! CSA(p, q) processes.
//!
//! Sequences are produced by ratio-of-linear-terms recursions. Gamma
//! functions enter only through the seeds and the overall scale, and those
//! are evaluated in log space.

use crate::coefficients::validate_csa_shape;
use crate::errors::{
    validate_allocation_size, validate_parameter, LongMemoryError, LongMemoryResult,
};
use crate::math_utils::gamma_ratio;
use nalgebra::DMatrix;
use statrs::function::beta::ln_beta;
use statrs::function::gamma::ln_gamma;

fn validate_fi_memory(d: f64) -> LongMemoryResult<()> {
    validate_parameter(d, f64::NEG_INFINITY, 0.5, "d")
}

/// Autocovariances `γ(0..T)` of unit-variance-innovation FI(d) noise.
///
/// `γ(0) = Γ(1 - 2d) / Γ(1 - d)²` and `γ(k) = γ(k-1)·(d + k - 1)/(k - d)`.
/// Requires `d < 1/2`.
///
/// # Example
/// ```rust
/// use long_memory::covariance::fi_acov;
///
/// let acov = fi_acov(3, 0.0).unwrap();
/// assert!((acov[0] - 1.0).abs() < 1e-12);
/// assert_eq!(acov[1], 0.0);
/// assert!(fi_acov(3, 0.5).is_err());
/// ```
pub fn fi_acov(length: usize, d: f64) -> LongMemoryResult<Vec<f64>> {
    validate_fi_memory(d)?;
    let mut acov = Vec::with_capacity(length);
    if length == 0 {
        return Ok(acov);
    }
    acov.push(1.0);
    for k in 1..length {
        let kf = k as f64;
        acov.push(acov[k - 1] * (d + kf - 1.0) / (kf - d));
    }

    let scale = (ln_gamma(1.0 - 2.0 * d) - 2.0 * ln_gamma(1.0 - d)).exp();
    acov.iter_mut().for_each(|v| *v *= scale);
    Ok(acov)
}

/// Autocovariances `γ(0..T)` of CSA(p, q) noise.
///
/// Lag `k` is proportional to `Γ(p + k/2) / Γ(p + q - 1 + k/2)`; even and
/// odd lags are advanced by separate recursions from their own seeds and
/// interleaved. The sequence is scaled by `Γ(p+q) / (Γ(p)(q-1)) · B(p, q)`.
/// Requires `p > 0` and `q > 1`.
pub fn csa_acov(length: usize, p: f64, q: f64) -> LongMemoryResult<Vec<f64>> {
    validate_csa_shape(p, q, 1.0)?;
    let mut acov = vec![0.0; length];
    if length == 0 {
        return Ok(acov);
    }

    // Even lags k = 2j
    let mut even = gamma_ratio(p, p + q - 1.0);
    for (j, k) in (0..length).step_by(2).enumerate() {
        if j > 0 {
            let jf = j as f64;
            even *= (p + jf - 1.0) / (p + q - 2.0 + jf);
        }
        acov[k] = even;
    }

    // Odd lags k = 2j + 1
    let mut odd = gamma_ratio(p + 0.5, p + q - 0.5);
    for (j, k) in (1..length).step_by(2).enumerate() {
        if j > 0 {
            let jf = j as f64;
            odd *= (p + jf - 0.5) / (p + q - 1.5 + jf);
        }
        acov[k] = odd;
    }

    let scale = (ln_gamma(p + q) - ln_gamma(p) - (q - 1.0).ln() + ln_beta(p, q)).exp();
    if !scale.is_finite() {
        return Err(LongMemoryError::NumericalError {
            reason: format!("CSA scale factor overflowed for p = {}, q = {}", p, q),
            operation: Some("csa_acov".to_string()),
        });
    }
    acov.iter_mut().for_each(|v| *v *= scale);
    Ok(acov)
}

fn normalize(mut acov: Vec<f64>) -> Vec<f64> {
    if let Some(&lag_zero) = acov.first() {
        acov.iter_mut().for_each(|v| *v /= lag_zero);
    }
    acov
}

/// Autocorrelations of FI(d) noise, `fi_acov` normalized by its lag-0 value.
pub fn fi_acorr(length: usize, d: f64) -> LongMemoryResult<Vec<f64>> {
    fi_acov(length, d).map(normalize)
}

/// Autocorrelations of CSA(p, q) noise.
pub fn csa_acorr(length: usize, p: f64, q: f64) -> LongMemoryResult<Vec<f64>> {
    csa_acov(length, p, q).map(normalize)
}

/// Symmetric Toeplitz matrix with entry `(i, j) = acov[|i - j|]`.
///
/// # Example
/// ```rust
/// use long_memory::toeplitz_covariance;
///
/// let v = toeplitz_covariance(&[2.0, 0.5, 0.1]).unwrap();
/// assert_eq!(v[(0, 2)], 0.1);
/// assert_eq!(v[(2, 1)], 0.5);
/// ```
pub fn toeplitz_covariance(acov: &[f64]) -> LongMemoryResult<DMatrix<f64>> {
    let n = acov.len();
    validate_allocation_size(
        n.saturating_mul(n).saturating_mul(std::mem::size_of::<f64>()),
        "toeplitz_covariance",
    )?;
    Ok(DMatrix::from_fn(n, n, |i, j| acov[i.abs_diff(j)]))
}

/// Full T×T covariance matrix of FI(d) noise.
pub fn fi_covariance_matrix(length: usize, d: f64) -> LongMemoryResult<DMatrix<f64>> {
    toeplitz_covariance(&fi_acov(length, d)?)
}

/// Full T×T covariance matrix of CSA(p, q) noise.
pub fn csa_covariance_matrix(length: usize, p: f64, q: f64) -> LongMemoryResult<DMatrix<f64>> {
    toeplitz_covariance(&csa_acov(length, p, q)?)
}
