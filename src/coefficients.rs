//! Filter and moving-average coefficient recursions.
//!
//! Both families are generated by multiplying the previous tap by a ratio of
//! linear terms, so no per-lag gamma function is evaluated and long sequences
//! neither overflow nor lose precision to cancellation. Tap 0 is always 1.

use crate::errors::{validate_finite, validate_parameter, LongMemoryResult};

/// Taps of `(1 - L)^d`: `c[0] = 1`, `c[k] = c[k-1]·(k - 1 - d)/k`.
///
/// Any finite `d` is accepted; integer `d` yields the ordinary binomial taps
/// (for `d = 1` the sequence is `1, -1, 0, 0, ...`).
///
/// # Example
/// ```rust
/// use long_memory::coefficients::fractional_filter;
///
/// let taps = fractional_filter(3, 0.5).unwrap();
/// assert_eq!(taps, vec![1.0, -0.5, -0.125]);
/// ```
pub fn fractional_filter(length: usize, d: f64) -> LongMemoryResult<Vec<f64>> {
    validate_finite(d, "d")?;
    Ok(fractional_taps(length, d))
}

pub(crate) fn fractional_taps(length: usize, d: f64) -> Vec<f64> {
    let mut taps = Vec::with_capacity(length);
    if length == 0 {
        return taps;
    }
    taps.push(1.0);
    for k in 1..length {
        let kf = k as f64;
        taps.push(taps[k - 1] * (kf - 1.0 - d) / kf);
    }
    taps
}

/// Taps of the CSA moving-average filter:
/// `c[0] = 1`, `c[k] = c[k-1]·sqrt((p + k - 1)/(p + k - 1 + q))`.
///
/// Requires `p > 0` and `q > 0`; the taps then decrease monotonically to 0.
pub fn csa_filter(length: usize, p: f64, q: f64) -> LongMemoryResult<Vec<f64>> {
    validate_csa_shape(p, q, 0.0)?;
    Ok(csa_taps(length, p, q))
}

pub(crate) fn csa_taps(length: usize, p: f64, q: f64) -> Vec<f64> {
    let mut taps = Vec::with_capacity(length);
    if length == 0 {
        return taps;
    }
    taps.push(1.0);
    for k in 1..length {
        let base = p + k as f64 - 1.0;
        taps.push(taps[k - 1] * (base / (base + q)).sqrt());
    }
    taps
}

/// MA(∞) weights of an FI(d) process, the taps of `(1 - L)^(-d)`.
pub fn fi_ma_coefficients(length: usize, d: f64) -> LongMemoryResult<Vec<f64>> {
    fractional_filter(length, -d)
}

/// MA(∞) weights of a CSA(p, q) process.
pub fn csa_ma_coefficients(length: usize, p: f64, q: f64) -> LongMemoryResult<Vec<f64>> {
    csa_filter(length, p, q)
}

/// Checks `p > 0` and `q > q_min`.
pub(crate) fn validate_csa_shape(p: f64, q: f64, q_min: f64) -> LongMemoryResult<()> {
    validate_parameter(p, 0.0, f64::INFINITY, "p")?;
    validate_parameter(q, q_min, f64::INFINITY, "q")
}
