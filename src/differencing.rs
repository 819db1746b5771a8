//! Fractional and cross-sectional-aggregation (CSA) differencing.
//!
//! A real order `d` is resolved once, at the call boundary, into a
//! [`DifferencingOrder`]: the integers 0 and 1 select exact identity and
//! first-difference paths, every other integer is rejected, and any
//! non-integer value runs the fractional filter through the zero-padded FFT
//! convolution.

use crate::coefficients::{csa_filter, fractional_taps};
use crate::errors::{validate_all_finite, LongMemoryError, LongMemoryResult};
use crate::fft_ops::linear_convolve;

/// Integer differencing orders with a defined meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerOrder {
    /// `d = 0`: the series is returned unchanged
    Zero,
    /// `d = 1`: first differences, one observation shorter
    One,
}

/// Differencing order resolved from a real `d`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DifferencingOrder {
    /// Non-integer `d`, applied through `(1 - L)^d`
    Fractional(f64),
    /// `d ∈ {0, 1}`
    Integer(IntegerOrder),
}

impl TryFrom<f64> for DifferencingOrder {
    type Error = LongMemoryError;

    fn try_from(d: f64) -> Result<Self, Self::Error> {
        if !d.is_finite() {
            return Err(LongMemoryError::InvalidParameter {
                parameter: "d".to_string(),
                value: d,
                constraint: "must be finite".to_string(),
            });
        }
        if d.fract() != 0.0 {
            return Ok(DifferencingOrder::Fractional(d));
        }
        match d as i64 {
            0 => Ok(DifferencingOrder::Integer(IntegerOrder::Zero)),
            1 => Ok(DifferencingOrder::Integer(IntegerOrder::One)),
            order => Err(LongMemoryError::UnsupportedIntegerOrder { order }),
        }
    }
}

impl DifferencingOrder {
    /// Length of the differenced series for an input of length `n`.
    pub fn output_len(&self, n: usize) -> usize {
        match self {
            DifferencingOrder::Integer(IntegerOrder::One) => n.saturating_sub(1),
            _ => n,
        }
    }
}

/// Apply `(1 - L)^d` to a series.
///
/// Non-integer `d` returns a series of the same length, computed as the
/// linear convolution of the series with the fractional filter. `d = 0`
/// returns the series unchanged and `d = 1` returns the `T - 1` first
/// differences; callers must account for the shorter result. Negative `d`
/// integrates, so `fracdiff(x, -d)` generates FI(d) from white noise.
///
/// # Errors
/// [`LongMemoryError::UnsupportedIntegerOrder`] for integers other than 0
/// and 1, and a numerical error for non-finite input.
///
/// # Example
/// ```rust
/// use long_memory::fracdiff;
///
/// let out = fracdiff(&[1.0, 1.0, 1.0], 0.5).unwrap();
/// assert!((out[1] - 0.5).abs() < 1e-12);
/// assert!((out[2] - 0.375).abs() < 1e-12);
///
/// assert_eq!(fracdiff(&[1.0, 4.0, 9.0], 1.0).unwrap(), vec![3.0, 5.0]);
/// assert!(fracdiff(&[1.0, 2.0], 2.0).is_err());
/// ```
pub fn fracdiff(data: &[f64], d: f64) -> LongMemoryResult<Vec<f64>> {
    fracdiff_with_order(data, DifferencingOrder::try_from(d)?)
}

/// [`fracdiff`] with an already resolved order.
pub fn fracdiff_with_order(data: &[f64], order: DifferencingOrder) -> LongMemoryResult<Vec<f64>> {
    validate_all_finite(data, "series")?;
    match order {
        DifferencingOrder::Integer(IntegerOrder::Zero) => Ok(data.to_vec()),
        DifferencingOrder::Integer(IntegerOrder::One) => {
            Ok(data.windows(2).map(|w| w[1] - w[0]).collect())
        }
        DifferencingOrder::Fractional(d) => {
            linear_convolve(data, &fractional_taps(data.len(), d))
        }
    }
}

/// Apply the fractional filter for any finite `d`, integer or not, keeping
/// the input length.
///
/// Used inside objective functions, where the optimizer may land exactly on
/// an integer and a length change would be meaningless.
pub(crate) fn fractional_filter_apply(data: &[f64], d: f64) -> LongMemoryResult<Vec<f64>> {
    linear_convolve(data, &fractional_taps(data.len(), d))
}

/// Apply the CSA(p, q) moving-average filter to a series.
///
/// The output has the same length as the input.
pub fn csadiff(data: &[f64], p: f64, q: f64) -> LongMemoryResult<Vec<f64>> {
    validate_all_finite(data, "series")?;
    let taps = csa_filter(data.len(), p, q)?;
    linear_convolve(data, &taps)
}
