//! FFT operations: linear convolution, periodogram and sample autocorrelation.
//!
//! Convolutions are computed on buffers zero-padded to the next power of two
//! at or above `2T - 1`. At that length the circular convolution produced by
//! the FFT coincides with the linear one on the first `T` samples, so the
//! slowly decaying tails of fractional and CSA filters never wrap around.
//! The periodogram is the one exception: it is taken on the raw sample
//! without padding.
//!
//! Planners are created per call; nothing is cached between calls.

use crate::errors::{
    validate_all_finite, validate_allocation_size, LongMemoryError, LongMemoryResult,
};
use num_complex::Complex64;
use rustfft::FftPlanner;
use std::f64::consts::PI;

/// Periodogram ordinates paired with their Fourier frequencies.
#[derive(Debug, Clone, PartialEq)]
pub struct Periodogram {
    /// `I(ω_k) = |X_k|² / T` for `k = 0..=⌊T/2⌋`
    pub power: Vec<f64>,
    /// `ω_k = 2πk / T`, all in `[0, π]`
    pub frequencies: Vec<f64>,
    /// Length `T` of the series the periodogram was taken from
    pub sample_size: usize,
}

impl Periodogram {
    /// Number of ordinates.
    pub fn len(&self) -> usize {
        self.power.len()
    }

    /// True when there are no ordinates.
    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }
}

/// Transform length that makes circular convolution of two length-`n`
/// sequences equal to their linear convolution on the first `n` samples.
pub fn padded_length(n: usize) -> LongMemoryResult<usize> {
    if n <= 1 {
        return Ok(1);
    }
    n.checked_mul(2)
        .and_then(|m| (m - 1).checked_next_power_of_two())
        .ok_or(LongMemoryError::FftError { size: n })
}

fn to_complex_padded(data: &[f64], size: usize) -> Vec<Complex64> {
    let mut buffer: Vec<Complex64> = data.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    buffer.resize(size, Complex64::new(0.0, 0.0));
    buffer
}

/// First `T = signal.len()` terms of the linear convolution of `signal` with
/// `taps`.
///
/// Taps beyond index `T - 1` cannot reach the first `T` outputs and are
/// ignored.
///
/// # Example
/// ```rust
/// use long_memory::linear_convolve;
///
/// let out = linear_convolve(&[1.0, 1.0, 1.0], &[1.0, -1.0]).unwrap();
/// assert!((out[0] - 1.0).abs() < 1e-12);
/// assert!(out[1].abs() < 1e-12);
/// assert!(out[2].abs() < 1e-12);
/// ```
pub fn linear_convolve(signal: &[f64], taps: &[f64]) -> LongMemoryResult<Vec<f64>> {
    let n = signal.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    validate_all_finite(signal, "signal")?;
    validate_all_finite(taps, "taps")?;

    let taps = &taps[..taps.len().min(n)];
    if taps.is_empty() {
        return Ok(vec![0.0; n]);
    }

    let size = padded_length(n)?;
    validate_allocation_size(
        size.saturating_mul(2 * std::mem::size_of::<Complex64>()),
        "linear convolution",
    )?;

    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(size);
    let inverse = planner.plan_fft_inverse(size);

    let mut x = to_complex_padded(signal, size);
    let mut h = to_complex_padded(taps, size);
    forward.process(&mut x);
    forward.process(&mut h);

    for (xi, hi) in x.iter_mut().zip(&h) {
        *xi *= *hi;
    }
    inverse.process(&mut x);

    // rustfft leaves the inverse transform unnormalized
    let scale = size as f64;
    Ok(x.iter().take(n).map(|c| c.re / scale).collect())
}

/// Periodogram of a series: `I(ω_k) = |FFT(x)_k|² / T` at `ω_k = 2πk/T`,
/// `k = 0..=⌊T/2⌋`.
///
/// The series is neither demeaned nor padded.
pub fn periodogram(data: &[f64]) -> LongMemoryResult<Periodogram> {
    let n = data.len();
    if n < 2 {
        return Err(LongMemoryError::InsufficientData {
            required: 2,
            actual: n,
        });
    }
    validate_all_finite(data, "series")?;

    let mut buffer = to_complex_padded(data, n);
    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(n).process(&mut buffer);

    let half = n / 2 + 1;
    let nf = n as f64;
    let power = buffer.iter().take(half).map(|c| c.norm_sqr() / nf).collect();
    let frequencies = (0..half).map(|k| 2.0 * PI * k as f64 / nf).collect();

    Ok(Periodogram {
        power,
        frequencies,
        sample_size: n,
    })
}

/// Biased sample autocorrelations `ρ̂(0..=max_lag)` computed through a
/// zero-padded FFT of the demeaned series.
pub fn sample_autocorrelation(data: &[f64], max_lag: usize) -> LongMemoryResult<Vec<f64>> {
    let n = data.len();
    if n < 2 {
        return Err(LongMemoryError::InsufficientData {
            required: 2,
            actual: n,
        });
    }
    if max_lag >= n {
        return Err(LongMemoryError::InvalidParameter {
            parameter: "max_lag".to_string(),
            value: max_lag as f64,
            constraint: format!("must be less than data length ({})", n),
        });
    }
    validate_all_finite(data, "series")?;

    let centered = crate::math_utils::center(data);
    let size = padded_length(n)?;
    let mut buffer = to_complex_padded(&centered, size);

    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(size).process(&mut buffer);
    for c in buffer.iter_mut() {
        *c = Complex64::new(c.norm_sqr(), 0.0);
    }
    planner.plan_fft_inverse(size).process(&mut buffer);

    let lag_zero = buffer[0].re;
    if lag_zero.abs() < 1e-300 {
        return Err(LongMemoryError::NumericalError {
            reason: "series has zero variance".to_string(),
            operation: Some("sample_autocorrelation".to_string()),
        });
    }

    Ok(buffer
        .iter()
        .take(max_lag + 1)
        .map(|c| (c.re / lag_zero).clamp(-1.0, 1.0))
        .collect())
}
