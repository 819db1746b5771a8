//! Synthetic long-memory series.
//!
//! Both generators draw Gaussian innovations from a caller-supplied random
//! source and push them through the MA(∞) filter of the target process with
//! the FFT convolution. The same seed always yields the same path, and
//! independent threads stay independent as long as each owns its generator.

use crate::coefficients::{csa_ma_coefficients, validate_csa_shape};
use crate::differencing::fracdiff;
use crate::errors::{validate_parameter, LongMemoryError, LongMemoryResult};
use crate::fft_ops::linear_convolve;
use rand::Rng;
use rand_distr::{Distribution, Normal};

fn gaussian_innovations<R: Rng + ?Sized>(
    length: usize,
    sigma: f64,
    rng: &mut R,
) -> LongMemoryResult<Vec<f64>> {
    validate_parameter(sigma, 0.0, f64::INFINITY, "sigma")?;
    let normal = Normal::new(0.0, sigma).map_err(|e| LongMemoryError::InvalidParameter {
        parameter: "sigma".to_string(),
        value: sigma,
        constraint: e.to_string(),
    })?;
    Ok((0..length).map(|_| normal.sample(rng)).collect())
}

/// Fractionally integrated noise FI(d): `(1 - L)^(-d) ε_t` with
/// `ε_t ~ N(0, σ²)`.
///
/// `d` must be finite, and zero if it is an integer. A stationary path needs
/// `d ∈ (-1/2, 1/2)`.
///
/// # Example
/// ```rust
/// use long_memory::fi_generate;
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let x = fi_generate(512, 0.3, 1.0, &mut rng).unwrap();
/// assert_eq!(x.len(), 512);
/// ```
pub fn fi_generate<R: Rng + ?Sized>(
    length: usize,
    d: f64,
    sigma: f64,
    rng: &mut R,
) -> LongMemoryResult<Vec<f64>> {
    let noise = gaussian_innovations(length, sigma, rng)?;
    let path = fracdiff(&noise, -d)?;
    if path.len() != length {
        return Err(LongMemoryError::InvalidParameter {
            parameter: "d".to_string(),
            value: d,
            constraint: "d = -1 changes the series length and cannot generate FI noise"
                .to_string(),
        });
    }
    log::debug!("generated FI(d = {}) path of length {}", d, length);
    Ok(path)
}

/// Cross-sectionally aggregated noise CSA(p, q): the CSA MA(∞) filter applied
/// to `ε_t ~ N(0, σ²)`.
///
/// Requires `p > 0` and `q > 1`.
pub fn csa_generate<R: Rng + ?Sized>(
    length: usize,
    p: f64,
    q: f64,
    sigma: f64,
    rng: &mut R,
) -> LongMemoryResult<Vec<f64>> {
    validate_csa_shape(p, q, 1.0)?;
    let noise = gaussian_innovations(length, sigma, rng)?;
    let taps = csa_ma_coefficients(length, p, q)?;
    log::debug!("generated CSA(p = {}, q = {}) path of length {}", p, q, length);
    linear_convolve(&noise, &taps)
}
