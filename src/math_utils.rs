//! Mathematical utilities shared across the estimators.
//!
//! Centering, the logistic maps used to keep optimizer variables
//! inside their parameter domains, and log-space gamma-function ratios.

use statrs::function::gamma::ln_gamma;

/// Arithmetic mean, 0.0 for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Series minus its sample mean.
pub fn center(data: &[f64]) -> Vec<f64> {
    let m = mean(data);
    data.iter().map(|&x| x - m).collect()
}

/// Numerically stable logistic function `e^x / (1 + e^x)`.
///
/// Evaluated through `exp(-|x|)` so neither tail overflows.
pub fn logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Inverse of [`logistic`] on `(0, 1)`.
pub fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

/// [`logistic`] clamped to `[ε, 1 - ε]`, so the open-interval maps below
/// never round onto an endpoint in the far tails.
fn open_unit_logistic(x: f64) -> f64 {
    logistic(x).clamp(f64::EPSILON, 1.0 - f64::EPSILON)
}

/// Reparameterization used for the memory parameter: `d = -1/2 + logistic(θ)`.
///
/// Maps the whole real line onto `(-1/2, 1/2)`; the endpoints are never
/// returned.
pub fn theta_to_memory(theta: f64) -> f64 {
    -0.5 + open_unit_logistic(theta)
}

/// Inverse of [`theta_to_memory`].
pub fn memory_to_theta(d: f64) -> f64 {
    logit(d + 0.5)
}

/// Reparameterization used for CSA shape parameters: `p = 1 + 2·logistic(θ)`.
///
/// Maps the whole real line onto `(1, 3)`; the endpoints are never returned.
pub fn theta_to_csa_shape(theta: f64) -> f64 {
    1.0 + 2.0 * open_unit_logistic(theta)
}

/// Inverse of [`theta_to_csa_shape`].
pub fn csa_shape_to_theta(p: f64) -> f64 {
    logit((p - 1.0) / 2.0)
}

/// `Γ(a) / Γ(b)` evaluated in log space.
///
/// Both arguments must be positive.
pub fn gamma_ratio(a: f64, b: f64) -> f64 {
    (ln_gamma(a) - ln_gamma(b)).exp()
}

/// Means of the `window` observations ending at each index.
///
/// Entry `t` averages `data[t + 1 - window ..= t]`; the first `window - 1`
/// entries are `None`.
pub fn trailing_means(data: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; data.len()];
    }
    let mut out = Vec::with_capacity(data.len());
    let mut running = 0.0;
    for (t, &x) in data.iter().enumerate() {
        running += x;
        if t >= window {
            running -= data[t - window];
        }
        if t + 1 >= window {
            out.push(Some(running / window as f64));
        } else {
            out.push(None);
        }
    }
    out
}
