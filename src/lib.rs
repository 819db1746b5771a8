//! # Long-Memory Time Series
//!
//! Generation and estimation of long-memory (fractionally integrated)
//! processes.
//!
//! The crate covers the two halves of working with long memory: building
//! series with a prescribed memory structure, and recovering the memory
//! parameter from data. Two process families are supported, fractionally
//! integrated noise FI(d) and cross-sectionally aggregated noise CSA(p, q).
//!
//! ## Key Features
//!
//! - **Differencing**: `(1 - L)^d` and the CSA filter through zero-padded FFT
//!   convolution, with exact integer orders 0 and 1
//! - **Covariance Models**: closed-form autocovariance recursions and Toeplitz
//!   covariance matrices
//! - **Semiparametric Estimators**: GPH log-periodogram regression (with bias
//!   reduction), local Whittle and exact local Whittle, plus their asymptotic
//!   variances
//! - **Maximum Likelihood**: concentrated Gaussian likelihood for FI and CSA
//!   through a dense Cholesky factor or the Durbin-Levinson recursion
//! - **Diagnostics**: every optimized estimate carries a convergence report
//!
//! ## Quick Start
//!
//! ```rust
//! use long_memory::{fi_generate, fi_mle, gph_estimate, whittle_estimate};
//! use long_memory::{FrequencyBand, LikelihoodConfig, OptimizerConfig};
//! use rand::SeedableRng;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//!     let x = fi_generate(1024, 0.3, 1.0, &mut rng)?;
//!
//!     let band = FrequencyBand::default();
//!     let d_gph = gph_estimate(&x, &band, 0)?;
//!     let whittle = whittle_estimate(&x, &band, &OptimizerConfig::standard())?;
//!     let mle = fi_mle(&x, &LikelihoodConfig::durbin_levinson())?;
//!
//!     println!("GPH d = {:.3}", d_gph);
//!     println!("Whittle d = {:.3} (converged: {})", whittle.d, whittle.convergence.converged);
//!     println!("MLE d = {:.3}, sigma = {:.3}", mle.d, mle.sigma);
//!     Ok(())
//! }
//! ```
//!
//! ## Randomness
//!
//! Functions that draw random numbers take an explicit `&mut impl Rng`.
//! There is no global generator and no shared state between calls.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod fft_ops;
pub mod linear_algebra;
pub mod math_utils;
pub mod optimizer;

// Processes and estimators
pub mod coefficients;
pub mod covariance;
pub mod differencing;
pub mod generators;
pub mod har;
pub mod likelihood;
pub mod spectral_estimators;

// Re-exports for convenience - main public API
pub use config::{
    CovarianceSolver, FrequencyBand, LikelihoodConfig, OptimizerConfig, OptimizerMethod,
};
pub use errors::{LongMemoryError, LongMemoryResult};
pub use optimizer::Convergence;

// Filters and differencing exports
pub use coefficients::{csa_filter, csa_ma_coefficients, fi_ma_coefficients, fractional_filter};
pub use differencing::{csadiff, fracdiff, DifferencingOrder, IntegerOrder};
pub use fft_ops::{linear_convolve, periodogram, sample_autocorrelation, Periodogram};

// Data generation exports
pub use generators::{csa_generate, fi_generate};

// Covariance model exports
pub use covariance::{
    csa_acorr, csa_acov, csa_covariance_matrix, fi_acorr, fi_acov, fi_covariance_matrix,
    toeplitz_covariance,
};

// Estimator exports
pub use har::{har_estimate, HarEstimate, DEFAULT_HAR_LAGS};
pub use likelihood::{csa_llk, csa_mle, fi_llk, fi_mle, CsaMleEstimate, FiMleEstimate};
pub use spectral_estimators::{
    exact_whittle_estimate, exact_whittle_objective, gph_estimate, gph_variance,
    whittle_estimate, whittle_objective, whittle_variance, WhittleEstimate,
};
