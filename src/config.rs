//! # Estimation Configuration
//!
//! Configuration structures controlling the frequency band used by the
//! semiparametric estimators, the numerical optimizer that drives the Whittle
//! and maximum-likelihood estimators, and the linear-algebra route used to
//! evaluate the Gaussian likelihood.

use crate::errors::{validate_parameter, LongMemoryError, LongMemoryResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cost assigned to parameter values where the objective cannot be evaluated.
pub const DEFAULT_PENALTY: f64 = 1.0e10;

/// Frequency band `[T^l, T^m]` used by the spectral estimators.
///
/// The exponents satisfy `0 <= l < m <= 1`. With `l = 0` only the zero
/// frequency is trimmed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawFrequencyBand"))]
pub struct FrequencyBand {
    lower: f64,
    upper: f64,
}

/// Unchecked exponents read by `serde`, validated through
/// [`FrequencyBand::new`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawFrequencyBand {
    lower: f64,
    upper: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawFrequencyBand> for FrequencyBand {
    type Error = LongMemoryError;

    fn try_from(raw: RawFrequencyBand) -> LongMemoryResult<Self> {
        Self::new(raw.lower, raw.upper)
    }
}

impl FrequencyBand {
    /// Build a band from the lower exponent `l` and the upper exponent `m`.
    ///
    /// # Example
    /// ```rust
    /// use long_memory::FrequencyBand;
    ///
    /// assert!(FrequencyBand::new(0.0, 0.5).is_ok());
    /// assert!(FrequencyBand::new(0.6, 0.5).is_err());
    /// ```
    pub fn new(lower: f64, upper: f64) -> LongMemoryResult<Self> {
        let in_range = (0.0..1.0).contains(&lower) && upper > 0.0 && upper <= 1.0;
        if !in_range || lower >= upper {
            return Err(LongMemoryError::InvalidBand { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    /// Band `[1, T^m]` with no low-frequency trimming.
    pub fn with_upper(upper: f64) -> LongMemoryResult<Self> {
        Self::new(0.0, upper)
    }

    /// Lower exponent `l`.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper exponent `m`.
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Periodogram positions (0-based, position 0 is frequency zero) used for
    /// a sample of length `n`: positions `⌈max(n^l, 2)⌉ - 1 ..= ⌊n^m⌋ - 1`.
    ///
    /// The range is clipped to the `n / 2 + 1` periodogram ordinates and may
    /// be empty for very short samples.
    pub fn indices(&self, n: usize) -> std::ops::RangeInclusive<usize> {
        let nf = n as f64;
        let first = nf.powf(self.lower).max(2.0).ceil() as usize - 1;
        let last = (nf.powf(self.upper).floor() as usize)
            .min(n / 2 + 1)
            .saturating_sub(1);
        first..=last
    }

    /// Number of Fourier frequencies inside the band for a sample of length `n`.
    pub fn len(&self, n: usize) -> usize {
        let range = self.indices(n);
        if range.is_empty() {
            0
        } else {
            range.end() - range.start() + 1
        }
    }

    /// True when the band selects no frequency for a sample of length `n`.
    pub fn is_empty(&self, n: usize) -> bool {
        self.len(n) == 0
    }
}

impl Default for FrequencyBand {
    fn default() -> Self {
        Self {
            lower: 0.0,
            upper: 0.5,
        }
    }
}

/// Optimization algorithm used by the Whittle and likelihood estimators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OptimizerMethod {
    /// Derivative-free simplex search
    NelderMead,
    /// Limited-memory BFGS with finite-difference gradients
    Lbfgs,
}

/// Settings for the numerical optimizer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptimizerConfig {
    /// Algorithm
    pub method: OptimizerMethod,
    /// Iteration cap
    pub max_iters: u64,
    /// Convergence tolerance (simplex cost spread or gradient norm)
    pub tolerance: f64,
    /// Cost assigned where the objective is undefined
    pub penalty: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl OptimizerConfig {
    /// Loose tolerance and low iteration cap for exploratory runs
    pub fn fast() -> Self {
        Self {
            method: OptimizerMethod::NelderMead,
            max_iters: 200,
            tolerance: 1e-6,
            penalty: DEFAULT_PENALTY,
        }
    }

    /// Default settings
    pub fn standard() -> Self {
        Self {
            method: OptimizerMethod::NelderMead,
            max_iters: 1000,
            tolerance: 1e-10,
            penalty: DEFAULT_PENALTY,
        }
    }

    /// Tight tolerance for simulation studies
    pub fn precise() -> Self {
        Self {
            method: OptimizerMethod::NelderMead,
            max_iters: 5000,
            tolerance: 1e-14,
            penalty: DEFAULT_PENALTY,
        }
    }

    /// Same settings with a different algorithm
    pub fn with_method(mut self, method: OptimizerMethod) -> Self {
        self.method = method;
        self
    }

    /// Check that the settings can drive a solver.
    pub fn validate(&self) -> LongMemoryResult<()> {
        if self.max_iters == 0 {
            return Err(LongMemoryError::InvalidParameter {
                parameter: "max_iters".to_string(),
                value: 0.0,
                constraint: "must be > 0".to_string(),
            });
        }
        validate_parameter(self.tolerance, 0.0, f64::INFINITY, "tolerance")?;
        validate_parameter(self.penalty, 0.0, f64::INFINITY, "penalty")
    }
}

/// Linear-algebra route for the Gaussian likelihood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CovarianceSolver {
    /// Dense Toeplitz matrix with Cholesky factorization, O(T²) memory
    #[default]
    Cholesky,
    /// Durbin-Levinson recursion on the autocovariance sequence, O(T) memory
    DurbinLevinson,
}

/// Configuration of the maximum-likelihood estimators.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LikelihoodConfig {
    /// Route used to evaluate `log|V|` and `x'V⁻¹x`
    pub solver: CovarianceSolver,
    /// Optimizer settings
    pub optimizer: OptimizerConfig,
}

impl LikelihoodConfig {
    /// Durbin-Levinson evaluation with default optimizer settings, suited to
    /// long samples where a dense T×T matrix is impractical.
    pub fn durbin_levinson() -> Self {
        Self {
            solver: CovarianceSolver::DurbinLevinson,
            optimizer: OptimizerConfig::standard(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_rejects_inverted_exponents() {
        assert!(matches!(
            FrequencyBand::new(0.5, 0.5),
            Err(LongMemoryError::InvalidBand { .. })
        ));
        assert!(FrequencyBand::new(0.7, 0.6).is_err());
        assert!(FrequencyBand::new(-0.1, 0.5).is_err());
        assert!(FrequencyBand::new(0.0, 1.2).is_err());
        assert!(FrequencyBand::new(0.2, 0.8).is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialized_band_is_validated() {
        use serde::de::value::{Error as ValueError, MapDeserializer};
        use serde::Deserialize;

        let fields = |lower: f64, upper: f64| {
            MapDeserializer::<_, ValueError>::new(
                vec![("lower", lower), ("upper", upper)].into_iter(),
            )
        };
        let band = FrequencyBand::deserialize(fields(0.2, 0.7)).unwrap();
        assert_eq!(band, FrequencyBand::new(0.2, 0.7).unwrap());

        let inverted = FrequencyBand::deserialize(fields(0.7, 0.5));
        let message = inverted.unwrap_err().to_string();
        assert!(message.contains("band"), "message was: {}", message);
        assert!(FrequencyBand::deserialize(fields(0.0, 1.5)).is_err());
    }

    #[test]
    fn test_band_indices_exclude_zero_frequency() {
        let band = FrequencyBand::default();
        // n = 120: 1-based positions 2..=10
        let idx = band.indices(120);
        assert_eq!(*idx.start(), 1);
        assert_eq!(*idx.end(), 9);
        assert_eq!(band.len(120), 9);

        let trimmed = FrequencyBand::new(0.3, 0.5).unwrap();
        // 1000^0.3 ≈ 7.94 and 1000^0.5 ≈ 31.6
        let idx = trimmed.indices(1000);
        assert_eq!(*idx.start(), 7);
        assert_eq!(*idx.end(), 30);
    }

    #[test]
    fn test_band_empty_for_tiny_samples() {
        let band = FrequencyBand::default();
        assert!(band.is_empty(3));
        assert_eq!(band.len(3), 0);
    }

    #[test]
    fn test_optimizer_presets_validate() {
        assert!(OptimizerConfig::fast().validate().is_ok());
        assert!(OptimizerConfig::standard().validate().is_ok());
        assert!(OptimizerConfig::precise().validate().is_ok());

        let mut bad = OptimizerConfig::standard();
        bad.max_iters = 0;
        assert!(bad.validate().is_err());

        let mut bad = OptimizerConfig::standard();
        bad.penalty = f64::INFINITY;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_likelihood_config_defaults() {
        let config = LikelihoodConfig::default();
        assert_eq!(config.solver, CovarianceSolver::Cholesky);
        assert_eq!(config.optimizer.method, OptimizerMethod::NelderMead);
        assert_eq!(
            LikelihoodConfig::durbin_levinson().solver,
            CovarianceSolver::DurbinLevinson
        );
    }
}
