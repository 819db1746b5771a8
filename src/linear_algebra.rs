//! Linear algebra for the estimators.
//!
//! Least squares through the normal equations, used by GPH and HAR, and the
//! two routes that evaluate the Gaussian quadratic quantities `log|V|` and
//! `x'V⁻¹x` of a stationary covariance matrix: a dense Cholesky factor of
//! the Toeplitz matrix, or the Durbin-Levinson recursion run directly on the
//! autocovariance sequence.

use crate::config::CovarianceSolver;
use crate::covariance::toeplitz_covariance;
use crate::errors::{LongMemoryError, LongMemoryResult};
use nalgebra::{DMatrix, DVector};

/// Validates that a vector contains no NaN or Inf values
fn ensure_finite_vector(v: &[f64], operation: &str) -> LongMemoryResult<()> {
    for (i, &val) in v.iter().enumerate() {
        if !val.is_finite() {
            return Err(LongMemoryError::NumericalError {
                reason: format!("Non-finite value ({}) at position [{}]", val, i),
                operation: Some(operation.to_string()),
            });
        }
    }
    Ok(())
}

/// Ordinary least squares solved through the normal equations
/// `(X'X) β = X'y`.
///
/// # Arguments
/// * `x` - Predictors as k vectors, each of length n (predictor-by-observation format)
///         x[predictor_idx][observation_idx]. Include a column of ones for an intercept.
/// * `y` - Response vector of length n
///
/// Returns the k coefficients in predictor order.
pub fn multiple_regression(x: &[Vec<f64>], y: &[f64]) -> LongMemoryResult<Vec<f64>> {
    let k = x.len();
    let n = y.len();

    if k == 0 {
        return Err(LongMemoryError::NumericalError {
            reason: "No predictors supplied".to_string(),
            operation: Some("multiple_regression".to_string()),
        });
    }
    if n < k {
        return Err(LongMemoryError::InsufficientData {
            required: k,
            actual: n,
        });
    }

    ensure_finite_vector(y, "multiple_regression")?;
    for (i, col) in x.iter().enumerate() {
        if col.len() != n {
            return Err(LongMemoryError::NumericalError {
                reason: format!("Predictor column {} has inconsistent length", i),
                operation: Some("multiple_regression".to_string()),
            });
        }
        ensure_finite_vector(col, "multiple_regression")?;
    }

    let xtx = DMatrix::from_fn(k, k, |i, j| {
        x[i].iter().zip(&x[j]).map(|(a, b)| a * b).sum::<f64>()
    });
    let xty = DVector::from_fn(k, |i, _| x[i].iter().zip(y).map(|(a, b)| a * b).sum::<f64>());

    let solution = match xtx.clone().cholesky() {
        Some(chol) => chol.solve(&xty),
        None => xtx.lu().solve(&xty).ok_or_else(|| LongMemoryError::NumericalError {
            reason: "Singular normal-equations matrix (collinear predictors)".to_string(),
            operation: Some("multiple_regression".to_string()),
        })?,
    };

    let coefficients: Vec<f64> = solution.iter().copied().collect();
    ensure_finite_vector(&coefficients, "multiple_regression")?;
    Ok(coefficients)
}

/// `log|V|` and `x'V⁻¹x` for a covariance matrix `V`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianQuadratic {
    /// Natural log of the determinant of `V`
    pub log_det: f64,
    /// Quadratic form `x'V⁻¹x`
    pub quad_form: f64,
}

fn validate_quadratic_inputs(acov: &[f64], x: &[f64], operation: &str) -> LongMemoryResult<()> {
    if x.is_empty() {
        return Err(LongMemoryError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    if acov.len() != x.len() {
        return Err(LongMemoryError::NumericalError {
            reason: format!(
                "Autocovariance length {} does not match series length {}",
                acov.len(),
                x.len()
            ),
            operation: Some(operation.to_string()),
        });
    }
    ensure_finite_vector(acov, operation)?;
    ensure_finite_vector(x, operation)
}

/// Gaussian quadratic quantities through the selected solver.
pub fn gaussian_quadratic(
    acov: &[f64],
    x: &[f64],
    solver: CovarianceSolver,
) -> LongMemoryResult<GaussianQuadratic> {
    match solver {
        CovarianceSolver::Cholesky => cholesky_quadratic(acov, x),
        CovarianceSolver::DurbinLevinson => durbin_levinson_quadratic(acov, x),
    }
}

/// Builds the Toeplitz matrix of `acov`, factors it as `LL'` and returns
/// `log|V| = 2 Σ ln L_ii` and `x'V⁻¹x = |L⁻¹x|²`.
pub fn cholesky_quadratic(acov: &[f64], x: &[f64]) -> LongMemoryResult<GaussianQuadratic> {
    validate_quadratic_inputs(acov, x, "cholesky_quadratic")?;
    let v = toeplitz_covariance(acov)?;
    let not_pd = || LongMemoryError::NotPositiveDefinite {
        operation: "cholesky_quadratic".to_string(),
    };

    let chol = v.cholesky().ok_or_else(not_pd)?;
    let l = chol.l();
    let log_det = 2.0 * l.diagonal().iter().map(|d| d.ln()).sum::<f64>();

    let rhs = DVector::from_column_slice(x);
    let z = l.solve_lower_triangular(&rhs).ok_or_else(not_pd)?;
    let quad_form = z.norm_squared();

    if !(log_det.is_finite() && quad_form.is_finite()) {
        return Err(not_pd());
    }
    Ok(GaussianQuadratic { log_det, quad_form })
}

/// Durbin-Levinson evaluation of `log|V|` and `x'V⁻¹x`.
///
/// Runs the one-step prediction recursion on `acov`: with prediction errors
/// `e_t` and their variances `v_t`, `log|V| = Σ ln v_t` and
/// `x'V⁻¹x = Σ e_t² / v_t`. O(T²) time and O(T) memory; no matrix is formed.
pub fn durbin_levinson_quadratic(acov: &[f64], x: &[f64]) -> LongMemoryResult<GaussianQuadratic> {
    validate_quadratic_inputs(acov, x, "durbin_levinson_quadratic")?;
    let not_pd = || LongMemoryError::NotPositiveDefinite {
        operation: "durbin_levinson_quadratic".to_string(),
    };

    let n = x.len();
    let mut v = acov[0];
    if !(v > 0.0) {
        return Err(not_pd());
    }
    let mut log_det = v.ln();
    let mut quad_form = x[0] * x[0] / v;

    // phi[j - 1] holds φ_{t,j}
    let mut phi: Vec<f64> = Vec::with_capacity(n);
    let mut previous: Vec<f64> = Vec::with_capacity(n);

    for t in 1..n {
        let partial: f64 = phi
            .iter()
            .enumerate()
            .map(|(j, &p)| p * acov[t - 1 - j])
            .sum();
        let reflection = (acov[t] - partial) / v;

        previous.clear();
        previous.extend_from_slice(&phi);
        for j in 0..previous.len() {
            phi[j] = previous[j] - reflection * previous[previous.len() - 1 - j];
        }
        phi.push(reflection);

        v *= 1.0 - reflection * reflection;
        if !(v > 0.0 && v.is_finite()) {
            return Err(not_pd());
        }

        let prediction: f64 = phi
            .iter()
            .enumerate()
            .map(|(j, &p)| p * x[t - 1 - j])
            .sum();
        let error = x[t] - prediction;
        log_det += v.ln();
        quad_form += error * error / v;
    }

    if !(log_det.is_finite() && quad_form.is_finite()) {
        return Err(not_pd());
    }
    Ok(GaussianQuadratic { log_det, quad_form })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covariance::{csa_acov, fi_acov};
    use assert_approx_eq::assert_approx_eq;

    fn test_series(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| ((i * 37 % 17) as f64 - 8.0) / 4.0 + (i as f64 * 0.3).cos())
            .collect()
    }

    #[test]
    fn test_multiple_regression_exact_fit() {
        let t: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let y: Vec<f64> = t.iter().map(|&v| 3.0 - 0.5 * v + 0.01 * v * v).collect();
        let x = vec![vec![1.0; 20], t.clone(), t.iter().map(|v| v * v).collect()];
        let beta = multiple_regression(&x, &y).unwrap();
        assert_approx_eq!(beta[0], 3.0, 1e-8);
        assert_approx_eq!(beta[1], -0.5, 1e-8);
        assert_approx_eq!(beta[2], 0.01, 1e-10);
    }

    #[test]
    fn test_multiple_regression_rejects_bad_design() {
        let y = vec![1.0, 2.0, 3.0];
        assert!(multiple_regression(&[], &y).is_err());
        assert!(multiple_regression(&[vec![1.0; 2]], &y).is_err());
        let collinear = vec![vec![1.0; 3], vec![2.0; 3]];
        assert!(multiple_regression(&collinear, &y).is_err());
        let short = vec![vec![1.0; 2], vec![1.0, 2.0]];
        assert!(matches!(
            multiple_regression(&short, &[1.0]),
            Err(LongMemoryError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_white_noise_quadratic() {
        let x = vec![1.0, -2.0, 0.5, 3.0];
        let acov = vec![2.0, 0.0, 0.0, 0.0];
        for solver in [CovarianceSolver::Cholesky, CovarianceSolver::DurbinLevinson] {
            let g = gaussian_quadratic(&acov, &x, solver).unwrap();
            assert_approx_eq!(g.log_det, 4.0 * 2.0_f64.ln(), 1e-12);
            assert_approx_eq!(g.quad_form, (1.0 + 4.0 + 0.25 + 9.0) / 2.0, 1e-12);
        }
    }

    #[test]
    fn test_solvers_agree_on_fi_covariance() {
        let n = 120;
        let x = test_series(n);
        for &d in &[-0.3, 0.1, 0.45] {
            let acov = fi_acov(n, d).unwrap();
            let chol = cholesky_quadratic(&acov, &x).unwrap();
            let dl = durbin_levinson_quadratic(&acov, &x).unwrap();
            assert_approx_eq!(chol.log_det, dl.log_det, 1e-8);
            assert_approx_eq!(chol.quad_form, dl.quad_form, 1e-8 * chol.quad_form);
        }
    }

    #[test]
    fn test_solvers_agree_on_csa_covariance() {
        let n = 80;
        let x = test_series(n);
        let acov = csa_acov(n, 1.4, 1.7).unwrap();
        let chol = cholesky_quadratic(&acov, &x).unwrap();
        let dl = durbin_levinson_quadratic(&acov, &x).unwrap();
        assert_approx_eq!(chol.log_det, dl.log_det, 1e-8);
        assert_approx_eq!(chol.quad_form, dl.quad_form, 1e-8 * chol.quad_form);
    }

    #[test]
    fn test_indefinite_covariance_is_reported() {
        let acov = vec![1.0, 2.0];
        let x = vec![1.0, 1.0];
        assert!(matches!(
            cholesky_quadratic(&acov, &x),
            Err(LongMemoryError::NotPositiveDefinite { .. })
        ));
        assert!(matches!(
            durbin_levinson_quadratic(&acov, &x),
            Err(LongMemoryError::NotPositiveDefinite { .. })
        ));
        assert!(cholesky_quadratic(&[1.0], &[1.0, 2.0]).is_err());
        assert!(durbin_levinson_quadratic(&[], &[]).is_err());
    }
}
