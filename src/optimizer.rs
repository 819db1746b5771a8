//! Unconstrained minimization backed by `argmin`.
//!
//! Estimators hand this module a closure returning `LongMemoryResult<f64>`.
//! Evaluations that fail, or return a non-finite value, are replaced by the
//! configured finite penalty so the solver keeps moving away from them; the
//! number of such replacements is reported in [`Convergence`].

use crate::config::{OptimizerConfig, OptimizerMethod};
use crate::errors::{LongMemoryError, LongMemoryResult};
use argmin::core::{
    CostFunction, Executor, Gradient, State, TerminationReason, TerminationStatus,
};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::neldermead::NelderMead;
use argmin::solver::quasinewton::LBFGS;
use finitediff::FiniteDiff;
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Offset of the initial simplex vertices from the starting point.
const INITIAL_SIMPLEX_STEP: f64 = 0.1;

/// Restarts of Nelder-Mead from its best point, each with a halved simplex.
const MAX_SIMPLEX_RESTARTS: usize = 4;

/// History length kept by L-BFGS.
const LBFGS_MEMORY: usize = 7;

/// Termination report attached to every optimized estimate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Convergence {
    /// True when the solver met its tolerance before the iteration cap
    pub converged: bool,
    /// Human-readable termination status reported by the solver
    pub status: String,
    /// Iterations performed
    pub iterations: u64,
    /// Objective value at the returned point
    pub objective: f64,
    /// Evaluations replaced by the penalty value
    pub penalty_hits: usize,
}

struct PenalizedObjective<'a, F> {
    objective: &'a F,
    penalty: f64,
    penalty_hits: &'a AtomicUsize,
}

impl<F> Clone for PenalizedObjective<'_, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F> Copy for PenalizedObjective<'_, F> {}

impl<F> PenalizedObjective<'_, F>
where
    F: Fn(&[f64]) -> LongMemoryResult<f64>,
{
    fn evaluate(&self, param: &[f64]) -> f64 {
        match (self.objective)(param) {
            Ok(value) if value.is_finite() => value.min(self.penalty),
            Ok(_) | Err(_) => {
                self.penalty_hits.fetch_add(1, Ordering::Relaxed);
                self.penalty
            }
        }
    }
}

impl<F> CostFunction for PenalizedObjective<'_, F>
where
    F: Fn(&[f64]) -> LongMemoryResult<f64>,
{
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        Ok(self.evaluate(param))
    }
}

impl<F> Gradient for PenalizedObjective<'_, F>
where
    F: Fn(&[f64]) -> LongMemoryResult<f64>,
{
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, param: &Self::Param) -> Result<Self::Gradient, argmin::core::Error> {
        Ok(param.central_diff(&|p: &Vec<f64>| self.evaluate(p)))
    }
}

fn initial_simplex(x0: &[f64], step: f64) -> Vec<Vec<f64>> {
    let mut simplex = Vec::with_capacity(x0.len() + 1);
    simplex.push(x0.to_vec());
    for i in 0..x0.len() {
        let mut vertex = x0.to_vec();
        vertex[i] += step;
        simplex.push(vertex);
    }
    simplex
}

/// Best point, cost and termination of a single solver run.
struct RunOutcome {
    param: Option<Vec<f64>>,
    cost: f64,
    status: TerminationStatus,
    iterations: u64,
}

impl RunOutcome {
    fn from_state<S>(state: &S) -> Self
    where
        S: State<Param = Vec<f64>, Float = f64>,
    {
        Self {
            param: state.get_best_param().cloned(),
            cost: state.get_best_cost(),
            status: state.get_termination_status().clone(),
            iterations: state.get_iter(),
        }
    }
}

fn is_converged(status: &TerminationStatus) -> bool {
    matches!(
        status,
        TerminationStatus::Terminated(
            TerminationReason::SolverConverged | TerminationReason::TargetCostReached
        )
    )
}

fn run_nelder_mead<F>(
    problem: PenalizedObjective<'_, F>,
    x0: &[f64],
    step: f64,
    tolerance: f64,
    max_iters: u64,
) -> LongMemoryResult<RunOutcome>
where
    F: Fn(&[f64]) -> LongMemoryResult<f64>,
{
    let solver = NelderMead::new(initial_simplex(x0, step)).with_sd_tolerance(tolerance)?;
    let result = Executor::new(problem, solver)
        .configure(|state| state.max_iters(max_iters))
        .run()?;
    Ok(RunOutcome::from_state(result.state()))
}

/// Nelder-Mead followed by restarts from the best point with a halved
/// simplex, until a restart no longer lowers the cost by more than the
/// tolerance.
///
/// The cost-spread test alone accepts a simplex whose vertices straddle the
/// minimum at equal cost; the restart moves off such a simplex.
fn nelder_mead_with_restarts<F>(
    problem: PenalizedObjective<'_, F>,
    x0: &[f64],
    tolerance: f64,
    max_iters: u64,
) -> LongMemoryResult<RunOutcome>
where
    F: Fn(&[f64]) -> LongMemoryResult<f64>,
{
    let mut step = INITIAL_SIMPLEX_STEP;
    let mut run = run_nelder_mead(problem, x0, step, tolerance, max_iters)?;

    for _ in 0..MAX_SIMPLEX_RESTARTS {
        let remaining = max_iters.saturating_sub(run.iterations);
        let start = match &run.param {
            Some(param) if remaining > 0 && is_converged(&run.status) => param.clone(),
            _ => break,
        };
        step *= 0.5;
        let restart = run_nelder_mead(problem, &start, step, tolerance, remaining)?;
        let iterations = run.iterations + restart.iterations;
        let improvement = run.cost - restart.cost;
        log::debug!(
            "simplex restart from {:?} (step {}) improved the cost by {:e}",
            start,
            step,
            improvement
        );
        if restart.cost <= run.cost {
            run = RunOutcome {
                iterations,
                ..restart
            };
        } else {
            run.iterations = iterations;
        }
        if !(improvement > tolerance) {
            break;
        }
    }
    Ok(run)
}

/// Minimize `objective` starting from `x0`.
///
/// Returns the best point found and its [`Convergence`] report. A run that
/// stops at the iteration cap still returns its best point, flagged as not
/// converged.
///
/// # Errors
/// [`LongMemoryError::OptimizationFailed`] when the solver cannot be
/// configured, aborts, or never finds a point where the objective is
/// defined.
pub fn minimize<F>(
    objective: F,
    x0: Vec<f64>,
    config: &OptimizerConfig,
) -> LongMemoryResult<(Vec<f64>, Convergence)>
where
    F: Fn(&[f64]) -> LongMemoryResult<f64>,
{
    config.validate()?;
    if x0.is_empty() || x0.iter().any(|v| !v.is_finite()) {
        return Err(LongMemoryError::OptimizationFailed {
            reason: format!("starting point must be non-empty and finite, got {:?}", x0),
        });
    }

    let penalty_hits = AtomicUsize::new(0);
    let problem = PenalizedObjective {
        objective: &objective,
        penalty: config.penalty,
        penalty_hits: &penalty_hits,
    };
    log::debug!(
        "starting {:?} from {:?} (max_iters = {}, tolerance = {:e})",
        config.method,
        x0,
        config.max_iters,
        config.tolerance
    );

    let max_iters = config.max_iters;
    let outcome = match config.method {
        OptimizerMethod::NelderMead => {
            nelder_mead_with_restarts(problem, &x0, config.tolerance, max_iters)?
        }
        OptimizerMethod::Lbfgs => {
            let solver = LBFGS::new(MoreThuenteLineSearch::new(), LBFGS_MEMORY)
                .with_tolerance_grad(config.tolerance)?
                .with_tolerance_cost(config.tolerance)?;
            let result = Executor::new(problem, solver)
                .configure(|state| state.param(x0.clone()).max_iters(max_iters))
                .run()?;
            RunOutcome::from_state(result.state())
        }
    };
    let RunOutcome {
        param: best_param,
        cost: best_cost,
        status,
        iterations,
    } = outcome;

    let penalty_hits = penalty_hits.load(Ordering::Relaxed);
    let best_param = best_param.ok_or_else(|| LongMemoryError::OptimizationFailed {
        reason: "solver returned no parameter".to_string(),
    })?;
    if !best_cost.is_finite() || best_cost >= config.penalty {
        return Err(LongMemoryError::OptimizationFailed {
            reason: format!(
                "objective undefined at every evaluated point ({} penalty hits)",
                penalty_hits
            ),
        });
    }

    let converged = is_converged(&status);
    if !converged {
        log::warn!(
            "{:?} stopped without converging after {} iterations: {:?}",
            config.method,
            iterations,
            status
        );
    }
    if penalty_hits > 0 {
        log::warn!(
            "objective was undefined at {} evaluated points and replaced by the penalty",
            penalty_hits
        );
    }
    log::debug!(
        "finished at {:?} with objective {} after {} iterations",
        best_param,
        best_cost,
        iterations
    );

    Ok((
        best_param,
        Convergence {
            converged,
            status: format!("{:?}", status),
            iterations,
            objective: best_cost,
            penalty_hits,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn rosenbrock(p: &[f64]) -> LongMemoryResult<f64> {
        Ok((1.0 - p[0]).powi(2) + 100.0 * (p[1] - p[0] * p[0]).powi(2))
    }

    #[test]
    fn test_nelder_mead_one_dimensional_quadratic() {
        let (x, report) = minimize(
            |p| Ok((p[0] - 0.3).powi(2) + 1.0),
            vec![0.0],
            &OptimizerConfig::standard(),
        )
        .unwrap();
        assert_approx_eq!(x[0], 0.3, 1e-4);
        assert!(report.converged, "status: {}", report.status);
        assert_approx_eq!(report.objective, 1.0, 1e-8);
        assert_eq!(report.penalty_hits, 0);
    }

    #[test]
    fn test_nelder_mead_rosenbrock() {
        let (x, report) =
            minimize(rosenbrock, vec![-1.2, 1.0], &OptimizerConfig::precise()).unwrap();
        assert_approx_eq!(x[0], 1.0, 1e-3);
        assert_approx_eq!(x[1], 1.0, 1e-3);
        assert!(report.iterations > 0);
    }

    #[test]
    fn test_lbfgs_smooth_quadratic() {
        let config = OptimizerConfig::standard().with_method(OptimizerMethod::Lbfgs);
        let (x, report) = minimize(
            |p| Ok((p[0] - 1.5).powi(2) + 2.0 * (p[1] + 0.5).powi(2)),
            vec![0.0, 0.0],
            &config,
        )
        .unwrap();
        assert_approx_eq!(x[0], 1.5, 1e-4);
        assert_approx_eq!(x[1], -0.5, 1e-4);
        assert!(report.objective < 1e-8);
    }

    #[test]
    fn test_failed_evaluations_become_penalties() {
        // Undefined left of zero: the solver must stay in the valid region
        let objective = |p: &[f64]| {
            if p[0] < 0.0 {
                Err(LongMemoryError::NotPositiveDefinite {
                    operation: "test".to_string(),
                })
            } else {
                Ok((p[0] - 0.05).powi(2))
            }
        };
        let (x, report) = minimize(objective, vec![0.5], &OptimizerConfig::standard()).unwrap();
        assert!(x[0] >= 0.0);
        assert_approx_eq!(x[0], 0.05, 1e-3);
        assert!(report.penalty_hits > 0);
    }

    #[test]
    fn test_simplex_straddling_the_minimum_is_restarted() {
        // The first simplex {0.0, 0.1} has equal cost at both vertices
        let (x, report) = minimize(
            |p| Ok((p[0] - 0.05).powi(2)),
            vec![0.0],
            &OptimizerConfig::standard(),
        )
        .unwrap();
        assert_approx_eq!(x[0], 0.05, 1e-3);
        assert!(report.objective < 1e-6);
        assert!(report.converged, "status: {}", report.status);
    }

    #[test]
    fn test_iteration_cap_reports_not_converged() {
        let mut config = OptimizerConfig::standard();
        config.max_iters = 3;
        let (_, report) = minimize(rosenbrock, vec![-1.2, 1.0], &config).unwrap();
        assert!(!report.converged);
        assert_eq!(report.iterations, 3);
    }

    #[test]
    fn test_invalid_inputs() {
        let ok = |_: &[f64]| -> LongMemoryResult<f64> { Ok(0.0) };
        assert!(minimize(ok, vec![], &OptimizerConfig::standard()).is_err());
        assert!(minimize(ok, vec![f64::NAN], &OptimizerConfig::standard()).is_err());
        let always_fails = |_: &[f64]| -> LongMemoryResult<f64> {
            Err(LongMemoryError::NotPositiveDefinite {
                operation: "test".to_string(),
            })
        };
        assert!(matches!(
            minimize(always_fails, vec![0.0], &OptimizerConfig::fast()),
            Err(LongMemoryError::OptimizationFailed { .. })
        ));
    }
}
