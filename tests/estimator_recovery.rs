//! Monte Carlo recovery of the memory parameter from seeded FI(d) samples.
//!
//! Each check averages a handful of replications so the tolerances sit
//! several standard errors away from the truth.

use long_memory::{
    exact_whittle_estimate, fi_generate, fi_mle, gph_estimate, gph_variance, whittle_estimate,
    whittle_variance, FrequencyBand, LikelihoodConfig, OptimizerConfig, OptimizerMethod,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const REPLICATIONS: usize = 6;
const LENGTH: usize = 2048;

fn replications(d: f64, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..REPLICATIONS)
        .map(|_| fi_generate(LENGTH, d, 1.0, &mut rng).unwrap())
        .collect()
}

fn average(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[test]
fn test_gph_recovers_memory() {
    let band = FrequencyBand::with_upper(0.65).unwrap();
    for (d, seed) in [(0.3, 1u64), (-0.2, 2), (0.0, 3)] {
        let estimates: Vec<f64> = replications(d, seed)
            .iter()
            .map(|x| gph_estimate(x, &band, 0).unwrap())
            .collect();
        let mean = average(&estimates);
        assert!((mean - d).abs() < 0.1, "d = {}: mean GPH = {}", d, mean);
    }
}

#[test]
fn test_bias_reduced_gph_is_finite_and_close() {
    let band = FrequencyBand::with_upper(0.8).unwrap();
    let estimates: Vec<f64> = replications(0.25, 11)
        .iter()
        .map(|x| gph_estimate(x, &band, 2).unwrap())
        .collect();
    let mean = average(&estimates);
    assert!((mean - 0.25).abs() < 0.1, "mean bias-reduced GPH = {}", mean);
    assert!(gph_variance(LENGTH, &band, 2).unwrap() > gph_variance(LENGTH, &band, 0).unwrap());
}

#[test]
fn test_whittle_variants_agree_within_their_standard_error() {
    let band = FrequencyBand::with_upper(0.65).unwrap();
    let config = OptimizerConfig::standard();
    let se = whittle_variance(LENGTH, &band).unwrap().sqrt();

    for x in replications(0.35, 21) {
        let plain = whittle_estimate(&x, &band, &config).unwrap();
        let exact = exact_whittle_estimate(&x, &band, &config).unwrap();
        assert!(plain.convergence.converged);
        assert!(exact.convergence.converged);
        assert!(
            (plain.d - exact.d).abs() < 3.0 * se,
            "Whittle {} vs exact {} (se {})",
            plain.d,
            exact.d,
            se
        );
        assert!((plain.d - 0.35).abs() < 5.0 * se, "Whittle d = {}", plain.d);
    }
}

#[test]
fn test_whittle_with_lbfgs_matches_nelder_mead() {
    let band = FrequencyBand::with_upper(0.6).unwrap();
    let x = &replications(0.2, 31)[0];
    let nm = whittle_estimate(x, &band, &OptimizerConfig::standard()).unwrap();
    let lbfgs = whittle_estimate(
        x,
        &band,
        &OptimizerConfig::standard().with_method(OptimizerMethod::Lbfgs),
    )
    .unwrap();
    assert!((nm.d - lbfgs.d).abs() < 1e-3, "{} vs {}", nm.d, lbfgs.d);
}

#[test]
fn test_fi_mle_recovers_memory_and_scale() {
    let config = LikelihoodConfig::durbin_levinson();
    let mut rng = ChaCha8Rng::seed_from_u64(41);
    let mut d_hats = Vec::new();
    let mut sigma_hats = Vec::new();
    for _ in 0..3 {
        let x = fi_generate(1200, 0.3, 0.5, &mut rng).unwrap();
        let est = fi_mle(&x, &config).unwrap();
        assert!(est.d > -0.5 && est.d < 0.5);
        d_hats.push(est.d);
        sigma_hats.push(est.sigma);
    }
    let d_mean = average(&d_hats);
    let sigma_mean = average(&sigma_hats);
    assert!((d_mean - 0.3).abs() < 0.1, "mean MLE d = {}", d_mean);
    assert!((sigma_mean - 0.5).abs() < 0.05, "mean MLE sigma = {}", sigma_mean);
}
