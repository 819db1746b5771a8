//! Properties of fractional and CSA differencing through the public API.

use assert_approx_eq::assert_approx_eq;
use long_memory::{
    csa_filter, csadiff, fi_generate, fracdiff, fractional_filter, linear_convolve,
    DifferencingOrder, IntegerOrder,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn test_identity_and_first_difference() {
    let mut rng = ChaCha8Rng::seed_from_u64(10);
    let x = fi_generate(300, 0.2, 1.0, &mut rng).unwrap();

    assert_eq!(fracdiff(&x, 0.0).unwrap(), x);

    let diff = fracdiff(&x, 1.0).unwrap();
    assert_eq!(diff.len(), x.len() - 1);
    for (t, v) in diff.iter().enumerate() {
        assert_eq!(*v, x[t + 1] - x[t]);
    }
    assert_eq!(
        DifferencingOrder::try_from(1.0).unwrap().output_len(x.len()),
        diff.len()
    );
}

#[test]
fn test_half_difference_of_constant() {
    let out = fracdiff(&[1.0, 1.0, 1.0], 0.5).unwrap();
    assert_approx_eq!(out[0], 1.0, 1e-12);
    assert_approx_eq!(out[1], 0.5, 1e-12);
    assert_approx_eq!(out[2], 0.375, 1e-12);
}

#[test]
fn test_fractional_length_is_preserved() {
    let x: Vec<f64> = (0..777).map(|i| (i as f64 * 0.11).sin()).collect();
    for d in [-0.45, -0.1, 0.25, 0.49, 1.5] {
        assert_eq!(fracdiff(&x, d).unwrap().len(), x.len());
    }
    assert_eq!(
        DifferencingOrder::try_from(0.0).unwrap(),
        DifferencingOrder::Integer(IntegerOrder::Zero)
    );
}

#[test]
fn test_differencing_matches_direct_convolution() {
    let x: Vec<f64> = (0..150).map(|i| ((i * 31) % 17) as f64 - 8.0).collect();
    let d = 0.37;
    let taps = fractional_filter(x.len(), d).unwrap();
    let fast = fracdiff(&x, d).unwrap();
    for t in [0usize, 1, 10, 75, 149] {
        let direct: f64 = (0..=t).map(|k| taps[k] * x[t - k]).sum();
        assert_approx_eq!(fast[t], direct, 1e-9);
    }
}

#[test]
fn test_differencing_undoes_integration() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let x = fi_generate(512, 0.0, 1.0, &mut rng).unwrap();
    let integrated = fracdiff(&x, -0.4).unwrap();
    let recovered = fracdiff(&integrated, 0.4).unwrap();
    for (a, b) in recovered.iter().zip(&x) {
        assert_approx_eq!(*a, *b, 1e-8);
    }
}

#[test]
fn test_csadiff_zero_series_and_linearity() {
    let zeros = vec![0.0; 100];
    for v in csadiff(&zeros, 1.2, 1.9).unwrap() {
        assert_approx_eq!(v, 0.0, 1e-14);
    }

    let a: Vec<f64> = (0..64).map(|i| (i as f64 * 0.4).cos()).collect();
    let b: Vec<f64> = (0..64).map(|i| ((i * 13) % 7) as f64).collect();
    let sum: Vec<f64> = a.iter().zip(&b).map(|(x, y)| 2.0 * x + y).collect();
    let lhs = csadiff(&sum, 1.5, 1.5).unwrap();
    let fa = csadiff(&a, 1.5, 1.5).unwrap();
    let fb = csadiff(&b, 1.5, 1.5).unwrap();
    for t in 0..64 {
        assert_approx_eq!(lhs[t], 2.0 * fa[t] + fb[t], 1e-9);
    }

    let taps = csa_filter(64, 1.5, 1.5).unwrap();
    let via_convolution = linear_convolve(&a, &taps).unwrap();
    for (x, y) in fa.iter().zip(&via_convolution) {
        assert_approx_eq!(*x, *y, 1e-12);
    }
}
