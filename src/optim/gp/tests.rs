//! Tests for the GP surrogate and sampler

use approx::assert_abs_diff_eq;
use ndarray::{array, Array1, Array2};

use super::acquisition::{erf, normal_cdf};
use super::model::cholesky;
use super::{GaussianProcess, GpSampler};
use crate::optim::error::OptimError;
use crate::optim::sampler::{AcquisitionFunction, Sampler};
use crate::optim::types::{Direction, ParameterDomain, SearchSpace, Trial};

fn two_zone_space() -> SearchSpace {
    let mut space = SearchSpace::new();
    space
        .add("Manning zone 0", ParameterDomain::new(0.001, 81.101).with_step(0.01))
        .unwrap();
    space
        .add("Manning zone 1", ParameterDomain::new(0.001, 81.101).with_step(0.01))
        .unwrap();
    space
}

fn objective(params: &std::collections::HashMap<String, f64>) -> f64 {
    let a = params["Manning zone 0"];
    let b = params["Manning zone 1"];
    ((a - 32.0) / 81.0).powi(2) + ((b - 45.0) / 81.0).powi(2)
}

fn run(sampler: &mut GpSampler, space: &SearchSpace, n: usize) -> Vec<Trial> {
    let mut history = Vec::new();
    for number in 0..n {
        let params = sampler.sample(space, &history, Direction::Minimize).unwrap();
        let value = objective(&params);
        let mut trial = Trial::new(number, params);
        trial.complete(value);
        history.push(trial);
    }
    history
}

#[test]
fn test_erf_known_values() {
    assert_abs_diff_eq!(erf(0.0), 0.0, epsilon = 1e-7);
    assert_abs_diff_eq!(erf(1.0), 0.842_700_79, epsilon = 1e-6);
    assert_abs_diff_eq!(erf(-1.0), -0.842_700_79, epsilon = 1e-6);
    assert_abs_diff_eq!(normal_cdf(0.0), 0.5, epsilon = 1e-7);
}

#[test]
fn test_cholesky_reconstructs() {
    let m = array![[4.0, 2.0], [2.0, 3.0]];
    let l = cholesky(&m).unwrap();
    let rebuilt = l.dot(&l.t());
    for (a, b) in rebuilt.iter().zip(m.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
    }
}

#[test]
fn test_cholesky_rejects_indefinite() {
    let m = array![[1.0, 2.0], [2.0, 1.0]];
    assert!(cholesky(&m).is_none());
}

#[test]
fn test_gp_interpolates_training_points() {
    let x = Array2::from_shape_vec((3, 1), vec![0.1, 0.5, 0.9]).unwrap();
    let y = [1.0, 0.2, 0.8];
    let gp = GaussianProcess::fit(x, &y, 0.3).unwrap();

    let (mean, std) = gp.predict(Array1::from(vec![0.5]).view());
    assert_abs_diff_eq!(mean, 0.2, epsilon = 1e-3);
    assert!(std < 1e-2);

    let (_, far_std) = gp.predict(Array1::from(vec![0.3]).view());
    assert!(far_std > std);
}

#[test]
fn test_gp_duplicate_points_fit() {
    let x = Array2::from_shape_vec((2, 1), vec![0.4, 0.4]).unwrap();
    assert!(GaussianProcess::fit(x, &[0.3, 0.3], 0.2).is_ok());
}

#[test]
fn test_gp_fit_rejects_mismatch() {
    let x = Array2::from_shape_vec((2, 1), vec![0.1, 0.2]).unwrap();
    assert!(matches!(
        GaussianProcess::fit(x, &[1.0], 0.2),
        Err(OptimError::Surrogate(_))
    ));
}

#[test]
fn test_expected_improvement_prefers_low_mean() {
    let ei = AcquisitionFunction::ExpectedImprovement;
    assert!(ei.score(0.1, 0.05, 0.2) > ei.score(0.3, 0.05, 0.2));
    assert!(ei.score(0.2, 0.2, 0.2) > ei.score(0.2, 0.01, 0.2));

    let lcb = AcquisitionFunction::UpperConfidenceBound { kappa: 2.0 };
    assert!(lcb.score(0.1, 0.0, 0.0) > lcb.score(0.2, 0.0, 0.0));
}

#[test]
fn test_gp_sampler_empty_space() {
    let mut gp = GpSampler::new(Some(0));
    let result = gp.sample(&SearchSpace::new(), &[], Direction::Minimize);
    assert!(matches!(result, Err(OptimError::EmptySpace)));
}

#[test]
fn test_gp_sampler_seeded_determinism() {
    let space = two_zone_space();
    let a = run(&mut GpSampler::new(Some(42)).with_startup(4).with_candidates(64), &space, 12);
    let b = run(&mut GpSampler::new(Some(42)).with_startup(4).with_candidates(64), &space, 12);
    assert_eq!(a, b);
}

#[test]
fn test_gp_sampler_stays_on_grid() {
    let space = two_zone_space();
    let history = run(&mut GpSampler::new(Some(9)).with_startup(3).with_candidates(64), &space, 10);
    for trial in &history {
        assert!(space.validate(&trial.params).is_ok());
        for v in trial.params.values() {
            let k = (v - 0.001) / 0.01;
            assert_abs_diff_eq!(k, k.round(), epsilon = 1e-6);
        }
    }
}

#[test]
fn test_gp_sampler_improves_on_startup() {
    let space = two_zone_space();
    let history = run(&mut GpSampler::new(Some(1)).with_startup(5).with_candidates(256), &space, 25);
    let best_startup = history[..5]
        .iter()
        .filter_map(|t| t.value)
        .fold(f64::INFINITY, f64::min);
    let best_overall = history
        .iter()
        .filter_map(|t| t.value)
        .fold(f64::INFINITY, f64::min);
    assert!(best_overall <= best_startup);
    assert!(best_overall < 0.02, "best {best_overall}");
}
