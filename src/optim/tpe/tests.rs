//! Tests for the TPE sampler

use super::kde::kde_score;
use super::TpeSampler;
use crate::optim::error::OptimError;
use crate::optim::sampler::Sampler;
use crate::optim::types::{Direction, ParameterDomain, SearchSpace, Trial};

fn quadratic_space() -> SearchSpace {
    let mut space = SearchSpace::new();
    space.add("x", ParameterDomain::new(0.0, 10.0)).unwrap();
    space
}

fn run(sampler: &mut TpeSampler, space: &SearchSpace, n: usize) -> Vec<Trial> {
    let mut history = Vec::new();
    for number in 0..n {
        let params = sampler.sample(space, &history, Direction::Minimize).unwrap();
        let x = params["x"];
        let mut trial = Trial::new(number, params);
        trial.complete((x - 3.0).powi(2));
        history.push(trial);
    }
    history
}

#[test]
fn test_tpe_empty_space() {
    let mut tpe = TpeSampler::new(Some(0));
    let result = tpe.sample(&SearchSpace::new(), &[], Direction::Minimize);
    assert!(matches!(result, Err(OptimError::EmptySpace)));
}

#[test]
fn test_tpe_builder_clamps() {
    let tpe = TpeSampler::new(None).with_gamma(5.0).with_startup(0);
    assert_eq!(tpe.gamma, 0.99);
    assert_eq!(tpe.n_startup, 1);
}

#[test]
fn test_tpe_values_within_domain() {
    let space = quadratic_space();
    let mut tpe = TpeSampler::new(Some(3)).with_startup(5);
    for trial in run(&mut tpe, &space, 30) {
        assert!(space.validate(&trial.params).is_ok());
    }
}

#[test]
fn test_tpe_seeded_determinism() {
    let space = quadratic_space();
    let a = run(&mut TpeSampler::new(Some(11)).with_startup(4), &space, 20);
    let b = run(&mut TpeSampler::new(Some(11)).with_startup(4), &space, 20);
    assert_eq!(a, b);
}

#[test]
fn test_tpe_concentrates_near_optimum() {
    let space = quadratic_space();
    let history = run(&mut TpeSampler::new(Some(5)).with_startup(8), &space, 60);
    let best = history
        .iter()
        .filter_map(|t| t.value)
        .fold(f64::INFINITY, f64::min);
    assert!(best < 1.0, "best loss {best}");
}

#[test]
fn test_kde_score_empty_is_flat() {
    assert_eq!(kde_score(0.3, &[], 0.1), 1.0);
    assert!(kde_score(0.5, &[0.5], 0.1) > kde_score(0.9, &[0.5], 0.1));
}
