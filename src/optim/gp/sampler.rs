//! Gaussian-process Bayesian optimization sampler

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashMap;

use crate::optim::error::{OptimError, Result};
use crate::optim::sampler::{seeded_rng, AcquisitionFunction, Sampler};
use crate::optim::tpe::gaussian;
use crate::optim::types::{completed_losses, Direction, SearchSpace, Trial};

use super::model::GaussianProcess;

/// Length scales tried on every fit (unit-cube coordinates)
const LENGTH_SCALES: [f64; 6] = [0.05, 0.1, 0.2, 0.3, 0.5, 1.0];
/// Spread of local candidates around the incumbents
const LOCAL_SPREAD: f64 = 0.05;
/// Number of best trials local candidates are drawn around
const N_INCUMBENTS: usize = 3;

/// GP surrogate sampler
///
/// The first `n_startup` completed trials are drawn uniformly. Afterwards a
/// GP is fitted to the losses of all completed trials and the candidate
/// maximising the acquisition function is proposed. Half the candidates are
/// uniform over the unit cube, half are perturbations of the best trials.
#[derive(Debug)]
pub struct GpSampler {
    rng: StdRng,
    pub(crate) n_startup: usize,
    acquisition: AcquisitionFunction,
    pub(crate) n_candidates: usize,
}

impl GpSampler {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: seeded_rng(seed),
            n_startup: 10,
            acquisition: AcquisitionFunction::ExpectedImprovement,
            n_candidates: 512,
        }
    }

    /// Set number of random startup trials
    pub fn with_startup(mut self, n: usize) -> Self {
        self.n_startup = n.max(1);
        self
    }

    pub fn with_acquisition(mut self, acquisition: AcquisitionFunction) -> Self {
        self.acquisition = acquisition;
        self
    }

    pub fn with_candidates(mut self, n: usize) -> Self {
        self.n_candidates = n.max(2);
        self
    }

    fn candidates(&mut self, dims: usize, incumbents: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let mut out = Vec::with_capacity(self.n_candidates);
        for i in 0..self.n_candidates {
            if i % 2 == 1 && !incumbents.is_empty() {
                let base = &incumbents[(i / 2) % incumbents.len()];
                let point = base
                    .iter()
                    .map(|v| (v + gaussian(&mut self.rng) * LOCAL_SPREAD).clamp(0.0, 1.0))
                    .collect();
                out.push(point);
            } else {
                out.push((0..dims).map(|_| self.rng.random::<f64>()).collect());
            }
        }
        out
    }
}

impl Sampler for GpSampler {
    fn sample(
        &mut self,
        space: &SearchSpace,
        history: &[Trial],
        direction: Direction,
    ) -> Result<HashMap<String, f64>> {
        if space.is_empty() {
            return Err(OptimError::EmptySpace);
        }

        let mut observed: Vec<(Vec<f64>, f64)> = completed_losses(history, direction)
            .into_iter()
            .filter_map(|(t, loss)| space.to_unit_vector(&t.params).map(|u| (u, loss)))
            .collect();

        if observed.len() < self.n_startup {
            return Ok(space.sample_random(&mut self.rng));
        }

        let dims = space.len();
        let n = observed.len();
        let flat: Vec<f64> = observed.iter().flat_map(|(u, _)| u.iter().copied()).collect();
        let x = Array2::from_shape_vec((n, dims), flat)
            .map_err(|e| OptimError::Surrogate(format!("bad design matrix: {e}")))?;
        let y: Vec<f64> = observed.iter().map(|(_, loss)| *loss).collect();

        let gp = match GaussianProcess::fit_best(x, &y, &LENGTH_SCALES) {
            Ok(gp) => gp,
            Err(e) => {
                tracing::warn!("GP fit failed ({e}), falling back to random sampling");
                return Ok(space.sample_random(&mut self.rng));
            }
        };
        tracing::debug!(
            length_scale = gp.length_scale(),
            lml = gp.log_marginal_likelihood(),
            n_observed = n,
            "fitted GP surrogate"
        );

        observed.sort_by(|a, b| a.1.total_cmp(&b.1));
        let best_loss = observed[0].1;
        let incumbents: Vec<Vec<f64>> = observed
            .iter()
            .take(N_INCUMBENTS)
            .map(|(u, _)| u.clone())
            .collect();

        let mut best_point = incumbents[0].clone();
        let mut best_score = f64::NEG_INFINITY;
        for candidate in self.candidates(dims, &incumbents) {
            let (mean, std) = gp.predict(Array1::from(candidate.clone()).view());
            let score = self.acquisition.score(mean, std, best_loss);
            if score > best_score {
                best_score = score;
                best_point = candidate;
            }
        }

        Ok(space.from_unit_vector(&best_point))
    }

    fn name(&self) -> &'static str {
        "gaussian_process"
    }
}
