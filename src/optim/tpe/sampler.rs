//! TPE sampler core implementation

use rand::rngs::StdRng;
use std::collections::HashMap;

use crate::optim::error::{OptimError, Result};
use crate::optim::sampler::{seeded_rng, Sampler};
use crate::optim::types::{completed_losses, Direction, SearchSpace, Trial};

use super::kde::sample_ei_ratio;

/// Tree-structured Parzen Estimator sampler
///
/// Splits completed trials by the `gamma` quantile into "good" and "bad"
/// groups and picks, per parameter, the candidate maximising the ratio of
/// the two kernel densities. Works in unit-cube coordinates so step grids
/// and log scales are handled by the domain.
#[derive(Debug)]
pub struct TpeSampler {
    rng: StdRng,
    /// Quantile for splitting good/bad (default: 0.25)
    pub(crate) gamma: f64,
    /// Number of random trials before modelling starts
    pub(crate) n_startup: usize,
    /// KDE bandwidth in unit coordinates
    bandwidth: f64,
}

impl TpeSampler {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: seeded_rng(seed),
            gamma: 0.25,
            n_startup: 10,
            bandwidth: 0.1,
        }
    }

    /// Set gamma (quantile for splitting)
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma.clamp(0.01, 0.99);
        self
    }

    /// Set number of startup trials
    pub fn with_startup(mut self, n: usize) -> Self {
        self.n_startup = n.max(1);
        self
    }
}

impl Sampler for TpeSampler {
    fn sample(
        &mut self,
        space: &SearchSpace,
        history: &[Trial],
        direction: Direction,
    ) -> Result<HashMap<String, f64>> {
        if space.is_empty() {
            return Err(OptimError::EmptySpace);
        }

        let mut completed = completed_losses(history, direction);
        if completed.len() < self.n_startup.max(2) {
            return Ok(space.sample_random(&mut self.rng));
        }

        completed.sort_by(|a, b| a.1.total_cmp(&b.1));
        let n_good = ((completed.len() as f64) * self.gamma).ceil() as usize;
        let n_good = n_good.max(1).min(completed.len() - 1);
        let (good, bad) = completed.split_at(n_good);

        let mut config = HashMap::with_capacity(space.len());
        for (name, domain) in space.iter() {
            let coords = |group: &[(&Trial, f64)]| -> Vec<f64> {
                group
                    .iter()
                    .filter_map(|(t, _)| t.param(name))
                    .map(|v| domain.to_unit(v))
                    .collect()
            };
            let unit = sample_ei_ratio(&coords(good), &coords(bad), self.bandwidth, &mut self.rng);
            config.insert(name.to_string(), domain.from_unit(unit));
        }

        Ok(config)
    }

    fn name(&self) -> &'static str {
        "tpe"
    }
}
