//! Sampler trait, random sampling and sampler configuration

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::error::{OptimError, Result};
use super::gp::GpSampler;
use super::tpe::TpeSampler;
use super::types::{Direction, SearchSpace, Trial};

/// Proposes the next configuration given the trial history
pub trait Sampler: std::fmt::Debug {
    /// Sample one value per parameter of `space`
    ///
    /// `history` holds every trial of the study so far, failed ones
    /// included; implementations only learn from completed trials.
    fn sample(
        &mut self,
        space: &SearchSpace,
        history: &[Trial],
        direction: Direction,
    ) -> Result<HashMap<String, f64>>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Build a seeded RNG, falling back to OS entropy
pub(crate) fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Uniform random search
#[derive(Debug)]
pub struct RandomSampler {
    rng: StdRng,
}

impl RandomSampler {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: seeded_rng(seed),
        }
    }
}

impl Sampler for RandomSampler {
    fn sample(
        &mut self,
        space: &SearchSpace,
        _history: &[Trial],
        _direction: Direction,
    ) -> Result<HashMap<String, f64>> {
        if space.is_empty() {
            return Err(OptimError::EmptySpace);
        }
        Ok(space.sample_random(&mut self.rng))
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// Acquisition function for Bayesian optimization
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionFunction {
    /// Expected Improvement
    #[default]
    ExpectedImprovement,
    /// Lower confidence bound on the loss, `mu - kappa * sigma`
    UpperConfidenceBound { kappa: f64 },
    /// Probability of Improvement
    ProbabilityOfImprovement,
}

fn default_n_startup() -> usize {
    10
}

fn default_gamma() -> f64 {
    0.25
}

fn default_n_candidates() -> usize {
    512
}

/// Sampling strategy, selected in the calibration config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SamplerConfig {
    /// Uniform random search
    Random,
    /// Tree-structured Parzen Estimator
    Tpe {
        #[serde(default = "default_gamma")]
        gamma: f64,
        #[serde(default = "default_n_startup")]
        n_startup: usize,
    },
    /// Gaussian-process surrogate with an acquisition function
    GaussianProcess {
        #[serde(default = "default_n_startup")]
        n_startup: usize,
        #[serde(default)]
        acquisition: AcquisitionFunction,
        #[serde(default = "default_n_candidates")]
        n_candidates: usize,
    },
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig::GaussianProcess {
            n_startup: default_n_startup(),
            acquisition: AcquisitionFunction::default(),
            n_candidates: default_n_candidates(),
        }
    }
}

impl SamplerConfig {
    /// Instantiate the configured sampler
    pub fn build(&self, seed: Option<u64>) -> Box<dyn Sampler> {
        match self {
            SamplerConfig::Random => Box::new(RandomSampler::new(seed)),
            SamplerConfig::Tpe { gamma, n_startup } => Box::new(
                TpeSampler::new(seed)
                    .with_gamma(*gamma)
                    .with_startup(*n_startup),
            ),
            SamplerConfig::GaussianProcess {
                n_startup,
                acquisition,
                n_candidates,
            } => Box::new(
                GpSampler::new(seed)
                    .with_startup(*n_startup)
                    .with_acquisition(*acquisition)
                    .with_candidates(*n_candidates),
            ),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SamplerConfig::Random => "random",
            SamplerConfig::Tpe { .. } => "tpe",
            SamplerConfig::GaussianProcess { .. } => "gaussian_process",
        }
    }
}
