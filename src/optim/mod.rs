//! Parameter sampling for Manning-zone calibration
//!
//! Bayesian optimization with a Gaussian-process surrogate (default), a
//! Tree-structured Parzen Estimator, or plain random search. Every sampler
//! is seeded so a study can be replayed exactly.
//!
//! # Example
//!
//! ```
//! use manning_calibrator::optim::{Direction, ParameterDomain, Sampler, SamplerConfig, SearchSpace};
//!
//! let mut space = SearchSpace::new();
//! space.add("Manning zone 0", ParameterDomain::new(0.001, 81.101).with_step(0.01)).unwrap();
//!
//! let mut sampler = SamplerConfig::default().build(Some(42));
//! let params = sampler.sample(&space, &[], Direction::Minimize).unwrap();
//! assert!(space.validate(&params).is_ok());
//! ```
//!
//! # References
//!
//! \[1\] Bergstra et al. (2011) - Algorithms for Hyper-Parameter Optimization (TPE)
//! \[2\] Rasmussen & Williams (2006) - Gaussian Processes for Machine Learning

mod error;
mod gp;
mod sampler;
mod tpe;
mod types;

pub use error::{OptimError, Result};
pub use gp::{GaussianProcess, GpSampler};
pub use sampler::{AcquisitionFunction, RandomSampler, Sampler, SamplerConfig};
pub use tpe::TpeSampler;
pub use types::{Direction, ParameterDomain, SearchSpace, Trial, TrialStatus};
