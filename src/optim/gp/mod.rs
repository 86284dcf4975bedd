//! Gaussian-process surrogate sampler
//!
//! The GP is refitted from scratch on every suggestion.

mod acquisition;
mod model;
mod sampler;

#[cfg(test)]
mod tests;

pub use model::GaussianProcess;
pub use sampler::GpSampler;
