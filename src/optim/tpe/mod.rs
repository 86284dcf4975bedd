//! Tree-structured Parzen Estimator

mod kde;
mod sampler;

#[cfg(test)]
mod tests;

pub(crate) use kde::gaussian;
pub use sampler::TpeSampler;
