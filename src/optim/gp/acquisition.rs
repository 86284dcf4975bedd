//! Acquisition functions over a loss surface (smaller is better)

use crate::optim::sampler::AcquisitionFunction;

/// Error function, Abramowitz & Stegun 7.1.26 (|err| < 1.5e-7)
pub(crate) fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.327_591_1 * x);
    let poly = t
        * (0.254_829_592
            + t * (-0.284_496_736 + t * (1.421_413_741 + t * (-1.453_152_027 + t * 1.061_405_429))));
    sign * (1.0 - poly * (-x * x).exp())
}

pub(crate) fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

pub(crate) fn normal_pdf(z: f64) -> f64 {
    (-0.5 * z * z).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

impl AcquisitionFunction {
    /// Score a candidate with posterior `mean`/`std`; larger is more promising
    pub fn score(&self, mean: f64, std: f64, best_loss: f64) -> f64 {
        let std = std.max(1e-12);
        match *self {
            AcquisitionFunction::ExpectedImprovement => {
                let improvement = best_loss - mean;
                let z = improvement / std;
                improvement * normal_cdf(z) + std * normal_pdf(z)
            }
            AcquisitionFunction::ProbabilityOfImprovement => normal_cdf((best_loss - mean) / std),
            AcquisitionFunction::UpperConfidenceBound { kappa } => -(mean - kappa * std),
        }
    }
}
