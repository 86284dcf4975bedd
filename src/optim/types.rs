//! Core search-space and trial types

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::error::{OptimError, Result};

/// Rounding applied after snapping to a step grid so that `low + k * step`
/// does not carry binary noise into stored values.
const GRID_PRECISION: f64 = 1e10;

/// Bounded continuous range a parameter is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterDomain {
    pub low: f64,
    pub high: f64,
    /// Grid spacing anchored at `low`; `None` for a fully continuous range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default)]
    pub log_scale: bool,
}

impl ParameterDomain {
    /// Uniform continuous range
    pub fn new(low: f64, high: f64) -> Self {
        Self {
            low,
            high,
            step: None,
            log_scale: false,
        }
    }

    /// Set the grid spacing
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// Sample in log space
    pub fn with_log_scale(mut self) -> Self {
        self.log_scale = true;
        self
    }

    /// Check the domain is well formed
    pub fn validate(&self, name: &str) -> Result<()> {
        let invalid = |reason: &str| OptimError::InvalidDomain {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        if !self.low.is_finite() || !self.high.is_finite() {
            return Err(invalid("bounds must be finite"));
        }
        if self.low >= self.high {
            return Err(invalid("low must be smaller than high"));
        }
        if let Some(step) = self.step {
            if !(step.is_finite() && step > 0.0) {
                return Err(invalid("step must be positive"));
            }
            if step > self.high - self.low {
                return Err(invalid("step is wider than the range"));
            }
            if self.log_scale {
                return Err(invalid("step and log_scale are mutually exclusive"));
            }
        }
        if self.log_scale && self.low <= 0.0 {
            return Err(invalid("log_scale requires a positive lower bound"));
        }
        Ok(())
    }

    /// Sample a random value from this domain
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        self.from_unit(rng.random::<f64>())
    }

    /// Snap a raw value onto the step grid and into range
    pub fn snap(&self, value: f64) -> f64 {
        let clamped = value.clamp(self.low, self.high);
        match self.step {
            Some(step) => {
                let max_k = ((self.high - self.low) / step + 1e-9).floor();
                let k = ((clamped - self.low) / step).round().clamp(0.0, max_k);
                let snapped = self.low + k * step;
                (snapped * GRID_PRECISION).round() / GRID_PRECISION
            }
            None => clamped,
        }
    }

    /// Check if a value lies within this domain
    pub fn contains(&self, value: f64) -> bool {
        let eps = 1e-9 * (self.high - self.low).abs().max(1.0);
        value.is_finite() && value >= self.low - eps && value <= self.high + eps
    }

    /// Map a domain value onto `[0, 1]`
    pub fn to_unit(&self, value: f64) -> f64 {
        let u = if self.log_scale {
            (value.max(f64::MIN_POSITIVE).ln() - self.low.ln()) / (self.high.ln() - self.low.ln())
        } else {
            (value - self.low) / (self.high - self.low)
        };
        u.clamp(0.0, 1.0)
    }

    /// Map `[0, 1]` back onto the domain (snapped)
    pub fn from_unit(&self, unit: f64) -> f64 {
        let u = unit.clamp(0.0, 1.0);
        let raw = if self.log_scale {
            (self.low.ln() + u * (self.high.ln() - self.low.ln())).exp()
        } else {
            self.low + u * (self.high - self.low)
        };
        self.snap(raw)
    }
}

/// Ordered collection of named parameter domains
///
/// Insertion order is preserved so that seeded samplers visit parameters in
/// the same order on every run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchSpace {
    params: Vec<(String, ParameterDomain)>,
}

impl SearchSpace {
    /// Create an empty search space
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter to the search space
    pub fn add(&mut self, name: &str, domain: ParameterDomain) -> Result<()> {
        domain.validate(name)?;
        if self.get(name).is_some() {
            return Err(OptimError::DuplicateParameter(name.to_string()));
        }
        self.params.push((name.to_string(), domain));
        Ok(())
    }

    /// Get a parameter domain
    pub fn get(&self, name: &str) -> Option<&ParameterDomain> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, domain)| domain)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Iterate over parameters in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterDomain)> {
        self.params.iter().map(|(name, domain)| (name.as_str(), domain))
    }

    /// Sample a random configuration
    pub fn sample_random<R: Rng>(&self, rng: &mut R) -> HashMap<String, f64> {
        self.params
            .iter()
            .map(|(name, domain)| (name.clone(), domain.sample(rng)))
            .collect()
    }

    /// Validate a configuration against the space
    pub fn validate(&self, config: &HashMap<String, f64>) -> Result<()> {
        for (name, domain) in &self.params {
            match config.get(name) {
                Some(value) if domain.contains(*value) => {}
                Some(value) => return Err(OptimError::InvalidValue(name.clone(), *value)),
                None => return Err(OptimError::ParameterNotFound(name.clone())),
            }
        }
        Ok(())
    }

    /// Project a configuration onto the unit cube, in parameter order
    pub fn to_unit_vector(&self, config: &HashMap<String, f64>) -> Option<Vec<f64>> {
        self.params
            .iter()
            .map(|(name, domain)| config.get(name).map(|v| domain.to_unit(*v)))
            .collect()
    }

    /// Inverse of [`SearchSpace::to_unit_vector`]
    pub fn from_unit_vector(&self, unit: &[f64]) -> HashMap<String, f64> {
        self.params
            .iter()
            .zip(unit)
            .map(|((name, domain), u)| (name.clone(), domain.from_unit(*u)))
            .collect()
    }
}

/// Optimization direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Minimize,
    Maximize,
}

impl Direction {
    /// Convert an objective value so that smaller is always better
    pub fn to_loss(self, value: f64) -> f64 {
        match self {
            Direction::Minimize => value,
            Direction::Maximize => -value,
        }
    }

    /// True if `a` improves on `b`
    pub fn is_better(self, a: f64, b: f64) -> bool {
        self.to_loss(a) < self.to_loss(b)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Minimize => "minimize",
            Direction::Maximize => "maximize",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minimize" => Ok(Direction::Minimize),
            "maximize" => Ok(Direction::Maximize),
            other => Err(format!("unknown direction '{other}'")),
        }
    }
}

/// Trial lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrialStatus {
    Running,
    Completed,
    Failed,
    /// Stopped before producing a value, e.g. by an interrupt
    Pruned,
}

impl TrialStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TrialStatus::Running => "running",
            TrialStatus::Completed => "completed",
            TrialStatus::Failed => "failed",
            TrialStatus::Pruned => "pruned",
        }
    }
}

impl fmt::Display for TrialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrialStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "running" => Ok(TrialStatus::Running),
            "completed" => Ok(TrialStatus::Completed),
            "failed" => Ok(TrialStatus::Failed),
            "pruned" => Ok(TrialStatus::Pruned),
            other => Err(format!("unknown trial status '{other}'")),
        }
    }
}

/// A single trial (configuration + objective value)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    /// Sequence number within the study, starting at 0
    pub number: usize,
    /// Parameter configuration
    pub params: HashMap<String, f64>,
    /// Objective value, present only once completed
    pub value: Option<f64>,
    pub status: TrialStatus,
}

impl Trial {
    /// Create a new running trial
    pub fn new(number: usize, params: HashMap<String, f64>) -> Self {
        Self {
            number,
            params,
            value: None,
            status: TrialStatus::Running,
        }
    }

    /// Mark trial as complete with its objective value
    pub fn complete(&mut self, value: f64) {
        self.value = Some(value);
        self.status = TrialStatus::Completed;
    }

    /// Mark trial as failed; any value is discarded
    pub fn fail(&mut self) {
        self.value = None;
        self.status = TrialStatus::Failed;
    }

    /// Mark trial as pruned
    pub fn prune(&mut self) {
        self.value = None;
        self.status = TrialStatus::Pruned;
    }

    pub fn is_complete(&self) -> bool {
        self.status == TrialStatus::Completed && self.value.is_some()
    }

    /// Look up a sampled parameter
    pub fn param(&self, name: &str) -> Option<f64> {
        self.params.get(name).copied()
    }
}

/// Completed trials paired with their loss (smaller is better)
pub(crate) fn completed_losses(history: &[Trial], direction: Direction) -> Vec<(&Trial, f64)> {
    history
        .iter()
        .filter(|t| t.is_complete())
        .filter_map(|t| t.value.map(|v| (t, direction.to_loss(v))))
        .filter(|(_, loss)| loss.is_finite())
        .collect()
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_snapped_value_in_domain(
            low in 0.0f64..10.0,
            width in 0.5f64..100.0,
            step in 0.001f64..0.5,
            raw in -50.0f64..200.0,
        ) {
            let domain = ParameterDomain::new(low, low + width).with_step(step);
            let v = domain.snap(raw);
            prop_assert!(domain.contains(v));
        }

        #[test]
        fn prop_sample_validates(seed in any::<u64>()) {
            let mut space = SearchSpace::new();
            space.add("z0", ParameterDomain::new(0.001, 81.101).with_step(0.01)).unwrap();
            space.add("z1", ParameterDomain::new(10.0, 60.0)).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let config = space.sample_random(&mut rng);
            prop_assert!(space.validate(&config).is_ok());
        }
    }
}
