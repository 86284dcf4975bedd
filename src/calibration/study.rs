//! Ask/tell optimisation loop backed by the study store

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use super::context::TrialPhase;
use super::error::{CalibrationError, Result};
use crate::optim::{Direction, Sampler, SamplerConfig, SearchSpace, Trial, TrialStatus};
use crate::runner::RunnerError;
use crate::storage::{StudyRecord, StudyStore, ERROR_ATTR};

/// Attribute naming the phase a failed trial stopped in
pub const FAILED_PHASE_ATTR: &str = "failed_phase";

/// How to open a study
#[derive(Debug, Clone, PartialEq)]
pub struct StudyOptions {
    pub name: String,
    pub direction: Direction,
    pub load_if_exists: bool,
    pub fail_fast: bool,
    pub sampler: SamplerConfig,
    pub seed: Option<u64>,
}

impl StudyOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: Direction::Minimize,
            load_if_exists: true,
            fail_fast: false,
            sampler: SamplerConfig::default(),
            seed: None,
        }
    }
}

/// A sampled trial waiting for its objective value
#[derive(Debug, Clone, PartialEq)]
pub struct TrialHandle {
    id: i64,
    number: usize,
    params: HashMap<String, f64>,
}

impl TrialHandle {
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn params(&self) -> &HashMap<String, f64> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<f64> {
        self.params.get(name).copied()
    }
}

/// Objective value plus attributes stored with the trial
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrialReport {
    pub value: f64,
    pub attrs: BTreeMap<String, serde_json::Value>,
}

impl TrialReport {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
        self.attrs.insert(key.to_string(), value);
        self
    }
}

/// Evaluates one trial
pub trait Objective {
    fn evaluate(&mut self, trial: &TrialHandle) -> Result<TrialReport>;
}

impl<F> Objective for F
where
    F: FnMut(&TrialHandle) -> Result<TrialReport>,
{
    fn evaluate(&mut self, trial: &TrialHandle) -> Result<TrialReport> {
        self(trial)
    }
}

/// Outcome of one optimisation session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySummary {
    pub study: String,
    pub direction: Direction,
    /// Trials completed in this session
    pub completed: usize,
    /// Trials failed in this session
    pub failed: usize,
    /// Trials stored for the study, all sessions
    pub total_trials: usize,
    pub best: Option<Trial>,
}

/// A persisted optimisation study
#[derive(Debug)]
pub struct Study {
    store: StudyStore,
    record: StudyRecord,
    space: SearchSpace,
    sampler: Box<dyn Sampler>,
    history: Vec<Trial>,
    fail_fast: bool,
}

impl Study {
    /// Open the named study, creating it or resuming it per `options`
    ///
    /// On resume, trials left running by a dead session are marked failed
    /// and every stored trial becomes sampler history.
    pub fn open(store: StudyStore, space: SearchSpace, options: &StudyOptions) -> Result<Self> {
        let record = store.create_study(&options.name, options.direction, options.load_if_exists)?;
        store.fail_stale_trials(record.id)?;

        let history: Vec<Trial> = store
            .load_trials(record.id)?
            .into_iter()
            .map(|stored| stored.trial)
            .collect();
        let foreign = history
            .iter()
            .filter(|t| t.is_complete() && space.to_unit_vector(&t.params).is_none())
            .count();
        if foreign > 0 {
            tracing::warn!(
                study = %record.name,
                trials = foreign,
                "stored trials do not match the current zones and are ignored by the sampler"
            );
        }

        // resumed sessions continue the seeded sequence instead of replaying it
        let seed = options
            .seed
            .map(|s| s.wrapping_add(history.len() as u64));
        let sampler = options.sampler.build(seed);
        tracing::info!(
            study = %record.name,
            sampler = sampler.name(),
            previous_trials = history.len(),
            "study ready"
        );

        Ok(Self {
            store,
            record,
            space,
            sampler,
            history,
            fail_fast: options.fail_fast,
        })
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn direction(&self) -> Direction {
        self.record.direction
    }

    pub fn record(&self) -> &StudyRecord {
        &self.record
    }

    pub fn store(&self) -> &StudyStore {
        &self.store
    }

    pub fn space(&self) -> &SearchSpace {
        &self.space
    }

    /// All trials known to the study, including earlier sessions
    pub fn history(&self) -> &[Trial] {
        &self.history
    }

    /// Best completed trial so far
    pub fn best_trial(&self) -> Option<&Trial> {
        let direction = self.direction();
        self.history
            .iter()
            .filter(|t| t.is_complete())
            .fold(None, |best: Option<&Trial>, t| match (best, t.value) {
                (Some(b), Some(v)) if !direction.is_better(v, b.value.unwrap_or(v)) => Some(b),
                _ => Some(t),
            })
    }

    /// Start a trial and sample its parameters
    pub fn ask(&mut self) -> Result<TrialHandle> {
        let (id, number) = self.store.create_trial(self.record.id)?;
        tracing::debug!(trial = number, phase = %TrialPhase::Requested, "trial created");

        let direction = self.direction();
        let params = match self.sampler.sample(&self.space, &self.history, direction) {
            Ok(params) => params,
            Err(e) => {
                let error = CalibrationError::from(e);
                self.store_failure(id, number, HashMap::new(), &error)?;
                return Err(error);
            }
        };
        self.store.set_trial_params(id, &params)?;
        tracing::debug!(trial = number, phase = %TrialPhase::Sampling, ?params, "sampled");

        Ok(TrialHandle { id, number, params })
    }

    /// Record the outcome of a trial
    ///
    /// Returns the stored value, `None` for a trial that failed without
    /// stopping the study, or the error when the study must stop.
    pub fn tell(&mut self, handle: TrialHandle, outcome: Result<TrialReport>) -> Result<Option<f64>> {
        let report = match outcome {
            Ok(report) if report.value.is_finite() => report,
            Ok(report) => {
                return self.record_failure(handle, CalibrationError::NonFiniteObjective(report.value))
            }
            Err(error) => return self.record_failure(handle, error),
        };

        for (key, value) in &report.attrs {
            self.store.set_trial_attr(handle.id, key, value)?;
        }
        self.store
            .finish_trial(handle.id, TrialStatus::Completed, Some(report.value))?;

        let mut trial = Trial::new(handle.number, handle.params);
        trial.complete(report.value);
        self.history.push(trial);
        tracing::debug!(trial = handle.number, phase = %TrialPhase::Reported, "trial stored");
        Ok(Some(report.value))
    }

    fn record_failure(&mut self, handle: TrialHandle, error: CalibrationError) -> Result<Option<f64>> {
        self.store_failure(handle.id, handle.number, handle.params, &error)?;
        if error.is_trial_fatal() && !self.fail_fast {
            tracing::warn!(trial = handle.number, phase = %error.phase(), error = %error, "trial failed");
            Ok(None)
        } else {
            tracing::error!(trial = handle.number, phase = %error.phase(), error = %error, "stopping study");
            Err(error)
        }
    }

    /// Persist a failed (or interrupted) trial; it never carries a value
    fn store_failure(
        &mut self,
        id: i64,
        number: usize,
        params: HashMap<String, f64>,
        error: &CalibrationError,
    ) -> Result<()> {
        let status = if error.is_interrupt() {
            TrialStatus::Pruned
        } else {
            TrialStatus::Failed
        };
        self.store
            .set_trial_attr(id, ERROR_ATTR, &serde_json::Value::from(error.to_string()))?;
        self.store.set_trial_attr(
            id,
            FAILED_PHASE_ATTR,
            &serde_json::Value::from(error.phase().as_str()),
        )?;
        self.store.finish_trial(id, status, None)?;

        let mut trial = Trial::new(number, params);
        match status {
            TrialStatus::Pruned => trial.prune(),
            _ => trial.fail(),
        }
        self.history.push(trial);
        Ok(())
    }

    /// Run `n_trials` trials, stopping early on a study-level error
    pub fn optimize<O: Objective + ?Sized>(
        &mut self,
        objective: &mut O,
        n_trials: usize,
        interrupt: &AtomicBool,
    ) -> Result<StudySummary> {
        let (mut completed, mut failed) = (0, 0);
        for i in 0..n_trials {
            if interrupt.load(Ordering::SeqCst) {
                return Err(RunnerError::Interrupted.into());
            }

            let handle = self.ask()?;
            let number = handle.number();
            tracing::info!(trial = number, session_trial = i + 1, of = n_trials, "running trial");
            let outcome = objective.evaluate(&handle);
            match self.tell(handle, outcome)? {
                Some(value) => {
                    completed += 1;
                    let best = self.best_trial().and_then(|t| t.value).unwrap_or(value);
                    tracing::info!(trial = number, value, best, "trial finished");
                }
                None => failed += 1,
            }
        }
        Ok(self.summary(completed, failed))
    }

    fn summary(&self, completed: usize, failed: usize) -> StudySummary {
        StudySummary {
            study: self.record.name.clone(),
            direction: self.direction(),
            completed,
            failed,
            total_trials: self.history.len(),
            best: self.best_trial().cloned(),
        }
    }
}
