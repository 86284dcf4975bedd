//! Calibration error taxonomy

use std::path::PathBuf;
use thiserror::Error;

use super::context::TrialPhase;
use crate::field::FieldError;
use crate::observation::ObservationError;
use crate::optim::OptimError;
use crate::pfs::PfsError;
use crate::runner::RunnerError;
use crate::scoring::ScoreError;
use crate::storage::StorageError;
use crate::zones::ZoneError;

/// Failure while writing a trial's input files
#[derive(Debug, Error)]
pub enum MutatorError {
    #[error("Roughness file: {0}")]
    Field(#[from] FieldError),

    #[error("Simulation file: {0}")]
    Pfs(#[from] PfsError),

    #[error(transparent)]
    Zones(#[from] ZoneError),

    #[error("Trial parameters lack '{0}'")]
    MissingParameter(String),

    #[error("Cannot derive a trial path from {0}")]
    InvalidPath(PathBuf),

    #[error("Failed to resolve {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("Failed to write trial inputs: {0}")]
    Mutator(#[from] MutatorError),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("Scoring failed: {0}")]
    Score(#[from] ScoreError),

    #[error("Objective returned a non-finite value: {0}")]
    NonFiniteObjective(f64),

    #[error("Base roughness file: {0}")]
    Field(#[from] FieldError),

    #[error("Base simulation file: {0}")]
    Pfs(#[from] PfsError),

    #[error(transparent)]
    Zones(#[from] ZoneError),

    #[error("Observations: {0}")]
    Observation(#[from] ObservationError),

    #[error("Study storage: {0}")]
    Storage(#[from] StorageError),

    #[error("Sampler: {0}")]
    Sampler(#[from] OptimError),
}

impl CalibrationError {
    /// True when only the current trial is lost and the study can go on
    pub fn is_trial_fatal(&self) -> bool {
        match self {
            CalibrationError::Mutator(_)
            | CalibrationError::Score(_)
            | CalibrationError::NonFiniteObjective(_) => true,
            CalibrationError::Runner(e) => !matches!(e, RunnerError::Interrupted),
            _ => false,
        }
    }

    pub fn is_interrupt(&self) -> bool {
        matches!(self, CalibrationError::Runner(RunnerError::Interrupted))
    }

    /// Trial phase the error belongs to
    pub fn phase(&self) -> TrialPhase {
        match self {
            CalibrationError::Sampler(_) => TrialPhase::Sampling,
            // trial inputs are written as the first step of a run
            CalibrationError::Mutator(_) | CalibrationError::Runner(_) => TrialPhase::Running,
            CalibrationError::Score(_) | CalibrationError::NonFiniteObjective(_) => {
                TrialPhase::Scoring
            }
            _ => TrialPhase::Requested,
        }
    }
}

pub type Result<T> = std::result::Result<T, CalibrationError>;
