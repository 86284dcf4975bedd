//! Configuration errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {}", join_problems(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_problems(problems: &[ValidationError]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A single problem found by [`super::validate_config`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Study name cannot be empty")]
    EmptyStudyName,

    #[error("Invalid n_trials: {0} (must be > 0)")]
    InvalidTrialCount(usize),

    #[error("{what} does not exist: {path}")]
    PathNotFound { what: String, path: PathBuf },

    #[error("At least one observation source is required")]
    NoObservations,

    #[error("Duplicate observation name: {0}")]
    DuplicateObservation(String),

    #[error("Invalid bounds for {target}: {reason}")]
    InvalidBounds { target: String, reason: String },

    #[error("Invalid sampler setting: {0}")]
    InvalidSampler(String),

    #[error("Invalid solver timeout: 0 seconds")]
    ZeroTimeout,

    #[error("Invalid MPI process count: {0} (must be > 0)")]
    InvalidProcesses(usize),

    #[error("Solver result_file cannot be empty")]
    EmptyResultFile,

    #[error("Solver args must reference {{simfile}}")]
    MissingSimfileArg,

    #[error("Invalid max_distance: {0} (must be > 0)")]
    InvalidMaxDistance(f64),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
