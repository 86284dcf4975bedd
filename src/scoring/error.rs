//! Scoring errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("Failed to load simulation result {path}: {message}")]
    ResultLoad { path: PathBuf, message: String },

    #[error("Simulation result {0} holds no values")]
    EmptyResult(PathBuf),

    #[error("No observation matched the simulation for track '{track}' (no overlapping times or positions)")]
    NoOverlap { track: String },

    #[error("No observation tracks configured")]
    NoObservations,
}

pub type Result<T> = std::result::Result<T, ScoreError>;
