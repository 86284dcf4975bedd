//! Solver execution errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Failed to start solver '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Solver exited with {}: {stderr_tail}", exit_label(.code))]
    NonZeroExit {
        code: Option<i32>,
        stderr_tail: String,
    },

    #[error("Solver did not finish within {timeout_secs}s and was killed")]
    Timeout { timeout_secs: u64 },

    #[error("Solver run interrupted by user")]
    Interrupted,

    #[error("I/O error while supervising solver: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (killed by signal)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, RunnerError>;
