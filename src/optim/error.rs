//! Sampler error types

use thiserror::Error;

/// Search-space and sampler errors
#[derive(Debug, Error)]
pub enum OptimError {
    #[error("Empty search space")]
    EmptySpace,

    #[error("Parameter not found: {0}")]
    ParameterNotFound(String),

    #[error("Invalid parameter value for {0}: {1}")]
    InvalidValue(String, f64),

    #[error("Invalid domain for {name}: {reason}")]
    InvalidDomain { name: String, reason: String },

    #[error("Duplicate parameter: {0}")]
    DuplicateParameter(String),

    #[error("Surrogate model error: {0}")]
    Surrogate(String),
}

/// Result type for sampler operations
pub type Result<T> = std::result::Result<T, OptimError>;
