//! Configuration document errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PfsError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("Section [{0}] not found")]
    SectionNotFound(String),

    #[error("Key '{key}' not found in [{section}]")]
    KeyNotFound { section: String, key: String },

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, PfsError>;
