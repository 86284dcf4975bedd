//! Field file errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Item '{item}' not found in {path} (file holds '{found}')")]
    ItemNotFound {
        path: PathBuf,
        item: String,
        found: String,
    },

    #[error("{path} declares {declared} elements but holds {actual}")]
    ElementCount {
        path: PathBuf,
        declared: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, FieldError>;
