//! Study store errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Study not found: {0}")]
    StudyNotFound(String),

    #[error("Study '{0}' already exists (enable load_if_exists to resume it)")]
    DuplicatedStudy(String),

    #[error("Study '{study}' was created to {stored}, cannot {requested}")]
    DirectionMismatch {
        study: String,
        stored: String,
        requested: String,
    },

    #[error("Trial not found: {0}")]
    TrialNotFound(i64),

    #[error("Invalid trial state: {0}")]
    InvalidState(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Backend(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
