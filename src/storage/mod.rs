//! Study persistence
//!
//! Local-first SQLite storage in WAL mode. A study is keyed by its name so a
//! calibration can be stopped and resumed; trial numbers continue from the
//! highest number already stored.
//!
//! # Example
//!
//! ```
//! use manning_calibrator::optim::{Direction, TrialStatus};
//! use manning_calibrator::storage::StudyStore;
//! use std::collections::HashMap;
//!
//! let store = StudyStore::open_in_memory().unwrap();
//! let study = store.create_study("baltic", Direction::Minimize, true).unwrap();
//! let (trial_id, number) = store.create_trial(study.id).unwrap();
//! assert_eq!(number, 0);
//!
//! let params = HashMap::from([("Manning zone 0".to_string(), 32.0)]);
//! store.set_trial_params(trial_id, &params).unwrap();
//! store.finish_trial(trial_id, TrialStatus::Completed, Some(0.21)).unwrap();
//!
//! let best = store.best_trial(&study).unwrap().unwrap();
//! assert_eq!(best.trial.value, Some(0.21));
//! ```

mod error;
pub mod schema;
mod store;


pub use error::{Result, StorageError};
pub use store::{StoredTrial, StudyRecord, StudyStore, ERROR_ATTR};
