//! Declarative calibration configuration
//!
//! A run is described by one YAML file:
//!
//! ```yaml
//! study:
//!   name: north-sea-2022
//!   n_trials: 40
//!   seed: 7
//!   sampler:
//!     kind: gaussian_process
//!     n_startup: 8
//! model:
//!   simfile: model/north_sea.m21fm
//!   manning_file: model/manning.txt
//! solver:
//!   executable: FemEngineHD
//!   mpi:
//!     processes: 8
//!   result_file: Area.csv
//!   timeout_secs: 7200
//! zones:
//!   default: { low: 0.001, high: 81.101, step: 0.01 }
//! observations:
//!   - name: c2
//!     path: obs/altimetry_c2.csv
//! ```

mod cli;
mod error;
mod loader;
mod schema;
mod validate;

#[cfg(test)]
mod tests;

pub use cli::{
    apply_overrides, parse_args, CalibrateArgs, Cli, Command, ConfigArgs, HistoryArgs,
    OutputFormat,
};
pub use error::{ConfigError, Result, ValidationError};
pub use loader::{load_config, load_validated};
pub use schema::{CalibrationSpec, ModelSection, ScoringSection, StudySection};
pub use validate::validate_config;
