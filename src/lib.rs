//! Manning calibrator
//!
//! Bayesian calibration of zoned Manning roughness for a hydrodynamic
//! model. Each trial writes a roughness field and a simulation file, runs
//! the external solver, and scores the simulated water levels against
//! satellite altimetry tracks. Trials are persisted so studies can be
//! inspected and resumed.
//!
//! # Modules
//!
//! - [`pfs`]: hierarchical simulation-file documents
//! - [`field`]: per-element roughness fields
//! - [`zones`]: zone discovery and the search space built from it
//! - [`optim`]: samplers (random, TPE, Gaussian process)
//! - [`storage`]: SQLite study and trial persistence
//! - [`runner`]: solver process execution
//! - [`observation`] and [`scoring`]: altimetry tracks and skill metrics
//! - [`calibration`]: the ask/tell loop tying everything together
//! - [`config`] and [`cli`]: YAML configuration and the command line

pub mod calibration;
pub mod cli;
pub mod config;
pub mod field;
pub mod io;
pub mod observation;
pub mod optim;
pub mod pfs;
pub mod runner;
pub mod scoring;
pub mod storage;
pub mod zones;
