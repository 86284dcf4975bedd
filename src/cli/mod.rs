//! CLI module
//!
//! Command handlers return `Result<(), String>`; the binary maps errors to
//! a non-zero exit code.

mod commands;
mod logging;

pub use commands::run_command;
pub use logging::{init_tracing, LogLevel};

// Re-export Cli from config for convenience
pub use crate::config::Cli;
