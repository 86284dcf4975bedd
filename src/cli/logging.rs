//! Logging utilities for CLI output

use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Log level for CLI output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Warnings and errors only, no progress bars
    Quiet,
    /// Normal output level
    Normal,
    /// Verbose output with additional details
    Verbose,
}

impl LogLevel {
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            LogLevel::Quiet
        } else if verbose {
            LogLevel::Verbose
        } else {
            LogLevel::Normal
        }
    }

    /// Maximum tracing level for this output level
    pub fn tracing_level(self) -> Level {
        match self {
            LogLevel::Quiet => Level::WARN,
            LogLevel::Normal => Level::INFO,
            LogLevel::Verbose => Level::DEBUG,
        }
    }

    pub fn shows_progress(self) -> bool {
        self != LogLevel::Quiet
    }
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the CLI flags when set.
pub fn init_tracing(level: LogLevel) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.tracing_level().as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("Failed to initialize logging: {e}"))
}

/// Print a message if the current level permits it
pub fn log(level: LogLevel, required: LogLevel, msg: &str) {
    if level != LogLevel::Quiet && (level == required || required == LogLevel::Normal) {
        println!("{msg}");
    }
}
