//! Manning calibrator CLI
//!
//! # Usage
//!
//! ```bash
//! # Check a config before a long run
//! manning-calibrator validate calibration.yaml
//!
//! # Inspect the roughness zones of the base model
//! manning-calibrator zones calibration.yaml
//!
//! # Run (or resume) the study with 20 more trials
//! manning-calibrator calibrate calibration.yaml -n 20
//!
//! # Inspect results
//! manning-calibrator history calibration.yaml --format json
//! manning-calibrator best calibration.yaml
//! ```

use clap::Parser;
use manning_calibrator::cli::{init_tracing, run_command, Cli, LogLevel};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(LogLevel::from_flags(cli.quiet, cli.verbose)) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = interrupt.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    }) {
        tracing::warn!("Ctrl-C handler unavailable: {e}");
    }

    match run_command(cli, interrupt) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
