//! Command-line interface types

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::schema::CalibrationSpec;

/// Manning calibrator: Bayesian calibration of seabed roughness zones
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "manning-calibrator")]
#[command(version)]
#[command(
    about = "Calibrate zoned Manning roughness of a hydrodynamic model against altimetry tracks"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run (or resume) a calibration study
    Calibrate(CalibrateArgs),

    /// Show the roughness zones found in the base Manning file
    Zones(ConfigArgs),

    /// Validate a configuration file without running anything
    Validate(ConfigArgs),

    /// List the trials of the configured study
    History(HistoryArgs),

    /// Show the best trial of the configured study
    Best(ConfigArgs),
}

/// Arguments for the calibrate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct CalibrateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Override number of trials for this session
    #[arg(short = 'n', long)]
    pub n_trials: Option<usize>,

    /// Override sampler seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override study name
    #[arg(long)]
    pub study: Option<String>,

    /// Refuse to resume an existing study with the same name
    #[arg(long)]
    pub fresh: bool,

    /// Prepare everything and print the plan without running the solver
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for commands that only need the config
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ConfigArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
}

/// Arguments for the history command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct HistoryArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Output format for listings
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {s}. Valid formats: text, json")),
        }
    }
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Apply command-line overrides to a CalibrationSpec
pub fn apply_overrides(spec: &mut CalibrationSpec, args: &CalibrateArgs) {
    if let Some(n) = args.n_trials {
        spec.study.n_trials = n;
    }
    if let Some(seed) = args.seed {
        spec.study.seed = Some(seed);
    }
    if let Some(name) = &args.study {
        spec.study.name = name.clone();
    }
    if args.fresh {
        spec.study.load_if_exists = false;
    }
}
