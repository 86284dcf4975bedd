//! Validate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, validate_config, ConfigArgs, ValidationError};

pub fn run_validate(args: ConfigArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("Validating config: {}", args.config.display()),
    );

    let spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    let problems = validate_config(&spec);
    if problems.is_empty() {
        log(level, LogLevel::Normal, "Configuration is valid");
        log(
            level,
            LogLevel::Verbose,
            &format!(
                "  Study: {} ({} trials, {} sampler)",
                spec.study.name,
                spec.study.n_trials,
                spec.study.sampler.kind()
            ),
        );
        return Ok(());
    }

    eprint!("{}", format_problems(&problems));
    Err(format!("Config has {} problem(s)", problems.len()))
}

pub(crate) fn format_problems(problems: &[ValidationError]) -> String {
    problems
        .iter()
        .map(|p| format!("  - {p}\n"))
        .collect::<String>()
}
