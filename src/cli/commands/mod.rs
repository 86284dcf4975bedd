//! CLI command implementations

mod best;
mod calibrate;
mod history;
mod validate;
mod zones;

#[cfg(test)]
mod tests;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::cli::LogLevel;
use crate::config::{Cli, Command};

/// Execute a CLI command based on the parsed arguments
///
/// `interrupt` is raised by the Ctrl-C handler and stops a running study.
pub fn run_command(cli: Cli, interrupt: Arc<AtomicBool>) -> Result<(), String> {
    let log_level = LogLevel::from_flags(cli.quiet, cli.verbose);

    match cli.command {
        Command::Calibrate(args) => calibrate::run_calibrate(args, log_level, interrupt),
        Command::Zones(args) => zones::run_zones(args, log_level),
        Command::Validate(args) => validate::run_validate(args, log_level),
        Command::History(args) => history::run_history(args, log_level),
        Command::Best(args) => best::run_best(args, log_level),
    }
}

/// Shorten `s` to at most `max` characters
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('~');
        out
    }
}

/// Parameters of a trial in zone order
pub(crate) fn sorted_params(params: &std::collections::HashMap<String, f64>) -> Vec<(&str, f64)> {
    let mut sorted: Vec<(&str, f64)> = params.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    // "Manning zone 10" must sort after "Manning zone 9"
    sorted.sort_by_key(|(name, _)| {
        let index = name
            .rsplit(' ')
            .next()
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(usize::MAX);
        (index, name.to_string())
    });
    sorted
}
