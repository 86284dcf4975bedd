//! Best command implementation

use std::fmt::Write as _;

use crate::cli::LogLevel;
use crate::config::{load_config, ConfigArgs};
use crate::storage::{StoredTrial, StudyStore};

use super::sorted_params;

pub fn run_best(args: ConfigArgs, level: LogLevel) -> Result<(), String> {
    let spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    let store = StudyStore::open(spec.storage_path())
        .map_err(|e| format!("Failed to open study storage: {e}"))?;
    let study = store
        .get_study(&spec.study.name)
        .map_err(|e| format!("Failed to load study: {e}"))?;

    match store
        .best_trial(&study)
        .map_err(|e| format!("Failed to load trials: {e}"))?
    {
        Some(best) => {
            print!("{}", format_best(&best));
            Ok(())
        }
        None => {
            if level != LogLevel::Quiet {
                eprintln!("No completed trials for study '{}'", study.name);
            }
            Ok(())
        }
    }
}

pub(crate) fn format_best(best: &StoredTrial) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Trial:   #{}", best.trial.number);
    if let Some(value) = best.trial.value {
        let _ = writeln!(out, "Value:   {value:.6}");
    }
    if let Some(finished) = best.finished_at {
        let _ = writeln!(out, "Finished: {}", finished.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(simfile) = best.attrs.get("simfile").and_then(|v| v.as_str()) {
        let _ = writeln!(out, "Simfile: {simfile}");
    }
    let _ = writeln!(out, "Parameters:");
    for (name, value) in sorted_params(&best.trial.params) {
        let _ = writeln!(out, "  {name:<20} {value:.4}");
    }
    out
}
