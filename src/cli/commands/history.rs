//! History command implementation

use std::fmt::Write as _;

use crate::cli::LogLevel;
use crate::config::{load_config, HistoryArgs, OutputFormat};
use crate::storage::{StoredTrial, StudyStore};

use super::truncate;

pub fn run_history(args: HistoryArgs, level: LogLevel) -> Result<(), String> {
    let spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    let store = StudyStore::open(spec.storage_path())
        .map_err(|e| format!("Failed to open study storage: {e}"))?;
    let study = store
        .get_study(&spec.study.name)
        .map_err(|e| format!("Failed to load study: {e}"))?;
    let trials = store
        .load_trials(study.id)
        .map_err(|e| format!("Failed to load trials: {e}"))?;

    if trials.is_empty() {
        if level != LogLevel::Quiet {
            eprintln!("No trials found for study '{}'", study.name);
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&trials)
                .map_err(|e| format!("JSON serialization failed: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Text => print!("{}", format_history(&trials)),
    }
    Ok(())
}

pub(crate) fn format_history(trials: &[StoredTrial]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} {:<10} {:<14} {:<20} {:<30}",
        "NUMBER", "STATUS", "VALUE", "STARTED", "ERROR"
    );
    let _ = writeln!(out, "{}", "-".repeat(86));
    for stored in trials {
        let value = stored
            .trial
            .value
            .map_or_else(|| "-".to_string(), |v| format!("{v:.6}"));
        let _ = writeln!(
            out,
            "{:<8} {:<10} {:<14} {:<20} {:<30}",
            stored.trial.number,
            stored.trial.status,
            value,
            stored.started_at.format("%Y-%m-%d %H:%M:%S"),
            truncate(stored.error().unwrap_or(""), 30)
        );
    }
    let _ = writeln!(out, "\n{} trial(s)", trials.len());
    out
}
