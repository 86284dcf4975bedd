//! Calibrate command implementation

use std::fmt::Write as _;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::calibration::{plan_calibration, run_calibration, CalibrationPlan, StudySummary};
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{apply_overrides, load_config, validate_config, CalibrateArgs};

use super::sorted_params;

pub fn run_calibrate(
    args: CalibrateArgs,
    level: LogLevel,
    interrupt: Arc<AtomicBool>,
) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("Calibrating with config: {}", args.config.display()),
    );

    let mut spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    apply_overrides(&mut spec, &args);

    let problems = validate_config(&spec);
    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("  - {problem}");
        }
        return Err(format!("Config has {} problem(s)", problems.len()));
    }

    if args.dry_run {
        let plan = plan_calibration(&spec).map_err(|e| format!("Dry run failed: {e}"))?;
        print!("{}", format_plan(&plan));
        return Ok(());
    }

    let summary = run_calibration(&spec, interrupt, level.shows_progress())
        .map_err(|e| format!("Calibration failed: {e}"))?;
    log(level, LogLevel::Normal, format_summary(&summary).trim_end());
    Ok(())
}

pub(crate) fn format_plan(plan: &CalibrationPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Study:     {}", plan.study);
    let _ = writeln!(out, "Sampler:   {}", plan.sampler);
    let _ = writeln!(out, "Trials:    {}", plan.n_trials);
    let _ = writeln!(out, "Elements:  {}", plan.n_elements);
    let _ = writeln!(out, "Zones:     {}", plan.n_zones);
    let _ = writeln!(out, "Steps:     {}", plan.expected_steps);
    let _ = writeln!(out, "Storage:   {}", plan.storage.display());
    let _ = writeln!(out, "Command:   {}", plan.command);
    let _ = writeln!(out, "Tracks:");
    for (name, n) in &plan.tracks {
        let _ = writeln!(out, "  {name:<20} {n} point(s)");
    }
    out
}

pub(crate) fn format_summary(summary: &StudySummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Study '{}': {} completed, {} failed this session ({} trial(s) total)",
        summary.study, summary.completed, summary.failed, summary.total_trials
    );
    match &summary.best {
        Some(best) => {
            let _ = writeln!(
                out,
                "Best trial #{} ({}): {:.6}",
                best.number,
                summary.direction,
                best.value.unwrap_or(f64::NAN)
            );
            for (name, value) in sorted_params(&best.params) {
                let _ = writeln!(out, "  {name:<20} {value:.4}");
            }
        }
        None => {
            let _ = writeln!(out, "No completed trials yet");
        }
    }
    out
}
