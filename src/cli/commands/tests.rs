//! Tests for CLI commands

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::Utc;
use tempfile::TempDir;

use super::*;
use crate::calibration::{load_context, plan_calibration};
use crate::config::{load_config, parse_args};
use crate::optim::{Direction, Trial, TrialStatus};
use crate::storage::{StoredTrial, StudyStore};

const SIMFILE: &str = "\
[FemEngineHD]
   [TIME]
      number_of_time_steps = 12
   EndSect  // TIME
   [HYDRODYNAMIC_MODULE]
      [BED_RESISTANCE]
         [MANNING_NUMBER]
            format = 2
            file_name = |manning.txt|
            item_number = 1
            item_name = 'manning'
         EndSect  // MANNING_NUMBER
      EndSect  // BED_RESISTANCE
   EndSect  // HYDRODYNAMIC_MODULE
EndSect  // FemEngineHD
";

const CONFIG: &str = r"
study:
  name: baltic
  storage: studies/baltic.db
  n_trials: 3
model:
  simfile: sea.m21fm
solver:
  executable: FemEngineHD
  result_file: Area.csv
zones:
  default: { low: 0.001, high: 81.101, step: 0.01 }
observations:
  - name: c2
    path: obs/c2.csv
";

fn model_dir() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("sea.m21fm"), SIMFILE).unwrap();
    fs::write(
        dir.path().join("manning.txt"),
        "# item: manning\n# elements: 5\n32\n45\n32\n20\n45\n",
    )
    .unwrap();
    fs::create_dir_all(dir.path().join("obs")).unwrap();
    fs::write(
        dir.path().join("obs/c2.csv"),
        "time,x,y,value\n2022-01-01 00:00:00,3.0,55.0,0.4\n2022-01-01 01:00:00,3.1,55.1,0.5\n",
    )
    .unwrap();
    let config = dir.path().join("calibration.yaml");
    fs::write(&config, CONFIG).unwrap();
    (dir, config)
}

fn cli(args: &[&str]) -> Cli {
    let mut full = vec!["manning-calibrator", "--quiet"];
    full.extend_from_slice(args);
    parse_args(full).unwrap()
}

fn no_interrupt() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(false))
}

fn stored(number: usize, status: TrialStatus, value: Option<f64>, error: Option<&str>) -> StoredTrial {
    let mut params = HashMap::new();
    params.insert("Manning zone 10".to_string(), 12.0);
    params.insert("Manning zone 2".to_string(), 40.5);
    params.insert("Manning zone 0".to_string(), 31.25);
    let mut attrs = BTreeMap::new();
    if let Some(e) = error {
        attrs.insert("error".to_string(), serde_json::json!(e));
    }
    StoredTrial {
        id: number as i64 + 1,
        trial: Trial {
            number,
            params,
            value,
            status,
        },
        attrs,
        started_at: Utc::now(),
        finished_at: Some(Utc::now()),
    }
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a rather long message", 8), "a rathe~");
}

#[test]
fn test_sorted_params_numeric_order() {
    let trial = stored(0, TrialStatus::Completed, Some(1.0), None);
    let names: Vec<&str> = sorted_params(&trial.trial.params)
        .into_iter()
        .map(|(n, _)| n)
        .collect();
    assert_eq!(names, vec!["Manning zone 0", "Manning zone 2", "Manning zone 10"]);
}

#[test]
fn test_format_zones_table() {
    let (_dir, config) = model_dir();
    let spec = load_config(&config).unwrap();
    let context = load_context(&spec).unwrap();

    let table = zones::format_zones(context.zones(), &spec.zones);
    assert!(table.starts_with("ZONE"));
    assert!(table.contains("Manning zone 0"));
    assert!(table.contains("step 0.01"));
    assert!(table.contains("3 zone(s) over 5 element(s)"));
}

#[test]
fn test_format_history_table() {
    let trials = vec![
        stored(0, TrialStatus::Completed, Some(0.123456789), None),
        stored(1, TrialStatus::Failed, None, Some("solver exited with code 3")),
    ];
    let table = history::format_history(&trials);
    assert!(table.contains("0.123457"));
    assert!(table.contains("failed"));
    assert!(table.contains("solver exited with code 3"));
    assert!(table.contains("2 trial(s)"));
}

#[test]
fn test_format_best() {
    let best = stored(4, TrialStatus::Completed, Some(0.25), None);
    let text = best::format_best(&best);
    assert!(text.contains("#4"));
    assert!(text.contains("0.250000"));
    let zone0 = text.find("Manning zone 0").unwrap();
    let zone10 = text.find("Manning zone 10").unwrap();
    assert!(zone0 < zone10);
}

#[test]
fn test_format_plan() {
    let (_dir, config) = model_dir();
    let spec = load_config(&config).unwrap();
    let plan = plan_calibration(&spec).unwrap();

    let text = calibrate::format_plan(&plan);
    assert!(text.contains("Study:     baltic"));
    assert!(text.contains("Zones:     3"));
    assert!(text.contains("Steps:     12"));
    assert!(text.contains("sea_trial_0.m21fm"));
    assert!(text.contains("c2"));
}

#[test]
fn test_validate_command() {
    let (dir, config) = model_dir();
    let args = cli(&["validate", config.to_str().unwrap()]);
    assert!(run_command(args, no_interrupt()).is_ok());

    fs::remove_file(dir.path().join("obs/c2.csv")).unwrap();
    let args = cli(&["validate", config.to_str().unwrap()]);
    let err = run_command(args, no_interrupt()).unwrap_err();
    assert!(err.contains("1 problem(s)"));
}

#[test]
fn test_zones_command() {
    let (_dir, config) = model_dir();
    let args = cli(&["zones", config.to_str().unwrap()]);
    assert!(run_command(args, no_interrupt()).is_ok());
}

#[test]
fn test_calibrate_dry_run_does_not_create_storage() {
    let (dir, config) = model_dir();
    let args = cli(&["calibrate", config.to_str().unwrap(), "--dry-run"]);
    assert!(run_command(args, no_interrupt()).is_ok());
    assert!(!dir.path().join("studies/baltic.db").exists());
}

#[test]
fn test_calibrate_rejects_invalid_overrides() {
    let (_dir, config) = model_dir();
    let args = cli(&["calibrate", config.to_str().unwrap(), "-n", "0", "--dry-run"]);
    let err = run_command(args, no_interrupt()).unwrap_err();
    assert!(err.contains("problem"));
}

#[test]
fn test_history_unknown_study() {
    let (_dir, config) = model_dir();
    let args = cli(&["history", config.to_str().unwrap()]);
    let err = run_command(args, no_interrupt()).unwrap_err();
    assert!(err.contains("baltic"));
}

#[test]
fn test_history_and_best_read_store() {
    let (dir, config) = model_dir();
    let store = StudyStore::open(dir.path().join("studies/baltic.db")).unwrap();
    let study = store
        .create_study("baltic", Direction::Minimize, false)
        .unwrap();
    let (trial_id, _) = store.create_trial(study.id).unwrap();
    let mut params = HashMap::new();
    params.insert("Manning zone 0".to_string(), 33.0);
    store.set_trial_params(trial_id, &params).unwrap();
    store
        .finish_trial(trial_id, TrialStatus::Completed, Some(0.5))
        .unwrap();
    drop(store);

    let path = config.to_str().unwrap();
    assert!(run_command(cli(&["history", path]), no_interrupt()).is_ok());
    assert!(run_command(cli(&["history", path, "-f", "json"]), no_interrupt()).is_ok());
    assert!(run_command(cli(&["best", path]), no_interrupt()).is_ok());
}

#[test]
fn test_missing_config_is_error() {
    let dir = TempDir::new().unwrap();
    let missing: &Path = &dir.path().join("absent.yaml");
    let args = cli(&["zones", missing.to_str().unwrap()]);
    let err = run_command(args, no_interrupt()).unwrap_err();
    assert!(err.starts_with("Config error"));
}
