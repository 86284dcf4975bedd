//! Tests for config loading, validation and CLI parsing

use super::*;
use crate::optim::{AcquisitionFunction, Direction, SamplerConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MINIMAL: &str = r"
study:
  name: baltic
model:
  simfile: sea.m21fm
solver:
  executable: FemEngineHD
  result_file: Area.csv
observations:
  - name: c2
    path: obs/c2.csv
";

fn write_config(dir: &TempDir, yaml: &str) -> PathBuf {
    let path = dir.path().join("calibration.yaml");
    fs::write(&path, yaml).unwrap();
    path
}

fn touch(dir: &Path, rel: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "").unwrap();
}

#[test]
fn test_load_minimal_config_defaults() {
    let dir = TempDir::new().unwrap();
    let spec = load_config(write_config(&dir, MINIMAL)).unwrap();

    assert_eq!(spec.study.name, "baltic");
    assert_eq!(spec.study.n_trials, 50);
    assert_eq!(spec.study.direction, Direction::Minimize);
    assert!(spec.study.load_if_exists);
    assert!(!spec.study.fail_fast);
    assert_eq!(spec.study.sampler.kind(), "gaussian_process");
    assert_eq!(spec.model.item, "manning");
    assert_eq!(spec.zones.default.low, 0.001);
    assert_eq!(spec.zones.default.high, 81.101);
    assert_eq!(spec.zones.default.step, Some(0.01));
    assert_eq!(spec.solver.args, vec!["{simfile}"]);
    assert_eq!(spec.observations[0].time_column, "time");
}

#[test]
fn test_paths_resolve_against_config_dir() {
    let dir = TempDir::new().unwrap();
    let spec = load_config(write_config(&dir, MINIMAL)).unwrap();

    assert_eq!(spec.simfile_path(), dir.path().join("sea.m21fm"));
    assert_eq!(spec.storage_path(), dir.path().join("calibration.db"));
    assert_eq!(spec.manning_path(), None);
    assert_eq!(spec.executable_path(), PathBuf::from("FemEngineHD"));
}

#[test]
fn test_relative_config_path_gives_absolute_paths() {
    let dir = TempDir::new_in(".").unwrap();
    let config = write_config(&dir, &MINIMAL.replace("FemEngineHD", "./bin/solver"));
    assert!(config.is_relative());

    let spec = load_config(&config).unwrap();
    assert!(spec.base_dir.is_absolute());
    assert!(spec.simfile_path().is_absolute());
    assert!(spec.simfile_path().ends_with("sea.m21fm"));
    assert!(spec.executable_path().is_absolute());
    assert!(spec.executable_path().ends_with("bin/solver"));
}

#[test]
fn test_load_full_config() {
    let yaml = r#"
study:
  name: north-sea
  storage: db/studies.db
  n_trials: 12
  seed: 7
  load_if_exists: "false"
  fail_fast: "true"
  sampler:
    kind: gaussian_process
    n_startup: 4
    acquisition:
      upper_confidence_bound:
        kappa: 2.0
model:
  simfile: model/sea.m21fm
  manning_file: model/manning.txt
  work_dir: runs
solver:
  executable: ./bin/engine
  args: ["{simfile}", "-e"]
  mpi:
    processes: 8
  timeout_secs: 3600
  result_file: Area.csv
zones:
  default: { low: 1.0, high: 60.0, step: 0.5 }
  overrides:
    2: { low: 20.0, high: 40.0 }
observations:
  - name: c2
    path: obs/c2.csv
    time_column: datetime
    value_column: adt
scoring:
  max_distance: 5000.0
"#;
    let dir = TempDir::new().unwrap();
    let spec = load_config(write_config(&dir, yaml)).unwrap();

    assert!(!spec.study.load_if_exists);
    assert!(spec.study.fail_fast);
    assert_eq!(
        spec.study.sampler,
        SamplerConfig::GaussianProcess {
            n_startup: 4,
            acquisition: AcquisitionFunction::UpperConfidenceBound { kappa: 2.0 },
            n_candidates: 512,
        }
    );
    assert_eq!(spec.zones.for_zone(2).low, 20.0);
    assert_eq!(spec.zones.for_zone(0).step, Some(0.5));
    assert_eq!(spec.solver.mpi.as_ref().unwrap().processes, 8);
    assert_eq!(spec.executable_path(), dir.path().join("./bin/engine"));
    assert_eq!(spec.work_dir(), Some(dir.path().join("runs")));
    assert_eq!(spec.observations[0].value_column, "adt");
    assert_eq!(spec.scoring.max_distance, Some(5000.0));
}

#[test]
fn test_invalid_lenient_bool() {
    let yaml = MINIMAL.replace("name: baltic", "name: baltic\n  fail_fast: \"maybe\"");
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        load_config(write_config(&dir, &yaml)),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        load_config(dir.path().join("nope.yaml")),
        Err(ConfigError::Read { .. })
    ));
}

#[test]
fn test_validate_reports_missing_paths() {
    let dir = TempDir::new().unwrap();
    let spec = load_config(write_config(&dir, MINIMAL)).unwrap();
    let problems = validate_config(&spec);
    assert_eq!(problems.len(), 2);
    assert!(problems
        .iter()
        .all(|p| matches!(p, ValidationError::PathNotFound { .. })));

    touch(dir.path(), "sea.m21fm");
    touch(dir.path(), "obs/c2.csv");
    assert!(validate_config(&spec).is_empty());
    assert!(load_validated(dir.path().join("calibration.yaml")).is_ok());
}

#[test]
fn test_validate_collects_all_problems() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "sea.m21fm");
    touch(dir.path(), "obs/c2.csv");
    let mut spec = load_config(write_config(&dir, MINIMAL)).unwrap();

    spec.study.name = " ".to_string();
    spec.study.n_trials = 0;
    spec.study.sampler = SamplerConfig::Tpe {
        gamma: 1.5,
        n_startup: 5,
    };
    spec.zones.default.low = 100.0;
    spec.solver.args = vec!["-e".to_string()];
    spec.solver.timeout_secs = Some(0);
    spec.observations.push(spec.observations[0].clone());
    spec.scoring.max_distance = Some(-1.0);

    let problems = validate_config(&spec);
    assert!(problems.contains(&ValidationError::EmptyStudyName));
    assert!(problems.contains(&ValidationError::InvalidTrialCount(0)));
    assert!(problems.contains(&ValidationError::MissingSimfileArg));
    assert!(problems.contains(&ValidationError::ZeroTimeout));
    assert!(problems.contains(&ValidationError::DuplicateObservation("c2".to_string())));
    assert!(problems.contains(&ValidationError::InvalidMaxDistance(-1.0)));
    assert!(problems
        .iter()
        .any(|p| matches!(p, ValidationError::InvalidSampler(_))));
    assert!(problems
        .iter()
        .any(|p| matches!(p, ValidationError::InvalidBounds { .. })));

    let err = ConfigError::Invalid(problems);
    assert!(err.to_string().contains("Study name cannot be empty"));
}

#[test]
fn test_parse_calibrate_args() {
    let cli = parse_args([
        "manning-calibrator",
        "calibrate",
        "cfg.yaml",
        "-n",
        "5",
        "--seed",
        "42",
        "--study",
        "retry",
        "--fresh",
        "-v",
    ])
    .unwrap();

    assert!(cli.verbose);
    match cli.command {
        Command::Calibrate(args) => {
            assert_eq!(args.config, PathBuf::from("cfg.yaml"));
            assert_eq!(args.n_trials, Some(5));
            assert_eq!(args.seed, Some(42));
            assert!(args.fresh);
            assert!(!args.dry_run);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_parse_history_format() {
    let cli = parse_args(["manning-calibrator", "history", "cfg.yaml", "--format", "json"]).unwrap();
    assert!(matches!(
        cli.command,
        Command::History(HistoryArgs {
            format: OutputFormat::Json,
            ..
        })
    ));
    assert!(parse_args(["manning-calibrator", "history", "cfg.yaml", "-f", "xml"]).is_err());
}

#[test]
fn test_parse_requires_command() {
    assert!(parse_args(["manning-calibrator"]).is_err());
    assert!(parse_args(["manning-calibrator", "zones"]).is_err());
}

#[test]
fn test_apply_overrides() {
    let dir = TempDir::new().unwrap();
    let mut spec = load_config(write_config(&dir, MINIMAL)).unwrap();
    let args = CalibrateArgs {
        config: PathBuf::from("cfg.yaml"),
        n_trials: Some(3),
        seed: Some(11),
        study: Some("retry".to_string()),
        fresh: true,
        dry_run: false,
    };
    apply_overrides(&mut spec, &args);

    assert_eq!(spec.study.n_trials, 3);
    assert_eq!(spec.study.seed, Some(11));
    assert_eq!(spec.study.name, "retry");
    assert!(!spec.study.load_if_exists);
}
