//! Calibration config validation
//!
//! Collects every problem instead of stopping at the first so `validate`
//! can report them all at once.

use std::collections::HashSet;

use super::error::ValidationError;
use super::schema::CalibrationSpec;
use crate::optim::{AcquisitionFunction, SamplerConfig};
use crate::runner::SIMFILE_PLACEHOLDER;

/// Validate a calibration specification
///
/// Checks:
/// - Base model and observation files exist
/// - Study budget, bounds and sampler settings are in range
/// - Solver invocation is complete
pub fn validate_config(spec: &CalibrationSpec) -> Vec<ValidationError> {
    let mut problems = Vec::new();

    if spec.study.name.trim().is_empty() {
        problems.push(ValidationError::EmptyStudyName);
    }
    if spec.study.n_trials == 0 {
        problems.push(ValidationError::InvalidTrialCount(0));
    }

    check_exists(&mut problems, "Simulation file", &spec.simfile_path());
    if let Some(manning) = spec.manning_path() {
        check_exists(&mut problems, "Manning file", &manning);
    }

    check_sampler(&mut problems, &spec.study.sampler);

    if let Err(e) = spec.zones.default.validate("default zone range") {
        problems.push(ValidationError::InvalidBounds {
            target: "default zone range".to_string(),
            reason: e.to_string(),
        });
    }
    for (zone, domain) in &spec.zones.overrides {
        let target = format!("zone {zone}");
        if let Err(e) = domain.validate(&target) {
            problems.push(ValidationError::InvalidBounds {
                target,
                reason: e.to_string(),
            });
        }
    }

    if spec.solver.result_file.trim().is_empty() {
        problems.push(ValidationError::EmptyResultFile);
    }
    if !spec
        .solver
        .args
        .iter()
        .any(|arg| arg.contains(SIMFILE_PLACEHOLDER))
    {
        problems.push(ValidationError::MissingSimfileArg);
    }
    if spec.solver.timeout_secs == Some(0) {
        problems.push(ValidationError::ZeroTimeout);
    }
    if let Some(mpi) = &spec.solver.mpi {
        if mpi.processes == 0 {
            problems.push(ValidationError::InvalidProcesses(0));
        }
    }

    if spec.observations.is_empty() {
        problems.push(ValidationError::NoObservations);
    }
    let mut seen = HashSet::new();
    for source in &spec.observations {
        if !seen.insert(source.name.as_str()) {
            problems.push(ValidationError::DuplicateObservation(source.name.clone()));
        }
        check_exists(
            &mut problems,
            &format!("Observation '{}'", source.name),
            &spec.resolve(&source.path),
        );
    }

    if let Some(d) = spec.scoring.max_distance {
        if !(d.is_finite() && d > 0.0) {
            problems.push(ValidationError::InvalidMaxDistance(d));
        }
    }

    problems
}

fn check_exists(problems: &mut Vec<ValidationError>, what: &str, path: &std::path::Path) {
    if !path.exists() {
        problems.push(ValidationError::PathNotFound {
            what: what.to_string(),
            path: path.to_path_buf(),
        });
    }
}

fn check_sampler(problems: &mut Vec<ValidationError>, sampler: &SamplerConfig) {
    match sampler {
        SamplerConfig::Random => {}
        SamplerConfig::Tpe { gamma, .. } => {
            if !(*gamma > 0.0 && *gamma < 1.0) {
                problems.push(ValidationError::InvalidSampler(format!(
                    "tpe gamma {gamma} must be in (0, 1)"
                )));
            }
        }
        SamplerConfig::GaussianProcess {
            acquisition,
            n_candidates,
            ..
        } => {
            if *n_candidates == 0 {
                problems.push(ValidationError::InvalidSampler(
                    "gaussian_process n_candidates must be > 0".to_string(),
                ));
            }
            if let AcquisitionFunction::UpperConfidenceBound { kappa } = acquisition {
                if !(kappa.is_finite() && *kappa >= 0.0) {
                    problems.push(ValidationError::InvalidSampler(format!(
                        "upper_confidence_bound kappa {kappa} must be >= 0"
                    )));
                }
            }
        }
    }
}
