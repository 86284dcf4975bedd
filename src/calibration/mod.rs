//! Calibration loop
//!
//! Each trial moves through `Requested -> Sampling -> Running -> Scoring ->
//! Reported`. The sampler proposes one Manning value per zone, the mutator
//! writes trial-tagged copies of the base roughness and simulation files,
//! the runner executes the solver and the scorer turns its output into the
//! objective value stored with the trial.
//!
//! Trial-level failures (bad inputs, solver errors, scoring errors) are
//! recorded and the study moves on; storage errors and user interrupts stop
//! the study.

mod context;
mod error;
mod mutator;
mod pipeline;
mod study;


pub use context::{TrialArtifacts, TrialContext, TrialPhase};
pub use error::{CalibrationError, MutatorError, Result};
pub use mutator::{trial_path, write_trial_inputs};
pub use pipeline::{
    build_objective, load_context, plan_calibration, run_calibration, study_options,
    CalibrationPlan, SimulationObjective,
};
pub use study::{
    Objective, Study, StudyOptions, StudySummary, TrialHandle, TrialReport, FAILED_PHASE_ATTR,
};
