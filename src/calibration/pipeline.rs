//! End-to-end calibration: mutate, run, score, report

use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::context::{TrialContext, TrialPhase};
use super::error::Result;
use super::mutator::{trial_path, write_trial_inputs};
use super::study::{Objective, Study, StudyOptions, StudySummary, TrialHandle, TrialReport};
use crate::config::CalibrationSpec;
use crate::field::TextFieldCodec;
use crate::observation::load_tracks;
use crate::runner::SimulationRunner;
use crate::scoring::{CsvResultReader, Scorer};
use crate::storage::StudyStore;

/// Objective that runs the solver on the trial's inputs and scores the output
#[derive(Debug)]
pub struct SimulationObjective {
    context: TrialContext,
    runner: SimulationRunner,
    scorer: Scorer,
}

impl SimulationObjective {
    pub fn new(context: TrialContext, runner: SimulationRunner, scorer: Scorer) -> Self {
        Self {
            context,
            runner,
            scorer,
        }
    }

    pub fn context(&self) -> &TrialContext {
        &self.context
    }
}

impl Objective for SimulationObjective {
    fn evaluate(&mut self, trial: &TrialHandle) -> Result<TrialReport> {
        let number = trial.number();
        tracing::debug!(trial = number, phase = %TrialPhase::Running, "writing inputs");
        let artifacts = write_trial_inputs(&self.context, trial.params(), number)?;

        let outcome = self.runner.run(&artifacts.simfile, self.context.expected_steps())?;
        for line in outcome.stderr.lines().filter(|l| !l.trim().is_empty()) {
            tracing::warn!(trial = number, "solver stderr: {line}");
        }

        tracing::debug!(trial = number, phase = %TrialPhase::Scoring, "scoring");
        let result_file = self.runner.config().result_path(&artifacts.simfile);
        let report = self.scorer.score_file(&result_file)?;
        for track in &report.tracks {
            tracing::info!(
                trial = number,
                track = %track.track,
                n = track.skill.n,
                rmse = track.skill.rmse,
                "track scored"
            );
        }

        Ok(TrialReport::new(report.aggregate)
            .with_attr("simfile", &artifacts.simfile)
            .with_attr("manning_file", &artifacts.manning_file)
            .with_attr("result_file", &result_file)
            .with_attr("duration_secs", outcome.duration.as_secs_f64())
            .with_attr("skill", &report.tracks))
    }
}

/// Load the base model described by `spec`
pub fn load_context(spec: &CalibrationSpec) -> Result<TrialContext> {
    let manning = spec.manning_path();
    let context = TrialContext::load(
        &spec.simfile_path(),
        manning.as_deref(),
        &spec.model.item,
        Box::new(TextFieldCodec),
    )?;
    Ok(match spec.work_dir() {
        Some(dir) => context.with_work_dir(dir),
        None => context,
    })
}

/// Assemble the solver-backed objective
pub fn build_objective(
    spec: &CalibrationSpec,
    interrupt: Arc<AtomicBool>,
    show_progress: bool,
) -> Result<SimulationObjective> {
    let context = load_context(spec)?;
    if let Some(dir) = spec.work_dir() {
        std::fs::create_dir_all(&dir).map_err(|source| {
            super::error::MutatorError::Resolve {
                path: dir.clone(),
                source,
            }
        })?;
    }

    let tracks = load_tracks(&spec.observations, &spec.base_dir)?;
    let scorer = Scorer::new(tracks, Box::new(CsvResultReader))
        .with_max_distance(spec.scoring.max_distance);

    let mut solver = spec.solver.clone();
    solver.executable = spec.executable_path();
    let runner = SimulationRunner::new(solver, interrupt).with_progress(show_progress);

    Ok(SimulationObjective::new(context, runner, scorer))
}

/// Study options from the config
pub fn study_options(spec: &CalibrationSpec) -> StudyOptions {
    StudyOptions {
        name: spec.study.name.clone(),
        direction: spec.study.direction,
        load_if_exists: spec.study.load_if_exists,
        fail_fast: spec.study.fail_fast,
        sampler: spec.study.sampler.clone(),
        seed: spec.study.seed,
    }
}

/// Run the configured number of trials
pub fn run_calibration(
    spec: &CalibrationSpec,
    interrupt: Arc<AtomicBool>,
    show_progress: bool,
) -> Result<StudySummary> {
    let mut objective = build_objective(spec, interrupt.clone(), show_progress)?;
    let space = objective.context().zones().search_space(&spec.zones)?;

    let store = StudyStore::open(spec.storage_path())?;
    let mut study = Study::open(store, space, &study_options(spec))?;
    study.optimize(&mut objective, spec.study.n_trials, &interrupt)
}

/// What a calibration would do, without running the solver
#[derive(Debug, Clone, Serialize)]
pub struct CalibrationPlan {
    pub study: String,
    pub sampler: &'static str,
    pub n_trials: usize,
    pub n_elements: usize,
    pub n_zones: usize,
    pub expected_steps: u64,
    pub tracks: Vec<(String, usize)>,
    /// Command for a trial, with the first trial's simulation file
    pub command: String,
    pub storage: PathBuf,
}

/// Load every input and describe the calibration
pub fn plan_calibration(spec: &CalibrationSpec) -> Result<CalibrationPlan> {
    let context = load_context(spec)?;
    context.zones().search_space(&spec.zones)?;
    let tracks = load_tracks(&spec.observations, &spec.base_dir)?;

    let mut solver = spec.solver.clone();
    solver.executable = spec.executable_path();
    let first_simfile = trial_path(context.work_dir(), context.simfile_path(), 0)?;

    Ok(CalibrationPlan {
        study: spec.study.name.clone(),
        sampler: spec.study.sampler.kind(),
        n_trials: spec.study.n_trials,
        n_elements: context.zones().n_elements(),
        n_zones: context.zones().len(),
        expected_steps: context.expected_steps(),
        tracks: tracks
            .iter()
            .map(|t| (t.name().to_string(), t.len()))
            .collect(),
        command: solver.command_line(&first_simfile),
        storage: spec.storage_path(),
    })
}
