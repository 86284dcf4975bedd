//! Immutable per-study inputs shared by every trial

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::error::{MutatorError, Result};
use crate::field::{FieldCodec, ScalarField};
use crate::pfs::SimFile;
use crate::zones::ZoneMap;

/// Linear lifecycle of one trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialPhase {
    Requested,
    Sampling,
    Running,
    Scoring,
    Reported,
}

impl TrialPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            TrialPhase::Requested => "requested",
            TrialPhase::Sampling => "sampling",
            TrialPhase::Running => "running",
            TrialPhase::Scoring => "scoring",
            TrialPhase::Reported => "reported",
        }
    }

    /// Phase that follows this one, `None` once reported
    pub fn next(self) -> Option<TrialPhase> {
        match self {
            TrialPhase::Requested => Some(TrialPhase::Sampling),
            TrialPhase::Sampling => Some(TrialPhase::Running),
            TrialPhase::Running => Some(TrialPhase::Scoring),
            TrialPhase::Scoring => Some(TrialPhase::Reported),
            TrialPhase::Reported => None,
        }
    }
}

impl fmt::Display for TrialPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Files written for one trial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialArtifacts {
    pub simfile: PathBuf,
    pub manning_file: PathBuf,
}

/// Base model the trials are derived from
///
/// Loaded once; trials only ever read it, so every trial starts from the
/// original files rather than the previous trial's output.
#[derive(Debug)]
pub struct TrialContext {
    simfile_path: PathBuf,
    manning_path: PathBuf,
    simfile: SimFile,
    base_field: ScalarField,
    zones: ZoneMap,
    codec: Box<dyn FieldCodec>,
    work_dir: PathBuf,
}

impl TrialContext {
    /// Load the base simulation and roughness files
    ///
    /// `manning_path` defaults to the map the simulation file references,
    /// resolved against the simulation file's directory.
    pub fn load(
        simfile_path: &Path,
        manning_path: Option<&Path>,
        item: &str,
        codec: Box<dyn FieldCodec>,
    ) -> Result<Self> {
        let simfile = SimFile::read(simfile_path)?;
        let sim_dir = simfile_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        let manning_path = match manning_path {
            Some(path) => path.to_path_buf(),
            None => crate::io::resolve_path(&sim_dir, &simfile.manning_map()?.file_name),
        };
        let base_field = codec.read(&manning_path, item)?;
        let zones = ZoneMap::from_field(&base_field)?;
        tracing::info!(
            simfile = %simfile_path.display(),
            manning = %manning_path.display(),
            elements = base_field.len(),
            zones = zones.len(),
            "loaded base model"
        );

        Ok(Self {
            simfile_path: simfile_path.to_path_buf(),
            manning_path,
            simfile,
            base_field,
            zones,
            codec,
            work_dir: sim_dir,
        })
    }

    /// Write trial files into `dir` instead of next to the base simulation
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn simfile_path(&self) -> &Path {
        &self.simfile_path
    }

    pub fn manning_path(&self) -> &Path {
        &self.manning_path
    }

    pub fn simfile(&self) -> &SimFile {
        &self.simfile
    }

    pub fn base_field(&self) -> &ScalarField {
        &self.base_field
    }

    pub fn zones(&self) -> &ZoneMap {
        &self.zones
    }

    pub fn codec(&self) -> &dyn FieldCodec {
        self.codec.as_ref()
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Step count for the progress bar; 0 when the file does not say
    pub fn expected_steps(&self) -> u64 {
        match self.simfile.number_of_time_steps() {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "cannot read number_of_time_steps");
                0
            }
        }
    }

    /// Sampled value for each zone, in zone order
    pub fn zone_values(
        &self,
        params: &HashMap<String, f64>,
    ) -> std::result::Result<Vec<f64>, MutatorError> {
        self.zones
            .zones()
            .iter()
            .map(|zone| {
                let name = zone.parameter_name();
                params
                    .get(&name)
                    .copied()
                    .ok_or(MutatorError::MissingParameter(name))
            })
            .collect()
    }
}
