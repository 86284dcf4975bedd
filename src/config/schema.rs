//! YAML schema for calibration runs

use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

use crate::field::MANNING_ITEM;
use crate::observation::ObservationSource;
use crate::optim::{Direction, SamplerConfig};
use crate::runner::SolverConfig;
use crate::zones::ZoneBounds;

/// Deserialize a bool from either a YAML boolean (`true`) or a quoted string (`"true"`).
fn deserialize_bool_lenient<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Str(s) => match s.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected 'true' or 'false', got '{other}'"
            ))),
        },
    }
}

fn default_true() -> bool {
    true
}

fn default_storage() -> PathBuf {
    PathBuf::from("calibration.db")
}

fn default_n_trials() -> usize {
    50
}

fn default_item() -> String {
    MANNING_ITEM.to_string()
}

/// Complete calibration specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSpec {
    pub study: StudySection,

    pub model: ModelSection,

    pub solver: SolverConfig,

    /// Sampling range per zone
    #[serde(default)]
    pub zones: ZoneBounds,

    pub observations: Vec<ObservationSource>,

    #[serde(default)]
    pub scoring: ScoringSection,

    /// Directory relative paths resolve against (the config file's directory)
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Study identity, budget and sampler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySection {
    pub name: String,

    /// SQLite database holding all studies
    #[serde(default = "default_storage")]
    pub storage: PathBuf,

    #[serde(default)]
    pub direction: Direction,

    /// Trials to run in one session
    #[serde(default = "default_n_trials")]
    pub n_trials: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Resume a stored study with the same name
    #[serde(default = "default_true", deserialize_with = "deserialize_bool_lenient")]
    pub load_if_exists: bool,

    /// Abort on the first failed trial
    #[serde(default, deserialize_with = "deserialize_bool_lenient")]
    pub fail_fast: bool,

    #[serde(default)]
    pub sampler: SamplerConfig,
}

/// Base model files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSection {
    /// Base simulation file; never modified
    pub simfile: PathBuf,

    /// Base roughness file; defaults to the map the simulation file references
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manning_file: Option<PathBuf>,

    /// Item holding the Manning values
    #[serde(default = "default_item")]
    pub item: String,

    /// Where trial files are written; defaults to the simulation file's directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringSection {
    /// Ignore observations farther than this from every mesh element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_distance: Option<f64>,
}

impl CalibrationSpec {
    /// Resolve a configured path against the config file's directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        crate::io::resolve_path(&self.base_dir, path)
    }

    pub fn simfile_path(&self) -> PathBuf {
        self.resolve(&self.model.simfile)
    }

    /// Explicitly configured roughness file, if any
    pub fn manning_path(&self) -> Option<PathBuf> {
        self.model.manning_file.as_deref().map(|p| self.resolve(p))
    }

    pub fn storage_path(&self) -> PathBuf {
        self.resolve(&self.study.storage)
    }

    pub fn work_dir(&self) -> Option<PathBuf> {
        self.model.work_dir.as_deref().map(|p| self.resolve(p))
    }

    pub fn executable_path(&self) -> PathBuf {
        let exe = &self.solver.executable;
        // bare program names are looked up on PATH
        if exe.components().count() > 1 {
            self.resolve(exe)
        } else {
            exe.clone()
        }
    }
}
