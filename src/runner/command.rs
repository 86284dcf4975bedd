//! Solver command construction

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Placeholder replaced by the trial's simulation file
pub const SIMFILE_PLACEHOLDER: &str = "{simfile}";

/// Suffix of the directory the solver writes results into
pub const RESULT_DIR_SUFFIX: &str = " - Result Files";

fn default_args() -> Vec<String> {
    vec![SIMFILE_PLACEHOLDER.to_string()]
}

fn default_launcher() -> PathBuf {
    PathBuf::from("mpiexec")
}

/// MPI launcher prefix, e.g. `mpiexec -n 8`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MpiConfig {
    #[serde(default = "default_launcher")]
    pub launcher: PathBuf,
    pub processes: usize,
}

/// How to invoke the solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Solver executable
    pub executable: PathBuf,
    /// Arguments after the executable; `{simfile}` expands to the trial's file
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpi: Option<MpiConfig>,
    /// Kill the solver after this many seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// File name inside `<simfile stem> - Result Files/` that is scored
    pub result_file: String,
}

impl SolverConfig {
    pub fn new(executable: impl Into<PathBuf>, result_file: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            args: default_args(),
            mpi: None,
            timeout_secs: None,
            result_file: result_file.into(),
        }
    }

    /// Full argument vector, program first
    pub fn argv(&self, simfile: &Path) -> Vec<String> {
        let mut argv = Vec::new();
        if let Some(mpi) = &self.mpi {
            argv.push(mpi.launcher.display().to_string());
            argv.push("-n".to_string());
            argv.push(mpi.processes.to_string());
        }
        argv.push(self.executable.display().to_string());
        let simfile = simfile.display().to_string();
        argv.extend(
            self.args
                .iter()
                .map(|arg| arg.replace(SIMFILE_PLACEHOLDER, &simfile)),
        );
        argv
    }

    /// Build the process for `simfile`, run from the simulation's directory
    pub fn command(&self, simfile: &Path) -> Command {
        let argv = self.argv(simfile);
        let mut cmd = Command::new(&argv[0]);
        cmd.args(&argv[1..]);
        if let Some(dir) = simfile.parent().filter(|d| !d.as_os_str().is_empty()) {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Human-readable command line for logs
    pub fn command_line(&self, simfile: &Path) -> String {
        self.argv(simfile).join(" ")
    }

    /// Where the solver leaves the scored result for `simfile`
    pub fn result_path(&self, simfile: &Path) -> PathBuf {
        result_path(simfile, &self.result_file)
    }
}

/// `<dir>/<stem> - Result Files/<file_name>`
pub fn result_path(simfile: &Path, file_name: &str) -> PathBuf {
    let stem = simfile
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = simfile.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{stem}{RESULT_DIR_SUFFIX}")).join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argv_plain() {
        let config = SolverConfig::new("FemEngineHD", "Area.csv");
        assert_eq!(
            config.argv(Path::new("/runs/sea_trial_2.m21fm")),
            vec!["FemEngineHD", "/runs/sea_trial_2.m21fm"]
        );
    }

    #[test]
    fn test_argv_with_mpi_and_flags() {
        let mut config = SolverConfig::new("FemEngineHD", "Area.csv");
        config.mpi = Some(MpiConfig {
            launcher: PathBuf::from("mpiexec"),
            processes: 8,
        });
        config.args = vec!["{simfile}".to_string(), "-x".to_string()];

        assert_eq!(
            config.command_line(Path::new("sea.m21fm")),
            "mpiexec -n 8 FemEngineHD sea.m21fm -x"
        );
    }

    #[test]
    fn test_result_path_convention() {
        let path = result_path(Path::new("/runs/sea_trial_4.m21fm"), "Area.csv");
        assert_eq!(
            path,
            PathBuf::from("/runs/sea_trial_4 - Result Files/Area.csv")
        );
    }

    #[test]
    fn test_solver_config_yaml_defaults() {
        let config: SolverConfig =
            serde_yaml::from_str("executable: FemEngineHD\nresult_file: Area.csv\nmpi:\n  processes: 4\n")
                .unwrap();
        assert_eq!(config.args, vec!["{simfile}"]);
        assert_eq!(config.mpi.unwrap().launcher, PathBuf::from("mpiexec"));
        assert_eq!(config.timeout_secs, None);
    }
}
