//! Config file loading

use std::fs;
use std::path::Path;

use super::error::{ConfigError, Result};
use super::schema::CalibrationSpec;
use super::validate::validate_config;

/// Parse a YAML calibration config
///
/// Relative paths inside the file resolve against its directory, which is
/// made absolute so the paths stay valid from the solver's working directory.
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<CalibrationSpec> {
    let path = config_path.as_ref();
    let yaml_content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut spec: CalibrationSpec = serde_yaml::from_str(&yaml_content)?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| ".".into());
    spec.base_dir = std::path::absolute(&dir).unwrap_or(dir);
    tracing::debug!(config = %path.display(), study = %spec.study.name, "loaded config");
    Ok(spec)
}

/// Load and reject the config if validation finds any problem
pub fn load_validated<P: AsRef<Path>>(config_path: P) -> Result<CalibrationSpec> {
    let spec = load_config(config_path)?;
    let problems = validate_config(&spec);
    if problems.is_empty() {
        Ok(spec)
    } else {
        Err(ConfigError::Invalid(problems))
    }
}
