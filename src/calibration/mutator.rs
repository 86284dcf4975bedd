//! Trial input writer
//!
//! Each trial gets its own roughness file and simulation file, named after
//! the base files with a `_trial_<n>` suffix.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::context::{TrialArtifacts, TrialContext};
use super::error::MutatorError;

const TRIAL_TAG: &str = "_trial_";

type Result<T> = std::result::Result<T, MutatorError>;

/// Base stem with any trailing `_trial_<k>` removed
fn base_stem(stem: &str) -> &str {
    match stem.rfind(TRIAL_TAG) {
        Some(pos) => {
            let suffix = &stem[pos + TRIAL_TAG.len()..];
            if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
                &stem[..pos]
            } else {
                stem
            }
        }
        None => stem,
    }
}

/// `<dir>/<stem>_trial_<number>.<ext>` for a file derived from `base`
///
/// An existing `_trial_<k>` suffix on `base` is replaced, never stacked.
/// A name that would land on `base` itself is rejected.
pub fn trial_path(dir: &Path, base: &Path, number: usize) -> Result<PathBuf> {
    let stem = base
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| MutatorError::InvalidPath(base.to_path_buf()))?;
    let mut name = format!("{}{TRIAL_TAG}{number}", base_stem(stem));
    if let Some(ext) = base.extension().and_then(|e| e.to_str()) {
        name.push('.');
        name.push_str(ext);
    }
    let path = dir.join(name);
    if same_file_path(&path, base) {
        return Err(MutatorError::InvalidPath(path));
    }
    Ok(path)
}

fn same_file_path(a: &Path, b: &Path) -> bool {
    match (std::path::absolute(a), std::path::absolute(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Write the roughness and simulation files for trial `number`
///
/// The roughness file is written first so the simulation file never
/// references a map that does not exist yet.
pub fn write_trial_inputs(
    ctx: &TrialContext,
    params: &HashMap<String, f64>,
    number: usize,
) -> Result<TrialArtifacts> {
    let values = ctx.zone_values(params)?;
    let field = ctx.zones().apply(ctx.base_field(), &values)?;

    let manning_file = trial_path(ctx.work_dir(), ctx.manning_path(), number)?;
    let simfile = trial_path(ctx.work_dir(), ctx.simfile_path(), number)?;
    let manning_abs = std::path::absolute(&manning_file).map_err(|source| MutatorError::Resolve {
        path: manning_file.clone(),
        source,
    })?;

    ctx.codec().write(&field, &manning_file)?;

    let mut sim = ctx.simfile().clone();
    sim.set_manning_map(&manning_abs, field.item())?;
    sim.write(&simfile)?;

    tracing::debug!(
        trial = number,
        simfile = %simfile.display(),
        manning = %manning_file.display(),
        "wrote trial inputs"
    );
    Ok(TrialArtifacts {
        simfile,
        manning_file: manning_abs,
    })
}
