//! File helpers shared by the artifact writers

mod atomic;

pub use atomic::{write_atomic, write_string_atomic};

use std::path::{Path, PathBuf};

/// Resolve `path` against `base` unless it is already absolute
pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
