//! Plain-text field exchange format
//!
//! ```text
//! # item: manning
//! # elements: 3
//! 32.0
//! 32.0
//! 45.5
//! ```
//!
//! Header lines start with `#`; unknown header keys are ignored. Values are
//! written in shortest round-trip form so read-modify-write keeps untouched
//! elements bit-identical.

use std::fs;
use std::io::Write;
use std::path::Path;

use super::error::{FieldError, Result};
use super::{FieldCodec, ScalarField};
use crate::io::write_atomic;

#[derive(Debug, Clone, Copy, Default)]
pub struct TextFieldCodec;

impl TextFieldCodec {
    fn parse(path: &Path, contents: &str) -> Result<ScalarField> {
        let mut item = None;
        let mut declared = None;
        let mut values = Vec::new();

        for (idx, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(header) = line.strip_prefix('#') {
                if let Some((key, value)) = header.split_once(':') {
                    match key.trim().to_lowercase().as_str() {
                        "item" => item = Some(value.trim().to_string()),
                        "elements" => {
                            let n = value.trim().parse::<usize>().map_err(|e| FieldError::Parse {
                                path: path.to_path_buf(),
                                line: idx + 1,
                                message: format!("invalid element count: {e}"),
                            })?;
                            declared = Some(n);
                        }
                        _ => {}
                    }
                }
                continue;
            }
            let value = line.parse::<f64>().map_err(|e| FieldError::Parse {
                path: path.to_path_buf(),
                line: idx + 1,
                message: format!("invalid value '{line}': {e}"),
            })?;
            values.push(value);
        }

        if let Some(declared) = declared {
            if declared != values.len() {
                return Err(FieldError::ElementCount {
                    path: path.to_path_buf(),
                    declared,
                    actual: values.len(),
                });
            }
        }

        Ok(ScalarField::new(item.unwrap_or_default(), values))
    }
}

impl FieldCodec for TextFieldCodec {
    fn read(&self, path: &Path, item: &str) -> Result<ScalarField> {
        let contents = fs::read_to_string(path).map_err(|source| FieldError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let field = Self::parse(path, &contents)?;
        if !field.item().eq_ignore_ascii_case(item) {
            return Err(FieldError::ItemNotFound {
                path: path.to_path_buf(),
                item: item.to_string(),
                found: field.item().to_string(),
            });
        }
        Ok(field)
    }

    fn write(&self, field: &ScalarField, path: &Path) -> Result<()> {
        write_atomic(path, |w| {
            writeln!(w, "# item: {}", field.item())?;
            writeln!(w, "# elements: {}", field.len())?;
            for value in field.values() {
                writeln!(w, "{value:?}")?;
            }
            Ok(())
        })
        .map_err(|source| FieldError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
