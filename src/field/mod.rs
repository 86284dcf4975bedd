//! Mesh-associated scalar fields (one value per mesh element)
//!
//! The calibration only ever touches a single item of the roughness file,
//! so a field is an item name plus a flat value vector in element order.
//! Concrete on-disk formats plug in through [`FieldCodec`].

mod error;
mod text;

pub use error::{FieldError, Result};
pub use text::TextFieldCodec;

use std::path::Path;

/// Item name the solver expects for the Manning map
pub const MANNING_ITEM: &str = "manning";

/// Scalar value per mesh element
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    item: String,
    values: Vec<f64>,
}

impl ScalarField {
    pub fn new(item: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            item: item.into(),
            values,
        }
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Number of mesh elements
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Reads and writes scalar field files
pub trait FieldCodec: std::fmt::Debug {
    /// Read `item` from the file at `path`
    fn read(&self, path: &Path, item: &str) -> Result<ScalarField>;

    /// Write the field to `path`, replacing any existing file atomically
    fn write(&self, field: &ScalarField, path: &Path) -> Result<()>;
}
