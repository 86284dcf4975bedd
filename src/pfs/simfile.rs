//! Hydrodynamic simulation file accessors
//!
//! Only the handful of entries the calibration reads or rewrites are
//! exposed; everything else in the document is carried through untouched.

use std::path::{Path, PathBuf};

use super::document::{quote_file, quote_str, unquote, PfsDocument};
use super::error::{PfsError, Result};

/// Section holding the simulation period
pub const TIME_SECTION: &str = "FemEngineHD/TIME";
/// Section holding the bed-resistance Manning map reference
pub const MANNING_SECTION: &str = "FemEngineHD/HYDRODYNAMIC_MODULE/BED_RESISTANCE/MANNING_NUMBER";

/// `format` code selecting a spatially varying map
const FORMAT_VARYING_IN_DOMAIN: i64 = 2;

/// Reference to the roughness map currently configured
#[derive(Debug, Clone, PartialEq)]
pub struct ManningMapRef {
    pub file_name: PathBuf,
    pub item_number: i64,
    pub item_name: String,
}

/// A parsed simulation file
#[derive(Debug, Clone, PartialEq)]
pub struct SimFile {
    doc: PfsDocument,
}

impl SimFile {
    pub fn from_document(doc: PfsDocument) -> Self {
        Self { doc }
    }

    pub fn read(path: &Path) -> Result<Self> {
        Ok(Self::from_document(PfsDocument::read(path)?))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        self.doc.write(path)
    }

    pub fn document(&self) -> &PfsDocument {
        &self.doc
    }

    /// Number of solver time steps, used to size the progress bar
    pub fn number_of_time_steps(&self) -> Result<u64> {
        self.doc
            .require_section(TIME_SECTION)?
            .get_parsed::<u64>("number_of_time_steps")
    }

    /// Currently configured Manning map, if the section names one
    pub fn manning_map(&self) -> Result<ManningMapRef> {
        let section = self.doc.require_section(MANNING_SECTION)?;
        let raw = section.get("file_name").ok_or_else(|| PfsError::KeyNotFound {
            section: MANNING_SECTION.to_string(),
            key: "file_name".to_string(),
        })?;
        Ok(ManningMapRef {
            file_name: PathBuf::from(unquote(raw)),
            item_number: section.get_parsed("item_number").unwrap_or(1),
            item_name: section
                .get("item_name")
                .map(|v| unquote(v).to_string())
                .unwrap_or_default(),
        })
    }

    /// Point the bed resistance at a spatially varying Manning map
    pub fn set_manning_map(&mut self, file: &Path, item_name: &str) -> Result<()> {
        let section = self.doc.require_section_mut(MANNING_SECTION)?;
        section.set("format", FORMAT_VARYING_IN_DOMAIN.to_string());
        section.set("file_name", quote_file(file));
        section.set("item_number", "1");
        section.set("item_name", quote_str(item_name));
        Ok(())
    }
}
