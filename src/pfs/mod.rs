//! Simulation configuration files
//!
//! The solver is configured through a sectioned text format:
//!
//! ```text
//! // Created by the model setup editor
//! [FemEngineHD]
//!    [TIME]
//!       number_of_time_steps = 1440
//!    EndSect  // TIME
//! EndSect  // FemEngineHD
//! ```
//!
//! [`PfsDocument`] parses and writes the generic tree, [`SimFile`] wraps it
//! with the entries the calibration needs.

mod document;
mod error;
mod simfile;

#[cfg(test)]
mod tests;

pub use document::{quote_file, quote_str, unquote, PfsDocument, PfsNode, PfsSection};
pub use error::{PfsError, Result};
pub use simfile::{ManningMapRef, SimFile, MANNING_SECTION, TIME_SECTION};
