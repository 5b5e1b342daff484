//! Writing document sets back to load files.
//!
//! Each writer is the inverse of a builder in [`crate::group`]: it renders a
//! [`DocumentSet`] into the text of a delimited, Opticon or LFP file, or into
//! JSON for inspection.

mod delimited;
mod json;
mod lfp;
mod opticon;
mod options;

pub use delimited::to_delimited;
pub use json::{to_json, JsonFormat};
pub use lfp::to_lfp;
pub use opticon::to_opticon;
pub use options::ExportOptions;

use std::fmt;
use std::str::FromStr;

use crate::detect::LoadFileFormat;
use crate::error::{Error, Result};
use crate::model::DocumentSet;

/// Output format for export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Delimited load file
    #[default]
    Delimited,
    /// Opticon image cross-reference
    Opticon,
    /// IPRO image and native load
    Lfp,
    /// JSON array of documents
    Json,
}

impl ExportFormat {
    /// Conventional file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Delimited => "dat",
            ExportFormat::Opticon => "opt",
            ExportFormat::Lfp => "lfp",
            ExportFormat::Json => "json",
        }
    }
}

impl From<LoadFileFormat> for ExportFormat {
    fn from(format: LoadFileFormat) -> Self {
        match format {
            LoadFileFormat::Delimited => ExportFormat::Delimited,
            LoadFileFormat::Opticon => ExportFormat::Opticon,
            LoadFileFormat::Lfp => ExportFormat::Lfp,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            other => other.parse::<LoadFileFormat>().map(ExportFormat::from),
        }
    }
}

/// Render a document set in the given format.
pub fn export(set: &DocumentSet, format: ExportFormat, options: &ExportOptions) -> Result<String> {
    log::debug!("exporting {} documents as {}", set.len(), format);
    match format {
        ExportFormat::Delimited => to_delimited(set, options),
        ExportFormat::Opticon => to_opticon(set, options),
        ExportFormat::Lfp => to_lfp(set, options),
        ExportFormat::Json => to_json(set, options.json_format),
    }
}
