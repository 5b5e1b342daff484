//! Delimited load file importer.

use crate::detect::{self, LoadFileFormat};
use crate::error::Result;
use crate::group::DelimitedBuilder;
use crate::model::DocumentSet;
use crate::parser::{DelimitedOptions, RecordReader};

use super::Importer;

/// Imports Concordance DAT, CSV and TSV files.
#[derive(Debug, Clone, Default)]
pub struct DelimitedImporter {
    options: DelimitedOptions,
    detect_delimiters: bool,
}

impl DelimitedImporter {
    /// Create an importer that uses the options' delimiter profile.
    pub fn new(options: DelimitedOptions) -> Self {
        Self {
            options,
            detect_delimiters: false,
        }
    }

    /// Create an importer that guesses the delimiter profile per input.
    pub fn auto(options: DelimitedOptions) -> Self {
        Self {
            options,
            detect_delimiters: true,
        }
    }

    fn options_for(&self, text: &str) -> DelimitedOptions {
        let mut options = self.options.clone();
        if self.detect_delimiters {
            options.delimiters = detect::detect_delimiters(text);
            log::debug!("detected delimiters {:?}", options.delimiters);
        }
        options
    }
}

impl Importer for DelimitedImporter {
    fn supported_extensions(&self) -> &[&str] {
        &["dat", "csv", "txt", "tsv"]
    }

    fn name(&self) -> &str {
        "delimited"
    }

    fn format(&self) -> LoadFileFormat {
        LoadFileFormat::Delimited
    }

    fn import_str(&self, text: &str) -> Result<DocumentSet> {
        let options = self.options_for(text);
        let records = RecordReader::from_text(text, options.delimiters);
        DelimitedBuilder::new(options).build(records)
    }
}
