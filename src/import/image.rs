//! Opticon and LFP importers.

use crate::detect::LoadFileFormat;
use crate::error::Result;
use crate::group::{LfpBuilder, OpticonBuilder};
use crate::model::DocumentSet;
use crate::parser::{Delimiters, ImageOptions, RecordReader};

use super::Importer;

/// Imports Opticon image cross-reference files.
#[derive(Debug, Clone, Default)]
pub struct OpticonImporter {
    options: ImageOptions,
}

impl OpticonImporter {
    /// Create a new Opticon importer.
    pub fn new(options: ImageOptions) -> Self {
        Self { options }
    }
}

impl Importer for OpticonImporter {
    fn supported_extensions(&self) -> &[&str] {
        &["opt"]
    }

    fn name(&self) -> &str {
        "opticon"
    }

    fn format(&self) -> LoadFileFormat {
        LoadFileFormat::Opticon
    }

    fn import_str(&self, text: &str) -> Result<DocumentSet> {
        let records = RecordReader::from_text(text, Delimiters::COMMA_DELIMITED);
        OpticonBuilder::new(self.options.clone()).build(records)
    }
}

/// Imports IPRO LFP files.
#[derive(Debug, Clone, Default)]
pub struct LfpImporter {
    options: ImageOptions,
}

impl LfpImporter {
    /// Create a new LFP importer.
    pub fn new(options: ImageOptions) -> Self {
        Self { options }
    }
}

impl Importer for LfpImporter {
    fn supported_extensions(&self) -> &[&str] {
        &["lfp"]
    }

    fn name(&self) -> &str {
        "lfp"
    }

    fn format(&self) -> LoadFileFormat {
        LoadFileFormat::Lfp
    }

    fn import_str(&self, text: &str) -> Result<DocumentSet> {
        let records = RecordReader::from_text(text, Delimiters::COMMA_DELIMITED);
        LfpBuilder::new(self.options.clone()).build(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opticon_importer() {
        let importer = OpticonImporter::default();
        assert!(importer.supports_extension("OPT"));
        let set = importer
            .import_str("A1,V,IMG\\A1.tif,Y,,,2\r\nA1,V,IMG\\A2.tif,,,,\r\n")
            .unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_lfp_importer() {
        let importer = LfpImporter::default();
        assert!(!importer.supports_extension("opt"));
        let set = importer
            .import_str("IM,A1,D,0,@V;IMG;A1.tif;2\r\nIM,A2,C,0,@V;IMG;A2.tif;2\r\n")
            .unwrap();
        assert_eq!(set.family_count(), 1);
    }
}
