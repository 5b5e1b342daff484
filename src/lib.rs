//! # loadfile
//!
//! Reader and writer for litigation load files.
//!
//! This library reads the three common load file families (delimited
//! metadata such as Concordance DAT, Opticon image cross-references and IPRO
//! LFP image/native loads) into one document model: documents with ordered
//! metadata, named representative file sets (images, natives, text) and
//! parent/child families.
//!
//! ## Quick Start
//!
//! ```no_run
//! use loadfile::{export, parse_file};
//!
//! fn main() -> loadfile::Result<()> {
//!     // Parse a load file, detecting its format and encoding
//!     let set = parse_file("VOL001/DATA/VOL001.dat")?;
//!
//!     // Write it back out as JSON
//!     let json = export::to_json(&set, export::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Qualified field tokenizer**: quoted values, escaped qualifiers and
//!   values spanning several lines
//! - **Delimiter presets**: Concordance, comma/quote, tab, pipe/caret
//! - **Document grouping**: multi-page image rows grouped into documents
//! - **Families**: parent/child links from parent or attachment columns,
//!   including children declared before they are read
//! - **Export**: delimited, Opticon, LFP and JSON writers

pub mod detect;
pub mod error;
pub mod export;
pub mod group;
pub mod import;
pub mod model;
pub mod parser;

// Re-export commonly used types
pub use detect::{detect_format_from_path, detect_format_from_text, LoadFileFormat};
pub use error::{Error, Result};
pub use export::{ExportFormat, ExportOptions, JsonFormat};
pub use group::{DelimitedBuilder, FamilyResolver, LfpBuilder, OpticonBuilder};
pub use import::{ImportOptions, Importer, ImporterRegistry};
pub use model::{DocId, Document, DocumentSet, Representative, RepresentativeKind};
pub use parser::{
    DelimitedOptions, Delimiters, FieldTokenizer, ImageOptions, RecordReader,
    RepresentativeNames, RepresentativeSetting, TextLevel, TextLocation, TextSetting,
};

use std::path::Path;

/// Parse a load file, detecting its format from the extension or content.
///
/// # Example
///
/// ```no_run
/// use loadfile::parse_file;
///
/// let set = parse_file("VOL001/DATA/VOL001.opt").unwrap();
/// println!("Documents: {}", set.len());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<DocumentSet> {
    ImporterRegistry::with_defaults().import(path.as_ref())
}

/// Parse a load file with custom options.
///
/// # Example
///
/// ```no_run
/// use loadfile::{parse_file_with_options, DelimitedOptions, Delimiters, ImportOptions};
///
/// let options = ImportOptions::new().with_delimited(
///     DelimitedOptions::new()
///         .with_delimiters(Delimiters::CONCORDANCE)
///         .with_parent_column("ParentID"),
/// );
/// let set = parse_file_with_options("VOL001.dat", &options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: &ImportOptions) -> Result<DocumentSet> {
    ImporterRegistry::with_options(options).import(path.as_ref())
}

/// Parse delimited text.
///
/// # Example
///
/// ```
/// use loadfile::{parse_delimited_str, DelimitedOptions, Delimiters};
///
/// let options = DelimitedOptions::new().with_delimiters(Delimiters::COMMA_QUOTE);
/// let set = parse_delimited_str("BegDoc,Title\nA1,\"Memo, draft\"\n", &options).unwrap();
/// assert_eq!(set.by_key("A1").unwrap().field("Title"), Some("Memo, draft"));
/// ```
pub fn parse_delimited_str(text: &str, options: &DelimitedOptions) -> Result<DocumentSet> {
    let records = RecordReader::from_text(text, options.delimiters);
    DelimitedBuilder::new(options.clone()).build(records)
}

/// Parse Opticon text.
pub fn parse_opticon_str(text: &str, options: &ImageOptions) -> Result<DocumentSet> {
    let records = RecordReader::from_text(text, Delimiters::COMMA_DELIMITED);
    OpticonBuilder::new(options.clone()).build(records)
}

/// Parse LFP text.
pub fn parse_lfp_str(text: &str, options: &ImageOptions) -> Result<DocumentSet> {
    let records = RecordReader::from_text(text, Delimiters::COMMA_DELIMITED);
    LfpBuilder::new(options.clone()).build(records)
}

/// Convert a load file to another format.
///
/// # Example
///
/// ```no_run
/// use loadfile::{convert_file, ExportFormat};
///
/// let lfp = convert_file("VOL001.opt", ExportFormat::Lfp).unwrap();
/// std::fs::write("VOL001.lfp", lfp).unwrap();
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P, format: ExportFormat) -> Result<String> {
    let set = parse_file(path)?;
    export::export(&set, format, &ExportOptions::default())
}

/// Builder for reading and converting load files.
///
/// # Example
///
/// ```no_run
/// use loadfile::{Delimiters, ExportFormat, LoadFile};
///
/// let opt = LoadFile::new()
///     .with_delimiters(Delimiters::CONCORDANCE)
///     .with_parent_column("ParentID")
///     .with_volume("VOL002")
///     .parse("VOL001.dat")?
///     .export(ExportFormat::Opticon)?;
/// # Ok::<(), loadfile::Error>(())
/// ```
pub struct LoadFile {
    import_options: ImportOptions,
    export_options: ExportOptions,
}

impl LoadFile {
    /// Create a new LoadFile builder.
    pub fn new() -> Self {
        Self {
            import_options: ImportOptions::default(),
            export_options: ExportOptions::default(),
        }
    }

    /// Use a fixed delimiter profile for delimited input and output.
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.import_options.delimited.delimiters = delimiters;
        self.import_options.fixed_delimiters = true;
        self.export_options.delimiters = delimiters;
        self
    }

    /// Set delimited options.
    pub fn with_delimited(mut self, options: DelimitedOptions) -> Self {
        self.import_options = self.import_options.with_delimited(options);
        self
    }

    /// Set image options.
    pub fn with_image(mut self, options: ImageOptions) -> Self {
        self.import_options = self.import_options.with_image(options);
        self
    }

    /// Read and write parent keys in a column.
    pub fn with_parent_column(mut self, column: impl Into<String>) -> Self {
        let column = column.into();
        self.import_options.delimited.parent_column = Some(column.clone());
        self.export_options.parent_column = Some(column);
        self
    }

    /// Read and write child keys in a column.
    pub fn with_child_column(mut self, column: impl Into<String>) -> Self {
        let column = column.into();
        self.import_options.delimited.child_column = Some(column.clone());
        self.export_options.child_column = Some(column);
        self
    }

    /// Set representative names for reading and writing.
    pub fn with_names(mut self, names: RepresentativeNames) -> Self {
        self.import_options.delimited.names = names.clone();
        self.import_options.image.names = names.clone();
        self.export_options.names = names;
        self
    }

    /// Derive text representatives.
    pub fn with_text(mut self, text: TextSetting) -> Self {
        self.import_options.delimited.text = Some(text.clone());
        self.import_options.image.text = Some(text);
        self
    }

    /// Set the volume name written by image exports.
    pub fn with_volume(mut self, volume: impl Into<String>) -> Self {
        self.export_options = self.export_options.with_volume(volume);
        self
    }

    /// Set export options.
    pub fn with_export(mut self, options: ExportOptions) -> Self {
        self.export_options = options;
        self
    }

    /// Parse a load file and return a result wrapper.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<LoadFileResult> {
        let set = parse_file_with_options(path, &self.import_options)?;
        Ok(LoadFileResult {
            set,
            export_options: self.export_options,
        })
    }

    /// Parse text in a known format.
    pub fn parse_str(self, text: &str, format: LoadFileFormat) -> Result<LoadFileResult> {
        let set = ImporterRegistry::with_options(&self.import_options).import_str(text, format)?;
        Ok(LoadFileResult {
            set,
            export_options: self.export_options,
        })
    }
}

impl Default for LoadFile {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of parsing a load file.
pub struct LoadFileResult {
    /// The parsed documents
    pub set: DocumentSet,
    /// Export options to use
    export_options: ExportOptions,
}

impl LoadFileResult {
    /// Export in the given format.
    pub fn export(&self, format: ExportFormat) -> Result<String> {
        export::export(&self.set, format, &self.export_options)
    }

    /// Convert to a delimited load file.
    pub fn to_delimited(&self) -> Result<String> {
        export::to_delimited(&self.set, &self.export_options)
    }

    /// Convert to Opticon.
    pub fn to_opticon(&self) -> Result<String> {
        export::to_opticon(&self.set, &self.export_options)
    }

    /// Convert to LFP.
    pub fn to_lfp(&self) -> Result<String> {
        export::to_lfp(&self.set, &self.export_options)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        export::to_json(&self.set, format)
    }

    /// Get the documents.
    pub fn documents(&self) -> &DocumentSet {
        &self.set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loadfile_builder() {
        let builder = LoadFile::new()
            .with_delimiters(Delimiters::PIPE_CARET)
            .with_parent_column("ParentID")
            .with_volume("VOL9");

        assert!(builder.import_options.fixed_delimiters);
        assert_eq!(builder.import_options.delimited.delimiters, Delimiters::PIPE_CARET);
        assert_eq!(builder.export_options.delimiters, Delimiters::PIPE_CARET);
        assert_eq!(builder.export_options.parent_column.as_deref(), Some("ParentID"));
        assert_eq!(builder.export_options.volume.as_deref(), Some("VOL9"));
    }

    #[test]
    fn test_loadfile_builder_default() {
        let builder = LoadFile::default();
        assert!(!builder.import_options.fixed_delimiters);
        assert!(builder.export_options.volume.is_none());
    }

    #[test]
    fn test_parse_str_and_export() {
        let result = LoadFile::new()
            .with_volume("OUT")
            .parse_str("A1,VOL1,IMG\\A1.tif,Y,,,1\n", LoadFileFormat::Opticon)
            .unwrap();

        assert_eq!(result.documents().len(), 1);
        assert_eq!(result.to_opticon().unwrap(), "A1,OUT,IMG\\A1.tif,Y,,,1\r\n");
        assert!(result
            .to_lfp()
            .unwrap()
            .starts_with("IM,A1,D,0,@OUT;IMG;A1.tif;2"));
    }

    #[test]
    fn test_parse_delimited_str_empty() {
        let result = parse_delimited_str("", &DelimitedOptions::new());
        assert!(matches!(result, Err(Error::EmptyInput)));
    }

    #[test]
    fn test_parse_lfp_str() {
        let set = parse_lfp_str("IM,A1,D,0,@V;IMG;A1.tif;2\n", &ImageOptions::new()).unwrap();
        assert!(set.contains_key("A1"));
    }

    #[test]
    fn test_parse_opticon_str_invalid() {
        let result = parse_opticon_str("A1,VOL1\n", &ImageOptions::new());
        assert!(matches!(result, Err(Error::InvalidRecord { line: 1, .. })));
    }
}
