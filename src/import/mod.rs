//! Importer registry dispatching load files to the right builder.
//!
//! Each [`Importer`] wraps one builder from [`crate::group`] together with
//! its options. The [`ImporterRegistry`] maps file extensions and format
//! names to importers and sniffs the content when the extension is unknown.
//!
//! # Example
//!
//! ```no_run
//! use loadfile::import::ImporterRegistry;
//! use std::path::Path;
//!
//! fn main() -> loadfile::Result<()> {
//!     let registry = ImporterRegistry::with_defaults();
//!     let set = registry.import(Path::new("VOL001/DATA/VOL001.dat"))?;
//!     println!("{} documents", set.len());
//!     Ok(())
//! }
//! ```

mod delimited;
mod image;

pub use delimited::DelimitedImporter;
pub use image::{LfpImporter, OpticonImporter};

use crate::detect::{self, LoadFileFormat};
use crate::error::{Error, Result};
use crate::model::DocumentSet;
use crate::parser::{DelimitedOptions, ImageOptions};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Options for every importer in a registry.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Delimited file options
    pub delimited: DelimitedOptions,

    /// Whether delimited files use `delimited.delimiters` as given instead of
    /// guessing the profile from the first line
    pub fixed_delimiters: bool,

    /// Opticon and LFP options
    pub image: ImageOptions,
}

impl ImportOptions {
    /// Create new import options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set delimited options. Their delimiter profile is used as given.
    pub fn with_delimited(mut self, options: DelimitedOptions) -> Self {
        self.delimited = options;
        self.fixed_delimiters = true;
        self
    }

    /// Set delimited options, guessing the delimiter profile per file.
    pub fn with_delimited_auto(mut self, options: DelimitedOptions) -> Self {
        self.delimited = options;
        self.fixed_delimiters = false;
        self
    }

    /// Set image options.
    pub fn with_image(mut self, options: ImageOptions) -> Self {
        self.image = options;
        self
    }
}

/// Trait for load file importers.
///
/// Implement this trait to add support for a new load file format.
pub trait Importer: Send + Sync {
    /// Get the supported file extensions for this importer.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["opt"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this importer.
    fn name(&self) -> &str;

    /// The format this importer reads.
    fn format(&self) -> LoadFileFormat;

    /// Import decoded text.
    fn import_str(&self, text: &str) -> Result<DocumentSet>;

    /// Import raw bytes, detecting their encoding.
    fn import_bytes(&self, bytes: &[u8]) -> Result<DocumentSet> {
        let text = detect::decode_bytes(bytes)?;
        self.import_str(&text)
    }

    /// Import a file at the given path.
    fn import_file(&self, path: &Path) -> Result<DocumentSet> {
        let text = detect::read_text(path)?;
        log::debug!("importing {} as {}", path.display(), self.name());
        self.import_str(&text)
    }

    /// Check if this importer supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry for load file importers.
pub struct ImporterRegistry {
    importers: HashMap<String, Arc<dyn Importer>>,
    by_name: HashMap<String, Arc<dyn Importer>>,
}

impl ImporterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            importers: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the delimited, Opticon and LFP importers using
    /// default options.
    pub fn with_defaults() -> Self {
        Self::with_options(&ImportOptions::default())
    }

    /// Create a registry with the three standard importers.
    pub fn with_options(options: &ImportOptions) -> Self {
        let delimited = if options.fixed_delimiters {
            DelimitedImporter::new(options.delimited.clone())
        } else {
            DelimitedImporter::auto(options.delimited.clone())
        };

        let mut registry = Self::new();
        registry.register(Arc::new(delimited));
        registry.register(Arc::new(OpticonImporter::new(options.image.clone())));
        registry.register(Arc::new(LfpImporter::new(options.image.clone())));
        registry
    }

    /// Register an importer.
    ///
    /// The importer will be registered for all its supported extensions.
    pub fn register(&mut self, importer: Arc<dyn Importer>) {
        for ext in importer.supported_extensions() {
            self.importers.insert(ext.to_lowercase(), importer.clone());
        }
        self.by_name.insert(importer.name().to_lowercase(), importer);
    }

    /// Get an importer by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn Importer>> {
        self.importers.get(&ext.to_lowercase()).cloned()
    }

    /// Get an importer by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn Importer>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Get the importer for a format.
    pub fn get_by_format(&self, format: LoadFileFormat) -> Option<Arc<dyn Importer>> {
        self.by_name.values().find(|i| i.format() == format).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.importers.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions.
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.importers.keys().map(|s| s.as_str()).collect()
    }

    /// Import a file using the importer for its extension, or for its sniffed
    /// format when the extension is unknown.
    pub fn import(&self, path: &Path) -> Result<DocumentSet> {
        let by_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.get_by_extension(ext));

        if let Some(importer) = by_extension {
            return importer.import_file(path);
        }

        let text = detect::read_text(path)?;
        let format = detect::detect_format_from_text(&text)?;
        self.import_str(&text, format)
    }

    /// Import decoded text in a known format.
    pub fn import_str(&self, text: &str, format: LoadFileFormat) -> Result<DocumentSet> {
        let importer = self
            .get_by_format(format)
            .ok_or_else(|| Error::UnknownFormat(format!("no importer for {}", format)))?;
        importer.import_str(text)
    }
}

impl Default for ImporterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
