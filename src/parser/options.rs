//! Parsing options and configuration.

use regex::Regex;

use super::Delimiters;
use crate::model::{RepresentativeKind, DEFAULT_REPRESENTATIVE_NAME};

/// Default separator between keys in a child-list column.
pub const DEFAULT_CHILD_SEPARATOR: &str = ";";

/// Default extension of derived text files.
pub const DEFAULT_TEXT_EXTENSION: &str = "txt";

/// Options for parsing delimited (DAT/CSV) load files.
#[derive(Debug, Clone)]
pub struct DelimitedOptions {
    /// Delimiter profile
    pub delimiters: Delimiters,

    /// Whether the first record holds column names
    pub has_header: bool,

    /// Column holding the document key (defaults to the first column)
    pub key_column: Option<String>,

    /// Column holding the parent document key
    pub parent_column: Option<String>,

    /// Column holding the list of child document keys
    pub child_column: Option<String>,

    /// Separator between keys in the child column
    pub child_separator: String,

    /// Columns that hold representative file paths
    pub representatives: Vec<RepresentativeSetting>,

    /// Derive a text representative from the image representative
    pub text: Option<TextSetting>,

    /// Representative names used for derived representatives
    pub names: RepresentativeNames,
}

impl DelimitedOptions {
    /// Create new delimited options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delimiter profile.
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Set whether the first record is a header.
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Treat the first record as data.
    pub fn headerless(mut self) -> Self {
        self.has_header = false;
        self
    }

    /// Set the key column.
    pub fn with_key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = Some(column.into());
        self
    }

    /// Set the parent column.
    pub fn with_parent_column(mut self, column: impl Into<String>) -> Self {
        self.parent_column = Some(column.into());
        self
    }

    /// Set the child-list column.
    pub fn with_child_column(mut self, column: impl Into<String>) -> Self {
        self.child_column = Some(column.into());
        self
    }

    /// Set the separator used inside the child-list column.
    pub fn with_child_separator(mut self, separator: impl Into<String>) -> Self {
        self.child_separator = separator.into();
        self
    }

    /// Add a representative column.
    pub fn with_representative(mut self, setting: RepresentativeSetting) -> Self {
        self.representatives.push(setting);
        self
    }

    /// Derive text representatives from the image representative.
    pub fn with_text(mut self, text: TextSetting) -> Self {
        self.text = Some(text);
        self
    }

    /// Set representative names.
    pub fn with_names(mut self, names: RepresentativeNames) -> Self {
        self.names = names;
        self
    }

    /// Check if any family column is configured.
    pub fn has_family_columns(&self) -> bool {
        self.parent_column.is_some() || self.child_column.is_some()
    }
}

impl Default for DelimitedOptions {
    fn default() -> Self {
        Self {
            delimiters: Delimiters::default(),
            has_header: true,
            key_column: None,
            parent_column: None,
            child_column: None,
            child_separator: DEFAULT_CHILD_SEPARATOR.to_string(),
            representatives: Vec::new(),
            text: None,
            names: RepresentativeNames::default(),
        }
    }
}

/// Options for parsing image cross-reference (OPT) and image+native (LFP)
/// load files.
#[derive(Debug, Clone, Default)]
pub struct ImageOptions {
    /// Representative names
    pub names: RepresentativeNames,

    /// Text representative derivation
    pub text: Option<TextSetting>,
}

impl ImageOptions {
    /// Create new image options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set representative names.
    pub fn with_names(mut self, names: RepresentativeNames) -> Self {
        self.names = names;
        self
    }

    /// Derive text representatives from image pages.
    pub fn with_text(mut self, text: TextSetting) -> Self {
        self.text = Some(text);
        self
    }
}

/// Names of the representatives a builder creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepresentativeNames {
    /// Image representative name
    pub image: String,
    /// Native representative name
    pub native: String,
    /// Text representative name
    pub text: String,
}

impl RepresentativeNames {
    /// Create names with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the image representative name.
    pub fn with_image(mut self, name: impl Into<String>) -> Self {
        self.image = name.into();
        self
    }

    /// Set the native representative name.
    pub fn with_native(mut self, name: impl Into<String>) -> Self {
        self.native = name.into();
        self
    }

    /// Set the text representative name.
    pub fn with_text(mut self, name: impl Into<String>) -> Self {
        self.text = name.into();
        self
    }
}

impl Default for RepresentativeNames {
    fn default() -> Self {
        Self {
            image: DEFAULT_REPRESENTATIVE_NAME.to_string(),
            native: DEFAULT_REPRESENTATIVE_NAME.to_string(),
            text: DEFAULT_REPRESENTATIVE_NAME.to_string(),
        }
    }
}

/// A delimited column whose value is a representative file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepresentativeSetting {
    /// Column name
    pub column: String,
    /// Representative name
    pub name: String,
    /// Representative kind
    pub kind: RepresentativeKind,
}

impl RepresentativeSetting {
    /// Create a setting with the default representative name.
    pub fn new(column: impl Into<String>, kind: RepresentativeKind) -> Self {
        Self {
            column: column.into(),
            name: DEFAULT_REPRESENTATIVE_NAME.to_string(),
            kind,
        }
    }

    /// Image path column.
    pub fn image(column: impl Into<String>) -> Self {
        Self::new(column, RepresentativeKind::Image)
    }

    /// Native path column.
    pub fn native(column: impl Into<String>) -> Self {
        Self::new(column, RepresentativeKind::Native)
    }

    /// Text path column.
    pub fn text(column: impl Into<String>) -> Self {
        Self::new(column, RepresentativeKind::Text)
    }

    /// Set the representative name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// How text files are derived from image files.
#[derive(Debug, Clone)]
pub struct TextSetting {
    /// One text file per page, per document, or none
    pub level: TextLevel,

    /// Where the text files live relative to the images
    pub location: TextLocation,

    /// Extension of text files, without the dot
    pub extension: String,
}

impl TextSetting {
    /// Create a setting for a level, next to the images.
    pub fn new(level: TextLevel) -> Self {
        Self {
            level,
            location: TextLocation::SameAsImages,
            extension: DEFAULT_TEXT_EXTENSION.to_string(),
        }
    }

    /// Set the text location.
    pub fn with_location(mut self, location: TextLocation) -> Self {
        self.location = location;
        self
    }

    /// Set the text extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }
}

impl Default for TextSetting {
    fn default() -> Self {
        Self::new(TextLevel::None)
    }
}

/// Granularity of derived text files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextLevel {
    /// No text representative
    #[default]
    None,
    /// One text file per image page
    Page,
    /// One text file per document, named after the first page
    Doc,
}

/// Location of derived text files.
#[derive(Debug, Clone, Default)]
pub enum TextLocation {
    /// Same directory as the image
    #[default]
    SameAsImages,
    /// Image directory rewritten by a regular expression
    AlternateLocation {
        /// Pattern matched against the image directory
        find: Regex,
        /// Replacement, may reference capture groups
        replace: String,
    },
}

impl TextLocation {
    /// Build an alternate location from a pattern and replacement.
    pub fn alternate(find: Regex, replace: impl Into<String>) -> Self {
        TextLocation::AlternateLocation {
            find,
            replace: replace.into(),
        }
    }
}
