//! Export options and configuration.

use crate::parser::{Delimiters, RepresentativeNames, RepresentativeSetting, DEFAULT_CHILD_SEPARATOR};

use super::JsonFormat;

/// Options for writing document sets back to load files.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Delimiter profile for delimited output
    pub delimiters: Delimiters,

    /// Volume name written to image rows (defaults to each document's
    /// `Volume Name` field)
    pub volume: Option<String>,

    /// Representatives to write
    pub names: RepresentativeNames,

    /// Column receiving the parent key in delimited output
    pub parent_column: Option<String>,

    /// Column receiving the child keys in delimited output
    pub child_column: Option<String>,

    /// Separator between child keys
    pub child_separator: String,

    /// Columns receiving representative file paths in delimited output
    pub representatives: Vec<RepresentativeSetting>,

    /// JSON layout
    pub json_format: JsonFormat,
}

impl ExportOptions {
    /// Create new export options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delimiter profile.
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Set the volume name.
    pub fn with_volume(mut self, volume: impl Into<String>) -> Self {
        self.volume = Some(volume.into());
        self
    }

    /// Set representative names.
    pub fn with_names(mut self, names: RepresentativeNames) -> Self {
        self.names = names;
        self
    }

    /// Write parent keys to a column.
    pub fn with_parent_column(mut self, column: impl Into<String>) -> Self {
        self.parent_column = Some(column.into());
        self
    }

    /// Write child keys to a column.
    pub fn with_child_column(mut self, column: impl Into<String>) -> Self {
        self.child_column = Some(column.into());
        self
    }

    /// Set the child key separator.
    pub fn with_child_separator(mut self, separator: impl Into<String>) -> Self {
        self.child_separator = separator.into();
        self
    }

    /// Write a representative's files to a column.
    pub fn with_representative(mut self, setting: RepresentativeSetting) -> Self {
        self.representatives.push(setting);
        self
    }

    /// Set JSON format.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Use compact JSON.
    pub fn compact(mut self) -> Self {
        self.json_format = JsonFormat::Compact;
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            delimiters: Delimiters::default(),
            volume: None,
            names: RepresentativeNames::default(),
            parent_column: None,
            child_column: None,
            child_separator: DEFAULT_CHILD_SEPARATOR.to_string(),
            representatives: Vec::new(),
            json_format: JsonFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_options_builder() {
        let options = ExportOptions::new()
            .with_delimiters(Delimiters::PIPE_CARET)
            .with_volume("VOL002")
            .with_parent_column("ParentID")
            .compact();

        assert_eq!(options.delimiters, Delimiters::PIPE_CARET);
        assert_eq!(options.volume.as_deref(), Some("VOL002"));
        assert_eq!(options.parent_column.as_deref(), Some("ParentID"));
        assert_eq!(options.json_format, JsonFormat::Compact);
    }

    #[test]
    fn test_default_options() {
        let options = ExportOptions::default();
        assert_eq!(options.delimiters, Delimiters::CONCORDANCE);
        assert_eq!(options.child_separator, ";");
        assert_eq!(options.json_format, JsonFormat::Pretty);
    }
}
