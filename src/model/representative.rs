//! Representative file sets attached to documents.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Name used for a representative when none is configured.
pub const DEFAULT_REPRESENTATIVE_NAME: &str = "default";

/// A named, typed collection of files belonging to a document.
///
/// Files form an ordered set: adding a path that is already present is a
/// no-op, so a multi-page image stored in a single file is listed once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Representative {
    /// What the files are (images, native, extracted text)
    pub kind: RepresentativeKind,

    /// Logical channel name, not a file path
    pub name: String,

    /// File paths in first-seen order
    pub files: IndexSet<String>,
}

impl Representative {
    /// Create an empty representative.
    pub fn new(kind: RepresentativeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            files: IndexSet::new(),
        }
    }

    /// Create an empty image representative.
    pub fn image(name: impl Into<String>) -> Self {
        Self::new(RepresentativeKind::Image, name)
    }

    /// Create an empty native representative.
    pub fn native(name: impl Into<String>) -> Self {
        Self::new(RepresentativeKind::Native, name)
    }

    /// Create an empty text representative.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(RepresentativeKind::Text, name)
    }

    /// Add a file, returning the representative.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.add_file(file);
        self
    }

    /// Add several files in order.
    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for file in files {
            self.add_file(file);
        }
        self
    }

    /// Add a file. Returns `false` if the path was already present.
    pub fn add_file(&mut self, file: impl Into<String>) -> bool {
        self.files.insert(file.into())
    }

    /// Number of distinct files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// First file in insertion order.
    pub fn first_file(&self) -> Option<&str> {
        self.files.first().map(String::as_str)
    }

    /// Check if the representative has no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if this representative matches a kind and name.
    pub fn matches(&self, kind: RepresentativeKind, name: &str) -> bool {
        self.kind == kind && self.name == name
    }
}

/// Type of representative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepresentativeKind {
    /// Page images (TIFF, JPEG, PDF)
    Image,
    /// Native (original) file
    Native,
    /// Extracted or OCR text
    Text,
}

impl fmt::Display for RepresentativeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepresentativeKind::Image => write!(f, "image"),
            RepresentativeKind::Native => write!(f, "native"),
            RepresentativeKind::Text => write!(f, "text"),
        }
    }
}

impl FromStr for RepresentativeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" | "images" => Ok(RepresentativeKind::Image),
            "native" | "natives" => Ok(RepresentativeKind::Native),
            "text" => Ok(RepresentativeKind::Text),
            other => Err(Error::Other(format!(
                "Unknown representative kind: {}",
                other
            ))),
        }
    }
}
