//! Error types for loadfile library.

use std::io;
use thiserror::Error;

/// Result type alias for loadfile operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading, grouping or exporting load files.
///
/// Every error is fatal to the operation that raised it: no partially built
/// document set is ever returned alongside an error.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input could not be decoded as text.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The file format could not be determined.
    #[error("Unknown load file format: {0}")]
    UnknownFormat(String),

    /// Two delimiter roles share the same character.
    #[error("Invalid delimiters: {0}")]
    InvalidDelimiters(String),

    /// A configured column name does not exist in the header.
    #[error("Column not found in header: {0}")]
    MissingColumn(String),

    /// The input contains no records at all.
    #[error("The file has no data")]
    EmptyInput,

    /// A qualifier character appeared where it is neither escaped nor closing a field.
    #[error("Line {line}: an unescaped qualifier was found, format invalid")]
    UnescapedQualifier {
        /// 1-based physical line where the record started
        line: usize,
    },

    /// The input ended inside a qualified field.
    #[error("Line {line}: the line data ended abruptly")]
    UnterminatedField {
        /// 1-based physical line where the record started
        line: usize,
    },

    /// A record has a different number of fields than the header.
    #[error("Line {line}: the value size ({found}) does not match the header size ({expected})")]
    FieldCountMismatch {
        /// 1-based physical line where the record started
        line: usize,
        /// Number of header columns
        expected: usize,
        /// Number of fields in the record
        found: usize,
    },

    /// A record is structurally invalid for its format.
    #[error("Line {line}: {message}")]
    InvalidRecord {
        /// 1-based physical line where the record started
        line: usize,
        /// What was wrong with the record
        message: String,
    },

    /// Two documents share the same key.
    #[error("Duplicate document key: {0}")]
    DuplicateKey(String),

    /// A document references a parent that has not been read.
    #[error("Broken families, the parent is missing: {parent} (child {key})")]
    MissingParent {
        /// Key of the child document
        key: String,
        /// Key of the referenced parent
        parent: String,
    },

    /// A document names a parent whose child list does not name it back.
    #[error("Broken families, the parent disowns a child document: {parent} does not list {key}")]
    DisownedChild {
        /// Key of the child document
        key: String,
        /// Key of the parent document
        parent: String,
    },

    /// Child declarations that were never satisfied by the end of the stream.
    #[error("Broken families, children have disowned their parent: {}", .keys.join(", "))]
    OrphanedChildren {
        /// Declared child keys that never appeared or never confirmed
        keys: Vec<String>,
    },

    /// A family link would attach a second parent or create a cycle.
    #[error("Broken families, invalid link from {key} to {parent}: {reason}")]
    InvalidFamily {
        /// Key of the child document
        key: String,
        /// Key of the parent document
        parent: String,
        /// Why the link was rejected
        reason: String,
    },

    /// Error while writing an export format.
    #[error("Export error: {0}")]
    Export(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error reports a broken parent/child relationship.
    pub fn is_family_error(&self) -> bool {
        matches!(
            self,
            Error::MissingParent { .. }
                | Error::DisownedChild { .. }
                | Error::OrphanedChildren { .. }
                | Error::InvalidFamily { .. }
        )
    }
}
