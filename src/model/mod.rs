//! Document model types for load file content.
//!
//! This module defines the in-memory representation every format builder
//! populates: documents with ordered metadata, named representative file
//! sets, and a [`DocumentSet`] arena that holds documents in source order and
//! records parent/child families as id references.

mod document;
mod representative;
mod set;

pub use document::{DocId, Document};
pub use representative::{Representative, RepresentativeKind, DEFAULT_REPRESENTATIVE_NAME};
pub use set::DocumentSet;
