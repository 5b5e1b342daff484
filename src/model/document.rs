//! Document-level types.

use super::{Representative, RepresentativeKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a document inside a [`DocumentSet`](super::DocumentSet).
///
/// Identifiers are assigned in insertion order and never reused, so they
/// double as the document's position in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocId(pub(crate) usize);

impl DocId {
    /// Position of the document in its set.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A logical document reconstructed from one or more load file records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique document key (control number)
    pub key: String,

    /// Field name to value, in column order
    pub metadata: IndexMap<String, String>,

    /// Representatives, at most one per (kind, name)
    pub representatives: Vec<Representative>,

    /// Parent document, set by family resolution
    pub(crate) parent: Option<DocId>,

    /// Child documents in the order they were linked
    pub(crate) children: Vec<DocId>,
}

impl Document {
    /// Create a new document with the given key and no fields.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Add a field, returning the document.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_field(name, value);
        self
    }

    /// Add a field. An existing field keeps its position and gets the new value.
    pub fn add_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(name.into(), value.into());
    }

    /// Get a field value.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.metadata.get(name).map(String::as_str)
    }

    /// Get a field value, treating missing and whitespace-only values as absent.
    pub fn non_blank_field(&self, name: &str) -> Option<&str> {
        self.field(name).filter(|v| !v.trim().is_empty())
    }

    /// Parent document id, if the document belongs to a family as a child.
    pub fn parent(&self) -> Option<DocId> {
        self.parent
    }

    /// Child document ids in link order.
    pub fn children(&self) -> &[DocId] {
        &self.children
    }

    /// Check if the document has a parent.
    pub fn is_child(&self) -> bool {
        self.parent.is_some()
    }

    /// Check if the document has children.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Add or replace the representative with the same kind and name.
    pub fn set_representative(&mut self, representative: Representative) {
        match self
            .representatives
            .iter_mut()
            .find(|r| r.matches(representative.kind, &representative.name))
        {
            Some(existing) => *existing = representative,
            None => self.representatives.push(representative),
        }
    }

    /// Add a representative, returning the document.
    pub fn with_representative(mut self, representative: Representative) -> Self {
        self.set_representative(representative);
        self
    }

    /// Find a representative by kind and name.
    pub fn representative(&self, kind: RepresentativeKind, name: &str) -> Option<&Representative> {
        self.representatives.iter().find(|r| r.matches(kind, name))
    }

    /// Find a representative by kind and name for modification.
    pub fn representative_mut(
        &mut self,
        kind: RepresentativeKind,
        name: &str,
    ) -> Option<&mut Representative> {
        self.representatives
            .iter_mut()
            .find(|r| r.matches(kind, name))
    }

    /// All representatives of one kind.
    pub fn representatives_of(
        &self,
        kind: RepresentativeKind,
    ) -> impl Iterator<Item = &Representative> {
        self.representatives.iter().filter(move |r| r.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_new() {
        let doc = Document::new("ABC0001");
        assert_eq!(doc.key, "ABC0001");
        assert!(doc.metadata.is_empty());
        assert!(!doc.is_child());
        assert!(!doc.has_children());
    }

    #[test]
    fn test_fields_keep_column_order() {
        let mut doc = Document::new("A")
            .with_field("BegDoc", "A")
            .with_field("EndDoc", "B")
            .with_field("Custodian", "Smith");
        doc.add_field("EndDoc", "C");

        let names: Vec<_> = doc.metadata.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["BegDoc", "EndDoc", "Custodian"]);
        assert_eq!(doc.field("EndDoc"), Some("C"));
    }

    #[test]
    fn test_non_blank_field() {
        let doc = Document::new("A")
            .with_field("Parent", "   ")
            .with_field("Key", "A");
        assert_eq!(doc.non_blank_field("Parent"), None);
        assert_eq!(doc.non_blank_field("Missing"), None);
        assert_eq!(doc.non_blank_field("Key"), Some("A"));
    }

    #[test]
    fn test_set_representative_replaces_same_kind_and_name() {
        let mut doc = Document::new("A");
        doc.set_representative(Representative::native("default").with_file("a.msg"));
        doc.set_representative(Representative::text("default").with_file("a.txt"));
        doc.set_representative(Representative::native("default").with_file("b.msg"));

        assert_eq!(doc.representatives.len(), 2);
        let native = doc
            .representative(RepresentativeKind::Native, "default")
            .unwrap();
        assert_eq!(native.first_file(), Some("b.msg"));
        assert_eq!(doc.representatives_of(RepresentativeKind::Text).count(), 1);
    }
}
