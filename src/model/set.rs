//! Arena of documents with family links expressed as ids.

use std::collections::HashMap;
use std::ops::Index;

use super::{DocId, Document};
use crate::error::{Error, Result};

/// An ordered collection of documents addressed by [`DocId`].
///
/// Documents are kept in source order. Parent/child relationships are stored
/// as ids on each document, so the family forest never needs shared
/// ownership. [`DocumentSet::link`] is the only way to create a relationship
/// and it rejects second parents and cycles.
#[derive(Debug, Clone, Default)]
pub struct DocumentSet {
    documents: Vec<Document>,
    index: HashMap<String, DocId>,
}

impl DocumentSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if the set holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Insert a document, returning its id.
    ///
    /// Family links on the incoming document are cleared; use
    /// [`DocumentSet::link`] to relate documents inside the set.
    pub fn insert(&mut self, mut document: Document) -> Result<DocId> {
        if self.index.contains_key(&document.key) {
            return Err(Error::DuplicateKey(document.key));
        }
        document.parent = None;
        document.children.clear();

        let id = DocId(self.documents.len());
        self.index.insert(document.key.clone(), id);
        self.documents.push(document);
        Ok(id)
    }

    /// Get a document by id.
    pub fn get(&self, id: DocId) -> Option<&Document> {
        self.documents.get(id.0)
    }

    /// Get a document by key.
    pub fn by_key(&self, key: &str) -> Option<&Document> {
        self.index.get(key).map(|id| &self.documents[id.0])
    }

    /// Get the id of the document with the given key.
    pub fn id_of(&self, key: &str) -> Option<DocId> {
        self.index.get(key).copied()
    }

    /// Check if a document with the key exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Iterate over documents in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    /// Iterate over ids and documents in source order.
    pub fn iter_with_ids(&self) -> impl Iterator<Item = (DocId, &Document)> {
        self.documents
            .iter()
            .enumerate()
            .map(|(i, doc)| (DocId(i), doc))
    }

    /// The parent of a document.
    pub fn parent_of(&self, id: DocId) -> Option<&Document> {
        self.get(id)
            .and_then(|doc| doc.parent)
            .and_then(|parent| self.get(parent))
    }

    /// The children of a document in link order.
    pub fn children_of(&self, id: DocId) -> impl Iterator<Item = &Document> {
        self.get(id)
            .map(|doc| doc.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.get(*child))
    }

    /// Documents without a parent.
    pub fn roots(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter().filter(|doc| doc.parent.is_none())
    }

    /// Number of documents that head a family (have at least one child).
    pub fn family_count(&self) -> usize {
        self.documents.iter().filter(|d| d.has_children()).count()
    }

    /// Link `child` to `parent`.
    ///
    /// Linking the same pair twice is a no-op. A document may have only one
    /// parent, may not be its own parent and may not become an ancestor of
    /// itself.
    pub fn link(&mut self, child: DocId, parent: DocId) -> Result<()> {
        if child.0 >= self.documents.len() || parent.0 >= self.documents.len() {
            return Err(Error::Other(format!(
                "Cannot link unknown documents {} and {}",
                child, parent
            )));
        }

        let invalid = |set: &Self, reason: &str| Error::InvalidFamily {
            key: set.documents[child.0].key.clone(),
            parent: set.documents[parent.0].key.clone(),
            reason: reason.to_string(),
        };

        if child == parent {
            return Err(invalid(self, "a document cannot be its own parent"));
        }

        let current_parent = self.documents[child.0].parent;
        match current_parent {
            Some(existing) if existing == parent => return Ok(()),
            Some(existing) => {
                let reason = format!(
                    "the document already belongs to {}",
                    self.documents[existing.0].key
                );
                return Err(invalid(self, &reason));
            }
            None => {}
        }

        if self.is_ancestor(child, parent) {
            return Err(invalid(self, "the link would create a cycle"));
        }

        self.documents[child.0].parent = Some(parent);
        self.documents[parent.0].children.push(child);
        Ok(())
    }

    /// Check if `ancestor` appears on the parent chain of `id` (or is `id`).
    pub fn is_ancestor(&self, ancestor: DocId, id: DocId) -> bool {
        let mut current = Some(id);
        let mut steps = 0;
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.documents.len() {
                break;
            }
            current = self.get(cur).and_then(|doc| doc.parent);
        }
        false
    }

    /// Consume the set, returning documents in source order.
    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }
}

impl Index<DocId> for DocumentSet {
    type Output = Document;

    fn index(&self, id: DocId) -> &Self::Output {
        &self.documents[id.0]
    }
}

impl<'a> IntoIterator for &'a DocumentSet {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}
