//! Parent/child family resolution for delimited load files.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::model::{DocId, DocumentSet};
use crate::parser::{DelimitedOptions, DEFAULT_CHILD_SEPARATOR};

/// Links documents into families as they are read.
///
/// Documents may name their parent (parent column), their children (child
/// column), or both. A parent must be read before any child that names it.
/// Children declared by a parent but not read yet are kept in a paternity
/// table until they appear; declarations still open at the end of the input
/// are an error.
#[derive(Debug, Clone)]
pub struct FamilyResolver {
    parent_column: Option<String>,
    child_column: Option<String>,
    child_separator: String,

    /// Declared child key -> declaring parent
    paternity: IndexMap<String, DocId>,
}

impl FamilyResolver {
    /// Create a resolver for the given columns.
    pub fn new(
        parent_column: Option<String>,
        child_column: Option<String>,
        child_separator: impl Into<String>,
    ) -> Self {
        let mut child_separator = child_separator.into();
        if child_separator.is_empty() {
            child_separator = DEFAULT_CHILD_SEPARATOR.to_string();
        }
        Self {
            parent_column,
            child_column,
            child_separator,
            paternity: IndexMap::new(),
        }
    }

    /// Create a resolver from delimited options.
    pub fn from_options(options: &DelimitedOptions) -> Self {
        Self::new(
            options.parent_column.clone(),
            options.child_column.clone(),
            options.child_separator.clone(),
        )
    }

    /// Check if any family column is configured.
    pub fn is_active(&self) -> bool {
        self.parent_column.is_some() || self.child_column.is_some()
    }

    /// Child keys declared but not yet satisfied, in declaration order.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.paternity.keys().map(String::as_str)
    }

    /// Resolve the family links of a document that was just added to `set`.
    pub fn resolve(&mut self, set: &mut DocumentSet, id: DocId) -> Result<()> {
        if !self.is_active() {
            return Ok(());
        }

        let key = set[id].key.clone();
        let parent_key = self.parent_column.as_deref().and_then(|column| {
            set[id]
                .non_blank_field(column)
                .map(str::trim)
                .filter(|parent| *parent != key)
                .map(str::to_string)
        });
        let declared = self
            .child_column
            .as_deref()
            .map(|column| self.split_children(set[id].field(column).unwrap_or("")));

        let mut linked_parent = None;
        if let Some(parent_key) = parent_key {
            let parent = set.id_of(&parent_key).ok_or_else(|| Error::MissingParent {
                key: key.clone(),
                parent: parent_key.clone(),
            })?;
            set.link(id, parent)?;
            linked_parent = Some(parent);
        }

        let Some(declared) = declared else {
            return Ok(());
        };

        self.declare(set, id, &key, &declared)?;

        match linked_parent {
            Some(parent) => {
                if !self.lists_child(set, parent, &key) {
                    return Err(Error::DisownedChild {
                        key,
                        parent: set[parent].key.clone(),
                    });
                }
                self.paternity.shift_remove(&key);
            }
            None if self.parent_column.is_none() => {
                if let Some(parent) = self.paternity.shift_remove(&key) {
                    set.link(id, parent)?;
                }
            }
            None => {}
        }

        Ok(())
    }

    /// Fail if any declared child never confirmed its parent.
    pub fn finish(self) -> Result<()> {
        if self.paternity.is_empty() {
            return Ok(());
        }
        Err(Error::OrphanedChildren {
            keys: self.paternity.into_keys().collect(),
        })
    }

    /// Record the children a document declares.
    fn declare(&mut self, set: &mut DocumentSet, id: DocId, key: &str, children: &[String]) -> Result<()> {
        for child in children {
            if child == key {
                continue;
            }

            if let Some(child_id) = set.id_of(child) {
                // already read; without a parent column the declaration is
                // the only source of the link
                if self.parent_column.is_none() {
                    set.link(child_id, id)?;
                }
                continue;
            }

            match self.paternity.get(child) {
                Some(existing) if *existing == id => {}
                Some(existing) => {
                    return Err(Error::InvalidFamily {
                        key: child.clone(),
                        parent: key.to_string(),
                        reason: format!("already declared as a child of {}", set[*existing].key),
                    });
                }
                None => {
                    self.paternity.insert(child.clone(), id);
                }
            }
        }
        Ok(())
    }

    fn split_children(&self, value: &str) -> Vec<String> {
        value
            .split(self.child_separator.as_str())
            .map(str::trim)
            .filter(|child| !child.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Check the parent's own child list names `key` exactly.
    fn lists_child(&self, set: &DocumentSet, parent: DocId, key: &str) -> bool {
        let Some(column) = self.child_column.as_deref() else {
            return true;
        };
        let value = set[parent].field(column).unwrap_or("");
        self.split_children(value).iter().any(|child| child == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Document;

    fn add(set: &mut DocumentSet, resolver: &mut FamilyResolver, doc: Document) -> Result<DocId> {
        let id = set.insert(doc)?;
        resolver.resolve(set, id)?;
        Ok(id)
    }

    fn doc(key: &str, parent: &str, children: &str) -> Document {
        Document::new(key)
            .with_field("Key", key)
            .with_field("Parent", parent)
            .with_field("Children", children)
    }

    fn child_keys(set: &DocumentSet, id: DocId) -> Vec<String> {
        set.children_of(id).map(|d| d.key.clone()).collect()
    }

    #[test]
    fn test_parent_column_only() {
        let mut set = DocumentSet::new();
        let mut resolver = FamilyResolver::new(Some("Parent".into()), None, ";");

        let d1 = add(&mut set, &mut resolver, doc("D1", "", "")).unwrap();
        let d2 = add(&mut set, &mut resolver, doc("D2", "D1", "")).unwrap();
        add(&mut set, &mut resolver, doc("D3", "D1", "")).unwrap();
        resolver.finish().unwrap();

        assert_eq!(child_keys(&set, d1), vec!["D2", "D3"]);
        assert_eq!(set.parent_of(d2).unwrap().key, "D1");
    }

    #[test]
    fn test_missing_parent_fails_immediately() {
        let mut set = DocumentSet::new();
        let mut resolver = FamilyResolver::new(Some("Parent".into()), None, ";");
        let err = add(&mut set, &mut resolver, doc("D2", "D1", "")).unwrap_err();
        assert!(matches!(err, Error::MissingParent { ref parent, .. } if parent == "D1"));
    }

    #[test]
    fn test_own_key_as_parent_is_ignored() {
        let mut set = DocumentSet::new();
        let mut resolver = FamilyResolver::new(Some("Parent".into()), None, ";");
        let d1 = add(&mut set, &mut resolver, doc("D1", "D1", "")).unwrap();
        assert!(!set[d1].is_child());
    }

    #[test]
    fn test_parent_and_child_columns_reciprocal() {
        let mut set = DocumentSet::new();
        let mut resolver =
            FamilyResolver::new(Some("Parent".into()), Some("Children".into()), ";");

        let d1 = add(&mut set, &mut resolver, doc("D1", "", "D2; D3")).unwrap();
        assert_eq!(resolver.pending().collect::<Vec<_>>(), vec!["D2", "D3"]);
        add(&mut set, &mut resolver, doc("D2", "D1", "")).unwrap();
        add(&mut set, &mut resolver, doc("D3", "D1", "")).unwrap();
        assert_eq!(resolver.pending().count(), 0);
        resolver.finish().unwrap();

        assert_eq!(child_keys(&set, d1), vec!["D2", "D3"]);
    }

    #[test]
    fn test_parent_disowns_child() {
        let mut set = DocumentSet::new();
        let mut resolver =
            FamilyResolver::new(Some("Parent".into()), Some("Children".into()), ";");

        add(&mut set, &mut resolver, doc("D1", "", "D2")).unwrap();
        let err = add(&mut set, &mut resolver, doc("D22", "D1", "")).unwrap_err();
        assert!(matches!(err, Error::DisownedChild { ref key, .. } if key == "D22"));
    }

    #[test]
    fn test_reciprocity_uses_whole_keys() {
        let mut set = DocumentSet::new();
        let mut resolver =
            FamilyResolver::new(Some("Parent".into()), Some("Children".into()), ";");

        add(&mut set, &mut resolver, doc("D1", "", "D22")).unwrap();
        let err = add(&mut set, &mut resolver, doc("D2", "D1", "")).unwrap_err();
        assert!(matches!(err, Error::DisownedChild { .. }));
    }

    #[test]
    fn test_child_column_only_links_on_arrival() {
        let mut set = DocumentSet::new();
        let mut resolver = FamilyResolver::new(None, Some("Children".into()), ";");

        let d1 = add(&mut set, &mut resolver, doc("D1", "", "D2;D3")).unwrap();
        let d2 = add(&mut set, &mut resolver, doc("D2", "", "")).unwrap();
        add(&mut set, &mut resolver, doc("D3", "", "")).unwrap();
        resolver.finish().unwrap();

        assert_eq!(child_keys(&set, d1), vec!["D2", "D3"]);
        assert_eq!(set.parent_of(d2).unwrap().key, "D1");
    }

    #[test]
    fn test_child_column_only_links_children_read_first() {
        let mut set = DocumentSet::new();
        let mut resolver = FamilyResolver::new(None, Some("Children".into()), ";");

        let d2 = add(&mut set, &mut resolver, doc("D2", "", "")).unwrap();
        let d1 = add(&mut set, &mut resolver, doc("D1", "", "D2")).unwrap();
        resolver.finish().unwrap();

        assert_eq!(set[d2].parent(), Some(d1));
    }

    #[test]
    fn test_orphaned_declarations_fail_at_end() {
        let mut set = DocumentSet::new();
        let mut resolver = FamilyResolver::new(None, Some("Children".into()), ";");

        add(&mut set, &mut resolver, doc("D1", "", "D9;D2")).unwrap();
        add(&mut set, &mut resolver, doc("D2", "", "")).unwrap();
        let err = resolver.finish().unwrap_err();
        match err {
            Error::OrphanedChildren { keys } => assert_eq!(keys, vec!["D9"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_child_declared_by_two_parents_fails() {
        let mut set = DocumentSet::new();
        let mut resolver = FamilyResolver::new(None, Some("Children".into()), ";");

        add(&mut set, &mut resolver, doc("D1", "", "D3")).unwrap();
        let err = add(&mut set, &mut resolver, doc("D2", "", "D3")).unwrap_err();
        assert!(matches!(err, Error::InvalidFamily { .. }));
    }

    #[test]
    fn test_inactive_resolver_does_nothing() {
        let mut set = DocumentSet::new();
        let mut resolver = FamilyResolver::new(None, None, "");
        assert!(!resolver.is_active());
        add(&mut set, &mut resolver, doc("D2", "D1", "D3")).unwrap();
        resolver.finish().unwrap();
    }
}
