//! JSON rendering of document sets.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{DocumentSet, Representative};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// A document with its family links resolved to keys.
#[derive(Serialize)]
struct DocumentView<'a> {
    key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<&'a str>,
    metadata: &'a IndexMap<String, String>,
    representatives: &'a [Representative],
}

/// Convert a document set to a JSON array.
pub fn to_json(set: &DocumentSet, format: JsonFormat) -> Result<String> {
    let views: Vec<DocumentView<'_>> = set
        .iter_with_ids()
        .map(|(id, doc)| DocumentView {
            key: &doc.key,
            parent: set.parent_of(id).map(|p| p.key.as_str()),
            children: set.children_of(id).map(|c| c.key.as_str()).collect(),
            metadata: &doc.metadata,
            representatives: &doc.representatives,
        })
        .collect();

    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(&views),
        JsonFormat::Compact => serde_json::to_string(&views),
    };

    result.map_err(|e| Error::Export(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Document;

    fn family() -> DocumentSet {
        let mut set = DocumentSet::new();
        let parent = set
            .insert(
                Document::new("D1")
                    .with_field("Title", "Email")
                    .with_representative(Representative::native("default").with_file("N\\D1.msg")),
            )
            .unwrap();
        let child = set.insert(Document::new("D2")).unwrap();
        set.link(child, parent).unwrap();
        set
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&family(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"Title\": \"Email\""));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&family(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_family_links_as_keys() {
        let json = to_json(&family(), JsonFormat::Compact).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["children"][0], "D2");
        assert!(value[0].get("parent").is_none());
        assert_eq!(value[1]["parent"], "D1");
        assert_eq!(value[0]["representatives"][0]["kind"], "native");
        assert_eq!(value[0]["representatives"][0]["files"][0], "N\\D1.msg");
    }
}
