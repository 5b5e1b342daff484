//! Builder for delimited (DAT/CSV) load files.

use crate::error::{Error, Result};
use crate::model::{Document, DocumentSet, Representative, RepresentativeKind};
use crate::parser::{DelimitedOptions, Record};

use super::{accumulate, text, Boundary, BoundaryPolicy, FamilyResolver};

/// Builds documents from a delimited record stream.
///
/// Every record is one document. Column names come from the header record,
/// or are generated (`Column 0`, `Column 1`, ...) when the file has none.
///
/// # Example
///
/// ```
/// use loadfile::group::DelimitedBuilder;
/// use loadfile::parser::{DelimitedOptions, Delimiters, RecordReader};
///
/// let text = "BegDoc,ParentID\nD1,\nD2,D1\n";
/// let options = DelimitedOptions::new()
///     .with_delimiters(Delimiters::COMMA_QUOTE)
///     .with_parent_column("ParentID");
///
/// let records = RecordReader::from_text(text, options.delimiters);
/// let set = DelimitedBuilder::new(options).build(records).unwrap();
///
/// assert_eq!(set.len(), 2);
/// assert_eq!(set.by_key("D1").unwrap().children().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DelimitedBuilder {
    options: DelimitedOptions,
}

impl DelimitedBuilder {
    /// Create a builder.
    pub fn new(options: DelimitedOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &DelimitedOptions {
        &self.options
    }

    /// Build a document set from records.
    pub fn build<I>(&self, records: I) -> Result<DocumentSet>
    where
        I: IntoIterator<Item = Result<Record>>,
    {
        let mut records = records.into_iter();
        let first = records.next().ok_or(Error::EmptyInput)??;

        let (header, first_data) = if self.options.has_header {
            let header: Vec<String> = first.fields.iter().map(|f| f.trim().to_string()).collect();
            (header, None)
        } else {
            let header: Vec<String> = (0..first.fields.len())
                .map(|i| format!("Column {}", i))
                .collect();
            (header, Some(first))
        };

        let mut policy = DelimitedPolicy::new(header, &self.options)?;
        let mut resolver = FamilyResolver::from_options(&self.options);
        let mut set = DocumentSet::new();

        let rows = first_data.map(Ok).into_iter().chain(records);
        accumulate(&mut policy, rows, |document| {
            log::debug!("document {} ({} fields)", document.key, document.metadata.len());
            let id = set.insert(document)?;
            resolver.resolve(&mut set, id)
        })?;
        resolver.finish()?;

        log::debug!(
            "built {} documents, {} families",
            set.len(),
            set.family_count()
        );
        Ok(set)
    }
}

/// Column positions resolved against the header.
struct DelimitedPolicy<'a> {
    header: Vec<String>,
    key_index: usize,
    representatives: Vec<(usize, &'a str, RepresentativeKind)>,
    options: &'a DelimitedOptions,
}

impl<'a> DelimitedPolicy<'a> {
    fn new(header: Vec<String>, options: &'a DelimitedOptions) -> Result<Self> {
        let position = |column: &str| {
            header
                .iter()
                .position(|name| name == column.trim())
                .ok_or_else(|| Error::MissingColumn(column.to_string()))
        };

        let key_index = match options.key_column.as_deref() {
            Some(column) => position(column)?,
            None => 0,
        };
        for column in [&options.parent_column, &options.child_column]
            .into_iter()
            .flatten()
        {
            position(column.as_str())?;
        }
        let representatives = options
            .representatives
            .iter()
            .map(|setting| Ok((position(setting.column.as_str())?, setting.name.as_str(), setting.kind)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            header,
            key_index,
            representatives,
            options,
        })
    }
}

impl BoundaryPolicy for DelimitedPolicy<'_> {
    type Row = Record;
    type Group = Document;

    fn line(row: &Record) -> usize {
        row.line
    }

    fn classify(&mut self, _row: &Record, _open: Option<&[Record]>) -> Result<Boundary> {
        Ok(Boundary::Start)
    }

    fn build(&mut self, rows: Vec<Record>) -> Result<Document> {
        let mut document = Document::default();

        for record in rows {
            if record.fields.len() != self.header.len() {
                return Err(Error::FieldCountMismatch {
                    line: record.line,
                    expected: self.header.len(),
                    found: record.fields.len(),
                });
            }

            let key = record.fields[self.key_index].trim();
            if key.is_empty() {
                return Err(Error::InvalidRecord {
                    line: record.line,
                    message: format!("the key column '{}' is blank", self.header[self.key_index]),
                });
            }
            document.key = key.to_string();

            for &(index, name, kind) in &self.representatives {
                let file = record.fields[index].trim();
                if file.is_empty() {
                    continue;
                }
                match document.representative_mut(kind, name) {
                    Some(existing) => {
                        existing.add_file(file);
                    }
                    None => document.set_representative(Representative::new(kind, name).with_file(file)),
                }
            }

            for (name, value) in self.header.iter().zip(record.fields) {
                document.add_field(name.as_str(), value);
            }
        }

        if let Some(setting) = &self.options.text {
            let names = &self.options.names;
            let has_text = document
                .representative(RepresentativeKind::Text, &names.text)
                .is_some();
            let image = document
                .representative(RepresentativeKind::Image, &names.image)
                .or_else(|| document.representatives_of(RepresentativeKind::Image).next());

            if !has_text {
                if let Some(text) = image.and_then(|image| text::derive_text(image, setting, &names.text)) {
                    document.set_representative(text);
                }
            }
        }

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Delimiters, RecordReader, RepresentativeSetting, TextLevel, TextSetting};

    fn build(text: &str, options: DelimitedOptions) -> Result<DocumentSet> {
        let options = options.with_delimiters(Delimiters::COMMA_QUOTE);
        let records = RecordReader::from_text(text, options.delimiters);
        DelimitedBuilder::new(options).build(records)
    }

    #[test]
    fn test_one_document_per_record() {
        let set = build("BegDoc,Title\nA1,First\nA2,\"Second, again\"\n", DelimitedOptions::new()).unwrap();
        assert_eq!(set.len(), 2);
        let doc = set.by_key("A2").unwrap();
        assert_eq!(doc.field("Title"), Some("Second, again"));
        let names: Vec<_> = doc.metadata.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["BegDoc", "Title"]);
    }

    #[test]
    fn test_headerless_columns() {
        let set = build("A1,x\nA2,y\n", DelimitedOptions::new().headerless()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.by_key("A1").unwrap().field("Column 1"), Some("x"));
    }

    #[test]
    fn test_key_column() {
        let options = DelimitedOptions::new().with_key_column("Control");
        let set = build("Title,Control\nfoo,K1\n", options).unwrap();
        assert!(set.contains_key("K1"));
    }

    #[test]
    fn test_missing_configured_column() {
        let options = DelimitedOptions::new().with_parent_column("ParentID");
        let err = build("BegDoc,Title\nA1,x\n", options).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(ref c) if c == "ParentID"));
    }

    #[test]
    fn test_field_count_mismatch() {
        let err = build("BegDoc,Title\nA1,x\nA2\n", DelimitedOptions::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::FieldCountMismatch {
                line: 3,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(build("", DelimitedOptions::new()), Err(Error::EmptyInput)));
        assert!(build("BegDoc\n", DelimitedOptions::new()).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_key() {
        let err = build("BegDoc\nA1\nA1\n", DelimitedOptions::new()).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(ref k) if k == "A1"));
    }

    #[test]
    fn test_representative_columns() {
        let options = DelimitedOptions::new()
            .with_representative(RepresentativeSetting::native("Native"))
            .with_representative(RepresentativeSetting::image("Image"))
            .with_text(TextSetting::new(TextLevel::Doc));
        let text = "BegDoc,Native,Image\nA1,NATIVE\\A1.msg,IMAGES\\A1.tif\nA2,,\n";
        let set = build(text, options).unwrap();

        let a1 = set.by_key("A1").unwrap();
        let native = a1.representative(RepresentativeKind::Native, "default").unwrap();
        assert_eq!(native.first_file(), Some("NATIVE\\A1.msg"));
        let text = a1.representative(RepresentativeKind::Text, "default").unwrap();
        assert_eq!(text.first_file(), Some("IMAGES\\A1.txt"));

        assert!(set.by_key("A2").unwrap().representatives.is_empty());
    }

    #[test]
    fn test_parent_column_families() {
        let options = DelimitedOptions::new().with_parent_column("ParentID");
        let set = build("BegDoc,ParentID\nD1,\nD2,D1\nD3,D1\n", options).unwrap();

        let d1 = set.id_of("D1").unwrap();
        let children: Vec<_> = set.children_of(d1).map(|d| d.key.as_str()).collect();
        assert_eq!(children, vec!["D2", "D3"]);
        assert_eq!(set.parent_of(set.id_of("D3").unwrap()).unwrap().key, "D1");
    }

    #[test]
    fn test_unsatisfied_child_declaration() {
        let options = DelimitedOptions::new().with_child_column("Attach");
        let err = build("BegDoc,Attach\nD1,D2\n", options).unwrap_err();
        assert!(matches!(err, Error::OrphanedChildren { .. }));
    }
}
