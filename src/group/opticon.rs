//! Builder for Opticon image cross-reference (OPT) files.

use crate::error::{Error, Result};
use crate::model::{Document, DocumentSet, Representative};
use crate::parser::{ImageOptions, Record};

use super::{accumulate, text, Boundary, BoundaryPolicy};

/// Minimum number of fields in an Opticon row: key, volume, path, break.
const MIN_FIELDS: usize = 4;

const KEY: usize = 0;
const VOLUME: usize = 1;
const PATH: usize = 2;
const DOC_BREAK: usize = 3;
const BOX_BREAK: usize = 4;
const FOLDER_BREAK: usize = 5;

/// Builds documents from Opticon rows.
///
/// Each row is one image page: `key,volume,path,Y,box,folder,pages`. A `Y`
/// in the break column starts a new document; blank means the page belongs
/// to the document above it.
#[derive(Debug, Clone, Default)]
pub struct OpticonBuilder {
    options: ImageOptions,
}

impl OpticonBuilder {
    /// Create a builder.
    pub fn new(options: ImageOptions) -> Self {
        Self { options }
    }

    /// Build a document set from comma split records.
    pub fn build<I>(&self, records: I) -> Result<DocumentSet>
    where
        I: IntoIterator<Item = Result<Record>>,
    {
        let mut policy = OpticonPolicy {
            options: &self.options,
        };
        let mut set = DocumentSet::new();

        accumulate(&mut policy, records, |document| {
            log::debug!(
                "document {} ({} pages)",
                document.key,
                document.field("Page Count").unwrap_or("0")
            );
            set.insert(document).map(|_| ())
        })?;

        log::debug!("built {} documents", set.len());
        Ok(set)
    }
}

struct OpticonPolicy<'a> {
    options: &'a ImageOptions,
}

impl BoundaryPolicy for OpticonPolicy<'_> {
    type Row = Record;
    type Group = Document;

    fn line(row: &Record) -> usize {
        row.line
    }

    fn classify(&mut self, row: &Record, _open: Option<&[Record]>) -> Result<Boundary> {
        if row.fields.len() < MIN_FIELDS {
            return Err(Error::InvalidRecord {
                line: row.line,
                message: format!(
                    "expected at least {} fields, found {}",
                    MIN_FIELDS,
                    row.fields.len()
                ),
            });
        }

        if row.field(DOC_BREAK).trim().eq_ignore_ascii_case("Y") {
            Ok(Boundary::Start)
        } else {
            Ok(Boundary::Continue)
        }
    }

    fn build(&mut self, rows: Vec<Record>) -> Result<Document> {
        let first = &rows[0];
        let key = first.field(KEY).trim();
        if key.is_empty() {
            return Err(Error::InvalidRecord {
                line: first.line,
                message: "the document key is blank".to_string(),
            });
        }

        let names = &self.options.names;
        let images = Representative::image(names.image.as_str()).with_files(
            rows.iter()
                .map(|row| row.field(PATH).trim())
                .filter(|path| !path.is_empty()),
        );

        let volume = first.field(VOLUME).trim();
        let mut document = Document::new(key)
            .with_field("DocID", key)
            .with_field("Volume Name", volume.strip_prefix('@').unwrap_or(volume))
            .with_field("Page Count", rows.len().to_string())
            .with_field("Box Break", first.field(BOX_BREAK).trim())
            .with_field("Folder Break", first.field(FOLDER_BREAK).trim());

        let text = self
            .options
            .text
            .as_ref()
            .and_then(|setting| text::derive_text(&images, setting, &names.text));
        if !images.is_empty() {
            document.set_representative(images);
        }
        if let Some(text) = text {
            document.set_representative(text);
        }

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RepresentativeKind;
    use crate::parser::{Delimiters, RecordReader, TextLevel, TextSetting};

    fn build(text: &str, options: ImageOptions) -> Result<DocumentSet> {
        OpticonBuilder::new(options).build(RecordReader::from_text(text, Delimiters::COMMA_DELIMITED))
    }

    const OPT: &str = "\
ABC0001,VOL001,IMAGES\\0001\\ABC0001.tif,Y,,,3
ABC0002,VOL001,IMAGES\\0001\\ABC0002.tif,,,,
ABC0003,VOL001,IMAGES\\0001\\ABC0003.tif,,,,
ABC0004,@VOL001,IMAGES\\0001\\ABC0004.tif,y,BOX1,F1,1
";

    #[test]
    fn test_groups_pages_by_doc_break() {
        let set = build(OPT, ImageOptions::new()).unwrap();
        assert_eq!(set.len(), 2);

        let first = set.by_key("ABC0001").unwrap();
        assert_eq!(first.field("Page Count"), Some("3"));
        let images = first.representative(RepresentativeKind::Image, "default").unwrap();
        assert_eq!(images.file_count(), 3);

        let second = set.by_key("ABC0004").unwrap();
        assert_eq!(second.field("Volume Name"), Some("VOL001"));
        assert_eq!(second.field("Box Break"), Some("BOX1"));
        assert_eq!(second.field("Folder Break"), Some("F1"));
    }

    #[test]
    fn test_single_volume_marker_stripped() {
        let set = build("A1,@@VOL,IMG\\A1.tif,Y,,,1\n", ImageOptions::new()).unwrap();
        assert_eq!(set.by_key("A1").unwrap().field("Volume Name"), Some("@VOL"));
    }

    #[test]
    fn test_multi_page_file_listed_once() {
        let text = "A1,V,IMG\\A1.pdf,Y,,,2\nA1,V,IMG\\A1.pdf,,,,\n";
        let set = build(text, ImageOptions::new()).unwrap();
        let doc = set.by_key("A1").unwrap();
        assert_eq!(doc.field("Page Count"), Some("2"));
        assert_eq!(
            doc.representative(RepresentativeKind::Image, "default").unwrap().file_count(),
            1
        );
    }

    #[test]
    fn test_page_before_first_break_fails() {
        let text = "A1,V,IMG\\A1.tif,,,,\nA2,V,IMG\\A2.tif,Y,,,1\n";
        let err = build(text, ImageOptions::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord { line: 1, .. }));
    }

    #[test]
    fn test_short_row_fails() {
        let err = build("A1,V,IMG\\A1.tif\n", ImageOptions::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord { line: 1, .. }));
    }

    #[test]
    fn test_page_level_text() {
        let options = ImageOptions::new().with_text(TextSetting::new(TextLevel::Page));
        let set = build(OPT, options).unwrap();
        let text = set
            .by_key("ABC0001")
            .unwrap()
            .representative(RepresentativeKind::Text, "default")
            .unwrap();
        assert_eq!(text.file_count(), 3);
        assert_eq!(text.first_file(), Some("IMAGES\\0001\\ABC0001.txt"));
    }
}
