//! Builder for IPRO image and native (LFP) load files.

use std::fmt;

use crate::error::{Error, Result};
use crate::model::{DocId, Document, DocumentSet, Representative};
use crate::parser::{ImageOptions, Record};

use super::text::{derive_text, join_path};
use super::{accumulate, Boundary, BoundaryPolicy};

/// Boundary flag of an `IM` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFlag {
    /// `D`: first page of a standalone or parent document
    Document,
    /// `C`: first page of a child of the most recent `D` document
    Child,
    /// Empty: another page of the open document
    Page,
}

impl ImageFlag {
    /// Flag as written in the file.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFlag::Document => "D",
            ImageFlag::Child => "C",
            ImageFlag::Page => "",
        }
    }

    fn parse(value: &str, line: usize) -> Result<Self> {
        match value.trim() {
            "D" | "d" => Ok(ImageFlag::Document),
            "C" | "c" => Ok(ImageFlag::Child),
            "" => Ok(ImageFlag::Page),
            other => Err(Error::InvalidRecord {
                line,
                message: format!("unknown image boundary flag '{}'", other),
            }),
        }
    }
}

impl fmt::Display for ImageFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed LFP row.
///
/// Image rows: `IM,key,flag,offset,@volume;path;file;type[;rotation]`.
/// Native rows: `OF,key,@volume;path;file,offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LfpRow {
    /// `IM` row: one image page
    Image {
        /// 1-based physical line
        line: usize,
        /// Document key
        key: String,
        /// Boundary flag
        flag: ImageFlag,
        /// Volume name without the leading `@`
        volume: String,
        /// Image directory
        path: String,
        /// Image file name
        file: String,
    },
    /// `OF` row: the native file of a document
    Native {
        /// 1-based physical line
        line: usize,
        /// Document key
        key: String,
        /// Volume name without the leading `@`
        volume: String,
        /// Native directory
        path: String,
        /// Native file name
        file: String,
    },
}

impl LfpRow {
    /// Parse a record split on `,`; its fields are split again on `;`.
    pub fn parse(record: &Record) -> Result<Self> {
        let line = record.line;
        let fields: Vec<&str> = record
            .fields
            .iter()
            .flat_map(|field| field.split(';'))
            .map(str::trim)
            .collect();
        let short = |min: usize| Error::InvalidRecord {
            line,
            message: format!("expected at least {} fields, found {}", min, fields.len()),
        };
        let volume = |value: &str| value.strip_prefix('@').unwrap_or(value).to_string();

        match fields.first().copied() {
            Some("IM") => {
                if fields.len() < 7 {
                    return Err(short(7));
                }
                Ok(LfpRow::Image {
                    line,
                    key: fields[1].to_string(),
                    flag: ImageFlag::parse(fields[2], line)?,
                    volume: volume(fields[4]),
                    path: fields[5].to_string(),
                    file: fields[6].to_string(),
                })
            }
            Some("OF") => {
                if fields.len() < 5 {
                    return Err(short(5));
                }
                Ok(LfpRow::Native {
                    line,
                    key: fields[1].to_string(),
                    volume: volume(fields[2]),
                    path: fields[3].to_string(),
                    file: fields[4].to_string(),
                })
            }
            other => Err(Error::InvalidRecord {
                line,
                message: format!("unknown line type '{}'", other.unwrap_or("")),
            }),
        }
    }

    /// Document key.
    pub fn key(&self) -> &str {
        match self {
            LfpRow::Image { key, .. } | LfpRow::Native { key, .. } => key,
        }
    }

    /// Physical line.
    pub fn line(&self) -> usize {
        match self {
            LfpRow::Image { line, .. } | LfpRow::Native { line, .. } => *line,
        }
    }

    /// Check if this is an `OF` row.
    pub fn is_native(&self) -> bool {
        matches!(self, LfpRow::Native { .. })
    }

    /// Full file path.
    pub fn file_path(&self) -> String {
        match self {
            LfpRow::Image { path, file, .. } | LfpRow::Native { path, file, .. } => {
                join_path(path, file)
            }
        }
    }

    fn volume(&self) -> &str {
        match self {
            LfpRow::Image { volume, .. } | LfpRow::Native { volume, .. } => volume,
        }
    }
}

/// Builds documents from LFP rows and links `C` documents to their `D`
/// parent.
#[derive(Debug, Clone, Default)]
pub struct LfpBuilder {
    options: ImageOptions,
}

impl LfpBuilder {
    /// Create a builder.
    pub fn new(options: ImageOptions) -> Self {
        Self { options }
    }

    /// Build a document set from comma split records.
    pub fn build<I>(&self, records: I) -> Result<DocumentSet>
    where
        I: IntoIterator<Item = Result<Record>>,
    {
        let rows = records
            .into_iter()
            .map(|record| record.and_then(|record| LfpRow::parse(&record)));
        self.build_rows(rows)
    }

    /// Build a document set from parsed rows.
    pub fn build_rows<I>(&self, rows: I) -> Result<DocumentSet>
    where
        I: IntoIterator<Item = Result<LfpRow>>,
    {
        let mut policy = LfpPolicy {
            options: &self.options,
        };
        let mut set = DocumentSet::new();
        let mut last_parent: Option<DocId> = None;

        accumulate(&mut policy, rows, |group| {
            let key = group.document.key.clone();
            log::debug!("document {} ({})", key, group.flag.map_or("native only", |f| f.as_str()));
            let id = set.insert(group.document)?;

            match group.flag {
                Some(ImageFlag::Document) => last_parent = Some(id),
                Some(ImageFlag::Child) => {
                    let parent = last_parent.ok_or_else(|| Error::MissingParent {
                        key,
                        parent: "no preceding D document".to_string(),
                    })?;
                    set.link(id, parent)?;
                }
                _ => {}
            }
            Ok(())
        })?;

        log::debug!(
            "built {} documents, {} families",
            set.len(),
            set.family_count()
        );
        Ok(set)
    }
}

struct LfpGroup {
    document: Document,
    flag: Option<ImageFlag>,
}

struct LfpPolicy<'a> {
    options: &'a ImageOptions,
}

impl BoundaryPolicy for LfpPolicy<'_> {
    type Row = LfpRow;
    type Group = LfpGroup;

    fn line(row: &LfpRow) -> usize {
        row.line()
    }

    fn classify(&mut self, row: &LfpRow, open: Option<&[LfpRow]>) -> Result<Boundary> {
        let open_key = open.and_then(|rows| rows.first()).map(LfpRow::key);
        let open_has_native = open.is_some_and(|rows| rows.iter().any(LfpRow::is_native));
        let open_has_images = open.is_some_and(|rows| rows.iter().any(|r| !r.is_native()));

        match row {
            LfpRow::Native { key, .. } => {
                if open_key == Some(key.as_str()) && !open_has_native {
                    Ok(Boundary::Continue)
                } else {
                    Ok(Boundary::Start)
                }
            }
            LfpRow::Image {
                flag: ImageFlag::Page,
                line,
                ..
            } => {
                if open.is_some() && !open_has_images {
                    return Err(Error::InvalidRecord {
                        line: *line,
                        message: "an image page row follows a native-only document".to_string(),
                    });
                }
                Ok(Boundary::Continue)
            }
            LfpRow::Image { key, .. } => {
                // a boundary row completes a pending native-only document
                if open_key == Some(key.as_str()) && !open_has_images {
                    Ok(Boundary::Continue)
                } else {
                    Ok(Boundary::Start)
                }
            }
        }
    }

    fn build(&mut self, rows: Vec<LfpRow>) -> Result<LfpGroup> {
        let first = &rows[0];
        let key = first.key();
        if key.is_empty() {
            return Err(Error::InvalidRecord {
                line: first.line(),
                message: "the document key is blank".to_string(),
            });
        }

        let names = &self.options.names;
        let flag = rows.iter().find_map(|row| match row {
            LfpRow::Image { flag, .. } => Some(*flag),
            LfpRow::Native { .. } => None,
        });
        let volume = rows
            .iter()
            .find(|row| !row.is_native())
            .unwrap_or(first)
            .volume();
        let images = Representative::image(names.image.as_str()).with_files(
            rows.iter()
                .filter(|row| !row.is_native())
                .map(LfpRow::file_path),
        );
        let page_count = rows.iter().filter(|row| !row.is_native()).count();
        let native = rows
            .iter()
            .find(|row| row.is_native())
            .map(|row| Representative::native(names.native.as_str()).with_file(row.file_path()));

        let mut document = Document::new(key)
            .with_field("DocID", key)
            .with_field("Volume Name", volume)
            .with_field(
                "Page Count",
                if page_count == 0 {
                    String::new()
                } else {
                    page_count.to_string()
                },
            );

        let text = self
            .options
            .text
            .as_ref()
            .and_then(|setting| derive_text(&images, setting, &names.text));
        if !images.is_empty() {
            document.set_representative(images);
        }
        if let Some(native) = native {
            document.set_representative(native);
        }
        if let Some(text) = text {
            document.set_representative(text);
        }

        Ok(LfpGroup { document, flag })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RepresentativeKind;
    use crate::parser::{Delimiters, RecordReader};

    fn build(text: &str) -> Result<DocumentSet> {
        LfpBuilder::default().build(RecordReader::from_text(text, Delimiters::COMMA_DELIMITED))
    }

    fn files(doc: &Document, kind: RepresentativeKind) -> Vec<String> {
        doc.representative(kind, "default")
            .map(|r| r.files.iter().cloned().collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_parse_rows() {
        let record = Record {
            line: 3,
            fields: vec!["IM".into(), "A1".into(), "D".into(), "0".into(), "@VOL1;IMG\\001;A1.tif;2".into()],
        };
        let row = LfpRow::parse(&record).unwrap();
        assert_eq!(row.key(), "A1");
        assert_eq!(row.file_path(), "IMG\\001\\A1.tif");
        assert!(matches!(row, LfpRow::Image { flag: ImageFlag::Document, ref volume, .. } if volume == "VOL1"));

        let record = Record {
            line: 4,
            fields: vec!["OF".into(), "A1".into(), "@VOL1;NATIVE;A1.msg".into(), "1".into()],
        };
        assert!(LfpRow::parse(&record).unwrap().is_native());
    }

    #[test]
    fn test_images_and_native() {
        let text = "\
IM,A1,D,0,@VOL1;IMG;A1.tif;2
OF,A1,@VOL1;NATIVE;A1.msg,1
IM,A2,,0,@VOL1;IMG;A2.tif;2
IM,B1,D,0,@VOL1;IMG;B1.tif;2
";
        let set = build(text).unwrap();
        assert_eq!(set.len(), 2);

        let a1 = set.by_key("A1").unwrap();
        assert_eq!(a1.field("Page Count"), Some("2"));
        assert_eq!(a1.field("Volume Name"), Some("VOL1"));
        assert_eq!(files(a1, RepresentativeKind::Image), vec!["IMG\\A1.tif", "IMG\\A2.tif"]);
        assert_eq!(files(a1, RepresentativeKind::Native), vec!["NATIVE\\A1.msg"]);
    }

    #[test]
    fn test_single_volume_marker_stripped() {
        let set = build("IM,A1,D,0,@@VOL;IMG;A1.tif;2\nIM,B1,D,0,VOL;IMG;B1.tif;2\n").unwrap();
        assert_eq!(set.by_key("A1").unwrap().field("Volume Name"), Some("@VOL"));
        assert_eq!(set.by_key("B1").unwrap().field("Volume Name"), Some("VOL"));
    }

    #[test]
    fn test_child_documents_link_to_last_parent() {
        let text = "\
IM,P1,D,0,@V;IMG;P1.tif;2
IM,C1,C,0,@V;IMG;C1.tif;2
IM,C2,C,0,@V;IMG;C2.tif;2
IM,P2,D,0,@V;IMG;P2.tif;2
";
        let set = build(text).unwrap();
        let p1 = set.id_of("P1").unwrap();
        let children: Vec<_> = set.children_of(p1).map(|d| d.key.as_str()).collect();
        assert_eq!(children, vec!["C1", "C2"]);
        assert!(!set.by_key("P2").unwrap().has_children());
    }

    #[test]
    fn test_child_without_parent_fails() {
        let err = build("IM,C1,C,0,@V;IMG;C1.tif;2\n").unwrap_err();
        assert!(matches!(err, Error::MissingParent { ref key, .. } if key == "C1"));
    }

    #[test]
    fn test_native_before_images_joins_document() {
        let text = "\
OF,A1,@V;NATIVE;A1.doc,1
IM,A1,D,0,@V;IMG;A1.tif;2
IM,A1,,1,@V;IMG;A1.tif;2
";
        let set = build(text).unwrap();
        assert_eq!(set.len(), 1);
        let a1 = set.by_key("A1").unwrap();
        assert_eq!(a1.field("Page Count"), Some("2"));
        assert_eq!(files(a1, RepresentativeKind::Image).len(), 1);
        assert_eq!(files(a1, RepresentativeKind::Native), vec!["NATIVE\\A1.doc"]);
    }

    #[test]
    fn test_native_only_document() {
        let text = "\
IM,A1,D,0,@V;IMG;A1.tif;2
OF,A1,@V;NATIVE;A1.doc,1
OF,A2,@V;NATIVE;A2.xls,1
IM,A3,D,0,@V;IMG;A3.tif;2
";
        let set = build(text).unwrap();
        let keys: Vec<_> = set.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, vec!["A1", "A2", "A3"]);

        let a2 = set.by_key("A2").unwrap();
        assert_eq!(a2.field("Page Count"), Some(""));
        assert!(files(a2, RepresentativeKind::Image).is_empty());
        assert_eq!(files(a2, RepresentativeKind::Native), vec!["NATIVE\\A2.xls"]);
    }

    #[test]
    fn test_second_native_starts_new_document() {
        let text = "OF,A1,@V;N;A1.doc,1\nOF,A1,@V;N;A1.pdf,1\n";
        let err = build(text).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(ref k) if k == "A1"));
    }

    #[test]
    fn test_unknown_token_and_flag() {
        let err = build("XX,A1,D,0,@V;IMG;A1.tif;2\n").unwrap_err();
        assert!(matches!(err, Error::InvalidRecord { line: 1, .. }));

        let err = build("IM,A1,Q,0,@V;IMG;A1.tif;2\n").unwrap_err();
        assert!(err.to_string().contains("boundary flag"));
    }

    #[test]
    fn test_page_before_boundary_fails() {
        let err = build("IM,A1,,0,@V;IMG;A1.tif;2\n").unwrap_err();
        assert!(matches!(err, Error::InvalidRecord { line: 1, .. }));

        let err = build("OF,A1,@V;N;A1.doc,1\nIM,A1,,0,@V;IMG;A1.tif;2\n").unwrap_err();
        assert!(matches!(err, Error::InvalidRecord { line: 2, .. }));
    }
}
