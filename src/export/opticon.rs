//! Opticon (OPT) writer.

use crate::error::Result;
use crate::model::{Document, DocumentSet, Representative, RepresentativeKind};

use super::ExportOptions;

/// Write a document set as an Opticon image cross-reference.
///
/// One row per image file: `key,volume,path,break,box,folder,pages`. The
/// first row of a document carries the `Y` break and the page count.
/// Documents without the configured image representative are skipped.
pub fn to_opticon(set: &DocumentSet, options: &ExportOptions) -> Result<String> {
    let mut output = String::new();

    for doc in set {
        let Some(images) = image_representative(doc, &options.names.image) else {
            log::debug!("{} has no images, skipped", doc.key);
            continue;
        };
        let volume = volume_name(doc, options);

        for (i, file) in images.files.iter().enumerate() {
            let first = i == 0;
            output.push_str(&format!(
                "{},{},{},{},,,{}\r\n",
                doc.key,
                volume,
                file,
                if first { "Y" } else { "" },
                if first {
                    images.file_count().to_string()
                } else {
                    String::new()
                },
            ));
        }
    }

    Ok(output)
}

pub(crate) fn image_representative<'a>(doc: &'a Document, name: &str) -> Option<&'a Representative> {
    doc.representative(RepresentativeKind::Image, name)
        .filter(|r| !r.is_empty())
}

pub(crate) fn volume_name<'a>(doc: &'a Document, options: &'a ExportOptions) -> &'a str {
    options
        .volume
        .as_deref()
        .or_else(|| doc.field("Volume Name"))
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_per_image() {
        let mut set = DocumentSet::new();
        set.insert(
            Document::new("A1").with_field("Volume Name", "VOL1").with_representative(
                Representative::image("default")
                    .with_file("IMG\\A1.tif")
                    .with_file("IMG\\A2.tif"),
            ),
        )
        .unwrap();
        set.insert(Document::new("B1")).unwrap();

        let out = to_opticon(&set, &ExportOptions::new()).unwrap();
        assert_eq!(
            out,
            "A1,VOL1,IMG\\A1.tif,Y,,,2\r\nA1,VOL1,IMG\\A2.tif,,,,\r\n"
        );
    }

    #[test]
    fn test_volume_override() {
        let mut set = DocumentSet::new();
        set.insert(
            Document::new("A1")
                .with_field("Volume Name", "VOL1")
                .with_representative(Representative::image("default").with_file("A1.tif")),
        )
        .unwrap();

        let out = to_opticon(&set, &ExportOptions::new().with_volume("NEW")).unwrap();
        assert_eq!(out, "A1,NEW,A1.tif,Y,,,1\r\n");
    }
}
