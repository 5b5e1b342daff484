//! IPRO LFP writer.

use crate::error::{Error, Result};
use crate::group::text::split_path;
use crate::group::ImageFlag;
use crate::model::{DocumentSet, RepresentativeKind};

use super::opticon::{image_representative, volume_name};
use super::ExportOptions;

/// Write a document set as an LFP file.
///
/// Image rows: `IM,key,flag,offset,@volume;path;file;type`. The native row
/// follows the first image row of its document; a document without images
/// is written as a lone native row. A single image file covering several
/// pages (per the `Page Count` field) is repeated with offsets `1..=pages`.
pub fn to_lfp(set: &DocumentSet, options: &ExportOptions) -> Result<String> {
    let mut output = String::new();

    for doc in set {
        let volume = volume_name(doc, options);
        let native = doc
            .representative(RepresentativeKind::Native, &options.names.native)
            .and_then(|r| r.first_file());
        let native_row = native.map(|file| {
            let (dir, name) = split_path(file);
            format!("OF,{},@{};{};{},1\r\n", doc.key, volume, dir, name)
        });

        let Some(images) = image_representative(doc, &options.names.image) else {
            if let Some(row) = native_row {
                output.push_str(&row);
            } else {
                log::debug!("{} has no images or native, skipped", doc.key);
            }
            continue;
        };

        let boundary = if doc.is_child() {
            ImageFlag::Child
        } else {
            ImageFlag::Document
        };
        let page_count: usize = doc
            .field("Page Count")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0);

        let pages: Vec<(&str, usize)> = match images.first_file() {
            Some(file) if images.file_count() == 1 && page_count > 1 => {
                (1..=page_count).map(|offset| (file, offset)).collect()
            }
            _ => images.files.iter().map(|file| (file.as_str(), 0)).collect(),
        };

        for (i, (file, offset)) in pages.into_iter().enumerate() {
            let (dir, name) = split_path(file);
            let flag = if i == 0 { boundary } else { ImageFlag::Page };
            output.push_str(&format!(
                "IM,{},{},{},@{};{};{};{}\r\n",
                doc.key,
                flag,
                offset,
                volume,
                dir,
                name,
                image_type(file)?
            ));

            if i == 0 {
                if let Some(row) = &native_row {
                    output.push_str(row);
                }
            }
        }
    }

    Ok(output)
}

/// IPRO image type code from the file extension.
fn image_type(file: &str) -> Result<u8> {
    let extension = file
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_uppercase())
        .unwrap_or_default();
    match extension.as_str() {
        "TIF" | "TIFF" => Ok(2),
        "JPG" | "JPEG" => Ok(4),
        "PDF" => Ok(7),
        _ => Err(Error::Export(format!("unsupported image type: {}", file))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Document, Representative};

    #[test]
    fn test_family_flags_and_native() {
        let mut set = DocumentSet::new();
        let p = set
            .insert(
                Document::new("P1")
                    .with_field("Volume Name", "V")
                    .with_representative(
                        Representative::image("default")
                            .with_file("IMG\\P1.tif")
                            .with_file("IMG\\P2.tif"),
                    )
                    .with_representative(Representative::native("default").with_file("NAT\\P1.msg")),
            )
            .unwrap();
        let c = set
            .insert(
                Document::new("C1")
                    .with_field("Volume Name", "V")
                    .with_representative(Representative::image("default").with_file("IMG\\C1.jpg")),
            )
            .unwrap();
        set.link(c, p).unwrap();

        let out = to_lfp(&set, &ExportOptions::new()).unwrap();
        assert_eq!(
            out,
            "IM,P1,D,0,@V;IMG;P1.tif;2\r\n\
             OF,P1,@V;NAT;P1.msg,1\r\n\
             IM,P1,,0,@V;IMG;P2.tif;2\r\n\
             IM,C1,C,0,@V;IMG;C1.jpg;4\r\n"
        );
    }

    #[test]
    fn test_multi_page_pdf_offsets() {
        let mut set = DocumentSet::new();
        set.insert(
            Document::new("A1")
                .with_field("Page Count", "3")
                .with_representative(Representative::image("default").with_file("IMG/A1.pdf")),
        )
        .unwrap();

        let out = to_lfp(&set, &ExportOptions::new().with_volume("VOL")).unwrap();
        let offsets: Vec<_> = out
            .lines()
            .map(|l| l.split(',').nth(3).unwrap().to_string())
            .collect();
        assert_eq!(offsets, vec!["1", "2", "3"]);
        assert!(out.starts_with("IM,A1,D,1,@VOL;IMG;A1.pdf;7\r\n"));
    }

    #[test]
    fn test_native_only_document() {
        let mut set = DocumentSet::new();
        set.insert(
            Document::new("N1")
                .with_representative(Representative::native("default").with_file("NAT\\N1.xls")),
        )
        .unwrap();
        let out = to_lfp(&set, &ExportOptions::new().with_volume("V")).unwrap();
        assert_eq!(out, "OF,N1,@V;NAT;N1.xls,1\r\n");
    }

    #[test]
    fn test_unsupported_image_type() {
        let mut set = DocumentSet::new();
        set.insert(
            Document::new("A1")
                .with_representative(Representative::image("default").with_file("A1.bmp")),
        )
        .unwrap();
        assert!(matches!(
            to_lfp(&set, &ExportOptions::new()),
            Err(Error::Export(_))
        ));
    }
}
