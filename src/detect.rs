//! Load file format and text encoding detection.

use crate::error::{Error, Result};
use crate::parser::Delimiters;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// The three load file families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadFileFormat {
    /// Delimited metadata (Concordance DAT, CSV, TSV)
    Delimited,
    /// Opticon image cross-reference (OPT)
    Opticon,
    /// IPRO image and native load (LFP)
    Lfp,
}

impl LoadFileFormat {
    /// Conventional file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            LoadFileFormat::Delimited => "dat",
            LoadFileFormat::Opticon => "opt",
            LoadFileFormat::Lfp => "lfp",
        }
    }

    /// Map a file extension to a format.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "dat" | "csv" | "txt" | "tsv" => Some(LoadFileFormat::Delimited),
            "opt" => Some(LoadFileFormat::Opticon),
            "lfp" => Some(LoadFileFormat::Lfp),
            _ => None,
        }
    }
}

impl fmt::Display for LoadFileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadFileFormat::Delimited => write!(f, "delimited"),
            LoadFileFormat::Opticon => write!(f, "opticon"),
            LoadFileFormat::Lfp => write!(f, "lfp"),
        }
    }
}

impl FromStr for LoadFileFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delimited" => Ok(LoadFileFormat::Delimited),
            "opticon" => Ok(LoadFileFormat::Opticon),
            other => Self::from_extension(other).ok_or_else(|| Error::UnknownFormat(other.to_string())),
        }
    }
}

/// Text encoding found at the start of a byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8 with a byte-order mark
    Utf8Bom,
    /// UTF-16 little endian with a byte-order mark
    Utf16Le,
    /// UTF-16 big endian with a byte-order mark
    Utf16Be,
    /// UTF-8 without a byte-order mark
    Utf8,
    /// ISO-8859-1, used when the bytes are not valid UTF-8
    Latin1,
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];

impl TextEncoding {
    /// Length of the byte-order mark for this encoding.
    pub fn bom_len(&self) -> usize {
        match self {
            TextEncoding::Utf8Bom => UTF8_BOM.len(),
            TextEncoding::Utf16Le | TextEncoding::Utf16Be => 2,
            TextEncoding::Utf8 | TextEncoding::Latin1 => 0,
        }
    }
}

/// Detect the encoding of raw bytes.
///
/// A byte-order mark wins. Without one the data is UTF-8 if it decodes as
/// such and Latin-1 otherwise.
pub fn detect_encoding(data: &[u8]) -> TextEncoding {
    if data.starts_with(UTF8_BOM) {
        TextEncoding::Utf8Bom
    } else if data.starts_with(UTF16LE_BOM) {
        TextEncoding::Utf16Le
    } else if data.starts_with(UTF16BE_BOM) {
        TextEncoding::Utf16Be
    } else if std::str::from_utf8(data).is_ok() {
        TextEncoding::Utf8
    } else {
        TextEncoding::Latin1
    }
}

/// Decode raw bytes to text, stripping any byte-order mark.
pub fn decode_bytes(data: &[u8]) -> Result<String> {
    let encoding = detect_encoding(data);
    let body = &data[encoding.bom_len()..];

    match encoding {
        TextEncoding::Utf8 | TextEncoding::Utf8Bom => std::str::from_utf8(body)
            .map(str::to_string)
            .map_err(|e| Error::Encoding(e.to_string())),
        TextEncoding::Utf16Le => decode_utf16(body, u16::from_le_bytes),
        TextEncoding::Utf16Be => decode_utf16(body, u16::from_be_bytes),
        TextEncoding::Latin1 => {
            log::warn!("input is not valid UTF-8, decoding as Latin-1");
            Ok(body.iter().map(|&b| char::from(b)).collect())
        }
    }
}

fn decode_utf16(body: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String> {
    if body.len() % 2 != 0 {
        return Err(Error::Encoding("UTF-16 data has an odd number of bytes".to_string()));
    }
    let units = body.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Encoding(e.to_string()))
}

/// Read a file and decode it to text.
pub fn read_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    log::debug!(
        "read {} bytes from {} ({:?})",
        data.len(),
        path.display(),
        detect_encoding(&data)
    );
    decode_bytes(&data)
}

/// Detect the load file format of a file.
///
/// The extension decides when it is known; otherwise the first non-blank
/// line is inspected.
///
/// # Example
/// ```no_run
/// use loadfile::detect::{detect_format_from_path, LoadFileFormat};
///
/// let format = detect_format_from_path("VOL001.opt").unwrap();
/// assert_eq!(format, LoadFileFormat::Opticon);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<LoadFileFormat> {
    let path = path.as_ref();
    if let Some(format) = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(LoadFileFormat::from_extension)
    {
        return Ok(format);
    }

    let text = read_text(path)?;
    detect_format_from_text(&text)
}

/// Detect the load file format from decoded text.
pub fn detect_format_from_text(text: &str) -> Result<LoadFileFormat> {
    let first = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or(Error::EmptyInput)?;

    if first.starts_with("IM,") || first.starts_with("OF,") {
        return Ok(LoadFileFormat::Lfp);
    }

    if looks_like_opticon(first) {
        return Ok(LoadFileFormat::Opticon);
    }

    Ok(LoadFileFormat::Delimited)
}

/// Guess the delimiter profile of a delimited file from its first line.
///
/// Falls back to [`Delimiters::COMMA_QUOTE`].
pub fn detect_delimiters(text: &str) -> Delimiters {
    let Some(first) = text.lines().find(|line| !line.trim().is_empty()) else {
        return Delimiters::COMMA_QUOTE;
    };

    if first.contains('\u{14}') || first.starts_with('\u{fe}') {
        Delimiters::CONCORDANCE
    } else if first.contains('\t') {
        Delimiters::TAB_DELIMITED
    } else if first.starts_with('^') && first.contains('|') {
        Delimiters::PIPE_CARET
    } else {
        Delimiters::COMMA_QUOTE
    }
}

fn looks_like_opticon(line: &str) -> bool {
    let fields: Vec<&str> = line.split(',').collect();
    (4..=7).contains(&fields.len())
        && !fields[0].is_empty()
        && fields[2].contains('.')
        && matches!(fields[3], "Y" | "y" | "")
}

/// Check if a path has a known load file extension.
pub fn is_load_file<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .and_then(LoadFileFormat::from_extension)
        .is_some()
}
