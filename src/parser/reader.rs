//! Record reader over a text stream.

use std::io::{BufRead, Cursor};
use std::path::Path;

use crate::detect;
use crate::error::{Error, Result};

use super::{Delimiters, FieldTokenizer};

/// One logical record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based physical line the record started on
    pub line: usize,

    /// Field values in column order
    pub fields: Vec<String>,
}

impl Record {
    /// Field at `index`, or `""` when the record is shorter.
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }
}

/// Physical lines split on the record separator.
struct PhysicalLines<R> {
    reader: R,
    separator: char,
    encoded: [u8; 4],
    encoded_len: usize,
    line: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> PhysicalLines<R> {
    fn new(reader: R, separator: char) -> Self {
        let mut encoded = [0u8; 4];
        let encoded_len = separator.encode_utf8(&mut encoded).len();
        Self {
            reader,
            separator,
            encoded,
            encoded_len,
            line: 0,
            buf: Vec::new(),
        }
    }

    /// Next physical line without its separator, or `None` at end of input.
    fn next_line(&mut self) -> Result<Option<String>> {
        let separator = &self.encoded[..self.encoded_len];
        let last = separator[separator.len() - 1];

        self.buf.clear();
        let mut read_any = false;

        loop {
            let n = self.reader.read_until(last, &mut self.buf)?;
            if n == 0 {
                break;
            }
            read_any = true;
            if self.buf.ends_with(separator) {
                let len = self.buf.len() - separator.len();
                self.buf.truncate(len);
                break;
            }
            if self.buf.last() != Some(&last) {
                // end of input without a trailing separator
                break;
            }
        }

        if !read_any {
            return Ok(None);
        }

        self.line += 1;
        let mut line = String::from_utf8(std::mem::take(&mut self.buf)).map_err(|e| {
            Error::Encoding(format!("line {} is not valid UTF-8: {}", self.line, e))
        })?;
        if self.separator == '\n' && line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }
}

/// Lazy, forward-only sequence of logical records.
///
/// Blank lines between records are skipped. A qualified field may span
/// several physical lines; blank lines inside it are kept as data. The reader
/// owns its source until the input is exhausted or an error is returned,
/// after which it drops the source and yields `None` forever.
///
/// # Example
///
/// ```
/// use loadfile::parser::{Delimiters, RecordReader};
///
/// let text = "key,name\n\nA,\"two\nlines\"\n";
/// let records: Vec<_> = RecordReader::from_text(text, Delimiters::COMMA_QUOTE)
///     .collect::<Result<_, _>>()
///     .unwrap();
///
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[1].line, 3);
/// assert_eq!(records[1].fields, vec!["A", "two\r\nlines"]);
/// ```
pub struct RecordReader<R> {
    source: Option<PhysicalLines<R>>,
    tokenizer: FieldTokenizer,
}

impl<R: BufRead> RecordReader<R> {
    /// Create a reader over a buffered source.
    pub fn new(reader: R, delimiters: Delimiters) -> Self {
        Self {
            source: Some(PhysicalLines::new(reader, delimiters.record_separator())),
            tokenizer: FieldTokenizer::new(delimiters),
        }
    }

    /// The delimiter profile in use.
    pub fn delimiters(&self) -> &Delimiters {
        self.tokenizer.delimiters()
    }

    /// Check if the source has been released.
    pub fn is_finished(&self) -> bool {
        self.source.is_none()
    }

    fn read_record(source: &mut PhysicalLines<R>, tokenizer: &FieldTokenizer) -> Result<Option<Record>> {
        loop {
            let Some(line) = source.next_line()? else {
                return Ok(None);
            };
            let separator = tokenizer.delimiters().field_separator();
            if line.trim().is_empty() && !line.contains(separator) {
                continue;
            }

            let start = source.line;
            let fields = tokenizer.tokenize_record(&line, start, || source.next_line())?;
            return Ok(Some(Record {
                line: start,
                fields,
            }));
        }
    }
}

impl<'a> RecordReader<&'a [u8]> {
    /// Create a reader over already decoded text.
    pub fn from_text(text: &'a str, delimiters: Delimiters) -> Self {
        Self::new(text.as_bytes(), delimiters)
    }
}

impl RecordReader<Cursor<Vec<u8>>> {
    /// Open a file, detecting its encoding.
    pub fn open(path: impl AsRef<Path>, delimiters: Delimiters) -> Result<Self> {
        let text = detect::read_text(path)?;
        Ok(Self::new(Cursor::new(text.into_bytes()), delimiters))
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let source = self.source.as_mut()?;
        match Self::read_record(source, &self.tokenizer) {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.source = None;
                None
            }
            Err(e) => {
                self.source = None;
                Some(Err(e))
            }
        }
    }
}

impl<R: BufRead> std::iter::FusedIterator for RecordReader<R> {}
