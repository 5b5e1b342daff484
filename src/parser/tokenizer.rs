//! Qualified field tokenizer.

use crate::error::{Error, Result};

use super::Delimiters;

/// Splits logical records into field values under a [`Delimiters`] profile.
///
/// A record normally occupies one physical line. A qualified field that is
/// still open at the end of a line continues on the next line: the line break
/// becomes part of the value and the tokenizer asks its caller for more input.
#[derive(Debug, Clone, Copy)]
pub struct FieldTokenizer {
    delimiters: Delimiters,
}

impl FieldTokenizer {
    /// Create a tokenizer for a delimiter profile.
    pub fn new(delimiters: Delimiters) -> Self {
        Self { delimiters }
    }

    /// The profile this tokenizer splits on.
    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    /// Tokenize a record that is complete on a single line.
    ///
    /// # Example
    ///
    /// ```
    /// use loadfile::parser::{Delimiters, FieldTokenizer};
    ///
    /// let tokenizer = FieldTokenizer::new(Delimiters::COMMA_QUOTE);
    /// let fields = tokenizer.tokenize("\"a,b\",c").unwrap();
    /// assert_eq!(fields, vec!["a,b", "c"]);
    /// ```
    pub fn tokenize(&self, record: &str) -> Result<Vec<String>> {
        self.tokenize_record(record, 1, || Ok(None))
    }

    /// Tokenize a record, pulling continuation lines from `next_line` while a
    /// qualified field is open.
    ///
    /// `line` is the physical line the record starts on and is only used to
    /// report errors.
    pub fn tokenize_record<F>(&self, record: &str, line: usize, mut next_line: F) -> Result<Vec<String>>
    where
        F: FnMut() -> Result<Option<String>>,
    {
        let separator = self.delimiters.field_separator();

        let Some(qualifier) = self.delimiters.text_qualifier() else {
            return Ok(record
                .split(separator)
                .map(|value| self.unflatten(value.to_string()))
                .collect());
        };

        let mut chars: Vec<char> = record.chars().collect();
        let mut fields = Vec::new();
        let mut pos = 0;
        // set when the record ends right after a field separator
        let mut trailing_empty = false;

        while pos < chars.len() {
            let current = chars[pos];

            let value = if current == separator {
                pos += 1;
                trailing_empty = pos == chars.len();
                String::new()
            } else if current != qualifier {
                let end = chars[pos..]
                    .iter()
                    .position(|c| *c == separator)
                    .map_or(chars.len(), |offset| pos + offset);
                let value = self.read_unqualified(&chars[pos..end], qualifier, line)?;
                trailing_empty = end + 1 == chars.len();
                pos = end + 1;
                value
            } else {
                let (value, next_pos, consumed_separator) =
                    self.read_qualified(&mut chars, pos, qualifier, line, &mut next_line)?;
                trailing_empty = consumed_separator && next_pos == chars.len();
                pos = next_pos;
                value
            };

            fields.push(self.unflatten(value));
        }

        if trailing_empty {
            fields.push(String::new());
        }

        Ok(fields)
    }

    /// Read an unqualified value. Escaped qualifiers are unescaped; a bare
    /// qualifier is a format error.
    fn read_unqualified(&self, raw: &[char], qualifier: char, line: usize) -> Result<String> {
        let escape = self.delimiters.escape_char();
        let mut value = String::with_capacity(raw.len());
        let mut i = 0;

        while i < raw.len() {
            let current = raw[i];
            if Some(current) == escape && raw.get(i + 1) == Some(&qualifier) {
                value.push(qualifier);
                i += 2;
                continue;
            }
            if current == qualifier {
                return Err(Error::UnescapedQualifier { line });
            }
            value.push(current);
            i += 1;
        }

        Ok(value)
    }

    /// Read a qualified value starting at the opening qualifier.
    ///
    /// Returns the value, the position after the closing qualifier and its
    /// separator, and whether a separator was consumed. `chars` is replaced
    /// with the continuation line when the value spans lines.
    fn read_qualified<F>(
        &self,
        chars: &mut Vec<char>,
        start: usize,
        qualifier: char,
        line: usize,
        next_line: &mut F,
    ) -> Result<(String, usize, bool)>
    where
        F: FnMut() -> Result<Option<String>>,
    {
        let separator = self.delimiters.field_separator();
        let escape = self.delimiters.escape_char();
        let mut value = String::new();
        let mut pos = start + 1;

        loop {
            if pos >= chars.len() {
                match next_line()? {
                    Some(continuation) => {
                        log::trace!("line {}: qualified field continues on next line", line);
                        value.push_str(&self.delimiters.line_break());
                        *chars = continuation.chars().collect();
                        pos = 0;
                        continue;
                    }
                    None => return Err(Error::UnterminatedField { line }),
                }
            }

            let current = chars[pos];
            let next = chars.get(pos + 1).copied();

            if Some(current) == escape && next == Some(qualifier) {
                value.push(qualifier);
                pos += 2;
                continue;
            }

            if current == qualifier {
                if next.is_some() && next != Some(separator) {
                    return Err(Error::UnescapedQualifier { line });
                }
                let consumed_separator = next.is_some();
                return Ok((value, pos + 2, consumed_separator));
            }

            value.push(current);
            pos += 1;
        }
    }

    fn unflatten(&self, value: String) -> String {
        match self.delimiters.flattened_newline() {
            Some(flat) if value.contains(flat) => value.replace(flat, "\n"),
            _ => value,
        }
    }
}
