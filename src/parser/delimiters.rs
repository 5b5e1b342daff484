//! Delimiter profiles.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The five characters that define how a delimited load file is laid out.
///
/// A profile is validated once at construction and is immutable afterwards.
/// The field separator, text qualifier, record separator and flattened
/// newline must all differ. The escape character must differ from both
/// separators but may equal the qualifier, which is the usual
/// doubled-qualifier convention (`""` inside a quoted field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DelimitersRepr")]
pub struct Delimiters {
    field_separator: char,
    text_qualifier: Option<char>,
    record_separator: char,
    escape_char: Option<char>,
    flattened_newline: Option<char>,
}

impl Delimiters {
    /// Comma separated, double-quote qualified, `""` escaping.
    pub const COMMA_QUOTE: Delimiters = Delimiters {
        field_separator: ',',
        text_qualifier: Some('"'),
        record_separator: '\n',
        escape_char: Some('"'),
        flattened_newline: None,
    };

    /// Comma separated, no qualifier.
    pub const COMMA_DELIMITED: Delimiters = Delimiters {
        field_separator: ',',
        text_qualifier: None,
        record_separator: '\n',
        escape_char: None,
        flattened_newline: None,
    };

    /// Tab separated, no qualifier.
    pub const TAB_DELIMITED: Delimiters = Delimiters {
        field_separator: '\t',
        text_qualifier: None,
        record_separator: '\n',
        escape_char: None,
        flattened_newline: None,
    };

    /// Pipe separated, caret qualified.
    pub const PIPE_CARET: Delimiters = Delimiters {
        field_separator: '|',
        text_qualifier: Some('^'),
        record_separator: '\n',
        escape_char: Some('^'),
        flattened_newline: None,
    };

    /// Concordance DAT: DC4 (0x14) separator, thorn (0xFE) qualifier and
    /// registered sign (0xAE) standing in for newlines inside values.
    pub const CONCORDANCE: Delimiters = Delimiters {
        field_separator: '\u{14}',
        text_qualifier: Some('\u{fe}'),
        record_separator: '\n',
        escape_char: Some('\u{fe}'),
        flattened_newline: Some('\u{ae}'),
    };

    /// Create a validated custom profile.
    pub fn new(
        field_separator: char,
        text_qualifier: Option<char>,
        record_separator: char,
        escape_char: Option<char>,
        flattened_newline: Option<char>,
    ) -> Result<Self> {
        let delimiters = Self {
            field_separator,
            text_qualifier,
            record_separator,
            escape_char,
            flattened_newline,
        };
        delimiters.validate()?;
        Ok(delimiters)
    }

    /// Unqualified profile with newline-separated records.
    pub fn simple(field_separator: char) -> Result<Self> {
        Self::new(field_separator, None, '\n', None, None)
    }

    /// Qualified profile where the qualifier escapes itself.
    pub fn qualified(field_separator: char, text_qualifier: char) -> Result<Self> {
        Self::new(
            field_separator,
            Some(text_qualifier),
            '\n',
            Some(text_qualifier),
            None,
        )
    }

    /// Look up a predefined profile by name.
    ///
    /// Accepted names: `comma-quote`, `comma`, `tab`, `pipe-caret`, `concordance`.
    pub fn from_preset_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "comma-quote" | "csv" => Ok(Self::COMMA_QUOTE),
            "comma" | "comma-delimited" => Ok(Self::COMMA_DELIMITED),
            "tab" | "tab-delimited" | "tsv" => Ok(Self::TAB_DELIMITED),
            "pipe-caret" => Ok(Self::PIPE_CARET),
            "concordance" | "dat" => Ok(Self::CONCORDANCE),
            other => Err(Error::InvalidDelimiters(format!(
                "unknown delimiter preset '{}'",
                other
            ))),
        }
    }

    /// Field separator.
    pub fn field_separator(&self) -> char {
        self.field_separator
    }

    /// Text qualifier, if fields may be quoted.
    pub fn text_qualifier(&self) -> Option<char> {
        self.text_qualifier
    }

    /// Record separator.
    pub fn record_separator(&self) -> char {
        self.record_separator
    }

    /// Escape character for qualifiers inside values.
    pub fn escape_char(&self) -> Option<char> {
        self.escape_char
    }

    /// Character that stands in for a newline inside values.
    pub fn flattened_newline(&self) -> Option<char> {
        self.flattened_newline
    }

    /// Check if the profile uses a text qualifier.
    pub fn is_qualified(&self) -> bool {
        self.text_qualifier.is_some()
    }

    /// Text inserted into a value when a qualified field spans a record break.
    pub fn line_break(&self) -> String {
        if self.record_separator == '\n' {
            "\r\n".to_string()
        } else {
            self.record_separator.to_string()
        }
    }

    fn validate(&self) -> Result<()> {
        let roles = [
            ("field separator", Some(self.field_separator)),
            ("text qualifier", self.text_qualifier),
            ("record separator", Some(self.record_separator)),
            ("flattened newline", self.flattened_newline),
        ];

        for (i, (name_a, a)) in roles.iter().enumerate() {
            for (name_b, b) in &roles[i + 1..] {
                if let (Some(a), Some(b)) = (a, b) {
                    if a == b {
                        return Err(Error::InvalidDelimiters(format!(
                            "the {} and the {} can not have the same value ({:?})",
                            name_a, name_b, a
                        )));
                    }
                }
            }
        }

        if let Some(escape) = self.escape_char {
            if escape == self.field_separator || escape == self.record_separator {
                return Err(Error::InvalidDelimiters(format!(
                    "the escape character {:?} can not be a separator",
                    escape
                )));
            }
            if self.flattened_newline == Some(escape) {
                return Err(Error::InvalidDelimiters(format!(
                    "the escape character and the flattened newline can not have the same value ({:?})",
                    escape
                )));
            }
        }

        Ok(())
    }
}

/// Unvalidated wire form of [`Delimiters`].
#[derive(Deserialize)]
struct DelimitersRepr {
    field_separator: char,
    text_qualifier: Option<char>,
    record_separator: char,
    escape_char: Option<char>,
    flattened_newline: Option<char>,
}

impl TryFrom<DelimitersRepr> for Delimiters {
    type Error = Error;

    fn try_from(repr: DelimitersRepr) -> Result<Self> {
        Self::new(
            repr.field_separator,
            repr.text_qualifier,
            repr.record_separator,
            repr.escape_char,
            repr.flattened_newline,
        )
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::CONCORDANCE
    }
}
