//! Delimited (DAT/CSV) writer.

use indexmap::IndexSet;

use crate::error::{Error, Result};
use crate::model::{DocId, DocumentSet};
use crate::parser::Delimiters;

use super::ExportOptions;

/// Write a document set as a delimited load file.
///
/// The header is the union of all metadata field names in first-seen order,
/// followed by any configured family and representative columns. Every value
/// is qualified when the profile has a qualifier.
pub fn to_delimited(set: &DocumentSet, options: &ExportOptions) -> Result<String> {
    let delimiters = &options.delimiters;
    let mut header: IndexSet<&str> = IndexSet::new();
    for doc in set {
        header.extend(doc.metadata.keys().map(String::as_str));
    }
    for column in [&options.parent_column, &options.child_column]
        .into_iter()
        .flatten()
    {
        header.insert(column.as_str());
    }
    for setting in &options.representatives {
        header.insert(setting.column.as_str());
    }

    let line_break = delimiters.line_break();
    let mut output = String::new();
    write_record(&mut output, header.iter().copied(), delimiters)?;
    output.push_str(&line_break);

    for (id, doc) in set.iter_with_ids() {
        let values: Vec<String> = header
            .iter()
            .map(|column| column_value(set, id, column, options))
            .collect();
        write_record(&mut output, values.iter().map(String::as_str), delimiters)?;
        output.push_str(&line_break);
        log::trace!("wrote {}", doc.key);
    }

    Ok(output)
}

fn column_value(set: &DocumentSet, id: DocId, column: &str, options: &ExportOptions) -> String {
    let doc = &set[id];

    if options.parent_column.as_deref() == Some(column) {
        return set.parent_of(id).map(|p| p.key.clone()).unwrap_or_default();
    }
    if options.child_column.as_deref() == Some(column) {
        return set
            .children_of(id)
            .map(|c| c.key.as_str())
            .collect::<Vec<_>>()
            .join(&options.child_separator);
    }
    if let Some(setting) = options.representatives.iter().find(|s| s.column == column) {
        return doc
            .representative(setting.kind, &setting.name)
            .and_then(|r| r.first_file())
            .unwrap_or("")
            .to_string();
    }

    doc.field(column).unwrap_or("").to_string()
}

fn write_record<'a, I>(output: &mut String, values: I, delimiters: &Delimiters) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            output.push(delimiters.field_separator());
        }
        output.push_str(&encode_value(value, delimiters)?);
    }
    Ok(())
}

/// Encode one value: flatten newlines, escape qualifiers, qualify.
fn encode_value(value: &str, delimiters: &Delimiters) -> Result<String> {
    let mut value = value.to_string();

    if let Some(flat) = delimiters.flattened_newline() {
        let flat = flat.to_string();
        value = value.replace("\r\n", &flat).replace('\n', &flat);
    }

    match delimiters.text_qualifier() {
        Some(qualifier) => {
            if value.contains(qualifier) {
                let escape = delimiters.escape_char().ok_or_else(|| {
                    Error::Export(format!(
                        "the value {:?} contains the text qualifier and no escape character is set",
                        value
                    ))
                })?;
                value = value.replace(qualifier, &format!("{}{}", escape, qualifier));
            }
            Ok(format!("{}{}{}", qualifier, value, qualifier))
        }
        None => {
            if value.contains(delimiters.field_separator())
                || value.contains(delimiters.record_separator())
            {
                return Err(Error::Export(format!(
                    "the value {:?} contains a separator and the profile has no text qualifier",
                    value
                )));
            }
            Ok(value)
        }
    }
}
