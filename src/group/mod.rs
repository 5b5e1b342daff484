//! Grouping of records into documents.
//!
//! Every load file format reduces to the same procedure: walk the records in
//! order, decide for each one whether it opens a new document or continues
//! the open one, and build a document from each finished run of records.
//! The decision and the building are supplied by a [`BoundaryPolicy`]; the
//! walk itself lives in [`accumulate`].
//!
//! Built documents are then inserted into a [`DocumentSet`](crate::model::DocumentSet)
//! and, for delimited files, handed to the [`FamilyResolver`].

mod delimited;
mod family;
mod lfp;
mod opticon;
pub mod text;

pub use delimited::DelimitedBuilder;
pub use family::FamilyResolver;
pub use lfp::{ImageFlag, LfpBuilder, LfpRow};
pub use opticon::OpticonBuilder;

use crate::error::{Error, Result};

/// How a row relates to the document being accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// The row opens a new document; the open one is finished
    Start,
    /// The row belongs to the open document
    Continue,
}

/// Format-specific rules for grouping rows into documents.
pub trait BoundaryPolicy {
    /// A parsed input row.
    type Row;

    /// What a finished run of rows builds into.
    type Group;

    /// Physical line of a row, used in error messages.
    fn line(row: &Self::Row) -> usize;

    /// Classify a row given the rows of the open document, if any.
    fn classify(&mut self, row: &Self::Row, open: Option<&[Self::Row]>) -> Result<Boundary>;

    /// Build a document from a finished run of rows. `rows` is never empty.
    fn build(&mut self, rows: Vec<Self::Row>) -> Result<Self::Group>;
}

/// Group rows into documents, calling `emit` with each finished group in
/// source order.
///
/// A group is emitted only once the row that follows it has been classified
/// as [`Boundary::Start`], or at the end of input. A [`Boundary::Continue`]
/// row with no open group is an error.
pub fn accumulate<P, I, F>(policy: &mut P, rows: I, mut emit: F) -> Result<()>
where
    P: BoundaryPolicy,
    I: IntoIterator<Item = Result<P::Row>>,
    F: FnMut(P::Group) -> Result<()>,
{
    let mut open: Vec<P::Row> = Vec::new();

    for row in rows {
        let row = row?;
        let has_open = !open.is_empty();
        let view = if has_open { Some(open.as_slice()) } else { None };

        match policy.classify(&row, view)? {
            Boundary::Start => {
                if has_open {
                    let finished = std::mem::take(&mut open);
                    emit(policy.build(finished)?)?;
                }
                open.push(row);
            }
            Boundary::Continue if has_open => open.push(row),
            Boundary::Continue => {
                return Err(Error::InvalidRecord {
                    line: P::line(&row),
                    message: "a page row appears before any document boundary".to_string(),
                });
            }
        }
    }

    if !open.is_empty() {
        emit(policy.build(open)?)?;
    }

    Ok(())
}
