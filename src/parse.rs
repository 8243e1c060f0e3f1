//! Parsing for the two text shapes the tools understand.
//!
//! - Ed-style change headers such as `5c5`, `10,12c10,12` or `3a4`, used
//!   by strict extraction to validate block headers.
//! - Ignore-list entries such as `10,12 4`, one per line of the file
//!   written by `extract_ignore_lines`.
//!
//! # Examples
//!
//! ```
//! use diff_ignore::parse::{parse_change_header, parse_ignore_entry, ChangeKind, LineRange};
//!
//! let header = parse_change_header("10,12c10,12").unwrap();
//! assert_eq!(header.kind, ChangeKind::Change);
//! assert_eq!(header.old, LineRange { start: 10, end: Some(12) });
//!
//! let entry = parse_ignore_entry("10,12 4", 1).unwrap();
//! assert_eq!(entry.range(), "10,12");
//! assert_eq!(entry.count(), 4);
//! ```

use crate::ignore::IgnoreEntry;
use error_set::error_set;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_till1,
    character::complete::{char, digit1, space1},
    combinator::{all_consuming, map_res, opt, value},
    sequence::{preceded, separated_pair},
};

error_set! {
    /// Errors from parsing ignore-list lines
    ParseError := {
        /// Line has a range token but no count field
        #[display("Line {line_number}: expected '<range> <count>', found '{content}'")]
        MissingCount { line_number: usize, content: String },
        /// Count field is not a non-negative decimal integer
        #[display("Line {line_number}: invalid count '{value}'")]
        InvalidCount { line_number: usize, value: String },
    }
}

/// A line range from an ed-style header: `N` or `N,M`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: u32,
    pub end: Option<u32>,
}

/// The command letter between the two ranges of a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// `a`: lines appended after the old range
    Add,
    /// `c`: old range replaced by new range
    Change,
    /// `d`: old range deleted
    Delete,
}

/// A parsed ed-style change header, e.g. `10,12c10,13`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeHeader {
    pub old: LineRange,
    pub kind: ChangeKind,
    pub new: LineRange,
}

fn decimal(input: &str) -> IResult<&str, u32> {
    map_res(digit1, str::parse::<u32>).parse(input)
}

fn line_range(input: &str) -> IResult<&str, LineRange> {
    (decimal, opt(preceded(char(','), decimal)))
        .map(|(start, end)| LineRange { start, end })
        .parse(input)
}

fn change_kind(input: &str) -> IResult<&str, ChangeKind> {
    alt((
        value(ChangeKind::Add, char('a')),
        value(ChangeKind::Change, char('c')),
        value(ChangeKind::Delete, char('d')),
    ))
    .parse(input)
}

/// Parse an ed-style change header.
///
/// Surrounding whitespace is ignored. Returns `None` for anything that is
/// not exactly `N[,M]` + `a|c|d` + `N[,M]`.
#[must_use]
pub fn parse_change_header(line: &str) -> Option<ChangeHeader> {
    all_consuming((line_range, change_kind, line_range))
        .map(|(old, kind, new)| ChangeHeader { old, kind, new })
        .parse(line.trim())
        .ok()
        .map(|(_, header)| header)
}

/// Split an entry into its first two whitespace-separated fields
fn entry_fields(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        take_till1(char::is_whitespace),
        space1,
        take_till1(char::is_whitespace),
    )
    .parse(input)
}

/// Parse one ignore-list line into an [`IgnoreEntry`].
///
/// `line_number` is 1-based and only used for error reporting. Anything
/// after the count field is ignored.
///
/// # Errors
///
/// Returns [`ParseError`] if:
/// - The line has fewer than two fields
/// - The count is not a non-negative decimal integer
pub fn parse_ignore_entry(line: &str, line_number: usize) -> Result<IgnoreEntry, ParseError> {
    let trimmed = line.trim();
    let (_, (range, count)) = entry_fields(trimmed).map_err(|_| ParseError::MissingCount {
        line_number,
        content: trimmed.to_string(),
    })?;

    let count = count
        .parse::<usize>()
        .map_err(|_| ParseError::InvalidCount {
            line_number,
            value: count.to_string(),
        })?;

    Ok(IgnoreEntry::new(range, count))
}
