//! Ignore entries, the ignore list, and forward-only matching against it.
//!
//! An ignore list is the output of `extract_ignore_lines`: one
//! `<range> <count>` entry per change block of a reference diff, in the
//! order the blocks appeared. Matching walks the list with a [`ScanCursor`]
//! that only moves forward.
//!
//! # Ordering precondition
//!
//! Entries must appear in the same relative order as the blocks they
//! suppress in the diff being filtered. A header that only matches an entry
//! the cursor has already passed is reported as [`MatchOutcome::Behind`]
//! instead of being suppressed.

use crate::parse::{ParseError, parse_ignore_entry};
use crate::{InputError, InputRole};
use std::fmt;
use std::io::BufRead;
use std::path::Path;

/// One recorded change block: its range token and how many body lines
/// followed its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreEntry {
    range: String,
    count: usize,
}

impl IgnoreEntry {
    pub fn new(range: impl Into<String>, count: usize) -> Self {
        Self {
            range: range.into(),
            count,
        }
    }

    /// The left-hand range token, e.g. `10,12`
    pub fn range(&self) -> &str {
        &self.range
    }

    /// Number of body lines to skip after a matching header
    pub fn count(&self) -> usize {
        self.count
    }

    /// The header this entry suppresses: `<range>c<range>`
    pub fn header(&self) -> String {
        format!("{0}c{0}", self.range)
    }

    /// Check whether a trimmed diff line is this entry's header.
    pub fn matches_header(&self, line: &[u8]) -> bool {
        let range = self.range.as_bytes();
        line.len() == range.len() * 2 + 1
            && line.starts_with(range)
            && line.ends_with(range)
            && line[range.len()] == b'c'
    }
}

impl fmt::Display for IgnoreEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.range, self.count)
    }
}

/// Position of the next ignore entry eligible for matching.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScanCursor {
    position: usize,
}

impl ScanCursor {
    /// A cursor at the start of the list
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the next entry the cursor will consider
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Result of looking a header up in an [`IgnoreList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome<'a> {
    /// Entry at or after the cursor matched; `next` is just past it
    Matched {
        entry: &'a IgnoreEntry,
        next: ScanCursor,
    },
    /// No entry ahead matched, but the entry at `index` behind the cursor does
    Behind { index: usize, entry: &'a IgnoreEntry },
    /// The cursor is past the last entry, so nothing can match
    Exhausted,
    /// Entries remain ahead of the cursor but none matched
    NotFound,
}

/// The entries of an ignore-lines file, in file order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IgnoreList {
    entries: Vec<IgnoreEntry>,
}

impl IgnoreList {
    /// Open and parse an ignore-lines file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read, or if any
    /// non-blank line is malformed.
    pub fn load(path: &Path) -> Result<Self, crate::DiffIgnoreError> {
        let reader = crate::open_input(path, InputRole::IgnoreList)?;
        Self::parse(reader)
    }

    /// Parse ignore entries from a reader.
    ///
    /// Blank lines are skipped. The first malformed line aborts parsing.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::ReadFailed`] on I/O failure (including invalid
    /// UTF-8) and [`ParseError`] on a malformed entry.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, crate::DiffIgnoreError> {
        let mut entries = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| InputError::ReadFailed {
                role: InputRole::IgnoreList,
                message: e.to_string(),
            })?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(parse_ignore_entry(&line, index + 1)?);
        }

        Ok(Self { entries })
    }

    /// Parse ignore entries from a string; see [`IgnoreList::parse`].
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] on the first malformed line.
    pub fn parse_str(text: &str) -> Result<Self, ParseError> {
        let entries = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| parse_ignore_entry(line, index + 1))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[IgnoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a trimmed header line, scanning forward from `cursor`.
    ///
    /// The cursor is never modified here: on [`MatchOutcome::Matched`] the
    /// caller adopts `next`, every other outcome leaves its cursor as is.
    /// Entries before the cursor are only inspected to report
    /// [`MatchOutcome::Behind`]; they are never matched.
    pub fn find_match(&self, cursor: ScanCursor, header: &[u8]) -> MatchOutcome<'_> {
        let start = cursor.position.min(self.entries.len());

        if let Some(offset) = self.entries[start..]
            .iter()
            .position(|entry| entry.matches_header(header))
        {
            let index = start + offset;
            return MatchOutcome::Matched {
                entry: &self.entries[index],
                next: ScanCursor {
                    position: index + 1,
                },
            };
        }

        if let Some(index) = self.entries[..start]
            .iter()
            .position(|entry| entry.matches_header(header))
        {
            return MatchOutcome::Behind {
                index,
                entry: &self.entries[index],
            };
        }

        if start == self.entries.len() {
            MatchOutcome::Exhausted
        } else {
            MatchOutcome::NotFound
        }
    }
}

impl FromIterator<IgnoreEntry> for IgnoreList {
    fn from_iter<T: IntoIterator<Item = IgnoreEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_range() -> impl Strategy<Value = String> {
        (1..200u32, prop::option::of(0..5u32)).prop_map(|(start, extra)| match extra {
            Some(extra) => format!("{},{}", start, start + extra),
            None => start.to_string(),
        })
    }

    fn arb_list() -> impl Strategy<Value = IgnoreList> {
        prop::collection::vec((arb_range(), 0..6usize), 0..12).prop_map(|entries| {
            entries
                .into_iter()
                .map(|(range, count)| IgnoreEntry::new(range, count))
                .collect()
        })
    }

    proptest! {
        /// A cursor fed only through `Matched::next` never moves backwards
        #[test]
        fn cursor_only_moves_forward(
            ignore in arb_list(),
            lookups in prop::collection::vec(arb_range(), 0..20),
        ) {
            let mut cursor = ScanCursor::new();
            for range in lookups {
                let header = format!("{range}c{range}");
                if let MatchOutcome::Matched { next, .. } = ignore.find_match(cursor, header.as_bytes()) {
                    prop_assert!(next > cursor);
                    prop_assert!(next.position() <= ignore.len());
                    cursor = next;
                }
            }
        }

        /// Looking up every entry in order matches each one exactly once
        #[test]
        fn in_order_lookups_all_match(ignore in arb_list()) {
            let mut cursor = ScanCursor::new();
            for expected in ignore.entries() {
                match ignore.find_match(cursor, expected.header().as_bytes()) {
                    MatchOutcome::Matched { entry, next } => {
                        prop_assert_eq!(entry, expected);
                        cursor = next;
                    }
                    other => prop_assert!(false, "unexpected outcome {:?}", other),
                }
            }
            prop_assert_eq!(cursor.position(), ignore.len());
        }
    }
}
