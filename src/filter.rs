//! Suppressing recorded change blocks in a new diff.
//!
//! Every line that is not a body line is looked up in the [`IgnoreList`]
//! from the current [`ScanCursor`]. A match drops the header and up to
//! `count` following body lines; everything else passes through byte for
//! byte.

use crate::diff::{DiffLines, Line};
use crate::ignore::{IgnoreEntry, IgnoreList, MatchOutcome, ScanCursor};
use crate::{DiffIgnoreError, InputRole};
use std::io::BufRead;
use tracing::{debug, trace, warn};

/// Options for [`DiffFilter`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FilterOptions {
    /// Fail instead of warning when a header matches an entry the scan
    /// cursor has already passed
    pub strict_order: bool,
}

/// Counters collected while filtering.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FilterSummary {
    pub lines_read: usize,
    pub lines_written: usize,
    pub blocks_suppressed: usize,
    /// Header and body lines dropped
    pub lines_suppressed: usize,
    /// Headers left in place because their entry was behind the cursor
    pub out_of_order: usize,
}

/// Lazily yields the lines of a diff that survive the ignore list.
///
/// # Examples
///
/// ```
/// use diff_ignore::filter::{DiffFilter, FilterOptions};
/// use diff_ignore::IgnoreList;
///
/// let ignore = IgnoreList::parse_str("5 2\n").unwrap();
/// let diff = "5c5\n< foo\n> bar\n6c7\n";
/// let kept = DiffFilter::new(diff.as_bytes(), &ignore, FilterOptions::default())
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap();
/// assert_eq!(kept, [b"6c7\n".to_vec()]);
/// ```
pub struct DiffFilter<'a, R> {
    lines: DiffLines<R>,
    ignore: &'a IgnoreList,
    cursor: ScanCursor,
    options: FilterOptions,
    summary: FilterSummary,
    done: bool,
}

impl<'a, R: BufRead> DiffFilter<'a, R> {
    pub fn new(reader: R, ignore: &'a IgnoreList, options: FilterOptions) -> Self {
        Self {
            lines: DiffLines::new(reader, InputRole::Diff),
            ignore,
            cursor: ScanCursor::new(),
            options,
            summary: FilterSummary::default(),
            done: false,
        }
    }

    pub fn cursor(&self) -> ScanCursor {
        self.cursor
    }

    pub fn summary(&self) -> FilterSummary {
        FilterSummary {
            lines_read: self.lines.lines_read(),
            ..self.summary
        }
    }

    fn next_kept(&mut self) -> Result<Option<Vec<u8>>, DiffIgnoreError> {
        let ignore = self.ignore;
        while let Some(line) = self.lines.next_line()? {
            if line.is_body() {
                return Ok(Some(self.keep(line)));
            }

            match ignore.find_match(self.cursor, line.trimmed()) {
                MatchOutcome::Matched { entry, next } => {
                    self.cursor = next;
                    self.suppress(&line, entry)?;
                }
                MatchOutcome::Behind { index, entry } => {
                    self.summary.out_of_order += 1;
                    if self.options.strict_order {
                        return Err(DiffIgnoreError::OutOfOrder {
                            line_number: line.number,
                            range: entry.range().to_string(),
                            count: entry.count(),
                        });
                    }
                    warn!(
                        line = line.number,
                        entry = index + 1,
                        cursor = self.cursor.position(),
                        header = %line.lossy(),
                        "header matches an ignore entry already passed, keeping it"
                    );
                    return Ok(Some(self.keep(line)));
                }
                MatchOutcome::Exhausted | MatchOutcome::NotFound => {
                    trace!(line = line.number, header = %line.lossy(), "no ignore entry");
                    return Ok(Some(self.keep(line)));
                }
            }
        }
        Ok(None)
    }

    /// Drop a matched header and at most `entry.count()` body lines after it.
    ///
    /// Stops early at end of stream or at the first non-body line, which is
    /// left for the next header lookup.
    fn suppress(&mut self, header: &Line, entry: &IgnoreEntry) -> Result<(), DiffIgnoreError> {
        let mut skipped = 0;
        while skipped < entry.count() {
            let Some(line) = self.lines.next_line()? else {
                break;
            };
            if !line.is_body() {
                self.lines.push_back(line);
                break;
            }
            skipped += 1;
        }

        if skipped < entry.count() {
            debug!(
                line = header.number,
                expected = entry.count(),
                skipped,
                "change block shorter than its ignore entry"
            );
        }
        debug!(line = header.number, range = entry.range(), skipped, "suppressed change block");

        self.summary.blocks_suppressed += 1;
        self.summary.lines_suppressed += skipped + 1;
        Ok(())
    }

    fn keep(&mut self, line: Line) -> Vec<u8> {
        self.summary.lines_written += 1;
        line.into_bytes()
    }
}

impl<R: BufRead> Iterator for DiffFilter<'_, R> {
    type Item = Result<Vec<u8>, DiffIgnoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.next_kept().transpose();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}
