use error_set::error_set;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use tracing::info;

pub mod diff;
pub mod extract;
pub mod filter;
pub mod ignore;
pub mod logging;
pub mod parse;

pub use extract::{ExtractOptions, Extractor};
pub use filter::{DiffFilter, FilterOptions, FilterSummary};
pub use ignore::{IgnoreEntry, IgnoreList, MatchOutcome, ScanCursor};
pub use parse::ParseError;

error_set! {
    /// Top-level error for diff-ignore operations
    DiffIgnoreError := {
        /// Strict extraction met a header candidate that is not an ed-style header
        #[display("Unexpected line {line_number} in diff: '{content}'")]
        UnexpectedLine { line_number: usize, content: String },
        /// Header matched an ignore entry the scan cursor had already passed
        #[display("Line {line_number}: header matches ignore entry '{range} {count}' out of order")]
        OutOfOrder { line_number: usize, range: String, count: usize },
        ParseError(ParseError),
    } || InputError

    /// Errors from the tools' input and output streams
    InputError := {
        #[display("Cannot open {role} '{path}': {message}")]
        OpenFailed { role: InputRole, path: String, message: String },
        #[display("Failed to read {role}: {message}")]
        ReadFailed { role: InputRole, message: String },
        #[display("Failed to write output: {message}")]
        WriteFailed { message: String },
    }
}

/// Which input a stream error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRole {
    Diff,
    IgnoreList,
}

impl fmt::Display for InputRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InputRole::Diff => "diff file",
            InputRole::IgnoreList => "ignore lines file",
        })
    }
}

/// Open an input file for buffered reading
pub(crate) fn open_input(path: &Path, role: InputRole) -> Result<BufReader<File>, InputError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| InputError::OpenFailed {
            role,
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

fn write_failed(e: std::io::Error) -> InputError {
    InputError::WriteFailed {
        message: e.to_string(),
    }
}

/// Record every change block of `diff_path` as an ignore entry.
///
/// Writes one `<range> <count>` line per block to `out` and returns the
/// number of blocks recorded.
///
/// # Examples
/// ```no_run
/// # use diff_ignore::{extract_ignore_lines, ExtractOptions};
/// # use std::path::Path;
/// let mut out = Vec::<u8>::new();
/// let blocks = extract_ignore_lines(Path::new("golden.diff"), ExtractOptions::default(), &mut out).unwrap();
/// ```
///
/// # Errors
///
/// Fails if the diff cannot be opened or read, if output cannot be
/// written, or in strict mode on a malformed header.
pub fn extract_ignore_lines<W: Write>(
    diff_path: &Path,
    options: ExtractOptions,
    out: &mut W,
) -> Result<usize, DiffIgnoreError> {
    let reader = open_input(diff_path, InputRole::Diff)?;

    let mut blocks = 0;
    for entry in Extractor::new(reader, options) {
        writeln!(out, "{}", entry?).map_err(write_failed)?;
        blocks += 1;
    }
    out.flush().map_err(write_failed)?;

    info!(blocks, diff = %diff_path.display(), "extracted ignore entries");
    Ok(blocks)
}

/// Copy `diff_path` to `out`, dropping change blocks listed in `ignore_path`.
///
/// Both files are opened, and the ignore list fully parsed, before any
/// output is written.
///
/// # Examples
/// ```no_run
/// # use diff_ignore::{check_diff, FilterOptions};
/// # use std::path::Path;
/// let mut out = Vec::<u8>::new();
/// let summary = check_diff(
///     Path::new("new.diff"),
///     Path::new("ignore_lines.txt"),
///     FilterOptions::default(),
///     &mut out,
/// ).unwrap();
/// println!("suppressed {} blocks", summary.blocks_suppressed);
/// ```
///
/// # Errors
///
/// Fails if either file cannot be opened or read, if the ignore list is
/// malformed, if output cannot be written, or with
/// [`FilterOptions::strict_order`] on an out-of-order header.
pub fn check_diff<W: Write>(
    diff_path: &Path,
    ignore_path: &Path,
    options: FilterOptions,
    out: &mut W,
) -> Result<FilterSummary, DiffIgnoreError> {
    let reader = open_input(diff_path, InputRole::Diff)?;
    let ignore = IgnoreList::load(ignore_path)?;

    let mut filter = DiffFilter::new(reader, &ignore, options);
    for line in filter.by_ref() {
        out.write_all(&line?).map_err(write_failed)?;
    }
    out.flush().map_err(write_failed)?;

    let summary = filter.summary();
    info!(
        entries = ignore.len(),
        consumed = filter.cursor().position(),
        blocks_suppressed = summary.blocks_suppressed,
        lines_suppressed = summary.lines_suppressed,
        out_of_order = summary.out_of_order,
        "filtered diff"
    );
    Ok(summary)
}
