//! Recording change blocks of a reference diff as ignore entries.
//!
//! Each block starts at a header candidate and runs over the consecutive
//! body lines (`<`, `>`, `-`) after it. The first non-body line ends the
//! block and becomes the next header candidate, whatever its shape. Lenient
//! mode walks such blocks too but only records those whose range token can
//! be written back as an entry; [`ExtractOptions::strict`] rejects any
//! header candidate that is not an ed-style change header.

use crate::diff::{DiffLines, Line};
use crate::ignore::IgnoreEntry;
use crate::parse::parse_change_header;
use crate::{DiffIgnoreError, InputRole};
use std::io::BufRead;
use tracing::debug;

/// Options for [`Extractor`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Fail on header candidates that are not `N[,M](a|c|d)N[,M]`
    pub strict: bool,
}

/// Lazily yields one [`IgnoreEntry`] per change block of a diff.
///
/// Iteration stops after the first error.
///
/// # Examples
///
/// ```
/// use diff_ignore::extract::{ExtractOptions, Extractor};
///
/// let diff = "5c5\n< foo\n> bar\n6c7\n";
/// let entries = Extractor::new(diff.as_bytes(), ExtractOptions::default())
///     .map(|entry| entry.map(|e| e.to_string()))
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap();
/// assert_eq!(entries, ["5 2", "6 0"]);
/// ```
pub struct Extractor<R> {
    lines: DiffLines<R>,
    options: ExtractOptions,
    done: bool,
}

impl<R: BufRead> Extractor<R> {
    pub fn new(reader: R, options: ExtractOptions) -> Self {
        Self {
            lines: DiffLines::new(reader, InputRole::Diff),
            options,
            done: false,
        }
    }

    fn next_block(&mut self) -> Result<Option<IgnoreEntry>, DiffIgnoreError> {
        loop {
            let Some(header) = self.lines.next_line()? else {
                return Ok(None);
            };
            if self.options.strict {
                check_header(&header)?;
            }

            let mut count = 0;
            while let Some(line) = self.lines.next_line()? {
                if !line.is_body() {
                    self.lines.push_back(line);
                    break;
                }
                count += 1;
            }

            // An entry must read back as `<range> <count>`, and only a UTF-8
            // range without whitespace can ever equal a trimmed `<r>c<r>` header
            match recordable_range(header.range_token()) {
                Some(range) => {
                    debug!(line = header.number, range, count, "recorded change block");
                    return Ok(Some(IgnoreEntry::new(range, count)));
                }
                None => {
                    debug!(line = header.number, header = %header.lossy(), count, "skipped unmatchable block");
                }
            }
        }
    }
}

fn recordable_range(token: &[u8]) -> Option<&str> {
    let range = std::str::from_utf8(token).ok()?;
    if range.is_empty() || range.bytes().any(|b| b.is_ascii_whitespace()) {
        None
    } else {
        Some(range)
    }
}

fn check_header(line: &Line) -> Result<(), DiffIgnoreError> {
    let valid = std::str::from_utf8(line.content())
        .ok()
        .and_then(parse_change_header)
        .is_some();
    if valid {
        Ok(())
    } else {
        Err(DiffIgnoreError::UnexpectedLine {
            line_number: line.number,
            content: line.lossy().into_owned(),
        })
    }
}

impl<R: BufRead> Iterator for Extractor<R> {
    type Item = Result<IgnoreEntry, DiffIgnoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.next_block().transpose();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn extract(diff: &str) -> Vec<String> {
        extract_with(diff, ExtractOptions::default()).unwrap()
    }

    fn extract_with(diff: &str, options: ExtractOptions) -> Result<Vec<String>, DiffIgnoreError> {
        Extractor::new(diff.as_bytes(), options)
            .map(|entry| entry.map(|e| e.to_string()))
            .collect()
    }

    #[test]
    fn empty_diff_has_no_entries() {
        assert_eq!(extract(""), Vec::<String>::new());
    }

    #[test]
    fn single_block() {
        assert_eq!(extract("5c5\n< foo\n> bar\n6c7\n"), vec!["5 2", "6 0"]);
    }

    #[test]
    fn counts_separator_lines() {
        let diff = r#"10,11c10,11
< 1.0000001
< 2.0000001
---
> 1.0000002
> 2.0000002
20c20
< x
---
> y
"#;
        insta::assert_snapshot!(extract(diff).join("\n"), @r"
        10,11 5
        20 3
        ");
    }

    #[test]
    fn zero_count_blocks() {
        assert_eq!(extract("1c1\n2c2\n3c3"), vec!["1 0", "2 0", "3 0"]);
    }

    #[test]
    fn crlf_diff() {
        assert_eq!(extract("5c5\r\n< a\r\n> b\r\n"), vec!["5 2"]);
    }

    #[test]
    fn leading_body_lines_are_consumed() {
        // The first line is always a header candidate, but `< stray` can
        // never match a header, so its block is not recorded
        assert_eq!(extract("< stray\n> more\n5c5\n"), vec!["5 0"]);
    }

    #[test]
    fn unmatchable_candidates_are_skipped() {
        let diff = "5c5\n< a\n\\ No newline at end of file\n---\n> b\n\\ No newline at end of file\n\n< c\n7c7\n";
        assert_eq!(extract(diff), vec!["5 1", "7 0"]);
    }

    #[test]
    fn non_utf8_range_is_skipped() {
        let entries = Extractor::new(&b"\xffc\xff\n< a\n6c6\n"[..], ExtractOptions::default())
            .map(|entry| entry.unwrap().to_string())
            .collect::<Vec<_>>();
        assert_eq!(entries, vec!["6 0"]);
    }

    #[test]
    fn strict_accepts_ed_headers() {
        let options = ExtractOptions { strict: true };
        let entries = extract_with("3a4\n> new\n5,6d4\n< old\n8c8\n< a\n---\n> b\n", options);
        assert_eq!(entries.unwrap(), vec!["3a4 1", "5,6d4 1", "8 3"]);
    }

    #[test]
    fn strict_rejects_malformed_header() {
        let options = ExtractOptions { strict: true };
        let mut extractor = Extractor::new("5c5\n< a\ngarbage\n< b\n".as_bytes(), options);

        assert_eq!(extractor.next().unwrap().unwrap(), IgnoreEntry::new("5", 1));
        let err = extractor.next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            DiffIgnoreError::UnexpectedLine { line_number: 3, ref content } if content == "garbage"
        ));
        assert!(extractor.next().is_none());
    }
}
