//! Line-level view of an ed-style diff.
//!
//! The tools never build a structured diff. They walk raw lines, asking
//! only whether a line is a body line (`<`, `>` or a `---` separator) or
//! something else, which is treated as a header candidate.

mod lines;

pub use lines::{DiffLines, Line};

/// Check whether a raw diff line belongs to a change block body.
///
/// Body lines start with `<` (old side), `>` (new side) or `-` (the `---`
/// separator between the two sides).
#[must_use]
pub fn is_body_line(line: &[u8]) -> bool {
    matches!(line.first(), Some(b'<' | b'>' | b'-'))
}
