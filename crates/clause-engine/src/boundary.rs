//! Boundary refiner: cut a matcher window at the next section heading

use std::ops::Range;

use shared_types::RawSpan;

use crate::patterns::{byte_offset_of_char, SECTION_HEADING};

pub struct BoundaryRefiner {
    min_heading_offset: usize,
}

impl BoundaryRefiner {
    pub fn new(min_heading_offset: usize) -> Self {
        Self { min_heading_offset }
    }

    /// Byte range of the clause inside `window`, trimmed of surrounding whitespace.
    ///
    /// Headings starting within the first `min_heading_offset` characters are
    /// taken to be the clause's own header and skipped.
    pub fn clause_range(&self, window: &str) -> Range<usize> {
        let min_byte = byte_offset_of_char(window, self.min_heading_offset);

        let cut = SECTION_HEADING
            .find_iter(window)
            .map(|m| m.start())
            .find(|&start| start > min_byte)
            .unwrap_or(window.len());

        trimmed_range(window, 0..cut)
    }

    /// Truncate a span's window and move its offsets to match
    pub fn refine(&self, span: RawSpan) -> RawSpan {
        let range = self.clause_range(&span.source_text);
        let base = span.start_offset;

        RawSpan {
            source_text: span.source_text[range.clone()].to_string(),
            start_offset: base + range.start,
            end_offset: base + range.end,
            ..span
        }
    }
}

/// Shrink `range` within `text` so it starts and ends on non-whitespace
pub(crate) fn trimmed_range(text: &str, range: Range<usize>) -> Range<usize> {
    let slice = &text[range.clone()];
    let lead = slice.len() - slice.trim_start().len();
    let trimmed = slice.trim();
    let start = range.start + lead;
    start..start + trimmed.len()
}
