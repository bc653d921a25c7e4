//! Page splitting on `--- Page N ---` markers
//!
//! Each page keeps its byte offset into the full document, so spans found on a
//! page can be reported in whole-document offsets.

use crate::patterns::PAGE_MARKER;

/// One page of a page-delimited document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a> {
    /// Number taken from the marker; `None` for text before the first marker
    pub number: Option<u32>,
    /// Byte offset of `text` within the full document
    pub base_offset: usize,
    pub text: &'a str,
}

/// Split a document into pages.
///
/// A document without markers is a single page numbered 1. With markers, any
/// non-blank text before the first marker is returned as an unnumbered preamble.
pub fn split_pages(text: &str) -> Vec<Page<'_>> {
    let markers: Vec<_> = PAGE_MARKER.captures_iter(text).collect();

    if markers.is_empty() {
        return vec![Page {
            number: Some(1),
            base_offset: 0,
            text,
        }];
    }

    let mut pages = Vec::with_capacity(markers.len() + 1);

    let first_start = markers[0].get(0).map(|m| m.start()).unwrap_or(0);
    let preamble = &text[..first_start];
    if !preamble.trim().is_empty() {
        pages.push(Page {
            number: None,
            base_offset: 0,
            text: preamble,
        });
    }

    for (i, caps) in markers.iter().enumerate() {
        let Some(whole) = caps.get(0) else { continue };
        let number = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
        let start = whole.end();
        let end = markers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());

        pages.push(Page {
            number,
            base_offset: start,
            text: &text[start..end],
        });
    }

    pages
}

/// Page number covering a whole-document byte offset
pub fn page_at(pages: &[Page<'_>], offset: usize) -> Option<u32> {
    pages
        .iter()
        .rev()
        .find(|page| page.base_offset <= offset)
        .and_then(|page| page.number)
}
