//! Pattern matcher: signal-phrase scan over each page

use shared_types::{RawSpan, SpanSource};

use crate::pages::Page;
use crate::patterns::{byte_offset_of_char, CLAUSE_PATTERNS};

/// Emits one fixed-confidence window per signal-phrase match.
///
/// Duplicate matches of the same type are kept; resolution happens later.
pub struct PatternMatcher {
    max_window_chars: usize,
    confidence: f32,
}

impl PatternMatcher {
    pub fn new(max_window_chars: usize, confidence: f32) -> Self {
        Self {
            max_window_chars,
            confidence,
        }
    }

    /// Scan pages in order, then clause types in table order, then matches in text order
    pub fn scan(&self, pages: &[Page<'_>]) -> Vec<RawSpan> {
        let mut spans = Vec::new();

        for page in pages {
            for (clause_type, pattern) in CLAUSE_PATTERNS.iter() {
                for m in pattern.find_iter(page.text) {
                    let start = m.start();
                    let rest = &page.text[start..];
                    let end = start + byte_offset_of_char(rest, self.max_window_chars);

                    spans.push(RawSpan {
                        clause_type: *clause_type,
                        source_text: page.text[start..end].to_string(),
                        page_number: page.number,
                        start_offset: page.base_offset + start,
                        end_offset: page.base_offset + end,
                        confidence: self.confidence,
                        source: SpanSource::PatternMatcher,
                    });
                }
            }
        }

        tracing::debug!(spans = spans.len(), pages = pages.len(), "Pattern scan complete");
        spans
    }
}
