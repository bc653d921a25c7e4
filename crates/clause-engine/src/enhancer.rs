//! Semantic enhancer: sentence-level classification expanded to paragraphs

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{RawSpan, SpanSource};

use crate::boundary::trimmed_range;
use crate::pages::{page_at, Page};
use crate::patterns::{byte_offset_of_char, classify, has_legal_term};
use crate::segmenter::SentenceSegmenter;

lazy_static! {
    /// Blank line, LF or CRLF, possibly holding spaces or tabs
    static ref PARAGRAPH_BREAK: Regex = Regex::new(r"\r?\n[ \t]*\r?\n").unwrap();
}

pub struct SemanticEnhancer {
    segmenter: Box<dyn SentenceSegmenter>,
    max_input_chars: usize,
    min_sentence_chars: usize,
    proximity_threshold: usize,
    confidence: f32,
}

impl SemanticEnhancer {
    pub fn new(
        segmenter: Box<dyn SentenceSegmenter>,
        max_input_chars: usize,
        min_sentence_chars: usize,
        proximity_threshold: usize,
        confidence: f32,
    ) -> Self {
        Self {
            segmenter,
            max_input_chars,
            min_sentence_chars,
            proximity_threshold,
            confidence,
        }
    }

    pub fn is_available(&self) -> bool {
        self.segmenter.is_available()
    }

    pub fn segmenter_name(&self) -> &str {
        self.segmenter.name()
    }

    pub fn into_segmenter(self) -> Box<dyn SentenceSegmenter> {
        self.segmenter
    }

    /// Append paragraph candidates to `candidates`.
    ///
    /// A paragraph is added only when no existing candidate starts within
    /// `proximity_threshold` bytes of it; candidates added here count for
    /// later sentences too.
    pub fn enhance(&self, text: &str, pages: &[Page<'_>], candidates: &mut Vec<RawSpan>) {
        let input = &text[..byte_offset_of_char(text, self.max_input_chars)];
        let before = candidates.len();

        for sentence in self.segmenter.segment(input) {
            let trimmed = sentence.text.trim();
            if trimmed.chars().count() < self.min_sentence_chars {
                continue;
            }

            let lower = trimmed.to_lowercase();
            if !has_legal_term(&lower) {
                continue;
            }
            let Some(clause_type) = classify(&lower) else {
                continue;
            };

            let range = paragraph_around(text, sentence.offset, sentence.offset + sentence.text.len());
            if range.is_empty() {
                continue;
            }

            let crowded = candidates
                .iter()
                .any(|c| c.start_offset.abs_diff(range.start) < self.proximity_threshold);
            if crowded {
                continue;
            }

            tracing::debug!(
                clause_type = %clause_type,
                start_offset = range.start,
                "Semantic candidate"
            );

            candidates.push(RawSpan {
                clause_type,
                source_text: text[range.clone()].to_string(),
                page_number: page_at(pages, range.start),
                start_offset: range.start,
                end_offset: range.end,
                confidence: self.confidence,
                source: SpanSource::SemanticEnhancer,
            });
        }

        tracing::debug!(
            added = candidates.len() - before,
            segmenter = self.segmenter.name(),
            "Semantic enhancement complete"
        );
    }
}

/// Paragraph enclosing `start..end`, bounded by blank lines, whitespace-trimmed
fn paragraph_around(text: &str, start: usize, end: usize) -> std::ops::Range<usize> {
    let para_start = PARAGRAPH_BREAK
        .find_iter(&text[..start])
        .last()
        .map(|m| m.end())
        .unwrap_or(0);
    let para_end = PARAGRAPH_BREAK
        .find(&text[end..])
        .map(|m| end + m.start())
        .unwrap_or(text.len());

    trimmed_range(text, para_start..para_end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::split_pages;
    use crate::segmenter::{NoopSegmenter, Sentence};
    use pretty_assertions::assert_eq;
    use shared_types::ClauseType;

    /// Splits after '.' and '\n' so tests do not depend on a segmentation library
    struct PeriodSegmenter;

    impl SentenceSegmenter for PeriodSegmenter {
        fn segment<'a>(&self, text: &'a str) -> Vec<Sentence<'a>> {
            let mut out = Vec::new();
            let mut offset = 0;
            for piece in text.split_inclusive(|c: char| c == '.' || c == '\n') {
                out.push(Sentence {
                    offset,
                    text: piece,
                });
                offset += piece.len();
            }
            out
        }

        fn name(&self) -> &str {
            "period"
        }
    }

    fn enhancer(segmenter: Box<dyn SentenceSegmenter>) -> SemanticEnhancer {
        SemanticEnhancer::new(segmenter, 1_000_000, 10, 200, 0.6)
    }

    #[test]
    fn test_expands_to_paragraph() {
        let lead = "Preamble text about the deal that is long enough to push the next paragraph \
                    well past the proximity window of two hundred characters, so nothing from \
                    here interferes with the candidate that the enhancer should produce below.";
        let para = "Each party shall keep the other's secrets. Disclosure requires consent.";
        let text = format!("{}\n\n{}\n\nSignatures follow.", lead, para);
        let pages = split_pages(&text);

        let mut candidates = Vec::new();
        enhancer(Box::new(PeriodSegmenter)).enhance(&text, &pages, &mut candidates);

        let conf: Vec<_> = candidates
            .iter()
            .filter(|c| c.clause_type == ClauseType::Confidentiality)
            .collect();
        assert_eq!(conf.len(), 1);
        assert_eq!(conf[0].source_text, para);
        assert_eq!(&text[conf[0].start_offset..conf[0].end_offset], para);
        assert_eq!(conf[0].confidence, 0.6);
        assert_eq!(conf[0].source, SpanSource::SemanticEnhancer);
        assert_eq!(conf[0].page_number, Some(1));
    }

    #[test]
    fn test_skips_candidates_near_existing_ones() {
        let text = "The parties agree that either party may terminate with notice.";
        let pages = split_pages(text);
        let mut candidates = vec![RawSpan {
            clause_type: ClauseType::Termination,
            source_text: text.to_string(),
            page_number: Some(1),
            start_offset: 150,
            end_offset: text.len(),
            confidence: 0.7,
            source: SpanSource::PatternMatcher,
        }];

        enhancer(Box::new(PeriodSegmenter)).enhance(text, &pages, &mut candidates);
        assert_eq!(candidates.len(), 1);
    }

    fn existing_at(start_offset: usize) -> RawSpan {
        RawSpan {
            clause_type: ClauseType::Termination,
            source_text: String::new(),
            page_number: Some(1),
            start_offset,
            end_offset: start_offset,
            confidence: 0.7,
            source: SpanSource::PatternMatcher,
        }
    }

    #[test]
    fn test_proximity_threshold_is_exclusive() {
        let text = "The parties agree that either party may terminate with notice.";
        let pages = split_pages(text);

        let mut candidates = vec![existing_at(200)];
        enhancer(Box::new(PeriodSegmenter)).enhance(text, &pages, &mut candidates);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].start_offset, 0);
        assert_eq!(candidates[1].source, SpanSource::SemanticEnhancer);

        let mut candidates = vec![existing_at(199)];
        enhancer(Box::new(PeriodSegmenter)).enhance(text, &pages, &mut candidates);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_crlf_blank_lines_bound_paragraph() {
        let para = "Each party shall keep the other party's secrets confidential.";
        let text = format!(
            "{}\r\n\r\n{}\r\n \r\n{}",
            "x".repeat(300),
            para,
            "The sky is blue today and nothing else matters here."
        );
        let pages = split_pages(&text);

        let mut candidates = Vec::new();
        enhancer(Box::new(PeriodSegmenter)).enhance(&text, &pages, &mut candidates);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].clause_type, ClauseType::Confidentiality);
        assert_eq!(candidates[0].source_text, para);
        assert_eq!(candidates[0].start_offset, 304);
        assert_eq!(&text[candidates[0].start_offset..candidates[0].end_offset], para);
    }

    #[test]
    fn test_sentences_without_legal_terms_are_ignored() {
        let text = "Confidential secrets abound in this document.";
        let mut candidates = Vec::new();
        enhancer(Box::new(PeriodSegmenter)).enhance(text, &split_pages(text), &mut candidates);
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_noop_segmenter_adds_nothing() {
        let text = "The parties agree to keep all disclosures confidential.";
        let mut candidates = Vec::new();
        let enhancer = enhancer(Box::new(NoopSegmenter));
        assert!(!enhancer.is_available());
        enhancer.enhance(text, &split_pages(text), &mut candidates);
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_input_is_capped() {
        let text = "The parties agree to keep all disclosures confidential.";
        let mut candidates = Vec::new();
        SemanticEnhancer::new(Box::new(PeriodSegmenter), 5, 10, 200, 0.6).enhance(
            text,
            &split_pages(text),
            &mut candidates,
        );
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_paragraph_around() {
        let text = "one\n\n  two three  \n\nfour";
        let start = text.find("three").unwrap();
        let range = paragraph_around(text, start, start + 5);
        assert_eq!(&text[range], "two three");
    }
}
