//! Tunable constants for the extraction pipeline
//!
//! The proximity threshold and the two confidence levels are hand-tuned; they
//! are kept as plain fields so callers can adjust them without code changes.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    /// Longest window the pattern matcher takes after a signal phrase
    pub max_window_chars: usize,
    /// Headings closer than this to the window start belong to the clause itself
    pub min_heading_offset: usize,
    /// Confidence assigned to pattern-matcher spans
    pub pattern_confidence: f32,
    /// Confidence assigned to semantic-enhancer spans
    pub semantic_confidence: f32,
    /// Enhancer spans starting this close to an existing candidate are dropped
    pub proximity_threshold: usize,
    /// Sentences shorter than this are not classified
    pub min_sentence_chars: usize,
    /// Only this many leading characters are handed to the sentence segmenter
    pub max_segmenter_chars: usize,
    /// Documents larger than this are rejected up front
    pub max_document_bytes: usize,
    /// Per-call oracle deadline; a timeout counts as a transport failure
    pub oracle_timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Refine all representatives concurrently instead of one after another
    pub parallel_refinement: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_window_chars: 2000,
            min_heading_offset: 100,
            pattern_confidence: 0.7,
            semantic_confidence: 0.6,
            proximity_threshold: 200,
            min_sentence_chars: 10,
            max_segmenter_chars: 1_000_000,
            max_document_bytes: 16 * 1024 * 1024,
            oracle_timeout: Duration::from_secs(60),
            temperature: 0.0,
            max_tokens: 8192,
            parallel_refinement: true,
        }
    }
}

impl ExtractionConfig {
    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    pub fn with_parallel_refinement(mut self, parallel: bool) -> Self {
        self.parallel_refinement = parallel;
        self
    }
}
