//! Clause Engine - extracts one authoritative clause per type from contract text
//!
//! Stages, in order:
//! 1. `matcher` finds signal phrases page by page and takes a window after each
//! 2. `boundary` cuts each window at the next section heading
//! 3. `enhancer` adds paragraph candidates from sentence classification (optional)
//! 4. `resolver` keeps the best candidate per clause type
//! 5. `refiner` asks the completion oracle to validate and clean each survivor
//!
//! All offsets are byte offsets into the full text passed to `ClauseExtractor`,
//! page markers included.

pub mod boundary;
pub mod config;
pub mod enhancer;
pub mod error;
pub mod matcher;
pub mod pages;
pub mod patterns;
pub mod refiner;
pub mod resolver;
pub mod segmenter;

use std::sync::Arc;

use completion_oracle::CompletionOracle;
use shared_types::{ConfidenceMetadata, RawSpan, ResolvedClause};

pub use boundary::BoundaryRefiner;
pub use config::ExtractionConfig;
pub use enhancer::SemanticEnhancer;
pub use error::ExtractionError;
pub use matcher::PatternMatcher;
pub use refiner::{OracleRefiner, Refinement, CANDIDATE_MARKER, REJECTION_SENTINEL};
pub use segmenter::{default_segmenter, NoopSegmenter, Sentence, SentenceSegmenter};

/// ClauseExtractor entry point
pub struct ClauseExtractor {
    config: ExtractionConfig,
    oracle: Arc<dyn CompletionOracle>,
    matcher: PatternMatcher,
    boundary: BoundaryRefiner,
    enhancer: SemanticEnhancer,
    refiner: OracleRefiner,
}

impl ClauseExtractor {
    pub fn new(oracle: Arc<dyn CompletionOracle>) -> Self {
        Self::assemble(oracle, default_segmenter(), ExtractionConfig::default())
    }

    pub fn with_config(self, config: ExtractionConfig) -> Self {
        Self::assemble(self.oracle, self.enhancer.into_segmenter(), config)
    }

    /// Swap the sentence segmenter; pass `NoopSegmenter` to disable semantic enhancement
    pub fn with_segmenter(self, segmenter: Box<dyn SentenceSegmenter>) -> Self {
        Self::assemble(self.oracle, segmenter, self.config)
    }

    fn assemble(
        oracle: Arc<dyn CompletionOracle>,
        segmenter: Box<dyn SentenceSegmenter>,
        config: ExtractionConfig,
    ) -> Self {
        let matcher = PatternMatcher::new(config.max_window_chars, config.pattern_confidence);
        let boundary = BoundaryRefiner::new(config.min_heading_offset);
        let enhancer = SemanticEnhancer::new(
            segmenter,
            config.max_segmenter_chars,
            config.min_sentence_chars,
            config.proximity_threshold,
            config.semantic_confidence,
        );
        let refiner = OracleRefiner::new(oracle.clone(), config.oracle_timeout)
            .with_sampling(config.temperature, config.max_tokens);

        if enhancer.is_available() {
            tracing::debug!(segmenter = enhancer.segmenter_name(), "Semantic enhancement enabled");
        } else {
            tracing::info!("No sentence segmenter available, using pattern matches only");
        }

        Self {
            config,
            oracle,
            matcher,
            boundary,
            enhancer,
            refiner,
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Every candidate span from the matcher (boundary-refined) and the enhancer
    pub fn candidates(&self, text: &str) -> Result<Vec<RawSpan>, ExtractionError> {
        self.validate(text)?;

        let pages = pages::split_pages(text);
        let mut candidates: Vec<RawSpan> = self
            .matcher
            .scan(&pages)
            .into_iter()
            .map(|span| self.boundary.refine(span))
            .filter(|span| !span.source_text.is_empty())
            .collect();

        if self.enhancer.is_available() {
            self.enhancer.enhance(text, &pages, &mut candidates);
        }

        Ok(candidates)
    }

    /// One representative span per clause type, before oracle refinement
    pub fn representatives(&self, text: &str) -> Result<Vec<RawSpan>, ExtractionError> {
        let candidates = self.candidates(text)?;
        Ok(resolver::resolve(candidates))
    }

    /// Run the full pipeline.
    ///
    /// Finding nothing is success with an empty list. Oracle failures never
    /// surface here; affected clauses come back with `degraded` set.
    pub async fn extract(&self, text: &str) -> Result<Vec<ResolvedClause>, ExtractionError> {
        let representatives = self.representatives(text)?;
        let mut refinements = self
            .refiner
            .refine_all(&representatives, self.config.parallel_refinement)
            .await;

        let mut clauses = Vec::with_capacity(representatives.len());
        let mut rejected = 0;
        let mut degraded_count = 0;

        for span in representatives {
            match refinements.remove(&span.clause_type) {
                Some(Refinement::Accepted { text, degraded }) => {
                    if degraded {
                        degraded_count += 1;
                    }
                    clauses.push(ResolvedClause {
                        clause_id: uuid::Uuid::new_v4().to_string(),
                        clause_type: span.clause_type,
                        text,
                        page_number: span.page_number,
                        start_offset: span.start_offset,
                        end_offset: span.end_offset,
                        confidence: ConfidenceMetadata {
                            confidence: span.confidence,
                            source: span.source,
                            degraded,
                        },
                    });
                }
                Some(Refinement::Rejected) | None => rejected += 1,
            }
        }

        tracing::info!(
            clauses = clauses.len(),
            rejected,
            degraded = degraded_count,
            "Clause extraction complete"
        );

        Ok(clauses)
    }

    fn validate(&self, text: &str) -> Result<(), ExtractionError> {
        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyDocument);
        }
        if text.len() > self.config.max_document_bytes {
            return Err(ExtractionError::DocumentTooLarge {
                size: text.len(),
                limit: self.config.max_document_bytes,
            });
        }
        Ok(())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use completion_oracle::stub::StaticOracle;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn contract_like() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                Just("Termination Clause: ".to_string()),
                Just("Fees: ".to_string()),
                Just("\n\nGOVERNING LAW\n".to_string()),
                Just("\n--- Page 2 ---\n".to_string()),
                Just("The parties shall keep all disclosures confidential. ".to_string()),
                Just("\n12. ".to_string()),
                "\\PC{0,60}",
            ],
            0..24,
        )
        .prop_map(|parts| parts.concat())
    }

    fn extractor() -> ClauseExtractor {
        ClauseExtractor::new(Arc::new(StaticOracle::new("ok")))
    }

    proptest! {
        #[test]
        fn never_panics_on_arbitrary_text(text in "\\PC*") {
            let _ = extractor().representatives(&text);
        }

        #[test]
        fn candidate_offsets_slice_the_document(text in contract_like()) {
            if let Ok(candidates) = extractor().candidates(&text) {
                for span in candidates {
                    prop_assert!(span.start_offset <= span.end_offset);
                    prop_assert!(span.end_offset <= text.len());
                    prop_assert_eq!(&text[span.start_offset..span.end_offset], span.source_text.as_str());
                }
            }
        }

        #[test]
        fn at_most_one_representative_per_type(text in contract_like()) {
            if let Ok(reps) = extractor().representatives(&text) {
                let mut seen = HashSet::new();
                for span in &reps {
                    prop_assert!(seen.insert(span.clause_type));
                }
            }
        }

        #[test]
        fn representatives_are_deterministic(text in contract_like()) {
            let first = extractor().representatives(&text);
            let second = extractor().representatives(&text);
            prop_assert_eq!(first, second);
        }
    }
}
