//! Oracle refiner: validate and clean each representative span
//!
//! Per candidate the outcome is one of:
//! - `Accepted { degraded: false }` with the oracle's cleaned text
//! - `Rejected` when the oracle answers with the rejection sentinel
//! - `Accepted { degraded: true }` with the original span text when the call
//!   fails, times out or comes back empty
//!
//! At most one oracle call is made per candidate; there are no retries.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use completion_oracle::{CompletionOracle, CompletionRequest, OracleError};
use futures::future::join_all;
use shared_types::{ClauseType, RawSpan};

/// Exact oracle answer meaning "not a clause of this type"
pub const REJECTION_SENTINEL: &str = "NOT_VALID";

/// Line that introduces the candidate text in the prompt
pub const CANDIDATE_MARKER: &str = "Potential clause:\n";

pub const SYSTEM_PROMPT: &str = "You are a legal expert specialized in contract analysis. \
Your task is to extract and refine legal clauses from contracts.";

#[derive(Debug, Clone, PartialEq)]
pub enum Refinement {
    Accepted { text: String, degraded: bool },
    Rejected,
}

pub struct OracleRefiner {
    oracle: Arc<dyn CompletionOracle>,
    timeout: Duration,
    temperature: f32,
    max_tokens: u32,
}

impl OracleRefiner {
    pub fn new(oracle: Arc<dyn CompletionOracle>, timeout: Duration) -> Self {
        Self {
            oracle,
            timeout,
            temperature: 0.0,
            max_tokens: 8192,
        }
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn build_request(&self, span: &RawSpan) -> CompletionRequest {
        let label = span.clause_type.label();
        let prompt = format!(
            "Below is a potential {label} clause from a contract. \
             Please extract the complete clause text, removing any irrelevant text. \
             If this is not a valid {label} clause, respond with '{REJECTION_SENTINEL}'.\n\n\
             {CANDIDATE_MARKER}{text}",
            text = span.source_text,
        );

        CompletionRequest::new(SYSTEM_PROMPT, prompt)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }

    /// Refine one span. Never fails: transport problems fall back to the span text.
    pub async fn refine(&self, span: &RawSpan) -> Refinement {
        let request = self.build_request(span);

        let outcome = match tokio::time::timeout(self.timeout, self.oracle.complete(&request)).await
        {
            Ok(result) => result,
            Err(_) => Err(OracleError::Timeout(self.timeout.as_millis() as u64)),
        };

        let response = outcome.and_then(|text| {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Err(OracleError::MalformedResponse("empty completion".to_string()))
            } else {
                Ok(trimmed.to_string())
            }
        });

        match response {
            Ok(text) if text == REJECTION_SENTINEL => {
                tracing::debug!(clause_type = %span.clause_type, "Oracle rejected candidate");
                Refinement::Rejected
            }
            Ok(text) => {
                tracing::debug!(clause_type = %span.clause_type, "Oracle accepted candidate");
                Refinement::Accepted {
                    text,
                    degraded: false,
                }
            }
            Err(e) => {
                tracing::warn!(
                    clause_type = %span.clause_type,
                    oracle = self.oracle.name(),
                    error = %e,
                    "Oracle refinement failed, keeping unrefined text"
                );
                Refinement::Accepted {
                    text: span.source_text.clone(),
                    degraded: true,
                }
            }
        }
    }

    /// Refine every representative, concurrently when `parallel` is set.
    ///
    /// Results are keyed by clause type; callers must pass at most one span per type.
    pub async fn refine_all(
        &self,
        spans: &[RawSpan],
        parallel: bool,
    ) -> HashMap<ClauseType, Refinement> {
        if parallel {
            let calls = spans
                .iter()
                .map(|span| async move { (span.clause_type, self.refine(span).await) });
            join_all(calls).await.into_iter().collect()
        } else {
            let mut results = HashMap::with_capacity(spans.len());
            for span in spans {
                results.insert(span.clause_type, self.refine(span).await);
            }
            results
        }
    }
}
