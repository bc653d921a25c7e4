//! Risk Engine - what happens to clauses after extraction
//!
//! This crate provides:
//! - Per-clause risk assessment against relevant policy snippets
//! - A whole-contract policy compliance check
//! - Amendment suggestions for clauses above low risk
//! - `ContractAnalyzer`, which runs extraction and all of the above for one document
//!
//! Every oracle call has a deadline. A failed call never aborts the analysis;
//! it produces the most conservative result for its stage.

pub mod amendment;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod parse;
pub mod policy_check;
pub mod risk;

use std::time::Duration;

use completion_oracle::{CompletionOracle, CompletionRequest, OracleError};
use shared_types::PolicySnippet;

// Re-export commonly used types
pub use amendment::AmendmentSuggester;
pub use analyzer::ContractAnalyzer;
pub use config::{AnalysisConfig, RiskThresholds};
pub use error::AnalysisError;
pub use policy_check::PolicyChecker;
pub use risk::{overall_risk, RiskAssessor};

const NO_POLICIES: &str = "No policy references available";

pub(crate) async fn complete_with_timeout(
    oracle: &dyn CompletionOracle,
    request: &CompletionRequest,
    timeout: Duration,
) -> Result<String, OracleError> {
    let text = match tokio::time::timeout(timeout, oracle.complete(request)).await {
        Ok(result) => result?,
        Err(_) => return Err(OracleError::Timeout(timeout.as_millis() as u64)),
    };

    if text.trim().is_empty() {
        return Err(OracleError::MalformedResponse("empty completion".to_string()));
    }
    Ok(text)
}

/// Policy snippets as prompt text
pub(crate) fn policy_text(policies: &[PolicySnippet]) -> String {
    if policies.is_empty() {
        return NO_POLICIES.to_string();
    }
    policies
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
