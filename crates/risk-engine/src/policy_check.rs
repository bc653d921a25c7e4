//! Whole-contract policy compliance check

use std::sync::Arc;
use std::time::Duration;

use completion_oracle::{CompletionOracle, CompletionRequest};
use serde_json::{json, Map, Value};
use shared_types::{PolicyCheckResult, PolicySnippet};

use crate::parse::{parse_score, parse_sections};
use crate::{complete_with_timeout, policy_text};

pub const SYSTEM_PROMPT: &str = "You are a legal policy compliance expert. Your task is to analyze a contract \
against policy guidelines and identify violations and recommendations.\n\n\
Format your response as:\n\
Policy Violations:\n\
- [violation 1]\n\
Compliance Score: [0.0-1.0]\n\
Recommendations:\n\
- [recommendation 1]";

const HEADERS: &[&str] = &["Policy Violations", "Compliance Score", "Recommendations"];

pub struct PolicyChecker {
    oracle: Arc<dyn CompletionOracle>,
    timeout: Duration,
    max_contract_chars: usize,
    temperature: f32,
    max_tokens: u32,
}

impl PolicyChecker {
    pub fn new(oracle: Arc<dyn CompletionOracle>, timeout: Duration) -> Self {
        Self {
            oracle,
            timeout,
            max_contract_chars: 32_000,
            temperature: 0.0,
            max_tokens: 8192,
        }
    }

    pub fn with_max_contract_chars(mut self, max_chars: usize) -> Self {
        self.max_contract_chars = max_chars;
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn build_request(&self, contract_text: &str, policies: &[PolicySnippet]) -> CompletionRequest {
        let contract = truncate_chars(contract_text, self.max_contract_chars);
        let prompt = format!(
            "Contract:\n{}\n\nPolicies:\n{}\n\n\
             Analyze the contract against these policies and identify:\n\
             1. Policy violations\n\
             2. Compliance score (0.0-1.0)\n\
             3. Specific recommendations for improvement",
            contract,
            policy_text(policies),
        );

        CompletionRequest::new(SYSTEM_PROMPT, prompt)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }

    /// Check a contract against `policies`. Never fails; problems are reported in the result.
    pub async fn check(
        &self,
        contract_id: &str,
        contract_text: &str,
        policies: &[PolicySnippet],
    ) -> PolicyCheckResult {
        if policies.is_empty() {
            tracing::warn!(contract_id, "No policy documents to check against");
            return PolicyCheckResult {
                policy_violations: vec!["No policy documents found to check against".to_string()],
                compliance_score: 0.0,
                recommendations: vec!["Please upload policy documents first".to_string()],
                metadata: metadata_with([("error", json!("no_policies"))]),
            };
        }

        let request = self.build_request(contract_text, policies);
        match complete_with_timeout(self.oracle.as_ref(), &request, self.timeout).await {
            Ok(response) => {
                let mut result = parse_policy_check(&response);
                result
                    .metadata
                    .insert("contract_id".to_string(), json!(contract_id));
                result.metadata.insert(
                    "analysis_timestamp".to_string(),
                    json!(chrono::Utc::now().to_rfc3339()),
                );
                tracing::info!(
                    contract_id,
                    violations = result.policy_violations.len(),
                    compliance_score = result.compliance_score,
                    "Policy check complete"
                );
                result
            }
            Err(e) => {
                tracing::error!(contract_id, error = %e, "Policy check failed");
                PolicyCheckResult {
                    policy_violations: vec!["Error during policy check".to_string()],
                    compliance_score: 0.0,
                    recommendations: vec!["Please try again or contact support".to_string()],
                    metadata: metadata_with([("error", json!(e.to_string()))]),
                }
            }
        }
    }
}

/// Parse a sectioned compliance answer, filling gaps with defaults
pub fn parse_policy_check(response: &str) -> PolicyCheckResult {
    let sections = parse_sections(response, HEADERS);

    let list = |key: &str, default: &str| {
        let items = sections.get(key).map(|s| s.items()).unwrap_or_default();
        if items.is_empty() {
            vec![default.to_string()]
        } else {
            items
        }
    };

    PolicyCheckResult {
        policy_violations: list("policy violations", "No specific violations found"),
        compliance_score: sections
            .get("compliance score")
            .and_then(|s| parse_score(&s.text()))
            .unwrap_or(0.0),
        recommendations: list("recommendations", "No specific recommendations"),
        metadata: Map::new(),
    }
}

fn metadata_with<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
