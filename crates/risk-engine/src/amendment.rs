//! Amendment suggestions for risky clauses
//!
//! Only clauses assessed above `Low` get a suggestion. Each one is a single
//! oracle call; a failed call still produces an entry so the reviewer sees
//! that the clause needs attention.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use completion_oracle::{CompletionOracle, CompletionRequest};
use serde_json::{json, Map};
use shared_types::{AmendmentSuggestion, ClauseRiskAssessment, PolicySnippet, ResolvedClause, RiskLevel};

use crate::parse::{parse_integer, parse_sections};
use crate::{complete_with_timeout, policy_text};

pub const SYSTEM_PROMPT: &str = "You are a legal expert specialized in contract amendments. Your task is to \
suggest improvements to contract clauses based on risk assessments and policy guidelines.";

const HEADERS: &[&str] = &["Suggested Text", "Reason", "Priority"];

const DEFAULT_PRIORITY: u8 = 3;

pub struct AmendmentSuggester {
    oracle: Arc<dyn CompletionOracle>,
    timeout: Duration,
    temperature: f32,
    max_tokens: u32,
}

impl AmendmentSuggester {
    pub fn new(oracle: Arc<dyn CompletionOracle>, timeout: Duration) -> Self {
        Self {
            oracle,
            timeout,
            temperature: 0.2,
            max_tokens: 8192,
        }
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn build_request(
        &self,
        clause: &ResolvedClause,
        assessment: &ClauseRiskAssessment,
        policies: &[PolicySnippet],
    ) -> CompletionRequest {
        let prompt = format!(
            "Clause Type: {}\n\nOriginal Text:\n{}\n\nRisk Level: {}\nRisk Factors:\n{}\n\n\
             Policy Guidelines:\n{}\n\n\
             Please suggest amendments that would:\n\
             1. Reduce identified risks\n\
             2. Improve compliance with policies\n\
             3. Maintain the core business intent\n\n\
             Format your response as:\n\
             Suggested Text: [your suggested text]\n\n\
             Reason: [explanation of changes]\n\n\
             Priority: [1-5, where 5 is highest]",
            clause.clause_type,
            clause.text,
            assessment.risk_level,
            assessment.risk_factors.join("\n"),
            policy_text(policies),
        );

        CompletionRequest::new(SYSTEM_PROMPT, prompt)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }

    /// Suggest amendments for every clause whose assessment is above `Low`
    pub async fn suggest(
        &self,
        clauses: &[ResolvedClause],
        assessments: &[ClauseRiskAssessment],
        policies: &[PolicySnippet],
    ) -> Vec<AmendmentSuggestion> {
        let by_id: HashMap<&str, &ClauseRiskAssessment> = assessments
            .iter()
            .map(|a| (a.clause_id.as_str(), a))
            .collect();

        let mut suggestions = Vec::new();
        for clause in clauses {
            let Some(assessment) = by_id.get(clause.clause_id.as_str()) else {
                continue;
            };
            if assessment.risk_level == RiskLevel::Low {
                continue;
            }
            if let Some(suggestion) = self.suggest_one(clause, assessment, policies).await {
                suggestions.push(suggestion);
            }
        }

        tracing::info!(
            clauses = clauses.len(),
            suggestions = suggestions.len(),
            "Generated amendment suggestions"
        );
        suggestions
    }

    async fn suggest_one(
        &self,
        clause: &ResolvedClause,
        assessment: &ClauseRiskAssessment,
        policies: &[PolicySnippet],
    ) -> Option<AmendmentSuggestion> {
        let request = self.build_request(clause, assessment, policies);

        match complete_with_timeout(self.oracle.as_ref(), &request, self.timeout).await {
            Ok(response) => {
                let suggestion = parse_suggestion(clause, assessment, &response);
                if suggestion.is_none() {
                    tracing::debug!(
                        clause_id = %clause.clause_id,
                        "Amendment answer missing text or reason, skipping"
                    );
                }
                suggestion
            }
            Err(e) => {
                tracing::error!(
                    clause_id = %clause.clause_id,
                    error = %e,
                    "Amendment suggestion failed"
                );
                let mut metadata = Map::new();
                metadata.insert("error".to_string(), json!(e.to_string()));
                Some(AmendmentSuggestion {
                    clause_id: clause.clause_id.clone(),
                    clause_type: clause.clause_type,
                    original_text: clause.text.clone(),
                    suggested_text: "[Error generating suggestion]".to_string(),
                    reason: format!("Error during analysis: {}", e),
                    priority: 5,
                    metadata,
                })
            }
        }
    }
}

/// Parse an amendment answer. `None` unless both text and reason are present.
pub fn parse_suggestion(
    clause: &ResolvedClause,
    assessment: &ClauseRiskAssessment,
    response: &str,
) -> Option<AmendmentSuggestion> {
    let sections = parse_sections(response, HEADERS);

    let suggested_text = sections.get("suggested text").map(|s| s.text())?;
    let reason = sections.get("reason").map(|s| s.text())?;
    if suggested_text.is_empty() || reason.is_empty() {
        return None;
    }

    let priority = sections
        .get("priority")
        .and_then(|s| parse_integer(&s.text()))
        .map(|p| p.clamp(1, 5) as u8)
        .unwrap_or(DEFAULT_PRIORITY);

    let mut metadata = Map::new();
    metadata.insert("risk_level".to_string(), json!(assessment.risk_level.to_string()));
    metadata.insert("risk_score".to_string(), json!(assessment.risk_score));

    Some(AmendmentSuggestion {
        clause_id: clause.clause_id.clone(),
        clause_type: clause.clause_type,
        original_text: clause.text.clone(),
        suggested_text,
        reason,
        priority,
        metadata,
    })
}
