//! Clause risk assessment
//!
//! Each clause is scored by the oracle against the relevant policy snippets.
//! When the oracle cannot answer, the clause is marked High / 1.0 so that it
//! gets a human look instead of slipping through as low risk.

use std::sync::Arc;
use std::time::Duration;

use completion_oracle::{CompletionOracle, CompletionRequest};
use shared_types::{ClauseRiskAssessment, PolicySnippet, ResolvedClause, RiskLevel};

use crate::config::RiskThresholds;
use crate::parse::{parse_score, parse_sections};
use crate::{complete_with_timeout, policy_text};

pub const SYSTEM_PROMPT: &str = "You are a legal risk assessment expert. Your task is to analyze contract clauses \
and identify potential risks based on policy guidelines.\n\n\
For each clause, provide a risk assessment in the following format:\n\
Risk Level: [high/medium/low]\n\
Risk Score: [0.0-1.0]\n\
Risk Factors:\n\
- [factor 1]\n\
- [factor 2]\n\
Recommendations:\n\
- [recommendation 1]\n\
- [recommendation 2]\n\
Reasons:\n\
- [reason 1]";

const HEADERS: &[&str] = &[
    "Risk Level",
    "Risk Score",
    "Risk Factors",
    "Recommendations",
    "Reasons",
];

const DEFAULT_SCORE: f32 = 0.5;
const NO_FACTORS: &str = "No specific risk factors identified";
const NO_RECOMMENDATIONS: &str = "No specific recommendations";
const NO_REASONS: &str = "Risk assessment based on general analysis";

pub struct RiskAssessor {
    oracle: Arc<dyn CompletionOracle>,
    timeout: Duration,
    temperature: f32,
    max_tokens: u32,
}

impl RiskAssessor {
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

    pub fn build_request(
        &self,
        clause: &ResolvedClause,
        policies: &[PolicySnippet],
    ) -> CompletionRequest {
        let prompt = format!(
            "Clause Type: {}\n\nClause Text:\n{}\n\nPolicies:\n{}\n\n\
             Analyze this clause and provide:\n\
             1. Risk level (high/medium/low)\n\
             2. Risk score (0.0-1.0)\n\
             3. Specific risk factors\n\
             4. Recommendations for improvement\n\
             5. Reasons for the assessment",
            clause.clause_type,
            clause.text,
            policy_text(policies),
        );

        CompletionRequest::new(SYSTEM_PROMPT, prompt)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }

    /// Assess one clause. Never fails; oracle problems yield a High / 1.0 assessment.
    pub async fn assess(
        &self,
        clause: &ResolvedClause,
        policies: &[PolicySnippet],
    ) -> ClauseRiskAssessment {
        let request = self.build_request(clause, policies);

        match complete_with_timeout(self.oracle.as_ref(), &request, self.timeout).await {
            Ok(response) => {
                let assessment = parse_assessment(clause, policies, &response);
                tracing::debug!(
                    clause_type = %clause.clause_type,
                    risk_level = %assessment.risk_level,
                    risk_score = assessment.risk_score,
                    "Assessed clause"
                );
                assessment
            }
            Err(e) => {
                tracing::error!(
                    clause_id = %clause.clause_id,
                    clause_type = %clause.clause_type,
                    error = %e,
                    "Risk assessment failed, marking clause high risk"
                );
                ClauseRiskAssessment {
                    clause_id: clause.clause_id.clone(),
                    clause_type: clause.clause_type,
                    risk_level: RiskLevel::High,
                    risk_score: 1.0,
                    risk_factors: vec!["Error during risk assessment".to_string()],
                    recommendations: vec!["Please review manually or try again".to_string()],
                    reasons: vec![format!("Error: {}", e)],
                    policy_references: Vec::new(),
                }
            }
        }
    }
}

/// Build an assessment from a sectioned oracle answer, filling gaps with defaults
pub fn parse_assessment(
    clause: &ResolvedClause,
    policies: &[PolicySnippet],
    response: &str,
) -> ClauseRiskAssessment {
    let sections = parse_sections(response, HEADERS);

    let risk_level = sections
        .get("risk level")
        .and_then(|s| s.inline.split_whitespace().next())
        .and_then(|word| RiskLevel::parse(word.trim_matches(|c: char| !c.is_alphanumeric())))
        .unwrap_or(RiskLevel::Medium);

    let risk_score = sections
        .get("risk score")
        .and_then(|s| parse_score(&s.text()))
        .unwrap_or(DEFAULT_SCORE);

    let list = |key: &str, default: &str| {
        let items = sections.get(key).map(|s| s.items()).unwrap_or_default();
        if items.is_empty() {
            vec![default.to_string()]
        } else {
            items
        }
    };

    ClauseRiskAssessment {
        clause_id: clause.clause_id.clone(),
        clause_type: clause.clause_type,
        risk_level,
        risk_score,
        risk_factors: list("risk factors", NO_FACTORS),
        recommendations: list("recommendations", NO_RECOMMENDATIONS),
        reasons: list("reasons", NO_REASONS),
        policy_references: policies.iter().map(|p| p.policy_id.clone()).collect(),
    }
}

/// Mean clause score and its level; (0.5, Medium) when nothing was assessed
pub fn overall_risk(
    assessments: &[ClauseRiskAssessment],
    thresholds: &RiskThresholds,
) -> (f32, RiskLevel) {
    if assessments.is_empty() {
        return (DEFAULT_SCORE, RiskLevel::Medium);
    }

    let total: f32 = assessments.iter().map(|a| a.risk_score).sum();
    let mean = total / assessments.len() as f32;
    (mean, thresholds.level_for(mean))
}
