use std::time::Duration;

use shared_types::RiskLevel;

/// Score cut-offs for risk levels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskThresholds {
    pub high: f32,
    pub medium: f32,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high: 0.7,
            medium: 0.4,
        }
    }
}

impl RiskThresholds {
    pub fn level_for(&self, score: f32) -> RiskLevel {
        if score >= self.high {
            RiskLevel::High
        } else if score >= self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Settings for the analysis stages downstream of clause extraction
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub thresholds: RiskThresholds,
    /// Policy snippets fetched per clause for risk assessment
    pub policy_top_k: usize,
    /// Policy snippets fetched for the whole-contract policy check
    pub policy_check_top_k: usize,
    /// Contract text beyond this many characters is left out of the policy-check prompt
    pub max_contract_chars: usize,
    pub temperature: f32,
    pub amendment_temperature: f32,
    pub max_tokens: u32,
    pub oracle_timeout: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            thresholds: RiskThresholds::default(),
            policy_top_k: 3,
            policy_check_top_k: 10,
            max_contract_chars: 32_000,
            temperature: 0.0,
            amendment_temperature: 0.2,
            max_tokens: 8192,
            oracle_timeout: Duration::from_secs(60),
        }
    }
}

impl AnalysisConfig {
    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    pub fn with_policy_top_k(mut self, top_k: usize) -> Self {
        self.policy_top_k = top_k;
        self
    }
}
