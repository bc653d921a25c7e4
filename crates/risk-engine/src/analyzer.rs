//! ContractAnalyzer entry point
//!
//! One `analyze` call runs, in order: document lookup, clause extraction,
//! policy lookup and risk assessment per clause, the whole-contract policy
//! check, and amendment suggestions for risky clauses.

use std::sync::Arc;

use clause_engine::ClauseExtractor;
use completion_oracle::CompletionOracle;
use contract_corpus::{DocumentSource, PolicyReference};
use futures::future::join_all;
use shared_types::{ContractAnalysis, PolicySnippet};

use crate::amendment::AmendmentSuggester;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::policy_check::PolicyChecker;
use crate::risk::{overall_risk, RiskAssessor};

pub struct ContractAnalyzer {
    documents: Arc<dyn DocumentSource>,
    policies: Arc<dyn PolicyReference>,
    oracle: Arc<dyn CompletionOracle>,
    extractor: ClauseExtractor,
    assessor: RiskAssessor,
    checker: PolicyChecker,
    suggester: AmendmentSuggester,
    config: AnalysisConfig,
}

impl ContractAnalyzer {
    pub fn new(
        documents: Arc<dyn DocumentSource>,
        policies: Arc<dyn PolicyReference>,
        oracle: Arc<dyn CompletionOracle>,
    ) -> Self {
        let extractor = ClauseExtractor::new(oracle.clone());
        Self::assemble(documents, policies, oracle, extractor, AnalysisConfig::default())
    }

    pub fn with_config(self, config: AnalysisConfig) -> Self {
        Self::assemble(self.documents, self.policies, self.oracle, self.extractor, config)
    }

    /// Replace the clause extractor, e.g. to change its config or segmenter
    pub fn with_extractor(mut self, extractor: ClauseExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    fn assemble(
        documents: Arc<dyn DocumentSource>,
        policies: Arc<dyn PolicyReference>,
        oracle: Arc<dyn CompletionOracle>,
        extractor: ClauseExtractor,
        config: AnalysisConfig,
    ) -> Self {
        let assessor = RiskAssessor::new(oracle.clone(), config.oracle_timeout)
            .with_sampling(config.temperature, config.max_tokens);
        let checker = PolicyChecker::new(oracle.clone(), config.oracle_timeout)
            .with_max_contract_chars(config.max_contract_chars)
            .with_sampling(config.temperature, config.max_tokens);
        let suggester = AmendmentSuggester::new(oracle.clone(), config.oracle_timeout)
            .with_sampling(config.amendment_temperature, config.max_tokens);

        Self {
            documents,
            policies,
            oracle,
            extractor,
            assessor,
            checker,
            suggester,
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze one stored document
    pub async fn analyze(&self, document_id: &str) -> Result<ContractAnalysis, AnalysisError> {
        let metadata = self.documents.metadata(document_id)?;
        let text = self.documents.full_text(document_id)?;

        tracing::info!(
            document_id,
            title = %metadata.title,
            oracle = self.oracle.name(),
            "Analyzing contract"
        );

        let clauses = self.extractor.extract(&text).await?;

        let clause_policies: Vec<Vec<PolicySnippet>> = clauses
            .iter()
            .map(|clause| self.lookup_policies(&clause.text, self.config.policy_top_k))
            .collect();

        let risk_assessments = join_all(
            clauses
                .iter()
                .zip(&clause_policies)
                .map(|(clause, policies)| self.assessor.assess(clause, policies)),
        )
        .await;

        let contract_policies = self.lookup_policies(&text, self.config.policy_check_top_k);
        let policy_check = self
            .checker
            .check(document_id, &text, &contract_policies)
            .await;

        let amendment_suggestions = self
            .suggester
            .suggest(&clauses, &risk_assessments, &contract_policies)
            .await;

        let (overall_risk_score, overall_risk_level) =
            overall_risk(&risk_assessments, &self.config.thresholds);

        tracing::info!(
            document_id,
            clauses = clauses.len(),
            overall_risk_score,
            overall_risk_level = %overall_risk_level,
            suggestions = amendment_suggestions.len(),
            "Contract analysis complete"
        );

        Ok(ContractAnalysis {
            contract_id: document_id.to_string(),
            metadata,
            clauses,
            risk_assessments,
            policy_check,
            amendment_suggestions,
            overall_risk_score,
            overall_risk_level,
            analyzed_at: chrono::Utc::now().timestamp() as u64,
        })
    }

    fn lookup_policies(&self, text: &str, top_k: usize) -> Vec<PolicySnippet> {
        match self.policies.find_relevant(text, top_k) {
            Ok(snippets) => snippets,
            Err(e) => {
                tracing::warn!(error = %e, "Policy lookup failed, continuing without policies");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use completion_oracle::stub::StaticOracle;
    use contract_corpus::{CorpusError, InMemoryDocumentSource};
    use shared_types::RiskLevel;

    struct BrokenPolicies;

    impl PolicyReference for BrokenPolicies {
        fn find_relevant(&self, _: &str, _: usize) -> Result<Vec<PolicySnippet>, CorpusError> {
            Err(CorpusError::Index("index unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_unknown_document_is_an_error() {
        let analyzer = ContractAnalyzer::new(
            Arc::new(InMemoryDocumentSource::new()),
            Arc::new(BrokenPolicies),
            Arc::new(StaticOracle::new("Risk Level: low")),
        );
        let err = analyzer.analyze("missing").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Corpus(CorpusError::DocumentNotFound(_))));
    }

    #[tokio::test]
    async fn test_policy_lookup_failure_is_not_fatal() {
        let documents = Arc::new(InMemoryDocumentSource::new());
        let id = documents.add_text("Lease", "Nothing of legal interest here at all.");
        let analyzer = ContractAnalyzer::new(
            documents,
            Arc::new(BrokenPolicies),
            Arc::new(StaticOracle::new("Risk Level: low")),
        );

        let analysis = analyzer.analyze(&id).await.unwrap();
        assert!(analysis.clauses.is_empty());
        assert_eq!(analysis.overall_risk_level, RiskLevel::Medium);
        assert_eq!(analysis.overall_risk_score, 0.5);
        assert_eq!(
            analysis.policy_check.policy_violations,
            vec!["No policy documents found to check against"]
        );
    }
}
