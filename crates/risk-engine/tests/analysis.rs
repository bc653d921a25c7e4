//! Full contract analysis against an in-memory corpus and scripted oracles

use std::sync::Arc;

use clause_engine::{ClauseExtractor, NoopSegmenter, CANDIDATE_MARKER};
use completion_oracle::stub::{FailingOracle, ScriptedOracle};
use completion_oracle::CompletionRequest;
use contract_corpus::{InMemoryDocumentSource, PolicyIndex};
use pretty_assertions::assert_eq;
use risk_engine::{amendment, policy_check, risk, ContractAnalyzer};
use shared_types::{ClauseType, RiskLevel};

const CONTRACT: &str = "\
--- Page 1 ---
SERVICES AGREEMENT

1. Termination Clause: Either party may terminate this agreement upon five days notice without \
cause. No fees are refunded on termination.

2. Confidentiality: Each party shall keep the other party's confidential information secret and \
shall not disclose it to anyone.
";

const POLICY: &str = "\
TERMINATION

Contracts must allow termination on no less than 30 days notice.

CONFIDENTIALITY

Confidential information must be protected for five years.
";

fn script(request: &CompletionRequest) -> String {
    if request.system == risk::SYSTEM_PROMPT {
        if request.prompt.starts_with("Clause Type: termination") {
            "Risk Level: High\nRisk Score: 0.9\nRisk Factors:\n- Five day notice is too short\n\
             Recommendations:\n- Require 30 days notice\nReasons:\n- Policy requires 30 days"
                .to_string()
        } else {
            "Risk Level: Low\nRisk Score: 0.1".to_string()
        }
    } else if request.system == policy_check::SYSTEM_PROMPT {
        "Policy Violations:\n- Termination notice shorter than 30 days\n\
         Compliance Score: 0.5\nRecommendations:\n- Extend the notice period"
            .to_string()
    } else if request.system == amendment::SYSTEM_PROMPT {
        "Suggested Text: Either party may terminate this agreement upon thirty days notice.\n\
         Reason: Matches the 30 day policy.\nPriority: 4"
            .to_string()
    } else {
        // Clause refinement: hand the candidate back unchanged
        request
            .prompt
            .split_once(CANDIDATE_MARKER)
            .map(|(_, text)| text.to_string())
            .unwrap_or_default()
    }
}

fn setup(oracle: Arc<dyn completion_oracle::CompletionOracle>) -> (ContractAnalyzer, String) {
    let documents = Arc::new(InMemoryDocumentSource::new());
    let id = documents.add_text("Services Agreement", CONTRACT);

    let policies = PolicyIndex::in_memory().unwrap();
    policies
        .add_policy("contracting.md", "contracting", POLICY)
        .unwrap();

    let extractor = ClauseExtractor::new(oracle.clone()).with_segmenter(Box::new(NoopSegmenter));
    let analyzer =
        ContractAnalyzer::new(documents, Arc::new(policies), oracle).with_extractor(extractor);
    (analyzer, id)
}

#[tokio::test]
async fn test_full_analysis() {
    let oracle = Arc::new(ScriptedOracle::new(|req| Ok(script(req))));
    let (analyzer, id) = setup(oracle.clone());

    let analysis = analyzer.analyze(&id).await.unwrap();

    assert_eq!(analysis.contract_id, id);
    assert_eq!(analysis.metadata.title, "Services Agreement");

    let types: Vec<_> = analysis.clauses.iter().map(|c| c.clause_type).collect();
    assert_eq!(types, vec![ClauseType::Termination, ClauseType::Confidentiality]);
    assert!(analysis.clauses[0].text.ends_with("No fees are refunded on termination."));
    assert!(!analysis.clauses[0].text.contains("Confidentiality"));

    assert_eq!(analysis.risk_assessments.len(), 2);
    let termination = &analysis.risk_assessments[0];
    assert_eq!(termination.clause_id, analysis.clauses[0].clause_id);
    assert_eq!(termination.risk_level, RiskLevel::High);
    assert_eq!(termination.risk_factors, vec!["Five day notice is too short"]);
    assert_eq!(termination.policy_references.first().map(String::as_str), Some("contracting.md"));
    assert_eq!(analysis.risk_assessments[1].risk_level, RiskLevel::Low);

    assert!((analysis.overall_risk_score - 0.5).abs() < 1e-6);
    assert_eq!(analysis.overall_risk_level, RiskLevel::Medium);

    assert_eq!(
        analysis.policy_check.policy_violations,
        vec!["Termination notice shorter than 30 days"]
    );
    assert_eq!(analysis.policy_check.compliance_score, 0.5);
    assert_eq!(analysis.policy_check.metadata["contract_id"], id.as_str());

    assert_eq!(analysis.amendment_suggestions.len(), 1);
    let suggestion = &analysis.amendment_suggestions[0];
    assert_eq!(suggestion.clause_type, ClauseType::Termination);
    assert_eq!(suggestion.priority, 4);

    // 2 refinements + 2 assessments + 1 policy check + 1 amendment
    assert_eq!(oracle.calls(), 6);
}

#[tokio::test]
async fn test_unreachable_oracle_fails_closed() {
    let (analyzer, id) = setup(Arc::new(FailingOracle::unreachable()));

    let analysis = analyzer.analyze(&id).await.unwrap();

    assert_eq!(analysis.clauses.len(), 2);
    assert!(analysis.clauses.iter().all(|c| c.confidence.degraded));
    assert!(analysis
        .risk_assessments
        .iter()
        .all(|a| a.risk_level == RiskLevel::High && a.risk_score == 1.0));
    assert_eq!(analysis.overall_risk_level, RiskLevel::High);
    assert_eq!(
        analysis.policy_check.policy_violations,
        vec!["Error during policy check"]
    );
    assert_eq!(analysis.amendment_suggestions.len(), 2);
    assert!(analysis
        .amendment_suggestions
        .iter()
        .all(|s| s.priority == 5 && s.suggested_text == "[Error generating suggestion]"));
}

#[tokio::test]
async fn test_analysis_serializes() {
    let oracle = Arc::new(ScriptedOracle::new(|req| Ok(script(req))));
    let (analyzer, id) = setup(oracle);

    let analysis = analyzer.analyze(&id).await.unwrap();
    let json = serde_json::to_value(&analysis).unwrap();

    assert_eq!(json["overall_risk_level"], "medium");
    assert_eq!(json["clauses"][0]["clause_type"], "termination");
}
