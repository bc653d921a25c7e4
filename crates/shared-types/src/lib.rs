pub mod types;

pub use types::{
    AmendmentSuggestion, ClauseRiskAssessment, ClauseType, ConfidenceMetadata, ContractAnalysis,
    DocumentMetadata, PolicyCheckResult, PolicySnippet, RawSpan, ResolvedClause, RiskLevel,
    SpanSource,
};
