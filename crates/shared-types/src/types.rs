use std::fmt;

/// Closed set of clause categories the extraction pipeline recognises.
///
/// Adding a category means adding a variant here and a matching entry in the
/// clause-engine pattern table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ClauseType {
    Termination,
    Jurisdiction,
    PaymentTerms,
    Confidentiality,
    IntellectualProperty,
    Liability,
    Indemnification,
    ForceMajeure,
    Assignment,
    GoverningLaw,
    Other,
}

impl ClauseType {
    /// Every variant, in declaration order
    pub const ALL: [ClauseType; 11] = [
        ClauseType::Termination,
        ClauseType::Jurisdiction,
        ClauseType::PaymentTerms,
        ClauseType::Confidentiality,
        ClauseType::IntellectualProperty,
        ClauseType::Liability,
        ClauseType::Indemnification,
        ClauseType::ForceMajeure,
        ClauseType::Assignment,
        ClauseType::GoverningLaw,
        ClauseType::Other,
    ];

    /// Wire name, e.g. "payment_terms"
    pub fn as_str(&self) -> &'static str {
        match self {
            ClauseType::Termination => "termination",
            ClauseType::Jurisdiction => "jurisdiction",
            ClauseType::PaymentTerms => "payment_terms",
            ClauseType::Confidentiality => "confidentiality",
            ClauseType::IntellectualProperty => "intellectual_property",
            ClauseType::Liability => "liability",
            ClauseType::Indemnification => "indemnification",
            ClauseType::ForceMajeure => "force_majeure",
            ClauseType::Assignment => "assignment",
            ClauseType::GoverningLaw => "governing_law",
            ClauseType::Other => "other",
        }
    }

    /// Human-readable label used in oracle prompts
    pub fn label(&self) -> &'static str {
        match self {
            ClauseType::Termination => "termination",
            ClauseType::Jurisdiction => "jurisdiction",
            ClauseType::PaymentTerms => "payment terms",
            ClauseType::Confidentiality => "confidentiality",
            ClauseType::IntellectualProperty => "intellectual property",
            ClauseType::Liability => "liability",
            ClauseType::Indemnification => "indemnification",
            ClauseType::ForceMajeure => "force majeure",
            ClauseType::Assignment => "assignment",
            ClauseType::GoverningLaw => "governing law",
            ClauseType::Other => "other",
        }
    }
}

impl fmt::Display for ClauseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which extraction stage produced a candidate span
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanSource {
    PatternMatcher,
    SemanticEnhancer,
}

/// A candidate clause span, prior to resolution.
///
/// Offsets are byte offsets into the full document text handed to the
/// pipeline; `end_offset` is exclusive.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RawSpan {
    pub clause_type: ClauseType,
    pub source_text: String,
    pub page_number: Option<u32>,
    pub start_offset: usize,
    pub end_offset: usize,
    pub confidence: f32,
    pub source: SpanSource,
}

/// Provenance attached to every resolved clause
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConfidenceMetadata {
    pub confidence: f32,
    pub source: SpanSource,
    /// True when the oracle could not be reached and the unrefined span text was kept
    pub degraded: bool,
}

/// One authoritative clause per type per document. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResolvedClause {
    pub clause_id: String,
    pub clause_type: ClauseType,
    pub text: String,
    pub page_number: Option<u32>,
    pub start_offset: usize, // Byte offset in the document text
    pub end_offset: usize,   // Exclusive end of the source span
    pub confidence: ConfidenceMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().trim_matches(|c| c == '[' || c == ']').to_lowercase().as_str() {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClauseRiskAssessment {
    pub clause_id: String,
    pub clause_type: ClauseType,
    pub risk_level: RiskLevel,
    pub risk_score: f32, // 0.0 ..= 1.0
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub reasons: Vec<String>,
    pub policy_references: Vec<String>, // Policy ids
}

/// A policy passage returned by the policy reference collaborator
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PolicySnippet {
    pub policy_id: String,
    pub policy_name: String,
    pub section: Option<String>,
    pub text: String,
    pub relevance_score: f32, // 0.0 ..= 1.0
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PolicyCheckResult {
    pub policy_violations: Vec<String>,
    pub compliance_score: f32,
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AmendmentSuggestion {
    pub clause_id: String,
    pub clause_type: ClauseType,
    pub original_text: String,
    pub suggested_text: String,
    pub reason: String,
    pub priority: u8, // 1 ..= 5, 5 is most urgent
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DocumentMetadata {
    pub document_id: String,
    pub title: String,
    pub filename: Option<String>,
    pub page_count: u32,
    pub created_at: u64,
}

/// Complete analysis of one contract
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ContractAnalysis {
    pub contract_id: String,
    pub metadata: DocumentMetadata,
    pub clauses: Vec<ResolvedClause>,
    pub risk_assessments: Vec<ClauseRiskAssessment>,
    pub policy_check: PolicyCheckResult,
    pub amendment_suggestions: Vec<AmendmentSuggestion>,
    pub overall_risk_score: f32,
    pub overall_risk_level: RiskLevel,
    pub analyzed_at: u64,
}
