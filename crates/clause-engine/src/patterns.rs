//! Regex patterns and keyword tables for clause detection
//!
//! Every table here is ordered and loaded once. Adding a clause type means
//! adding one row to `CLAUSE_PATTERNS` and, optionally, one to
//! `CLASSIFICATION_KEYWORDS`.

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::ClauseType;

lazy_static! {
    /// Signal phrase followed by a qualifier, one row per clause type.
    /// `Other` has no pattern.
    pub static ref CLAUSE_PATTERNS: Vec<(ClauseType, Regex)> = vec![
        (
            ClauseType::Termination,
            Regex::new(r"(?i)\b(termination|cancellation|expiration)(\s+clause|\s+of\s+agreement|\s+and\s+suspension|\s+rights|\s+by|\s+for|\s+notice|\s+period|:)").unwrap(),
        ),
        (
            ClauseType::Jurisdiction,
            Regex::new(r"(?i)\b(jurisdiction|venue|forum|governing\s+law|choice\s+of\s+law|applicable\s+law)(\s+clause|\s+and|\s+selection|\s+provision|:)").unwrap(),
        ),
        (
            ClauseType::PaymentTerms,
            Regex::new(r"(?i)\b(payment\s+terms|fees|compensation|pricing|invoice|billing)(\s+clause|\s+and|\s+schedule|\s+provision|:)").unwrap(),
        ),
        (
            ClauseType::Confidentiality,
            Regex::new(r"(?i)\b(confidentiality|non[-\s]?disclosure|proprietary\s+information)(\s+clause|\s+and|\s+obligations|\s+provision|:)").unwrap(),
        ),
        (
            ClauseType::IntellectualProperty,
            Regex::new(r"(?i)\b(intellectual\s+property|ip|patent|copyright|trademark)(\s+clause|\s+rights|\s+ownership|\s+provision|:)").unwrap(),
        ),
        (
            ClauseType::Liability,
            Regex::new(r"(?i)\b(liability|limitation\s+of\s+liability|disclaimer|warranties)(\s+clause|\s+and|\s+limitation|\s+provision|:)").unwrap(),
        ),
        (
            ClauseType::Indemnification,
            Regex::new(r"(?i)\b(indemnification|indemnity|hold\s+harmless)(\s+clause|\s+and|\s+obligations|\s+provision|:)").unwrap(),
        ),
        (
            ClauseType::ForceMajeure,
            Regex::new(r"(?i)\b(force\s+majeure|act\s+of\s+god|unforeseen\s+event)(\s+clause|\s+and|\s+provision|:)").unwrap(),
        ),
        (
            ClauseType::Assignment,
            Regex::new(r"(?i)\b(assignment|transfer|delegation|successors)(\s+clause|\s+and|\s+of\s+rights|\s+provision|:)").unwrap(),
        ),
        (
            ClauseType::GoverningLaw,
            Regex::new(r"(?i)\b(governing\s+law|applicable\s+law|choice\s+of\s+law)(\s+clause|\s+and|\s+provision|:)").unwrap(),
        ),
    ];

    /// Page delimiter inserted by document ingestion, e.g. `--- Page 3 ---`
    pub static ref PAGE_MARKER: Regex = Regex::new(r"---\s*Page\s+(\d+)\s*---").unwrap();

    /// Start of the next section: a numbered marker (`12.`), an all-caps line
    /// (`GOVERNING LAW`, optionally with a colon), an all-caps lead-in ending
    /// in a colon, or a two-word Title Case heading with a colon (`Payment Terms:`).
    /// Every alternative is anchored on the preceding line break.
    pub static ref SECTION_HEADING: Regex = Regex::new(
        r"(?m)\n[ \t]*(?:\d+\.|[A-Z][A-Z&'\- \t]*[A-Z]:?[ \t\r]*$|[A-Z][A-Z \t]+:|[A-Z][a-z]+[ \t]+[A-Z][a-z]+:)"
    )
    .unwrap();
}

/// Vocabulary a sentence must touch before it is worth classifying
pub const LEGAL_TERMS: &[&str] = &[
    "agree",
    "shall",
    "party",
    "obligation",
    "right",
    "term",
    "condition",
    "law",
];

/// Keyword sets per clause type. Order is priority: the first set with a hit wins,
/// so "termination" outranks "governing law" for a sentence mentioning both.
pub const CLASSIFICATION_KEYWORDS: &[(ClauseType, &[&str])] = &[
    (
        ClauseType::Termination,
        &["terminat", "cancel", "end of agreement"],
    ),
    (
        ClauseType::Jurisdiction,
        &["jurisdict", "venue", "forum", "court"],
    ),
    (
        ClauseType::PaymentTerms,
        &["payment", "fee", "compensat", "invoice"],
    ),
    (
        ClauseType::Confidentiality,
        &["confidential", "disclos", "secret"],
    ),
    (
        ClauseType::IntellectualProperty,
        &["intellectual", "patent", "copyright", "trademark"],
    ),
    (ClauseType::Liability, &["liab", "warrant", "disclaimer"]),
    (ClauseType::Indemnification, &["indemnif", "hold harmless"]),
    (
        ClauseType::ForceMajeure,
        &["force majeure", "act of god", "unforeseen"],
    ),
    (ClauseType::Assignment, &["assign", "transfer", "delegat"]),
    (
        ClauseType::GoverningLaw,
        &["govern", "applicable law", "choice of law"],
    ),
];

/// Signal regex for a clause type, if the table has one
pub fn pattern_for(clause_type: ClauseType) -> Option<&'static Regex> {
    CLAUSE_PATTERNS
        .iter()
        .find(|(ty, _)| *ty == clause_type)
        .map(|(_, re)| re)
}

/// True if the lowercased text touches the legal vocabulary
pub fn has_legal_term(text_lower: &str) -> bool {
    LEGAL_TERMS.iter().any(|term| text_lower.contains(term))
}

/// Classify lowercased text by the first keyword set it hits
pub fn classify(text_lower: &str) -> Option<ClauseType> {
    CLASSIFICATION_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| text_lower.contains(kw)))
        .map(|(ty, _)| *ty)
}

/// Byte offset of the `n`th character of `text`, or `text.len()` if shorter
pub fn byte_offset_of_char(text: &str, n: usize) -> usize {
    text.char_indices()
        .nth(n)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}
