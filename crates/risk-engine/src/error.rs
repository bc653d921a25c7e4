use clause_engine::ExtractionError;
use contract_corpus::CorpusError;
use thiserror::Error;

/// Errors that stop a contract analysis.
///
/// Oracle failures are not among them: each stage turns those into a
/// conservative result instead.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Document unavailable: {0}")]
    Corpus(#[from] CorpusError),

    #[error("Clause extraction rejected the document: {0}")]
    Extraction(#[from] ExtractionError),
}
