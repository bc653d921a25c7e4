use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Policy index error: {0}")]
    Index(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<anyhow::Error> for CorpusError {
    fn from(err: anyhow::Error) -> Self {
        CorpusError::Index(format!("{:#}", err))
    }
}
