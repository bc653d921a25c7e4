use thiserror::Error;

/// Errors that reject a document before extraction starts.
///
/// Pattern, boundary and oracle problems never surface here: they reduce the
/// candidate set or fall back to unrefined text instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Document text is empty")]
    EmptyDocument,

    #[error("Document is {size} bytes, limit is {limit}")]
    DocumentTooLarge { size: usize, limit: usize },
}
