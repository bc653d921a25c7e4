//! Document source collaborator
//!
//! The extraction pipeline owns no storage. It asks a `DocumentSource` for the
//! full text and metadata of a document id and works on its own copy.

use std::collections::HashMap;
use std::sync::RwLock;

use shared_types::DocumentMetadata;

use crate::error::CorpusError;
use crate::ingest::{count_pages, LoadedDocument};

/// Read-only access to stored documents. Calls are synchronous and idempotent.
pub trait DocumentSource: Send + Sync {
    fn full_text(&self, document_id: &str) -> Result<String, CorpusError>;

    fn metadata(&self, document_id: &str) -> Result<DocumentMetadata, CorpusError>;
}

#[derive(Debug, Clone)]
struct StoredDocument {
    metadata: DocumentMetadata,
    text: String,
}

/// Process-local document store
#[derive(Debug, Default)]
pub struct InMemoryDocumentSource {
    documents: RwLock<HashMap<String, StoredDocument>>,
}

impl InMemoryDocumentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store text under a fresh id and return the id
    pub fn add_text(&self, title: &str, text: impl Into<String>) -> String {
        let text = text.into();
        let metadata = DocumentMetadata {
            document_id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            filename: None,
            page_count: count_pages(&text),
            created_at: chrono::Utc::now().timestamp() as u64,
        };
        let id = metadata.document_id.clone();
        self.insert(metadata, text);
        id
    }

    /// Store an ingested file under a fresh id and return the id
    pub fn add_loaded(&self, loaded: LoadedDocument) -> String {
        let metadata = DocumentMetadata {
            document_id: uuid::Uuid::new_v4().to_string(),
            title: loaded.title,
            filename: Some(loaded.filename),
            page_count: loaded.page_count,
            created_at: chrono::Utc::now().timestamp() as u64,
        };
        let id = metadata.document_id.clone();
        self.insert(metadata, loaded.text);
        id
    }

    /// Store a document under the id carried in its metadata, replacing any previous one
    pub fn insert(&self, metadata: DocumentMetadata, text: String) {
        let mut documents = match self.documents.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        tracing::debug!(document_id = %metadata.document_id, bytes = text.len(), "Stored document");
        documents.insert(metadata.document_id.clone(), StoredDocument { metadata, text });
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, StoredDocument>> {
        match self.documents.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn get(&self, document_id: &str) -> Result<StoredDocument, CorpusError> {
        self.read()
            .get(document_id)
            .cloned()
            .ok_or_else(|| CorpusError::DocumentNotFound(document_id.to_string()))
    }
}

impl DocumentSource for InMemoryDocumentSource {
    fn full_text(&self, document_id: &str) -> Result<String, CorpusError> {
        Ok(self.get(document_id)?.text)
    }

    fn metadata(&self, document_id: &str) -> Result<DocumentMetadata, CorpusError> {
        Ok(self.get(document_id)?.metadata)
    }
}
