//! Contract Corpus - the collaborators around the clause pipeline
//!
//! This crate provides:
//! - `DocumentSource` for full text and metadata by document id
//! - Ingestion of `.txt`, `.md` and `.pdf` files into page-delimited text
//! - `PolicyReference` backed by a Tantivy keyword index of policy sections
//! - Configuration management

pub mod config;
pub mod document;
pub mod error;
pub mod ingest;
pub mod policy;
pub mod search;

// Re-export commonly used types
pub use config::CorpusConfig;
pub use document::{DocumentSource, InMemoryDocumentSource};
pub use error::CorpusError;
pub use ingest::{load_document, LoadedDocument};
pub use policy::{PolicyIndex, PolicyReference};
