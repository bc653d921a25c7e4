//! Keyword search over policy sections (Tantivy, BM25)

pub mod keyword;

pub use keyword::{KeywordHit, KeywordIndex, SectionRecord};
