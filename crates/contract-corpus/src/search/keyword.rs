use anyhow::Result;
use std::path::Path;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::*;
use tantivy::{Index, IndexWriter, ReloadPolicy, TantivyDocument};

/// Writer heap budget per batch
const WRITER_HEAP_BYTES: usize = 50_000_000;

/// One indexed policy section
#[derive(Debug, Clone, PartialEq)]
pub struct SectionRecord {
    pub policy_id: String,
    pub policy_name: String,
    pub section: Option<String>,
    pub content: String,
}

/// A scored search hit
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordHit {
    pub record: SectionRecord,
    pub score: f32,
}

/// BM25 keyword index over policy sections
///
/// # Schema
///
/// - `policy_id`: owning policy (STRING | STORED)
/// - `policy_name`: policy title, searched alongside the body (TEXT | STORED)
/// - `section`: section heading, empty when the text precedes any heading (STRING | STORED)
/// - `content`: section body (TEXT | STORED)
pub struct KeywordIndex {
    index: Index,
    policy_id_field: Field,
    policy_name_field: Field,
    section_field: Field,
    content_field: Field,
}

impl KeywordIndex {
    fn schema() -> Schema {
        let mut schema_builder = Schema::builder();
        schema_builder.add_text_field("policy_id", STRING | STORED);
        schema_builder.add_text_field("policy_name", TEXT | STORED);
        schema_builder.add_text_field("section", STRING | STORED);
        schema_builder.add_text_field("content", TEXT | STORED);
        schema_builder.build()
    }

    fn from_index(index: Index) -> Result<Self> {
        let schema = index.schema();
        Ok(Self {
            policy_id_field: schema.get_field("policy_id")?,
            policy_name_field: schema.get_field("policy_name")?,
            section_field: schema.get_field("section")?,
            content_field: schema.get_field("content")?,
            index,
        })
    }

    /// Open the index at `index_path`, creating it (and the directory) if missing
    pub fn open_or_create(index_path: &Path) -> Result<Self> {
        let meta_exists = index_path.join("meta.json").exists();

        let index = if meta_exists {
            Index::open_in_dir(index_path)?
        } else {
            std::fs::create_dir_all(index_path)?;
            Index::create_in_dir(index_path, Self::schema())?
        };

        Self::from_index(index)
    }

    /// Create an in-memory index. Contents are lost when dropped.
    pub fn in_memory() -> Result<Self> {
        Self::from_index(Index::create_in_ram(Self::schema()))
    }

    /// Add sections in one batch and commit
    pub fn add_sections(&self, records: &[SectionRecord]) -> Result<()> {
        let mut index_writer: IndexWriter = self.index.writer(WRITER_HEAP_BYTES)?;

        for record in records {
            let mut doc = TantivyDocument::new();
            doc.add_text(self.policy_id_field, &record.policy_id);
            doc.add_text(self.policy_name_field, &record.policy_name);
            doc.add_text(self.section_field, record.section.as_deref().unwrap_or(""));
            doc.add_text(self.content_field, &record.content);
            index_writer.add_document(doc)?;
        }

        index_writer.commit()?;
        Ok(())
    }

    /// Number of indexed sections
    pub fn num_sections(&self) -> Result<u64> {
        let reader = self.index.reader()?;
        Ok(reader.searcher().num_docs())
    }

    /// BM25 search over policy name and content.
    ///
    /// The query is parsed leniently: raw clause text with quotes, colons or
    /// parentheses is searched as plain terms instead of failing.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<KeywordHit>> {
        let terms = sanitize(query);
        if limit == 0 || terms.is_empty() {
            return Ok(Vec::new());
        }

        let reader = self
            .index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()?;

        let searcher = reader.searcher();
        let query_parser =
            QueryParser::for_index(&self.index, vec![self.content_field, self.policy_name_field]);

        let (query, errors) = query_parser.parse_query_lenient(&terms);
        if !errors.is_empty() {
            tracing::debug!(errors = errors.len(), "Lenient query parse dropped terms");
        }

        let top_docs = searcher.search(&query, &TopDocs::with_limit(limit))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in top_docs {
            let doc: TantivyDocument = searcher.doc(doc_address)?;
            let section = self.text_of(&doc, self.section_field);
            hits.push(KeywordHit {
                record: SectionRecord {
                    policy_id: self.text_of(&doc, self.policy_id_field),
                    policy_name: self.text_of(&doc, self.policy_name_field),
                    section: (!section.is_empty()).then_some(section),
                    content: self.text_of(&doc, self.content_field),
                },
                score,
            });
        }

        Ok(hits)
    }

    fn text_of(&self, doc: &TantivyDocument, field: Field) -> String {
        doc.get_first(field)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    }
}

/// Reduce free text to plain search terms
fn sanitize(query: &str) -> String {
    query
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .filter(|term| !matches!(*term, "AND" | "OR" | "NOT"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str, section: Option<&str>, content: &str) -> SectionRecord {
        SectionRecord {
            policy_id: id.to_string(),
            policy_name: name.to_string(),
            section: section.map(str::to_string),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_in_memory_index() {
        let index = KeywordIndex::in_memory().expect("Failed to create in-memory index");
        index
            .add_sections(&[record(
                "p1",
                "Vendor Policy",
                Some("Payment"),
                "Invoices are payable within 45 days",
            )])
            .expect("Failed to add sections");

        let hits = index.search("invoices payable", 10).expect("Search failed");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.policy_id, "p1");
        assert_eq!(hits[0].record.section.as_deref(), Some("Payment"));
        assert_eq!(index.num_sections().unwrap(), 1);
    }

    #[test]
    fn test_raw_clause_text_is_a_valid_query() {
        let index = KeywordIndex::in_memory().expect("Failed to create index");
        index
            .add_sections(&[record("p1", "Termination Policy", None, "termination requires notice")])
            .expect("Failed to add sections");

        let hits = index
            .search("Termination Clause: (a) \"either\" party AND NOT -notice:", 10)
            .expect("Lenient search should not fail");
        assert!(!hits.is_empty());
        assert_eq!(hits[0].record.section, None);
    }

    #[test]
    fn test_relevance_scoring() {
        let index = KeywordIndex::in_memory().expect("Failed to create index");
        index
            .add_sections(&[
                record("p1", "A", None, "liability liability liability cap"),
                record("p2", "B", None, "liability cap"),
                record("p3", "C", None, "payment schedule"),
            ])
            .expect("Failed to add sections");

        let hits = index.search("liability", 10).expect("Search failed");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].record.policy_id, "p1");
        assert!(hits[0].score > hits[1].score, "Scores should be descending");
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let index = KeywordIndex::in_memory().expect("Failed to create index");
        index
            .add_sections(&[record("p1", "A", None, "content")])
            .expect("Failed to add sections");
        assert!(index.search("  ::  ", 10).unwrap().is_empty());
        assert!(index.search("content", 0).unwrap().is_empty());
    }

    #[test]
    fn test_reopen_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        {
            let index = KeywordIndex::open_or_create(dir.path()).unwrap();
            index
                .add_sections(&[record("p1", "Data Policy", None, "encryption at rest")])
                .unwrap();
        }
        let reopened = KeywordIndex::open_or_create(dir.path()).unwrap();
        let hits = reopened.search("encryption", 5).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("Fees: (net-30) AND \"late\""), "Fees net 30 late");
    }
}
