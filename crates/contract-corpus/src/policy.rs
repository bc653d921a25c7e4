//! Policy reference collaborator
//!
//! Policies are company documents (playbooks, standard terms) that clauses
//! are checked against. Each policy file is split into sections and indexed
//! for keyword retrieval; `find_relevant` returns the best sections for a
//! piece of clause text.

use std::path::Path;

use shared_types::PolicySnippet;

use crate::config::CorpusConfig;
use crate::error::CorpusError;
use crate::ingest::load_document;
use crate::search::{KeywordIndex, SectionRecord};

/// Headings longer than this are treated as body text
const MAX_HEADING_CHARS: usize = 80;

pub trait PolicyReference: Send + Sync {
    /// Up to `top_k` policy snippets, most relevant first
    fn find_relevant(&self, clause_text: &str, top_k: usize)
        -> Result<Vec<PolicySnippet>, CorpusError>;
}

/// Keyword-searchable store of policy sections
pub struct PolicyIndex {
    index: KeywordIndex,
}

impl PolicyIndex {
    pub fn in_memory() -> Result<Self, CorpusError> {
        Ok(Self {
            index: KeywordIndex::in_memory()?,
        })
    }

    pub fn open_or_create(path: &Path) -> Result<Self, CorpusError> {
        Ok(Self {
            index: KeywordIndex::open_or_create(path)?,
        })
    }

    /// Build the index described by `config`, loading `policy_dir` when set
    pub fn from_config(config: &CorpusConfig) -> Result<Self, CorpusError> {
        let index = match &config.index_path {
            Some(path) => Self::open_or_create(path)?,
            None => Self::in_memory()?,
        };
        if let Some(dir) = &config.policy_dir {
            index.load_dir(dir)?;
        }
        Ok(index)
    }

    /// Index one policy, split into sections. Returns the number of sections added.
    pub fn add_policy(
        &self,
        policy_id: &str,
        policy_name: &str,
        text: &str,
    ) -> Result<usize, CorpusError> {
        let records: Vec<SectionRecord> = split_sections(text)
            .into_iter()
            .map(|(section, content)| SectionRecord {
                policy_id: policy_id.to_string(),
                policy_name: policy_name.to_string(),
                section,
                content,
            })
            .collect();

        self.index.add_sections(&records)?;
        tracing::debug!(policy_id, sections = records.len(), "Indexed policy");
        Ok(records.len())
    }

    /// Index every `.txt` / `.md` file in `dir`, one policy per file.
    /// Returns the number of policies added.
    pub fn load_dir(&self, dir: &Path) -> Result<usize, CorpusError> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .map(|ext| {
                            let ext = ext.to_string_lossy().to_lowercase();
                            ext == "txt" || ext == "md"
                        })
                        .unwrap_or(false)
            })
            .collect();
        paths.sort();

        for path in &paths {
            let doc = load_document(path)?;
            self.add_policy(&doc.filename, &doc.title, &doc.text)?;
        }

        tracing::info!(dir = %dir.display(), policies = paths.len(), "Loaded policy documents");
        Ok(paths.len())
    }

    pub fn num_sections(&self) -> Result<u64, CorpusError> {
        Ok(self.index.num_sections()?)
    }

    pub fn is_empty(&self) -> Result<bool, CorpusError> {
        Ok(self.num_sections()? == 0)
    }
}

impl PolicyReference for PolicyIndex {
    fn find_relevant(
        &self,
        clause_text: &str,
        top_k: usize,
    ) -> Result<Vec<PolicySnippet>, CorpusError> {
        let hits = self.index.search(clause_text, top_k)?;
        let best = hits.first().map(|h| h.score).unwrap_or(0.0);

        Ok(hits
            .into_iter()
            .map(|hit| PolicySnippet {
                policy_id: hit.record.policy_id,
                policy_name: hit.record.policy_name,
                section: hit.record.section,
                text: hit.record.content,
                relevance_score: if best > 0.0 { hit.score / best } else { 0.0 },
            })
            .collect())
    }
}

/// Split a policy into `(heading, body)` sections on blank-line-separated headings.
///
/// A heading is a short single-line block: Markdown `#` headings, numbered
/// headings (`3. Payment`) and all-caps lines. Text before the first heading
/// has no section name.
pub fn split_sections(text: &str) -> Vec<(Option<String>, String)> {
    let mut sections = Vec::new();
    let mut heading: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    for block in text.split("\n\n").map(str::trim).filter(|b| !b.is_empty()) {
        match heading_of(block) {
            Some(next) => {
                flush(&mut sections, heading.take(), &mut body);
                heading = Some(next);
            }
            None => body.push(block),
        }
    }
    flush(&mut sections, heading, &mut body);

    sections
}

fn flush(sections: &mut Vec<(Option<String>, String)>, heading: Option<String>, body: &mut Vec<&str>) {
    if body.is_empty() && heading.is_none() {
        return;
    }
    let content = body.join("\n\n");
    body.clear();
    if content.is_empty() {
        // A heading with no body is still searchable by its name
        if let Some(h) = heading {
            sections.push((Some(h.clone()), h));
        }
        return;
    }
    sections.push((heading, content));
}

fn heading_of(block: &str) -> Option<String> {
    if block.contains('\n') || block.chars().count() > MAX_HEADING_CHARS {
        return None;
    }

    if let Some(stripped) = block.strip_prefix('#') {
        let name = stripped.trim_start_matches('#').trim();
        return (!name.is_empty()).then(|| name.to_string());
    }

    let numbered = block
        .split_once(". ")
        .map(|(num, rest)| num.chars().all(|c| c.is_ascii_digit()) && !num.is_empty() && !rest.ends_with('.'))
        .unwrap_or(false);
    let letters: Vec<char> = block.chars().filter(|c| c.is_alphabetic()).collect();
    let all_caps = letters.len() >= 3 && letters.iter().all(|c| c.is_uppercase());

    (numbered || all_caps).then(|| block.trim_end_matches(':').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const VENDOR_POLICY: &str = "\
# Vendor Contracting Policy

All vendor agreements are reviewed by legal.

## Payment

Invoices must be payable within 45 days. Late fees above 1% per month are not accepted.

## Liability

Vendor liability must not be capped below the annual contract value.

TERMINATION

We must be able to terminate for convenience on 30 days notice.
";

    #[test]
    fn test_split_sections() {
        let sections = split_sections(VENDOR_POLICY);
        let names: Vec<_> = sections.iter().map(|(h, _)| h.as_deref()).collect();
        assert_eq!(
            names,
            vec![
                Some("Vendor Contracting Policy"),
                Some("Payment"),
                Some("Liability"),
                Some("TERMINATION")
            ]
        );
        assert_eq!(sections[1].1, "Invoices must be payable within 45 days. Late fees above 1% per month are not accepted.");
    }

    #[test]
    fn test_text_before_heading_has_no_section() {
        let sections = split_sections("Preface paragraph.\n\n1. Scope\n\nApplies to all staff.");
        assert_eq!(sections[0], (None, "Preface paragraph.".to_string()));
        assert_eq!(
            sections[1],
            (Some("1. Scope".to_string()), "Applies to all staff.".to_string())
        );
    }

    #[test]
    fn test_find_relevant_normalizes_scores() {
        let index = PolicyIndex::in_memory().unwrap();
        index.add_policy("vendor.md", "Vendor Contracting Policy", VENDOR_POLICY).unwrap();

        let snippets = index
            .find_relevant("Vendor's total liability is capped at fees paid.", 3)
            .unwrap();
        assert!(!snippets.is_empty());
        assert!(snippets.len() <= 3);
        assert_eq!(snippets[0].relevance_score, 1.0);
        assert!(snippets
            .iter()
            .all(|s| s.relevance_score > 0.0 && s.relevance_score <= 1.0));
        assert!(snippets.iter().any(|s| s.section.as_deref() == Some("Liability")));
    }

    #[test]
    fn test_empty_index_finds_nothing() {
        let index = PolicyIndex::in_memory().unwrap();
        assert!(index.is_empty().unwrap());
        assert!(index.find_relevant("termination", 3).unwrap().is_empty());
    }

    #[test]
    fn test_load_dir_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("vendor.md"), VENDOR_POLICY).unwrap();
        std::fs::write(dir.path().join("privacy.txt"), "DATA HANDLING\n\nCustomer data stays in the EU.").unwrap();
        std::fs::write(dir.path().join("logo.png"), b"\x89PNG").unwrap();

        let index = PolicyIndex::in_memory().unwrap();
        assert_eq!(index.load_dir(dir.path()).unwrap(), 2);

        let snippets = index.find_relevant("customer data location", 1).unwrap();
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].policy_id, "privacy.txt");
        assert_eq!(snippets[0].policy_name, "privacy");
        assert_eq!(snippets[0].section.as_deref(), Some("DATA HANDLING"));
    }

    #[test]
    fn test_from_config_with_on_disk_index() {
        let policies = tempfile::tempdir().unwrap();
        let index_dir = tempfile::tempdir().unwrap();
        std::fs::write(policies.path().join("vendor.md"), VENDOR_POLICY).unwrap();

        let config = CorpusConfig::new()
            .with_policy_dir(policies.path())
            .with_index_path(index_dir.path().join("idx"));
        let index = PolicyIndex::from_config(&config).unwrap();
        assert!(!index.is_empty().unwrap());
    }
}
