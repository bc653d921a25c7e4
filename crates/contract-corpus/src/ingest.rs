//! Document ingestion: files to page-delimited text
//!
//! PDF pages are joined with `--- Page N ---` markers, the same delimiter the
//! clause engine splits on. Plain text and Markdown are taken verbatim.

use std::path::Path;

use lazy_static::lazy_static;
use pdf_extract::extract_text_from_mem;
use regex::Regex;

use crate::error::CorpusError;

const PAGE_BREAK: char = '\x0C';

lazy_static! {
    static ref PAGE_MARKER: Regex = Regex::new(r"---\s*Page\s+\d+\s*---").unwrap();
}

/// Text and basic metadata of one ingested file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    pub title: String,
    pub filename: String,
    pub text: String,
    pub page_count: u32,
}

/// Read a contract or policy file from disk
pub fn load_document(path: &Path) -> Result<LoadedDocument, CorpusError> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let title = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.clone());
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let text = match extension.as_str() {
        "txt" | "md" => std::fs::read_to_string(path)?,
        "pdf" => {
            let bytes = std::fs::read(path)?;
            pdf_to_text(&bytes)?
        }
        other => {
            return Err(CorpusError::UnsupportedFormat(if other.is_empty() {
                filename.clone()
            } else {
                format!(".{}", other)
            }))
        }
    };

    let page_count = count_pages(&text);
    tracing::info!(
        file = %filename,
        pages = page_count,
        bytes = text.len(),
        "Loaded document"
    );

    Ok(LoadedDocument {
        title,
        filename,
        text,
        page_count,
    })
}

/// Extract PDF text and mark page boundaries
pub fn pdf_to_text(pdf_bytes: &[u8]) -> Result<String, CorpusError> {
    let raw = extract_text_from_mem(pdf_bytes).map_err(|e| CorpusError::Extraction(e.to_string()))?;

    let mut pages: Vec<&str> = raw.split(PAGE_BREAK).collect();
    // pdf-extract ends the last page with a form feed too
    if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }

    Ok(paginate(&pages))
}

/// Join page texts with `--- Page N ---` markers, numbering from 1
pub fn paginate(pages: &[&str]) -> String {
    pages
        .iter()
        .enumerate()
        .map(|(i, text)| format!("\n\n--- Page {} ---\n\n{}", i + 1, text))
        .collect()
}

/// Number of page markers in `text`, at least 1
pub fn count_pages(text: &str) -> u32 {
    PAGE_MARKER.find_iter(text).count().max(1) as u32
}
