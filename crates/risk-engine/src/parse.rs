//! Parsing of sectioned oracle answers
//!
//! Answers look like
//!
//! ```text
//! Risk Level: high
//! Risk Score: 0.8
//! Risk Factors:
//! - Unlimited liability
//! ```
//!
//! A section starts at a line beginning with a known header (case-insensitive,
//! Markdown emphasis ignored) and runs until the next header. Blank lines
//! between sections are optional.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BULLET: Regex = Regex::new(r"^\s*(?:[-*\x{2022}]|\d+[.)])\s+").unwrap();
    static ref NUMBER: Regex = Regex::new(r"-?\d+(?:\.\d+)?(%?)").unwrap();
    static ref INTEGER: Regex = Regex::new(r"-?\d+").unwrap();
}

/// One header's content: text on the header line plus the lines under it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    pub inline: String,
    pub lines: Vec<String>,
}

impl Section {
    /// All content joined with newlines and trimmed
    pub fn text(&self) -> String {
        let mut parts = Vec::with_capacity(self.lines.len() + 1);
        if !self.inline.is_empty() {
            parts.push(self.inline.as_str());
        }
        parts.extend(self.lines.iter().map(String::as_str));
        parts.join("\n").trim().to_string()
    }

    /// Non-empty entries with list markers stripped
    pub fn items(&self) -> Vec<String> {
        std::iter::once(self.inline.as_str())
            .chain(self.lines.iter().map(String::as_str))
            .map(|line| BULLET.replace(line, "").trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }
}

/// Split `response` into sections keyed by lowercased header
pub fn parse_sections(response: &str, headers: &[&str]) -> HashMap<String, Section> {
    let mut sections: HashMap<String, Section> = HashMap::new();
    let mut current: Option<String> = None;

    for line in response.lines() {
        if let Some((header, inline)) = match_header(line, headers) {
            sections.insert(
                header.clone(),
                Section {
                    inline,
                    lines: Vec::new(),
                },
            );
            current = Some(header);
            continue;
        }

        if let Some(section) = current.as_ref().and_then(|h| sections.get_mut(h)) {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                section.lines.push(trimmed.to_string());
            }
        }
    }

    sections
}

fn match_header(line: &str, headers: &[&str]) -> Option<(String, String)> {
    let stripped = line.trim().trim_start_matches(['*', '#', '_']).trim_start();

    headers.iter().find_map(|header| {
        let prefix = stripped.get(..header.len())?;
        if !prefix.eq_ignore_ascii_case(header) {
            return None;
        }
        let rest = stripped[header.len()..].trim_start_matches(['*', '_']);
        let inline = rest.strip_prefix(':')?.trim_start_matches(['*', '_']).trim();
        Some((header.to_lowercase(), inline.to_string()))
    })
}

/// First number in `text` as a fraction in [0, 1]; `80%` reads as 0.8
pub fn parse_score(text: &str) -> Option<f32> {
    let caps = NUMBER.captures(text)?;
    let whole = caps.get(0)?.as_str();
    let percent = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
    let value: f32 = whole.trim_end_matches('%').parse().ok()?;
    let value = if percent { value / 100.0 } else { value };
    Some(value.clamp(0.0, 1.0))
}

/// First integer in `text`
pub fn parse_integer(text: &str) -> Option<i64> {
    INTEGER.find(text)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADERS: &[&str] = &["Risk Level", "Risk Score", "Risk Factors", "Recommendations"];

    #[test]
    fn test_single_newline_sections() {
        let response = "Risk Level: High\nRisk Score: 0.85\nRisk Factors:\n- Unlimited liability\n- No cap\nRecommendations:\n1. Add a cap";
        let sections = parse_sections(response, HEADERS);

        assert_eq!(sections["risk level"].inline, "High");
        assert_eq!(sections["risk score"].inline, "0.85");
        assert_eq!(
            sections["risk factors"].items(),
            vec!["Unlimited liability", "No cap"]
        );
        assert_eq!(sections["recommendations"].items(), vec!["Add a cap"]);
    }

    #[test]
    fn test_blank_lines_and_markdown() {
        let response = "Here is my analysis.\n\n**Risk Level:** medium\n\n**Risk Factors:**\n* Vague notice period\n\n";
        let sections = parse_sections(response, HEADERS);
        assert_eq!(sections["risk level"].inline, "medium");
        assert_eq!(sections["risk factors"].items(), vec!["Vague notice period"]);
        assert!(!sections.contains_key("risk score"));
    }

    #[test]
    fn test_section_text_keeps_lines() {
        let sections = parse_sections(
            "Suggested Text:\nThe vendor shall\nindemnify the client.\nReason: clearer",
            &["Suggested Text", "Reason"],
        );
        assert_eq!(
            sections["suggested text"].text(),
            "The vendor shall\nindemnify the client."
        );
        assert_eq!(sections["reason"].text(), "clearer");
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score("0.8"), Some(0.8));
        assert_eq!(parse_score("[0.25]"), Some(0.25));
        assert_eq!(parse_score("80%"), Some(0.8));
        assert_eq!(parse_score("7"), Some(1.0));
        assert_eq!(parse_score("-0.5"), Some(0.0));
        assert_eq!(parse_score("unknown"), None);
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("4 (high)"), Some(4));
        assert_eq!(parse_integer("[5]"), Some(5));
        assert_eq!(parse_integer("n/a"), None);
    }
}
