//! Cleanup of the generated IEEE reference list.
//!
//! Models tend to open with "Here are 15 references…" and to put several
//! entries on one line. The cleaned list starts exactly at `[1]` and holds
//! one entry per line.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static RE_ENTRY_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*(\[\d+\])").unwrap());
static RE_ENTRY_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[\d+\]").unwrap());
static RE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[#*\s]*references?[*:\s]*$").unwrap());

/// Clean a raw references blob.
///
/// 1. Drop everything before the first `[1]` (kept as-is if there is none)
/// 2. Normalise line endings and collapse 3+ newlines
/// 3. Strip leading whitespace on every line and drop blank lines
/// 4. Drop a leading "REFERENCES" heading; the renderer adds its own
/// 5. Start every `[n]` marker on its own line
pub fn clean_references(raw: &str) -> String {
    let text = match raw.find("[1]") {
        Some(start) => &raw[start..],
        None => raw,
    };
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = RE_EXCESS_NEWLINES.replace_all(&text, "\n\n");

    let text = text
        .lines()
        .map(str::trim_start)
        .filter(|l| !l.is_empty())
        .skip_while(|l| RE_HEADING.is_match(l))
        .collect::<Vec<_>>()
        .join("\n");

    RE_ENTRY_MARKER
        .replace_all(text.trim(), "\n${1}")
        .trim()
        .to_string()
}

/// Split a cleaned list into entries, each starting with its `[n]` marker.
///
/// Lines that do not start with a marker continue the previous entry.
pub fn split_entries(cleaned: &str) -> Vec<String> {
    let mut entries: Vec<String> = Vec::new();
    for line in cleaned.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match entries.last_mut() {
            Some(current) if !RE_ENTRY_START.is_match(line) => {
                current.push(' ');
                current.push_str(line);
            }
            _ => entries.push(line.to_string()),
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_prose_is_dropped() {
        let raw = "Here are some references for your report:\n\n[1] A. Author, \"One,\" 2020. [2] B. Author, \"Two,\" 2021.";
        let cleaned = clean_references(raw);
        assert!(cleaned.starts_with("[1]"), "got: {cleaned}");
        let lines: Vec<&str> = cleaned.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("[2]"));
    }

    #[test]
    fn every_marker_starts_a_line() {
        let raw = "[1] first\n\n\n\n   [2] second [3] third\r\n[4] fourth";
        let cleaned = clean_references(raw);
        assert_eq!(cleaned, "[1] first\n[2] second\n[3] third\n[4] fourth");
    }

    #[test]
    fn text_without_markers_is_kept() {
        assert_eq!(clean_references("  no references here  "), "no references here");
    }

    #[test]
    fn heading_without_markers_is_dropped() {
        let cleaned = clean_references("REFERENCES\nA. Author, \"Soil sensing,\" 2020.\nB. Author, 2021.");
        assert_eq!(cleaned, "A. Author, \"Soil sensing,\" 2020.\nB. Author, 2021.");

        let cleaned = clean_references("**References:**\n\nA. Author, 2020.");
        assert_eq!(cleaned, "A. Author, 2020.");
    }

    #[test]
    fn heading_word_inside_an_entry_is_kept() {
        let cleaned = clean_references("A. Author, \"References in practice,\" 2019.");
        assert_eq!(cleaned, "A. Author, \"References in practice,\" 2019.");
    }

    #[test]
    fn split_joins_continuation_lines() {
        let entries = split_entries("[1] A. Author, \"Title,\"\nJournal, 2020.\n[2] B. Author");
        assert_eq!(
            entries,
            vec![
                "[1] A. Author, \"Title,\" Journal, 2020.".to_string(),
                "[2] B. Author".to_string()
            ]
        );
    }

    #[test]
    fn split_empty_is_empty() {
        assert!(split_entries("").is_empty());
    }
}
