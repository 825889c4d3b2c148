//! Markup normalisation: clean emphasis markers in generated section text.
//!
//! The generator is asked for `**1.1 Title**` headings, `**Subheading**`
//! lines and `• **Term:** text` bullets, and returns anything from zero to
//! four asterisks around each of them. Headings and subheadings are detected
//! structurally by the classifier, so their markers are dropped here; bullets
//! keep single-marker emphasis pairs; everything else loses its markers.
//!
//! ## Rule Order
//!
//! Rules are tried per line, first match wins:
//!
//! 1. Numbered heading → strip leading/trailing marker runs
//! 2. Short capitalised subheading → strip every marker
//! 3. Bullet → drop markers after the label colon, drop runs of 2+ markers
//! 4. Anything else → strip every marker
//!
//! Whitespace-only lines become empty; the result is trimmed as a whole.
//! Every rule only removes markers, which keeps the normaliser idempotent.

use once_cell::sync::Lazy;
use regex::Regex;

/// The bullet glyph the generator is asked to use.
pub const BULLET: char = '•';

static RE_NUMBERED_MARKED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\*+\d+\.\d+\s+").unwrap());
static RE_NUMBERED_BARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+\s+").unwrap());
static RE_SUBHEADING_MARKED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\*+[A-Z][A-Za-z\s]+(and|&)?[A-Za-z\s]+").unwrap());
static RE_MARKERS_AFTER_COLON: Lazy<Regex> = Lazy::new(|| Regex::new(r":(?:\s*\*+)+").unwrap());
static RE_MULTI_MARKERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*{2,}").unwrap());

/// Normalise one generated chunk.
pub fn normalize_markup(input: &str) -> String {
    let text = input.replace("\r\n", "\n").replace('\r', "\n");
    text.split('\n')
        .map(normalize_line)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Apply the first matching rule to a single line.
///
/// Trailing whitespace is dropped before and after the rules; otherwise a
/// marker hidden behind a trailing space would only be stripped on a second
/// pass.
fn normalize_line(line: &str) -> String {
    let line = line.trim_end();
    if line.is_empty() {
        return String::new();
    }

    let cleaned = if RE_NUMBERED_MARKED.is_match(line) || RE_NUMBERED_BARE.is_match(line) {
        line.trim_start_matches('*')
            .trim_end_matches(|c: char| c == '*' || c.is_whitespace())
            .to_string()
    } else if is_subheading_candidate(line) {
        line.replace('*', "")
    } else if line.trim_start().starts_with(BULLET) {
        let s = RE_MARKERS_AFTER_COLON.replace_all(line, ":");
        RE_MULTI_MARKERS.replace_all(&s, "").into_owned()
    } else {
        line.replace('*', "")
    };

    cleaned.trim_end().to_string()
}

fn is_subheading_candidate(line: &str) -> bool {
    if RE_SUBHEADING_MARKED.is_match(line) {
        return true;
    }
    let short = line.split_whitespace().count() <= 4;
    short
        && line
            .trim_start_matches('*')
            .chars()
            .next()
            .is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn numbered_heading_survives_any_marker_count() {
        for input in ["1.1 Overview", "**1.1 Overview**", "****1.1 Overview****"] {
            assert_eq!(normalize_markup(input), "1.1 Overview", "input {input:?}");
        }
    }

    #[test]
    fn numbered_heading_keeps_inner_emphasis() {
        assert_eq!(
            normalize_markup("**1.2 The *core* problem**"),
            "1.2 The *core* problem"
        );
    }

    #[test]
    fn marked_subheading_loses_all_markers() {
        assert_eq!(
            normalize_markup("**Design and Implementation**"),
            "Design and Implementation"
        );
        assert_eq!(normalize_markup("****System Architecture****"), "System Architecture");
    }

    #[test]
    fn short_capitalised_line_loses_markers() {
        assert_eq!(normalize_markup("Key *Design* Goals"), "Key Design Goals");
    }

    #[test]
    fn bullet_label_markers_collapse() {
        assert_eq!(
            normalize_markup("• **Database:** stores records"),
            "• Database: stores records"
        );
        assert_eq!(
            normalize_markup("• ****Network:**** routes packets"),
            "• Network: routes packets"
        );
    }

    #[test]
    fn bullet_keeps_single_marker_pairs() {
        assert_eq!(
            normalize_markup("• uses *soil moisture* sensors for feedback"),
            "• uses *soil moisture* sensors for feedback"
        );
    }

    #[test]
    fn plain_text_loses_all_markers() {
        assert_eq!(
            normalize_markup("the system uses **low power** radios and *mesh* networking today"),
            "the system uses low power radios and mesh networking today"
        );
    }

    #[test]
    fn blank_lines_pass_through_and_output_is_trimmed() {
        let input = "\n\n**1.1 Overview**\n   \nbody text goes here for the intro\n\n";
        assert_eq!(
            normalize_markup(input),
            "1.1 Overview\n\nbody text goes here for the intro"
        );
    }

    #[test]
    fn crlf_is_normalised() {
        assert_eq!(normalize_markup("**1.1 Overview**\r\nmore body text here ok"), "1.1 Overview\nmore body text here ok");
    }

    #[test]
    fn normalised_text_is_fixed_point() {
        let input = "**1.1 Overview**\n\n**System Architecture**\n• **Database:** stores records\n• *bold* note: ** *x*\nplain **text** with many words in it";
        let once = normalize_markup(input);
        assert_eq!(normalize_markup(&once), once);
    }

    proptest! {
        #[test]
        fn idempotent(input in r"[A-Za-z0-9 .:&*•\n]{0,80}") {
            let once = normalize_markup(&input);
            let twice = normalize_markup(&once);
            prop_assert_eq!(twice, once);
        }
    }
}
