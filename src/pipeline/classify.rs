//! Line classification: decide what a normalised line of section text is.
//!
//! Classification is an ordered rule table ([`LINE_RULES`]); the first rule
//! whose predicate matches decides the [`LineKind`], and lines no rule claims
//! are body text. Malformed input never errors.
//!
//! [`LineKind::ChapterTitle`] and [`LineKind::ReferenceEntry`] are never
//! produced here: the assembler assigns them from the block a line sits in.

use crate::pipeline::normalize::BULLET;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// What a single line of the report renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineKind {
    ChapterTitle,
    /// `1.1 Overview`
    NumberedHeading,
    /// A short capitalised line such as `System Architecture`.
    Subheading,
    /// A line starting with the bullet glyph.
    BulletItem,
    BodyText,
    /// One `[n] …` entry of the references list.
    ReferenceEntry,
}

/// One classification rule.
pub struct LineRule {
    pub kind: LineKind,
    pub matches: fn(&str) -> bool,
}

/// Classification rules in priority order.
pub static LINE_RULES: &[LineRule] = &[
    LineRule {
        kind: LineKind::NumberedHeading,
        matches: is_numbered_heading,
    },
    LineRule {
        kind: LineKind::Subheading,
        matches: is_subheading,
    },
    LineRule {
        kind: LineKind::BulletItem,
        matches: is_bullet,
    },
];

static RE_NUMBERED_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+\s+").unwrap());
static RE_SUBHEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z\s]+(and|&)?[A-Za-z\s]+").unwrap());

/// Longest line (in words) the subheading pattern may claim.
const SUBHEADING_MAX_WORDS: usize = 6;
/// Longest capitalised line claimed as a subheading without the pattern.
const SHORT_LINE_MAX_WORDS: usize = 4;

/// Classify one line of section text.
pub fn classify_line(line: &str) -> LineKind {
    LINE_RULES
        .iter()
        .find(|rule| (rule.matches)(line))
        .map_or(LineKind::BodyText, |rule| rule.kind)
}

fn is_numbered_heading(line: &str) -> bool {
    RE_NUMBERED_HEADING.is_match(line)
}

fn is_subheading(line: &str) -> bool {
    let words = line.split_whitespace().count();
    if RE_SUBHEADING.is_match(line) && words <= SUBHEADING_MAX_WORDS {
        return true;
    }
    words <= SHORT_LINE_MAX_WORDS && line.chars().next().is_some_and(char::is_uppercase)
}

fn is_bullet(line: &str) -> bool {
    line.starts_with(BULLET)
}
