//! Output types returned by report generation.

use crate::document::Document;
use crate::plan::{ReportPlan, SectionKey};
use serde::{Deserialize, Serialize};

/// A finished report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutput {
    /// The assembled document, front matter included.
    pub document: Document,

    /// The word plan that drove generation.
    pub plan: ReportPlan,

    /// One entry per generated section, in key order.
    pub sections: Vec<SectionResult>,

    pub stats: ReportStats,
}

/// Result of generating one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionResult {
    pub key: SectionKey,
    pub title: String,
    pub target_words: u32,
    /// Words in the normalised text.
    pub words: usize,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
    pub retries: u8,
}

/// Aggregate statistics for a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportStats {
    pub chapters: usize,
    pub sections: usize,
    pub reference_entries: usize,
    pub paragraphs: usize,
    pub page_breaks: usize,
    pub target_words: u32,
    /// Words actually generated across all sections.
    pub generated_words: usize,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    /// Wall-clock time including throttle pauses.
    pub total_duration_ms: u64,
    /// Time spent inside generator calls.
    pub llm_duration_ms: u64,
}

impl ReportOutput {
    /// Serialise the document to a `.docx` file.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), crate::ReportError> {
        self.document.save(path)
    }
}
