//! Configuration types for report generation.
//!
//! All generation behaviour is controlled through [`ReportConfig`], built via
//! its [`ReportConfigBuilder`]. The fixed report shape (chapter weights,
//! section proportions, titles), the typography and the front-matter text are
//! plain immutable structs ([`ReportLayout`], [`Typography`], [`FrontMatter`])
//! that are handed to the allocator, formatter and assembler explicitly.

use crate::error::ReportError;
use crate::plan::SectionKey;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for one report-generation run.
///
/// # Example
/// ```rust
/// use edgequake_report::ReportConfig;
///
/// let config = ReportConfig::builder()
///     .model("gpt-4.1-mini")
///     .section_delay_ms(0)
///     .chapter_delay_ms(0)
///     .build()
///     .unwrap();
/// assert_eq!(config.layout.chapters.len(), 5);
/// ```
#[derive(Clone)]
pub struct ReportConfig {
    /// Chapters, sections and their word-budget weights.
    pub layout: ReportLayout,

    /// Fonts, sizes and spacing used for every paragraph.
    pub typography: Typography,

    /// Text placed on the title page and certificate.
    pub front_matter: FrontMatter,

    /// Characters of previously generated text passed to each section call. Default: 500.
    pub context_window_chars: usize,

    /// Pause before every generator call, in milliseconds. Default: 2000.
    ///
    /// Upstream free-tier endpoints rate-limit aggressively; two seconds
    /// between calls keeps a 24-section report under typical per-minute caps.
    pub section_delay_ms: u64,

    /// Pause after every chapter, in milliseconds. Default: 5000.
    pub chapter_delay_ms: u64,

    /// LLM model identifier. If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.7.
    ///
    /// Report prose benefits from some variety; the value matches what the
    /// section prompts were tuned against.
    pub temperature: f32,

    /// Maximum tokens per section completion. Default: 2048.
    pub max_tokens: usize,

    /// Retries the LLM generator performs on a transient failure. Default: 3.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Custom system prompt for section calls. If None, uses the built-in one.
    pub system_prompt: Option<String>,

    /// Optional progress callback for real-time section events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            layout: ReportLayout::default(),
            typography: Typography::default(),
            front_matter: FrontMatter::default(),
            context_window_chars: 500,
            section_delay_ms: 2000,
            chapter_delay_ms: 5000,
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.7,
            max_tokens: 2048,
            max_retries: 3,
            retry_backoff_ms: 500,
            api_timeout_secs: 60,
            system_prompt: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ReportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportConfig")
            .field("layout", &self.layout)
            .field("typography", &self.typography)
            .field("front_matter", &self.front_matter)
            .field("context_window_chars", &self.context_window_chars)
            .field("section_delay_ms", &self.section_delay_ms)
            .field("chapter_delay_ms", &self.chapter_delay_ms)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl ReportConfig {
    /// Create a new builder for `ReportConfig`.
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ReportConfig`].
#[derive(Debug)]
pub struct ReportConfigBuilder {
    config: ReportConfig,
}

impl ReportConfigBuilder {
    pub fn layout(mut self, layout: ReportLayout) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn typography(mut self, typography: Typography) -> Self {
        self.config.typography = typography;
        self
    }

    pub fn front_matter(mut self, front_matter: FrontMatter) -> Self {
        self.config.front_matter = front_matter;
        self
    }

    pub fn context_window_chars(mut self, n: usize) -> Self {
        self.config.context_window_chars = n;
        self
    }

    pub fn section_delay_ms(mut self, ms: u64) -> Self {
        self.config.section_delay_ms = ms;
        self
    }

    pub fn chapter_delay_ms(mut self, ms: u64) -> Self {
        self.config.chapter_delay_ms = ms;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    /// Retries per call, capped at 255 (the width reported in errors).
    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n.min(u32::from(u8::MAX));
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Attach a progress callback that receives per-section events.
    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating the layout.
    pub fn build(self) -> Result<ReportConfig, ReportError> {
        self.config.layout.validate()?;
        Ok(self.config)
    }
}

// ── Layout ───────────────────────────────────────────────────────────────

/// Fixed report shape: chapters, their sections and word-budget weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportLayout {
    /// Words one report page is expected to hold. Default: 300.
    pub words_per_page: u32,
    pub chapters: Vec<ChapterSpec>,
}

/// One chapter of the layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterSpec {
    pub number: u8,
    /// Heading text, e.g. `CHAPTER 1. INTRODUCTION`.
    pub title: String,
    /// Share of the whole report's words.
    pub weight: f64,
    pub sections: Vec<SectionSpec>,
}

/// One numbered section of a chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub number: u8,
    pub title: String,
    /// Share of the chapter's words.
    pub proportion: f64,
}

impl SectionSpec {
    fn new(number: u8, title: &str, proportion: f64) -> Self {
        Self {
            number,
            title: title.to_string(),
            proportion,
        }
    }
}

impl Default for ReportLayout {
    fn default() -> Self {
        let s = SectionSpec::new;
        Self {
            words_per_page: 300,
            chapters: vec![
                ChapterSpec {
                    number: 1,
                    title: "CHAPTER 1. INTRODUCTION".into(),
                    weight: 0.15,
                    sections: vec![
                        s(1, "Identification of Client/Need/ Relevant Contemporary issue", 0.25),
                        s(2, "Identification of Problem", 0.20),
                        s(3, "Identification of Tasks", 0.20),
                        s(4, "Timeline", 0.15),
                        s(5, "Organization of the Report", 0.20),
                    ],
                },
                ChapterSpec {
                    number: 2,
                    title: "CHAPTER 2. LITERATURE REVIEW/BACKGROUND STUDY".into(),
                    weight: 0.25,
                    sections: vec![
                        s(1, "Timeline of the reported problem", 0.15),
                        s(2, "Existing solutions", 0.25),
                        s(3, "Bibliometric analysis", 0.20),
                        s(4, "Review Summary", 0.15),
                        s(5, "Problem Definition", 0.15),
                        s(6, "Goals/Objectives", 0.10),
                    ],
                },
                ChapterSpec {
                    number: 3,
                    title: "CHAPTER 3. DESIGN FLOW/PROCESS".into(),
                    weight: 0.25,
                    sections: vec![
                        s(1, "Evaluation & Selection of Specifications/Features", 0.20),
                        s(2, "Design Constraints", 0.20),
                        s(3, "Analysis of Features and finalization subject to constraints", 0.20),
                        s(4, "Design Flow", 0.20),
                        s(5, "Design selection", 0.20),
                    ],
                },
                ChapterSpec {
                    number: 4,
                    title: "CHAPTER 4. RESULTS ANALYSIS AND VALIDATION".into(),
                    weight: 0.20,
                    sections: vec![
                        s(1, "Implementation of solution", 0.35),
                        s(2, "Results analysis", 0.35),
                        s(3, "Validation", 0.30),
                    ],
                },
                ChapterSpec {
                    number: 5,
                    title: "CHAPTER 5. CONCLUSION AND FUTURE WORK".into(),
                    weight: 0.15,
                    sections: vec![s(1, "Conclusion", 0.60), s(2, "Future work", 0.40)],
                },
            ],
        }
    }
}

impl ReportLayout {
    /// Check the invariants the allocator and assembler rely on.
    ///
    /// Chapter weights must sum to 1.0 and section keys must be strictly
    /// increasing in layout order. Section proportions are not checked.
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.chapters.is_empty() {
            return Err(ReportError::InvalidConfig("layout has no chapters".into()));
        }
        if self.words_per_page == 0 {
            return Err(ReportError::InvalidConfig(
                "words_per_page must be ≥ 1".into(),
            ));
        }

        let total: f64 = self.chapters.iter().map(|c| c.weight).sum();
        if (total - 1.0).abs() > 1e-6 {
            return Err(ReportError::InvalidConfig(format!(
                "chapter weights must sum to 1.0, got {total}"
            )));
        }

        let mut last: Option<SectionKey> = None;
        for chapter in &self.chapters {
            if chapter.sections.is_empty() {
                return Err(ReportError::InvalidConfig(format!(
                    "chapter {} has no sections",
                    chapter.number
                )));
            }
            for section in &chapter.sections {
                let key = SectionKey::new(chapter.number, section.number);
                if let Some(prev) = last {
                    if key <= prev {
                        return Err(ReportError::InvalidConfig(format!(
                            "section {key} does not follow {prev}"
                        )));
                    }
                }
                last = Some(key);
            }
        }
        Ok(())
    }
}

// ── Typography ───────────────────────────────────────────────────────────

/// Font and spacing rules, in points unless noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Typography {
    pub font_family: String,
    /// Chapter and references titles.
    pub chapter_title_size: f32,
    /// `1.1 Overview` style headings.
    pub numbered_heading_size: f32,
    pub subheading_size: f32,
    pub body_size: f32,
    pub heading_space_before: f32,
    pub heading_space_after: f32,
    /// Line-spacing multiple for body content and titles.
    pub line_spacing: f32,
    /// Left indent of bullet items.
    pub bullet_indent: f32,
    /// Hanging indent of reference entries.
    pub reference_indent: f32,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_family: "Times New Roman".into(),
            chapter_title_size: 16.0,
            numbered_heading_size: 14.0,
            subheading_size: 12.0,
            body_size: 12.0,
            heading_space_before: 12.0,
            heading_space_after: 6.0,
            line_spacing: 1.5,
            bullet_indent: 36.0,
            reference_indent: 36.0,
        }
    }
}

// ── Front matter ─────────────────────────────────────────────────────────

/// Title page, certificate and table-of-contents settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    pub candidate: String,
    pub degree: String,
    pub branch: String,
    pub institution: String,
    /// Logo shown on the title page and the certificate.
    pub logo_path: Option<PathBuf>,
    /// Display width of the logo.
    pub logo_width_pt: f32,
    /// Submission date line; `None` uses the current month ("Oct 2026").
    pub submission_date: Option<String>,
    /// Page the first chapter starts on, for the table of contents.
    pub first_chapter_page: u32,
    /// Leading entries of the table of contents (title, page).
    pub toc_lists: Vec<(String, u32)>,
    /// Entries listed after the chapters.
    pub toc_trailing: Vec<TrailingEntry>,
    /// Position of the right-aligned page-number tab stop.
    pub toc_tab_position: f32,
}

/// A table-of-contents entry after the last chapter (REFERENCES, APPENDIX, …).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailingEntry {
    pub title: String,
    pub subsections: Vec<String>,
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            candidate: "[NAME OF THE CANDIDATE(S)]".into(),
            degree: "[NAME OF THE DEGREE]".into(),
            branch: "[BRANCH OF STUDY]".into(),
            institution: "Chandigarh University".into(),
            logo_path: None,
            logo_width_pt: 200.0,
            submission_date: None,
            first_chapter_page: 11,
            toc_lists: vec![
                ("List of Figures".into(), 7),
                ("List of Tables".into(), 8),
                ("List of Standards".into(), 9),
            ],
            toc_trailing: vec![
                TrailingEntry {
                    title: "REFERENCES".into(),
                    subsections: vec![],
                },
                TrailingEntry {
                    title: "APPENDIX".into(),
                    subsections: vec![
                        "1. Plagiarism Report".into(),
                        "2. Design Checklist".into(),
                    ],
                },
                TrailingEntry {
                    title: "USER MANUAL".into(),
                    subsections: vec![],
                },
            ],
            toc_tab_position: 468.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_caps_retry_count() {
        let config = ReportConfig::builder().max_retries(10_000).build().unwrap();
        assert_eq!(config.max_retries, 255);
    }

    #[test]
    fn default_layout_is_valid() {
        ReportLayout::default().validate().expect("default layout");
    }

    #[test]
    fn default_layout_shape() {
        let layout = ReportLayout::default();
        let counts: Vec<usize> = layout.chapters.iter().map(|c| c.sections.len()).collect();
        assert_eq!(counts, vec![5, 6, 5, 3, 2]);
    }

    #[test]
    fn weights_must_sum_to_one() {
        let mut layout = ReportLayout::default();
        layout.chapters[0].weight = 0.5;
        let err = layout.validate().unwrap_err();
        assert!(matches!(err, ReportError::InvalidConfig(_)));
    }

    #[test]
    fn section_keys_must_increase() {
        let mut layout = ReportLayout::default();
        layout.chapters[1].sections.swap(0, 1);
        let err = layout.validate().unwrap_err();
        assert!(err.to_string().contains("2.1"), "got: {err}");
    }

    #[test]
    fn builder_clamps_temperature() {
        let config = ReportConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(config.temperature, 2.0);
    }

    #[test]
    fn builder_rejects_bad_layout() {
        let layout = ReportLayout {
            words_per_page: 300,
            chapters: vec![],
        };
        assert!(ReportConfig::builder().layout(layout).build().is_err());
    }

    #[test]
    fn defaults_match_rate_limit_policy() {
        let config = ReportConfig::default();
        assert_eq!(config.section_delay_ms, 2000);
        assert_eq!(config.chapter_delay_ms, 5000);
        assert_eq!(config.context_window_chars, 500);
    }
}
