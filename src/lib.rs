//! # edgequake-report
//!
//! Generate formatted academic project reports (`.docx`) with an LLM.
//!
//! The model writes the prose; this crate does everything around it. It
//! budgets words per chapter and section, feeds each call a rolling window of
//! earlier text, cleans the model's inconsistent bold markers, classifies each
//! line (numbered heading, subheading, bullet, body) and renders the result
//! with fixed typography, front matter and a table of contents.
//!
//! ## Pipeline Overview
//!
//! ```text
//! title + pages
//!  │
//!  ├─ 1. Plan       pages × 300 words → chapter and section budgets
//!  ├─ 2. Front      title page, certificate, table of contents
//!  ├─ 3. Generate   one LLM call per section, rolling 500-char context
//!  ├─ 4. Normalise  strip / collapse ** markers
//!  ├─ 5. References IEEE list, prose stripped, one entry per line
//!  ├─ 6. Assemble   split into blocks, classify lines, page breaks
//!  └─ 7. Output     Document → .docx (docx-rs)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_report::{generate_report_with_llm, ReportConfig, ReportRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let config = ReportConfig::default();
//!     let request = ReportRequest::new("Smart Irrigation System", 10);
//!     let output = generate_report_with_llm(&request, &config).await?;
//!     output.save("smart-irrigation.docx")?;
//!     eprintln!("{} sections, {} words",
//!         output.stats.sections,
//!         output.stats.generated_words);
//!     Ok(())
//! }
//! ```
//!
//! ## Custom generators
//!
//! Anything implementing [`SectionGenerator`] can drive
//! [`generate_report`], e.g. a cached or scripted generator in tests.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `reportgen` binary (clap + anyhow + indicatif + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod document;
pub mod docx;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod plan;
pub mod progress;
pub mod prompts;
pub mod report;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ChapterSpec, FrontMatter, ReportConfig, ReportConfigBuilder, ReportLayout, SectionSpec,
    TrailingEntry, Typography,
};
pub use document::{Document, Paragraph, Run};
pub use error::{GenerationError, ReportError};
pub use output::{ReportOutput, ReportStats, SectionResult};
pub use pipeline::classify::LineKind;
pub use pipeline::llm::{Generation, LlmGenerator, SectionGenerator, SectionRequest};
pub use plan::{allocate, ChapterPlan, ReportPlan, SectionKey, SectionPlan};
pub use progress::{NoopProgressCallback, ProgressCallback, ReportProgressCallback};
pub use report::{
    generate_report, generate_report_sync, generate_report_to_file, generate_report_with_llm,
    plan_report, resolve_provider, ReportRequest,
};
