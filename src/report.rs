//! Report generation entry points.
//!
//! [`generate_report`] drives the whole pipeline against any
//! [`SectionGenerator`]: allocate the word plan, render the front matter,
//! generate every section in key order with a rolling context, fetch the
//! references, then assemble the document. Generation is strictly sequential;
//! the only suspension points are generator calls and throttle pauses.
//!
//! There is no partial-success path. The first failing call aborts the run
//! and nothing is returned or written.

use crate::config::ReportConfig;
use crate::document::Document;
use crate::error::{GenerationError, ReportError};
use crate::output::{ReportOutput, ReportStats, SectionResult};
use crate::pipeline::assemble::{build_stream, render_stream, ChapterText};
use crate::pipeline::context::RollingContext;
use crate::pipeline::front_matter::render_front_matter;
use crate::pipeline::llm::{LlmGenerator, SectionGenerator, SectionRequest};
use crate::pipeline::normalize::normalize_markup;
use crate::pipeline::references::clean_references;
use crate::plan::{allocate, ReportPlan};
use edgequake_llm::{LLMProvider, ProviderFactory};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

/// Model used when a provider is named without one.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// What to generate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    /// Project title, used in every prompt and on the certificate.
    pub title: String,
    /// Target length in pages.
    pub pages: u32,
}

impl ReportRequest {
    pub fn new(title: impl Into<String>, pages: u32) -> Self {
        Self {
            title: title.into(),
            pages,
        }
    }

    /// Reject requests the pipeline cannot serve.
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.title.trim().is_empty() {
            return Err(ReportError::InvalidRequest("title must not be empty".into()));
        }
        if self.pages == 0 {
            return Err(ReportError::InvalidRequest(
                "page count must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Validate the request and derive its word plan without generating anything.
pub fn plan_report(
    request: &ReportRequest,
    config: &ReportConfig,
) -> Result<ReportPlan, ReportError> {
    request.validate()?;
    config.layout.validate()?;
    Ok(allocate(request.pages, &config.layout))
}

/// Generate a complete report with the given generator.
///
/// # Errors
/// - [`ReportError::InvalidRequest`] / [`ReportError::InvalidConfig`] before any call
/// - [`ReportError::PictureLoadFailed`] if the configured logo is unreadable
/// - [`ReportError::GenerationFailed`] naming the first failing section
/// - [`ReportError::ReferencesFailed`] if the references call fails
pub async fn generate_report<G: SectionGenerator>(
    request: &ReportRequest,
    generator: &G,
    config: &ReportConfig,
) -> Result<ReportOutput, ReportError> {
    let total_start = Instant::now();
    let plan = plan_report(request, config)?;
    let total_sections = plan.section_count();
    info!(
        "Generating \"{}\": {} pages, {} words, {} sections",
        request.title, plan.pages, plan.target_words, total_sections
    );

    // ── Step 1: Front matter ─────────────────────────────────────────────
    // Rendered first so a bad logo fails before any generator call.
    let mut document = Document::new();
    render_front_matter(
        &mut document,
        &request.title,
        &plan,
        config.layout.words_per_page,
        &config.front_matter,
        &config.typography,
    )?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_report_start(total_sections);
    }

    // ── Step 2: Sections, in key order ───────────────────────────────────
    let mut context = RollingContext::new(config.context_window_chars);
    let mut chapters = Vec::with_capacity(plan.chapters.len());
    let mut results = Vec::with_capacity(total_sections);
    let mut llm_duration_ms = 0u64;

    for chapter in &plan.chapters {
        let mut text = ChapterText {
            title: chapter.title.clone(),
            sections: Vec::with_capacity(chapter.sections.len()),
        };

        for section in &chapter.sections {
            throttle(config.section_delay_ms).await;
            if let Some(ref cb) = config.progress_callback {
                cb.on_section_start(section.key, total_sections);
            }

            let req = SectionRequest {
                report_title: request.title.clone(),
                key: section.key,
                section_title: section.title.clone(),
                target_words: section.target_words,
                context: context.as_str().to_string(),
            };
            debug!(
                "Section {}: target {} words, {} chars of context",
                section.key,
                section.target_words,
                req.context.chars().count()
            );

            let call_start = Instant::now();
            let generated = generator.generate_section(&req).await;
            llm_duration_ms += call_start.elapsed().as_millis() as u64;

            let generation = match generated {
                Ok(g) if !g.text.trim().is_empty() => g,
                outcome => {
                    let detail = match outcome {
                        Err(e) => e.to_string(),
                        Ok(_) => GenerationError::EmptyResponse.to_string(),
                    };
                    warn!("Section {} failed: {}", section.key, detail);
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_section_error(section.key, total_sections, &detail);
                    }
                    return Err(ReportError::GenerationFailed {
                        section: section.key.to_string(),
                        detail,
                    });
                }
            };

            let normalized = normalize_markup(&generation.text);
            context.push(&normalized);

            if let Some(ref cb) = config.progress_callback {
                cb.on_section_complete(section.key, total_sections, normalized.len());
            }
            results.push(SectionResult {
                key: section.key,
                title: section.title.clone(),
                target_words: section.target_words,
                words: normalized.split_whitespace().count(),
                input_tokens: generation.input_tokens,
                output_tokens: generation.output_tokens,
                duration_ms: generation.duration_ms,
                retries: generation.retries,
            });
            text.sections.push(normalized);
        }

        chapters.push(text);
        info!("Chapter {} complete", chapter.number);
        throttle(config.chapter_delay_ms).await;
    }

    // ── Step 3: References ───────────────────────────────────────────────
    throttle(config.section_delay_ms).await;
    if let Some(ref cb) = config.progress_callback {
        cb.on_references_start();
    }
    let call_start = Instant::now();
    let references = generator
        .generate_references(&request.title)
        .await
        .map_err(|e| ReportError::ReferencesFailed {
            detail: e.to_string(),
        })?;
    llm_duration_ms += call_start.elapsed().as_millis() as u64;

    let references = clean_references(&references.text);
    if references.is_empty() {
        return Err(ReportError::ReferencesFailed {
            detail: GenerationError::EmptyResponse.to_string(),
        });
    }

    // ── Step 4: Assemble ─────────────────────────────────────────────────
    let stream = build_stream(&chapters, &references);
    let summary = render_stream(&stream, &mut document, &config.typography);

    let stats = ReportStats {
        chapters: summary.chapters,
        sections: results.len(),
        reference_entries: summary.reference_entries,
        paragraphs: document.paragraphs().count(),
        page_breaks: document.page_break_count(),
        target_words: plan.target_words,
        generated_words: results.iter().map(|r| r.words).sum(),
        total_input_tokens: results.iter().map(|r| r.input_tokens as u64).sum(),
        total_output_tokens: results.iter().map(|r| r.output_tokens as u64).sum(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        llm_duration_ms,
    };

    info!(
        "Report complete: {} sections, {} reference entries, {} words, {}ms total",
        stats.sections, stats.reference_entries, stats.generated_words, stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_report_complete(stats.sections, stats.paragraphs);
    }

    Ok(ReportOutput {
        document,
        plan,
        sections: results,
        stats,
    })
}

/// Generate a report and write it to `output_path` as `.docx`.
///
/// The file is only created once the whole report has been generated, and is
/// written atomically.
pub async fn generate_report_to_file<G: SectionGenerator>(
    request: &ReportRequest,
    generator: &G,
    output_path: impl AsRef<Path>,
    config: &ReportConfig,
) -> Result<ReportStats, ReportError> {
    let output = generate_report(request, generator, config).await?;
    output.save(output_path)?;
    Ok(output.stats)
}

/// Generate a report with the LLM provider resolved from `config`.
pub async fn generate_report_with_llm(
    request: &ReportRequest,
    config: &ReportConfig,
) -> Result<ReportOutput, ReportError> {
    request.validate()?;
    let provider = resolve_provider(config)?;
    let generator = LlmGenerator::new(provider, config);
    generate_report(request, &generator, config).await
}

/// Synchronous wrapper around [`generate_report_with_llm`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_report_sync(
    request: &ReportRequest,
    config: &ReportConfig,
) -> Result<ReportOutput, ReportError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ReportError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate_report_with_llm(request, config))
}

async fn throttle(ms: u64) {
    if ms > 0 {
        sleep(Duration::from_millis(ms)).await;
    }
}

// ── Provider resolution ──────────────────────────────────────────────────

fn create_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, ReportError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        ReportError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider** (`config.provider_name`) with `config.model` or
///    [`DEFAULT_MODEL`]; the factory reads the matching API key.
/// 3. **Environment pair** `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`, when
///    both are set.
/// 4. **OpenAI** when `OPENAI_API_KEY` is set, else full auto-detection via
///    [`ProviderFactory::from_env`].
pub fn resolve_provider(config: &ReportConfig) -> Result<Arc<dyn LLMProvider>, ReportError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| ReportError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
