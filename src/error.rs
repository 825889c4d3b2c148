//! Error types for the edgequake-report library.
//!
//! Two distinct error types reflect two distinct layers:
//!
//! * [`ReportError`]: **Fatal**: the report cannot be produced. Returned as
//!   `Err(ReportError)` from the top-level `generate_report*` functions. There
//!   is no partial-success path: one failing section aborts the whole report
//!   and no document is returned or written.
//!
//! * [`GenerationError`]: a single text-generator call failed. Generators
//!   return it; the assembler wraps it into [`ReportError::GenerationFailed`]
//!   or [`ReportError::ReferencesFailed`] together with the failing location.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-report library.
#[derive(Debug, Error)]
pub enum ReportError {
    // ── Request errors ────────────────────────────────────────────────────
    /// The report request was rejected before any generation call.
    #[error("Invalid report request: {0}")]
    InvalidRequest(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Generation errors ─────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// A section call failed; `section` is the "C.S" key.
    #[error("Generation failed for section {section}: {detail}")]
    GenerationFailed { section: String, detail: String },

    /// The references call failed.
    #[error("Reference generation failed: {detail}")]
    ReferencesFailed { detail: String },

    // ── Front matter ──────────────────────────────────────────────────────
    /// The logo (or another picture) could not be read or decoded.
    #[error("Failed to load picture '{path}': {detail}")]
    PictureLoadFailed { path: PathBuf, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output document.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The DOCX package could not be assembled.
    #[error("DOCX packaging failed: {0}")]
    Docx(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A failed call to a text generator.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum GenerationError {
    /// The provider returned an error after the generator's own retries.
    #[error("LLM call failed after {retries} retries: {detail}")]
    Api { retries: u8, detail: String },

    /// The call did not complete in time.
    #[error("LLM call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The provider answered with nothing usable.
    #[error("LLM returned an empty response")]
    EmptyResponse,
}
