//! Progress-callback trait for per-section generation events.
//!
//! Inject an [`Arc<dyn ReportProgressCallback>`] via
//! [`crate::config::ReportConfigBuilder::progress_callback`] to receive
//! events while the report is generated. A full report is two dozen slow LLM
//! calls plus rate-limit pauses, so callers generally want to show something.
//!
//! # Example
//!
//! ```rust
//! use edgequake_report::{ReportConfig, ReportProgressCallback, SectionKey};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl ReportProgressCallback for CountingCallback {
//!     fn on_section_complete(&self, key: SectionKey, total: usize, text_len: usize) {
//!         let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("{done}/{total}: section {key} ({text_len} bytes)");
//!     }
//! }
//!
//! let config = ReportConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { completed: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::plan::SectionKey;
use std::sync::Arc;

/// Called by the report pipeline as it generates each section.
///
/// Generation is strictly sequential, so events arrive in order. The trait is
/// still `Send + Sync` because the config holding it is shared across tasks.
/// All methods default to no-ops.
pub trait ReportProgressCallback: Send + Sync {
    /// Called once before the first generator call.
    ///
    /// * `total_sections`: section calls that will be made (references excluded)
    fn on_report_start(&self, total_sections: usize) {
        let _ = total_sections;
    }

    /// Called just before the generator is asked for a section.
    fn on_section_start(&self, key: SectionKey, total_sections: usize) {
        let _ = (key, total_sections);
    }

    /// Called when a section's text has been generated and normalised.
    ///
    /// * `text_len`: byte length of the normalised text
    fn on_section_complete(&self, key: SectionKey, total_sections: usize, text_len: usize) {
        let _ = (key, total_sections, text_len);
    }

    /// Called when a section fails; the report aborts right after.
    fn on_section_error(&self, key: SectionKey, total_sections: usize, error: &str) {
        let _ = (key, total_sections, error);
    }

    /// Called before the references call.
    fn on_references_start(&self) {}

    /// Called when the report has been fully assembled.
    ///
    /// * `sections`: sections generated
    /// * `paragraphs`: paragraphs in the finished document
    fn on_report_complete(&self, sections: usize, paragraphs: usize) {
        let _ = (sections, paragraphs);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ReportProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ReportConfig`].
pub type ProgressCallback = Arc<dyn ReportProgressCallback>;
