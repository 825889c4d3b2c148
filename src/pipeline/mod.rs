//! Pipeline stages for report generation.
//!
//! Each submodule implements exactly one transformation step and is tested on
//! its own; [`crate::report`] drives them in order.
//!
//! ## Data Flow
//!
//! ```text
//! plan ──▶ llm ──▶ normalize ──▶ assemble ──▶ classify/format ──▶ Document
//!          ▲  │                     ▲
//!   context ◀─┘          references ┘
//! ```
//!
//! 1. [`llm`]: the generator seam and its retrying LLM implementation
//! 2. [`context`]: rolling window of previously generated text
//! 3. [`normalize`]: clean emphasis markers in each generated chunk
//! 4. [`references`]: strip prose from the reference list, one entry per line
//! 5. [`assemble`]: join chunks into a stream, split into blocks, paginate
//! 6. [`classify`]: ordered rule table mapping a line to a [`classify::LineKind`]
//! 7. [`format`]: turn a classified line into a styled paragraph
//! 8. [`front_matter`]: title page, certificate and table of contents

pub mod assemble;
pub mod classify;
pub mod context;
pub mod format;
pub mod front_matter;
pub mod llm;
pub mod normalize;
pub mod references;
