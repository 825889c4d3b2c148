//! Stream assembly and rendering.
//!
//! Generated chapters are first joined into one text stream (blocks separated
//! by blank lines), then the stream is split back into [`LogicalBlock`]s and
//! rendered into the [`Document`]. A block starting with `CHAPTER` or
//! `REFERENCES` opens a new unit; every other block belongs to the open unit.
//!
//! ```text
//! CHAPTER 1. INTRODUCTION      ← ChapterHeading, opens unit
//!
//! 1.1 Overview …               ← SectionBody
//!
//! 1.2 Problem …                ← SectionBody      → page break
//!
//! REFERENCES                   ← ReferencesBlock, opens unit
//!
//! [1] …                        ← SectionBody      (no page break)
//! ```

use crate::config::Typography;
use crate::document::Document;
use crate::pipeline::classify::LineKind;
use crate::pipeline::format::{format_line, format_section_line};
use crate::pipeline::references::split_entries;
use tracing::debug;

const CHAPTER_PREFIX: &str = "CHAPTER";
const REFERENCES_TITLE: &str = "REFERENCES";

/// Kind of a blank-line-separated block of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    ChapterHeading,
    ReferencesBlock,
    SectionBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalBlock<'a> {
    pub kind: BlockKind,
    /// Trimmed block text.
    pub text: &'a str,
}

/// Generated text of one chapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterText {
    pub title: String,
    /// Normalised section chunks in key order.
    pub sections: Vec<String>,
}

/// What [`render_stream`] put into the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub chapters: usize,
    pub reference_entries: usize,
}

/// Join chapters and the cleaned reference list into one stream.
pub fn build_stream(chapters: &[ChapterText], references: &str) -> String {
    let body = chapters
        .iter()
        .map(|c| {
            std::iter::once(c.title.as_str())
                .chain(c.sections.iter().map(String::as_str))
                .collect::<Vec<_>>()
                .join("\n\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{body}\n\n{REFERENCES_TITLE}\n\n{references}")
}

/// Split a stream into trimmed, non-empty blocks.
pub fn split_blocks(stream: &str) -> Vec<LogicalBlock<'_>> {
    stream
        .split("\n\n")
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(|text| LogicalBlock {
            kind: block_kind(text),
            text,
        })
        .collect()
}

fn block_kind(text: &str) -> BlockKind {
    if text.starts_with(CHAPTER_PREFIX) {
        BlockKind::ChapterHeading
    } else if text.starts_with(REFERENCES_TITLE) {
        BlockKind::ReferencesBlock
    } else {
        BlockKind::SectionBody
    }
}

/// A chapter or the references, with all blocks that belong to it.
enum Unit<'a> {
    Chapter(Vec<&'a str>),
    References(Vec<&'a str>),
}

fn group_units<'a>(blocks: &[LogicalBlock<'a>]) -> Vec<Unit<'a>> {
    let mut units: Vec<Unit<'a>> = Vec::new();
    for block in blocks {
        match block.kind {
            BlockKind::ChapterHeading => units.push(Unit::Chapter(vec![block.text])),
            BlockKind::ReferencesBlock => units.push(Unit::References(vec![block.text])),
            BlockKind::SectionBody => match units.last_mut() {
                Some(Unit::Chapter(b)) | Some(Unit::References(b)) => b.push(block.text),
                // Prose before the first chapter is dropped.
                None => debug!("Skipping {} chars before first chapter", block.text.len()),
            },
        }
    }
    units
}

/// Render a stream into `doc`.
///
/// Every chapter unit is followed by a page break; the references unit is not.
pub fn render_stream(stream: &str, doc: &mut Document, t: &Typography) -> RenderSummary {
    let blocks = split_blocks(stream);
    let mut summary = RenderSummary::default();

    for unit in group_units(&blocks) {
        match unit {
            Unit::Chapter(blocks) => {
                render_chapter(&blocks, doc, t);
                doc.add_page_break();
                summary.chapters += 1;
            }
            Unit::References(blocks) => {
                summary.reference_entries += render_references(&blocks, doc, t);
            }
        }
    }
    summary
}

fn render_chapter(blocks: &[&str], doc: &mut Document, t: &Typography) {
    let Some((heading, rest)) = blocks.split_first() else {
        return;
    };

    let mut lines = heading.lines().map(str::trim).filter(|l| !l.is_empty());
    if let Some(title) = lines.next() {
        doc.push_paragraph(format_line(LineKind::ChapterTitle, title, t));
    }
    for line in lines {
        doc.push_paragraph(format_section_line(line, t));
    }

    for block in rest {
        for line in block.lines().map(str::trim).filter(|l| !l.is_empty()) {
            doc.push_paragraph(format_section_line(line, t));
        }
    }
}

fn render_references(blocks: &[&str], doc: &mut Document, t: &Typography) -> usize {
    doc.push_paragraph(format_line(LineKind::ChapterTitle, REFERENCES_TITLE, t));

    let mut body = Vec::with_capacity(blocks.len());
    if let Some((heading, rest)) = blocks.split_first() {
        body.push(heading.trim_start_matches(REFERENCES_TITLE));
        body.extend(rest.iter().copied());
    }

    let entries = split_entries(&body.join("\n"));
    for entry in &entries {
        doc.push_paragraph(format_line(LineKind::ReferenceEntry, entry, t));
    }
    entries.len()
}
