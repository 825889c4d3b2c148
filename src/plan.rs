//! Word-budget allocation: page count → per-chapter, per-section word targets.
//!
//! The allocator is a pure function over an immutable [`ReportLayout`]:
//!
//! ```text
//! total   = pages × words_per_page
//! chapter = ⌊total × chapter.weight⌋
//! section = ⌊chapter × section.proportion⌋
//! ```
//!
//! Flooring at both levels means a chapter's sections may add up to a few
//! words less than the chapter budget; nothing redistributes the remainder.

use crate::config::ReportLayout;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite section identifier, displayed as `"C.S"`.
///
/// Ordering is numeric on `(chapter, section)`, which is also the order in
/// which sections are generated and numbered in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SectionKey {
    pub chapter: u8,
    pub section: u8,
}

impl SectionKey {
    pub fn new(chapter: u8, section: u8) -> Self {
        Self { chapter, section }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.chapter, self.section)
    }
}

/// Word targets for a whole report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPlan {
    pub pages: u32,
    pub target_words: u32,
    pub chapters: Vec<ChapterPlan>,
}

/// Word targets for one chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterPlan {
    pub number: u8,
    pub title: String,
    pub total_words: u32,
    pub sections: Vec<SectionPlan>,
}

/// Word target for one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionPlan {
    pub key: SectionKey,
    pub title: String,
    pub proportion: f64,
    pub target_words: u32,
}

/// Derive the word plan for `pages` pages.
///
/// `pages == 0` yields an empty plan; callers reject that before generation.
pub fn allocate(pages: u32, layout: &ReportLayout) -> ReportPlan {
    let target_words = pages.saturating_mul(layout.words_per_page);
    if pages == 0 {
        return ReportPlan {
            pages,
            target_words,
            chapters: Vec::new(),
        };
    }

    let chapters = layout
        .chapters
        .iter()
        .map(|chapter| {
            let total_words = floor_share(target_words, chapter.weight);
            let mut sections: Vec<SectionPlan> = chapter
                .sections
                .iter()
                .map(|section| SectionPlan {
                    key: SectionKey::new(chapter.number, section.number),
                    title: section.title.clone(),
                    proportion: section.proportion,
                    target_words: floor_share(total_words, section.proportion),
                })
                .collect();
            sections.sort_by_key(|s| s.key);

            ChapterPlan {
                number: chapter.number,
                title: chapter.title.clone(),
                total_words,
                sections,
            }
        })
        .collect();

    ReportPlan {
        pages,
        target_words,
        chapters,
    }
}

fn floor_share(words: u32, share: f64) -> u32 {
    (f64::from(words) * share).floor().max(0.0) as u32
}

impl ReportPlan {
    /// Sum of all chapter budgets (≤ `target_words` due to flooring).
    pub fn allocated_words(&self) -> u32 {
        self.chapters.iter().map(|c| c.total_words).sum()
    }

    /// Number of generator calls the plan requires (excluding references).
    pub fn section_count(&self) -> usize {
        self.chapters.iter().map(|c| c.sections.len()).sum()
    }

    /// Iterate over every section in generation order.
    pub fn sections(&self) -> impl Iterator<Item = &SectionPlan> {
        self.chapters.iter().flat_map(|c| c.sections.iter())
    }
}

impl ChapterPlan {
    /// Pages this chapter is expected to fill; at least one.
    pub fn estimated_pages(&self, words_per_page: u32) -> u32 {
        self.total_words.div_ceil(words_per_page.max(1)).max(1)
    }
}
