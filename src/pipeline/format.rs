//! Paragraph formatting for classified lines.
//!
//! Every [`LineKind`] maps to one paragraph shape; sizes, spacing and indents
//! come from [`Typography`]. All runs use the configured font family.

use crate::config::Typography;
use crate::document::{Alignment, Paragraph, ParagraphStyle};
use crate::pipeline::classify::{classify_line, LineKind};
use crate::pipeline::normalize::BULLET;

/// Classify a line of section text and format it.
pub fn format_section_line(line: &str, typography: &Typography) -> Paragraph {
    format_line(classify_line(line), line, typography)
}

/// Format `line` as a paragraph of the given kind.
pub fn format_line(kind: LineKind, line: &str, t: &Typography) -> Paragraph {
    let mut p = Paragraph {
        line_spacing: Some(t.line_spacing),
        ..Paragraph::default()
    };

    match kind {
        LineKind::ChapterTitle => {
            p.alignment = Alignment::Center;
            p.add_run(line).font(&t.font_family, t.chapter_title_size).bold();
        }
        LineKind::NumberedHeading => {
            heading(&mut p, t);
            p.add_run(line).font(&t.font_family, t.numbered_heading_size).bold();
        }
        LineKind::Subheading => {
            heading(&mut p, t);
            p.add_run(line).font(&t.font_family, t.subheading_size).bold();
        }
        LineKind::BulletItem => {
            p.alignment = Alignment::Justify;
            p.style = Some(ParagraphStyle::ListBullet);
            p.left_indent = Some(t.bullet_indent);

            let text = line.replace(BULLET, "");
            let text = text.trim();
            match text.split_once(':') {
                Some((label, rest)) => {
                    p.add_run(format!("{label}:"))
                        .font(&t.font_family, t.body_size)
                        .bold();
                    p.add_run(rest).font(&t.font_family, t.body_size);
                }
                None => {
                    p.add_run(text).font(&t.font_family, t.body_size);
                }
            }
        }
        LineKind::BodyText => {
            p.alignment = Alignment::Justify;
            p.add_run(line).font(&t.font_family, t.body_size);
        }
        LineKind::ReferenceEntry => {
            p.alignment = Alignment::Justify;
            p.left_indent = Some(t.reference_indent);
            p.first_line_indent = Some(-t.reference_indent);
            p.add_run(line).font(&t.font_family, t.body_size);
        }
    }
    p
}

fn heading(p: &mut Paragraph, t: &Typography) {
    p.alignment = Alignment::Justify;
    p.space_before = Some(t.heading_space_before);
    p.space_after = Some(t.heading_space_after);
}
