//! `.docx` writer: maps a [`Document`] onto `docx-rs` and packs it.
//!
//! Lengths in the model are points; WordprocessingML wants twentieths of a
//! point (twips) for paragraph metrics, half-points for font sizes and EMUs
//! for drawings. Text is filtered to the XML 1.0 character range on the way
//! out, so stray control characters in generated prose never reach the
//! package.

use crate::document::{
    Alignment, Block, Document, Paragraph, ParagraphStyle, Picture, Run, TabAlignment, TabLeader,
};
use crate::error::ReportError;
use docx_rs::{
    AbstractNumbering, AlignmentType, BreakType, Docx, IndentLevel, Level, LevelJc, LevelText,
    LineSpacing, NumberFormat, Numbering, NumberingId, PageMargin, Pic, RunFonts,
    SpecialIndentType, Start, Tab, TabLeaderType, TabValueType,
};
use std::io::{Seek, Write};
use tracing::warn;

const EMU_PER_POINT: f32 = 12_700.0;
/// Numbering instance used by `ListBullet` paragraphs.
const BULLET_NUMBERING_ID: usize = 1;

/// Write `doc` as a `.docx` package to `writer`.
pub fn write_docx<W: Write + Seek>(doc: &Document, writer: W) -> Result<(), ReportError> {
    build_docx(doc)
        .build()
        .pack(writer)
        .map_err(|e| ReportError::Docx(e.to_string()))
}

fn build_docx(doc: &Document) -> Docx {
    // US Letter with 1" margins, matching the 6.5" usable width the TOC tab
    // stops assume.
    let mut docx = Docx::new()
        .page_size(12240, 15840)
        .page_margin(
            PageMargin::new()
                .top(1440)
                .bottom(1440)
                .left(1440)
                .right(1440),
        )
        .add_abstract_numbering(
            AbstractNumbering::new(BULLET_NUMBERING_ID).add_level(
                Level::new(
                    0,
                    Start::new(1),
                    NumberFormat::new("bullet"),
                    LevelText::new("•"),
                    LevelJc::new("left"),
                )
                .indent(Some(360), Some(SpecialIndentType::Hanging(360)), None, None),
            ),
        )
        .add_numbering(Numbering::new(BULLET_NUMBERING_ID, BULLET_NUMBERING_ID));

    for block in &doc.blocks {
        docx = match block {
            Block::Paragraph(p) => docx.add_paragraph(map_paragraph(p)),
            Block::PageBreak => docx.add_paragraph(
                docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_break(BreakType::Page)),
            ),
        };
    }
    docx
}

fn map_paragraph(p: &Paragraph) -> docx_rs::Paragraph {
    let mut out = docx_rs::Paragraph::new();

    if let Some(ParagraphStyle::ListBullet) = p.style {
        out = out.numbering(NumberingId::new(BULLET_NUMBERING_ID), IndentLevel::new(0));
    }

    for tab in &p.tab_stops {
        let val = match tab.alignment {
            TabAlignment::Left => TabValueType::Left,
            TabAlignment::Right => TabValueType::Right,
        };
        let leader = match tab.leader {
            TabLeader::None => TabLeaderType::None,
            TabLeader::Dots => TabLeaderType::Dot,
        };
        out = out.add_tab(Tab::new().val(val).leader(leader).pos(twips(tab.position) as _));
    }

    if p.space_before.is_some() || p.space_after.is_some() || p.line_spacing.is_some() {
        let mut spacing = LineSpacing::new();
        if let Some(before) = p.space_before {
            spacing = spacing.before(twips(before) as _);
        }
        if let Some(after) = p.space_after {
            spacing = spacing.after(twips(after) as _);
        }
        if let Some(multiple) = p.line_spacing {
            // "auto" line rule measures in 240ths of a line.
            spacing = spacing.line((multiple * 240.0).round() as _);
        }
        out = out.line_spacing(spacing);
    }

    if p.left_indent.is_some() || p.first_line_indent.is_some() {
        let special = p.first_line_indent.map(|first| {
            if first < 0.0 {
                SpecialIndentType::Hanging(twips(-first) as _)
            } else {
                SpecialIndentType::FirstLine(twips(first) as _)
            }
        });
        out = out.indent(p.left_indent.map(|l| twips(l) as _), special, None, None);
    }

    out = match p.alignment {
        Alignment::Left => out,
        Alignment::Center => out.align(AlignmentType::Center),
        Alignment::Right => out.align(AlignmentType::Right),
        Alignment::Justify => out.align(AlignmentType::Both),
    };

    for run in &p.runs {
        out = out.add_run(map_run(run));
    }
    out
}

fn map_run(run: &Run) -> docx_rs::Run {
    let mut out = docx_rs::Run::new();

    if let Some(font) = &run.font {
        out = out.fonts(
            RunFonts::new()
                .ascii(font.as_str())
                .hi_ansi(font.as_str())
                .cs(font.as_str()),
        );
    }
    if let Some(size) = run.size {
        out = out.size((size * 2.0).round() as usize);
    }
    if run.bold {
        out = out.bold();
    }
    if run.italic {
        out = out.italic();
    }
    if run.underline {
        out = out.underline("single");
    }

    if let Some(pic) = &run.picture {
        match map_picture(pic) {
            Some(image) => out = out.add_image(image),
            None => warn!("Skipping picture {} with no image data", pic.source.display()),
        }
    }

    let text = xml_safe(&run.text);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out = out.add_break(BreakType::TextWrapping);
        }
        for (j, segment) in line.split('\t').enumerate() {
            if j > 0 {
                out = out.add_tab();
            }
            if !segment.is_empty() {
                out = out.add_text(segment);
            }
        }
    }

    if run.line_break {
        out = out.add_break(BreakType::TextWrapping);
    }
    out
}

fn map_picture(pic: &Picture) -> Option<Pic> {
    if pic.data.is_empty() {
        return None;
    }
    let cx = (pic.width * EMU_PER_POINT).round() as u32;
    let cy = (pic.height * EMU_PER_POINT).round() as u32;
    Some(Pic::new(&pic.data).size(cx, cy))
}

/// Drop characters outside the XML 1.0 `Char` production.
///
/// Tab, line feed and carriage return survive; other C0 controls and the
/// non-characters U+FFFE / U+FFFF are removed.
pub fn xml_safe(text: &str) -> String {
    text.chars().filter(|&c| is_xml_char(c)).collect()
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r')
        || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

fn twips(points: f32) -> i32 {
    (points * 20.0).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn sample() -> Document {
        let mut doc = Document::new();
        let p = doc.add_paragraph();
        p.alignment = Alignment::Justify;
        p.line_spacing = Some(1.5);
        p.add_run("Tom & Jerry <3").font("Times New Roman", 12.0).bold();
        doc.add_page_break();
        let toc = doc.add_paragraph();
        toc.add_tab_stop(468.0, TabAlignment::Right, TabLeader::Dots);
        toc.add_run("CHAPTER 1. INTRODUCTION");
        toc.add_run("\t11");
        doc
    }

    fn pack(doc: &Document) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        write_docx(doc, &mut buf).unwrap();
        buf.into_inner()
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        out
    }

    fn part_names(bytes: &[u8]) -> Vec<String> {
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    #[test]
    fn package_contains_required_parts() {
        let bytes = pack(&sample());
        for part in ["[Content_Types].xml", "_rels/.rels", "word/document.xml", "word/numbering.xml"] {
            assert!(!read_part(&bytes, part).is_empty(), "missing {part}");
        }
    }

    #[test]
    fn body_escapes_text_and_emits_breaks() {
        let body = read_part(&pack(&sample()), "word/document.xml");

        assert!(body.contains("Jerry"));
        assert!(!body.contains("Tom & Jerry <3"));
        assert!(body.contains(r#"w:type="page""#));
        assert!(body.contains(r#"w:leader="dot""#));
        assert!(body.contains(r#"w:pos="9360""#));
        assert!(body.contains("<w:tab"));
        assert!(body.contains(r#"w:val="both""#));
        assert!(body.contains(r#"w:line="360""#));
        assert!(body.contains(r#"<w:sz w:val="24""#));
    }

    #[test]
    fn control_characters_never_reach_the_package() {
        let mut doc = Document::new();
        doc.add_paragraph()
            .add_run("Soil\u{0C}moisture\u{1B}[0m sensor\tnode");
        let body = read_part(&pack(&doc), "word/document.xml");

        let illegal: Vec<u32> = body
            .chars()
            .filter(|&c| !is_xml_char(c))
            .map(u32::from)
            .collect();
        assert!(illegal.is_empty(), "document.xml contains {illegal:x?}");
        assert!(body.contains("Soilmoisture[0m sensor"));
    }

    #[test]
    fn xml_safe_keeps_whitespace_controls() {
        assert_eq!(xml_safe("a\tb\nc\rd"), "a\tb\nc\rd");
        assert_eq!(xml_safe("a\u{0}b\u{7}c\u{FFFF}"), "abc");
        assert_eq!(xml_safe("• Überblick"), "• Überblick");
    }

    #[test]
    fn hanging_indent_renders_as_hanging() {
        let mut doc = Document::new();
        let p = doc.add_paragraph();
        p.left_indent = Some(36.0);
        p.first_line_indent = Some(-36.0);
        p.add_run("[1] ref");
        let body = read_part(&pack(&doc), "word/document.xml");
        assert!(body.contains(r#"w:left="720""#), "{body}");
        assert!(body.contains(r#"w:hanging="720""#), "{body}");
    }

    #[test]
    fn bullet_paragraphs_use_the_bullet_numbering() {
        let mut doc = Document::new();
        let p = doc.add_paragraph();
        p.style = Some(ParagraphStyle::ListBullet);
        p.add_run("Sensor:");
        let bytes = pack(&doc);
        let body = read_part(&bytes, "word/document.xml");
        assert!(body.contains("<w:numPr>"), "{body}");
        let numbering = read_part(&bytes, "word/numbering.xml");
        assert!(numbering.contains(r#"w:val="bullet""#));
    }

    #[test]
    fn pictures_are_embedded() {
        let mut data = Vec::new();
        image::RgbImage::new(4, 2)
            .write_to(&mut Cursor::new(&mut data), image::ImageFormat::Png)
            .unwrap();
        let mut doc = Document::new();
        doc.add_paragraph().add_picture(Picture {
            source: "logo.png".into(),
            format: crate::document::PictureFormat::Png,
            width: 200.0,
            height: 100.0,
            data,
        });
        let bytes = pack(&doc);

        assert!(part_names(&bytes).iter().any(|n| n.starts_with("word/media/")));
        let body = read_part(&bytes, "word/document.xml");
        assert!(body.contains("r:embed"));
        assert!(body.contains(r#"cx="2540000""#));
    }

    #[test]
    fn picture_without_data_is_skipped() {
        let mut doc = Document::new();
        doc.add_paragraph().add_picture(Picture {
            source: "logo.png".into(),
            format: crate::document::PictureFormat::Png,
            width: 200.0,
            height: 100.0,
            data: Vec::new(),
        });
        let bytes = pack(&doc);
        assert!(!part_names(&bytes).iter().any(|n| n.starts_with("word/media/")));
    }
}
