//! Front matter: title page, bonafide certificate and table of contents.
//!
//! Rendered before the first chapter. The table of contents lists the plan's
//! chapters with page numbers estimated from each chapter's word budget.

use crate::config::{FrontMatter, Typography};
use crate::document::{Alignment, Document, Picture, Run, TabAlignment, TabLeader};
use crate::error::ReportError;
use crate::plan::ReportPlan;
use chrono::Local;

/// Tab stop for the signature and designation rows (4.5in).
const SIGNATURE_TAB: f32 = 324.0;
/// Tab stop for the examiner rows (4in).
const EXAMINER_TAB: f32 = 288.0;
const SIGNATURE_LINE: &str = "_____________________\t_____________________";

/// Render the title page, certificate and table of contents, each followed
/// by a page break.
pub fn render_front_matter(
    doc: &mut Document,
    report_title: &str,
    plan: &ReportPlan,
    words_per_page: u32,
    fm: &FrontMatter,
    t: &Typography,
) -> Result<(), ReportError> {
    let logo = match &fm.logo_path {
        Some(path) => Some(Picture::load(path, fm.logo_width_pt)?),
        None => None,
    };
    let date = fm
        .submission_date
        .clone()
        .unwrap_or_else(|| Local::now().format("%b %Y").to_string());

    title_page(doc, fm, t, logo.as_ref(), &date);
    doc.add_page_break();
    certificate(doc, report_title, fm, t, logo.as_ref());
    doc.add_page_break();
    table_of_contents(doc, plan, words_per_page, fm, t);
    doc.add_page_break();
    Ok(())
}

/// Start page of every chapter, then of every trailing entry.
///
/// Chapters start at `first_chapter_page` and occupy their estimated page
/// count; trailing entries take one page each after the last chapter.
pub fn toc_pages(plan: &ReportPlan, words_per_page: u32, fm: &FrontMatter) -> (Vec<u32>, Vec<u32>) {
    let mut page = fm.first_chapter_page;
    let chapters = plan
        .chapters
        .iter()
        .map(|c| {
            let start = page;
            page += c.estimated_pages(words_per_page);
            start
        })
        .collect();
    let trailing = (0..fm.toc_trailing.len() as u32).map(|i| page + i).collect();
    (chapters, trailing)
}

fn centered<'a>(doc: &'a mut Document, text: &str, font: &str, size: f32) -> &'a mut Run {
    let p = doc.add_paragraph();
    p.alignment = Alignment::Center;
    p.add_run(text).font(font, size)
}

fn title_page(
    doc: &mut Document,
    fm: &FrontMatter,
    t: &Typography,
    logo: Option<&Picture>,
    date: &str,
) {
    let font = t.font_family.as_str();

    {
        let p = doc.add_paragraph();
        p.alignment = Alignment::Center;
        p.line_spacing = Some(t.line_spacing);
        p.add_run("A PROJECT REPORT").font(font, 18.0).bold();
    }
    doc.add_blank_line();

    centered(doc, "Submitted by", font, 14.0).bold().italic();
    doc.add_blank_line();

    centered(doc, &fm.candidate, font, 16.0).bold();
    doc.add_blank_line();

    {
        let p = doc.add_paragraph();
        p.alignment = Alignment::Center;
        p.line_spacing = Some(t.line_spacing);
        p.add_run("in partial fulfillment for the award of the degree of")
            .font(font, 14.0)
            .bold()
            .italic();
    }
    doc.add_blank_line();

    centered(doc, &fm.degree, font, 16.0).bold();

    {
        let p = doc.add_paragraph();
        p.alignment = Alignment::Center;
        p.add_run("IN\n").font(font, 14.0);
        p.add_run(fm.branch.as_str()).font(font, 14.0);
    }
    doc.add_blank_line();

    if let Some(logo) = logo {
        let p = doc.add_paragraph();
        p.alignment = Alignment::Center;
        p.add_picture(logo.clone());
    }

    centered(doc, &fm.institution, font, 14.0);
    centered(doc, date, font, 14.0);
}

fn certificate(
    doc: &mut Document,
    report_title: &str,
    fm: &FrontMatter,
    t: &Typography,
    logo: Option<&Picture>,
) {
    let font = t.font_family.as_str();

    if let Some(logo) = logo {
        let p = doc.add_paragraph();
        p.alignment = Alignment::Center;
        p.add_picture(logo.clone());
    }
    doc.add_blank_line();

    centered(doc, "BONAFIDE CERTIFICATE", font, 16.0).bold();
    doc.add_blank_line();

    {
        let p = doc.add_paragraph();
        p.alignment = Alignment::Justify;
        p.add_run("Certified that this project report \"").font(font, 14.0);
        p.add_run(report_title).font(font, 14.0).bold();
        p.add_run("\" is the ").font(font, 14.0);
        p.add_run("bonafide").font(font, 14.0).underline();
        p.add_run(" work of \"").font(font, 14.0);
        p.add_run(fm.candidate.as_str()).font(font, 14.0).bold();
        p.add_run("\" who carried out the project work under my/our supervision.")
            .font(font, 14.0);
    }
    doc.add_blank_line();
    doc.add_blank_line();

    tabbed_row(doc, "SIGNATURE\tSIGNATURE", SIGNATURE_TAB, font, true);
    tabbed_row(doc, SIGNATURE_LINE, SIGNATURE_TAB, font, false);
    tabbed_row(doc, "HEAD OF THE DEPARTMENT\tSUPERVISOR", SIGNATURE_TAB, font, true);
    doc.add_blank_line();
    doc.add_blank_line();

    {
        let p = doc.add_paragraph();
        p.add_run("Submitted for the project ").font(font, 12.0);
        p.add_run("viva-voce").font(font, 12.0).underline();
        p.add_run(" examination held on _________________").font(font, 12.0);
    }
    doc.add_blank_line();

    tabbed_row(doc, SIGNATURE_LINE, EXAMINER_TAB, font, false);
    tabbed_row(doc, "INTERNAL EXAMINER\tEXTERNAL EXAMINER", EXAMINER_TAB, font, true);
}

fn tabbed_row(doc: &mut Document, text: &str, tab: f32, font: &str, bold: bool) {
    let p = doc.add_paragraph();
    p.add_tab_stop(tab, TabAlignment::Left, TabLeader::None);
    let run = p.add_run(text).font(font, 12.0);
    if bold {
        run.bold();
    }
}

fn table_of_contents(
    doc: &mut Document,
    plan: &ReportPlan,
    words_per_page: u32,
    fm: &FrontMatter,
    t: &Typography,
) {
    let font = t.font_family.as_str();
    centered(doc, "TABLE OF CONTENTS", font, 16.0).bold().underline();
    doc.add_paragraph();

    for (title, page) in &fm.toc_lists {
        toc_entry(doc, title, *page, 12.0, false, fm, t);
    }
    doc.add_paragraph();

    let (chapter_pages, trailing_pages) = toc_pages(plan, words_per_page, fm);

    for (chapter, page) in plan.chapters.iter().zip(chapter_pages) {
        toc_entry(doc, &chapter.title, page, 14.0, true, fm, t);
        for section in &chapter.sections {
            let label = format!("{}. {}", section.key, section.title);
            toc_entry(doc, &label, page, 12.0, false, fm, t);
        }
        doc.add_paragraph();
    }

    for (entry, page) in fm.toc_trailing.iter().zip(trailing_pages) {
        toc_entry(doc, &entry.title, page, 14.0, true, fm, t);
        for sub in &entry.subsections {
            toc_entry(doc, sub, page, 12.0, false, fm, t);
        }
        doc.add_paragraph();
    }
}

fn toc_entry(
    doc: &mut Document,
    text: &str,
    page: u32,
    size: f32,
    bold: bool,
    fm: &FrontMatter,
    t: &Typography,
) {
    let p = doc.add_paragraph();
    p.add_tab_stop(fm.toc_tab_position, TabAlignment::Right, TabLeader::Dots);
    let run = p.add_run(text).font(&t.font_family, size);
    if bold {
        run.bold();
    }
    p.add_run(format!("\t{page}")).font(&t.font_family, size);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportLayout;
    use crate::document::Paragraph;
    use crate::plan::allocate;

    fn render(fm: &FrontMatter) -> Document {
        let layout = ReportLayout::default();
        let plan = allocate(10, &layout);
        let mut doc = Document::new();
        render_front_matter(
            &mut doc,
            "Smart Irrigation System",
            &plan,
            layout.words_per_page,
            fm,
            &Typography::default(),
        )
        .unwrap();
        doc
    }

    fn fixed_date() -> FrontMatter {
        FrontMatter {
            submission_date: Some("Oct 2026".into()),
            ..FrontMatter::default()
        }
    }

    #[test]
    fn three_pages_of_front_matter() {
        let doc = render(&fixed_date());
        assert_eq!(doc.page_break_count(), 3);
        assert!(matches!(doc.blocks.last(), Some(crate::document::Block::PageBreak)));
    }

    #[test]
    fn title_page_text() {
        let doc = render(&fixed_date());
        let texts: Vec<String> = doc.paragraphs().map(Paragraph::text).collect();
        assert_eq!(texts[0], "A PROJECT REPORT");
        assert!(texts.contains(&"[NAME OF THE CANDIDATE(S)]".to_string()));
        assert!(texts.contains(&"Chandigarh University".to_string()));
        assert!(texts.contains(&"Oct 2026".to_string()));
        assert!(texts.contains(&"IN\n[BRANCH OF STUDY]".to_string()));
    }

    #[test]
    fn default_date_is_month_year() {
        let doc = render(&FrontMatter::default());
        let expected = Local::now().format("%b %Y").to_string();
        assert!(doc.paragraphs().any(|p| p.text() == expected));
    }

    #[test]
    fn certificate_names_report_in_bold() {
        let doc = render(&fixed_date());
        let cert = doc
            .paragraphs()
            .find(|p| p.text().starts_with("Certified that"))
            .expect("certificate paragraph");
        assert_eq!(cert.alignment, Alignment::Justify);
        let title_run = cert
            .runs
            .iter()
            .find(|r| r.text == "Smart Irrigation System")
            .unwrap();
        assert!(title_run.bold);
        assert!(cert.runs.iter().any(|r| r.text == "bonafide" && r.underline));
        assert!(cert.text().contains("\"Smart Irrigation System\" is the bonafide work of"));
    }

    #[test]
    fn toc_pages_follow_chapter_budgets() {
        let layout = ReportLayout::default();
        let plan = allocate(10, &layout);
        // Chapter words 450, 750, 750, 600, 450 at 300 words per page.
        let (chapters, trailing) = toc_pages(&plan, 300, &FrontMatter::default());
        assert_eq!(chapters, vec![11, 13, 16, 19, 21]);
        assert_eq!(trailing, vec![23, 24, 25]);
    }

    #[test]
    fn toc_entries_have_right_dot_leader_tab() {
        let doc = render(&fixed_date());
        let entry = doc
            .paragraphs()
            .find(|p| p.text().starts_with("CHAPTER 1. INTRODUCTION"))
            .expect("chapter entry");
        assert_eq!(entry.text(), "CHAPTER 1. INTRODUCTION\t11");
        assert!(entry.runs[0].bold);
        let tab = entry.tab_stops[0];
        assert_eq!(tab.position, 468.0);
        assert_eq!(tab.alignment, TabAlignment::Right);
        assert_eq!(tab.leader, TabLeader::Dots);

        assert!(doc.paragraphs().any(|p| p.text() == "1.4. Timeline\t11"));
        assert!(doc.paragraphs().any(|p| p.text() == "1. Plagiarism Report\t24"));
    }

    #[test]
    fn missing_logo_fails() {
        let fm = FrontMatter {
            logo_path: Some("/no/such/logo.png".into()),
            ..fixed_date()
        };
        let layout = ReportLayout::default();
        let plan = allocate(10, &layout);
        let mut doc = Document::new();
        let err = render_front_matter(&mut doc, "X", &plan, 300, &fm, &Typography::default())
            .unwrap_err();
        assert!(matches!(err, ReportError::PictureLoadFailed { .. }));
    }
}
