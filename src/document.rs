//! In-memory document model: the output sink the assembler writes into.
//!
//! The model mirrors the primitives of a word-processor API (paragraphs made
//! of styled runs, page breaks, pictures, tab stops) and nothing more. The
//! assembler owns one [`Document`] for the duration of a report; serialisation
//! to `.docx` lives in [`crate::docx`].
//!
//! All lengths are in points.

use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An ordered sequence of blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

/// A top-level document block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    Paragraph(Paragraph),
    PageBreak,
}

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Named paragraph style understood by the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParagraphStyle {
    ListBullet,
}

/// Tab-stop alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabAlignment {
    Left,
    Right,
}

/// Character repeated up to a tab stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabLeader {
    None,
    Dots,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TabStop {
    pub position: f32,
    pub alignment: TabAlignment,
    pub leader: TabLeader,
}

/// A paragraph: runs plus paragraph-level formatting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub alignment: Alignment,
    pub style: Option<ParagraphStyle>,
    /// Line-spacing multiple (1.5 = one-and-a-half spacing).
    pub line_spacing: Option<f32>,
    pub space_before: Option<f32>,
    pub space_after: Option<f32>,
    pub left_indent: Option<f32>,
    /// Negative values produce a hanging indent.
    pub first_line_indent: Option<f32>,
    pub tab_stops: Vec<TabStop>,
}

/// A run of uniformly formatted text (or a picture).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    pub font: Option<String>,
    pub size: Option<f32>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Emit a line break after the text.
    pub line_break: bool,
    pub picture: Option<Picture>,
}

/// Image format of an embedded picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PictureFormat {
    Png,
    Jpeg,
}

/// An inline picture with its display size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Picture {
    pub source: PathBuf,
    pub format: PictureFormat,
    pub width: f32,
    pub height: f32,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl Picture {
    /// Load an image file and scale it to `width`, keeping the aspect ratio.
    pub fn load(path: &Path, width: f32) -> Result<Self, ReportError> {
        let fail = |detail: String| ReportError::PictureLoadFailed {
            path: path.to_path_buf(),
            detail,
        };

        let data = std::fs::read(path).map_err(|e| fail(e.to_string()))?;
        let format = match image::guess_format(&data).map_err(|e| fail(e.to_string()))? {
            image::ImageFormat::Png => PictureFormat::Png,
            image::ImageFormat::Jpeg => PictureFormat::Jpeg,
            other => return Err(fail(format!("unsupported image format {other:?}"))),
        };
        let (px_w, px_h) = image::load_from_memory(&data)
            .map(|img| (img.width(), img.height()))
            .map_err(|e| fail(e.to_string()))?;
        if px_w == 0 {
            return Err(fail("image has zero width".into()));
        }

        Ok(Self {
            source: path.to_path_buf(),
            format,
            width,
            height: width * px_h as f32 / px_w as f32,
            data,
        })
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an empty paragraph and return it for further mutation.
    pub fn add_paragraph(&mut self) -> &mut Paragraph {
        self.push_paragraph(Paragraph::default())
    }

    /// Append an already-built paragraph and return it.
    pub fn push_paragraph(&mut self, paragraph: Paragraph) -> &mut Paragraph {
        self.blocks.push(Block::Paragraph(paragraph));
        match self.blocks.last_mut() {
            Some(Block::Paragraph(p)) => p,
            _ => unreachable!("a paragraph was just pushed"),
        }
    }

    pub fn add_page_break(&mut self) {
        self.blocks.push(Block::PageBreak);
    }

    /// Append an empty paragraph that holds only a line break.
    pub fn add_blank_line(&mut self) {
        self.add_paragraph().add_run("").line_break = true;
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::PageBreak => None,
        })
    }

    pub fn page_break_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::PageBreak))
            .count()
    }

    /// Serialise to a `.docx` file at `path`.
    ///
    /// The package is written to a temp file in the same directory and
    /// persisted over `path` only once complete, so a failed write never
    /// leaves a truncated document behind.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        let path = path.as_ref();
        let write_failed = |source: std::io::Error| ReportError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(write_failed)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_failed)?;
        crate::docx::write_docx(self, tmp.as_file_mut())?;
        tmp.persist(path).map_err(|e| write_failed(e.error))?;
        Ok(())
    }
}

impl Paragraph {
    /// Append a run with the given text and return it.
    pub fn add_run(&mut self, text: impl Into<String>) -> &mut Run {
        self.runs.push(Run {
            text: text.into(),
            ..Run::default()
        });
        let last = self.runs.len() - 1;
        &mut self.runs[last]
    }

    /// Append a run holding only a picture.
    pub fn add_picture(&mut self, picture: Picture) -> &mut Run {
        let run = self.add_run("");
        run.picture = Some(picture);
        run
    }

    pub fn add_tab_stop(&mut self, position: f32, alignment: TabAlignment, leader: TabLeader) {
        self.tab_stops.push(TabStop {
            position,
            alignment,
            leader,
        });
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

impl Run {
    /// Set font family and size in one call.
    pub fn font(&mut self, family: &str, size: f32) -> &mut Self {
        self.font = Some(family.to_string());
        self.size = Some(size);
        self
    }

    pub fn bold(&mut self) -> &mut Self {
        self.bold = true;
        self
    }

    pub fn italic(&mut self) -> &mut Self {
        self.italic = true;
        self
    }

    pub fn underline(&mut self) -> &mut Self {
        self.underline = true;
        self
    }
}
