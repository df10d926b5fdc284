//! Turns the worksheet into files on disk. Pages are rasterized strictly
//! one after another on a single reused surface, then either composited
//! into one A4 PDF or written out as numbered PNGs. Any per-page failure
//! aborts the whole export; nothing partial is left behind because output
//! is only written after every page rendered.

pub mod pdf;
pub mod png;

use std::path::{Path, PathBuf};

use image::RgbImage;
use thiserror::Error;

use crate::render::fonts::{self, FontError};
use crate::render::geometry::{self, PageSpec};
use crate::render::raster::RasterSurface;
use crate::worksheet::Worksheet;
use crate::worksheet::layout::{self, LineBudgets};

pub const PDF_FILE_NAME: &str = "받아쓰기_학습지.pdf";
pub const PNG_FILE_STEM: &str = "받아쓰기_학습지";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Png,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "PDF",
            ExportFormat::Png => "PNG",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("추가된 문장이 없습니다")]
    EmptySheet,
    #[error(transparent)]
    Font(#[from] FontError),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("PNG encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("PDF assembly failed: {0}")]
    Pdf(String),
}

pub struct ExportOutcome {
    pub files: Vec<PathBuf>,
    pub pages: usize,
}

pub struct ExportRequest<'a> {
    pub worksheet: &'a Worksheet,
    pub budgets: LineBudgets,
    pub dpi: u32,
    pub out_dir: &'a Path,
    pub format: ExportFormat,
    /// Formatted once by the caller at export time.
    pub date_label: &'a str,
    pub font_path: Option<&'a Path>,
}

pub fn export_worksheet(req: &ExportRequest) -> Result<ExportOutcome, ExportError> {
    if req.worksheet.is_empty() {
        return Err(ExportError::EmptySheet);
    }

    let font = fonts::load_font(req.font_path)?;
    let pages = rasterize_pages(req, &font)?;

    let files = match req.format {
        ExportFormat::Pdf => {
            let path = req.out_dir.join(PDF_FILE_NAME);
            pdf::write_pdf(&pages, req.dpi, &path)?;
            vec![path]
        }
        ExportFormat::Png => png::write_pngs(&pages, req.out_dir)?,
    };

    Ok(ExportOutcome {
        pages: pages.len(),
        files,
    })
}

/// Render every page in ascending order on one shared surface. The surface
/// is dropped on all exit paths; page buffers are cloned out because the
/// surface is reused.
fn rasterize_pages(
    req: &ExportRequest,
    font: &ab_glyph::FontVec,
) -> Result<Vec<RgbImage>, ExportError> {
    let options = req.worksheet.options;
    let per_page = layout::sentences_per_page(&options, &req.budgets);
    let total = layout::total_pages(req.worksheet.len(), per_page);

    let mut surface = RasterSurface::new(req.dpi);
    let mut pages = Vec::with_capacity(total);
    for page_number in 1..=total {
        let (start_index, slice) =
            layout::page_slice(req.worksheet.sentences(), page_number, per_page);
        let spec = PageSpec {
            sentences: slice,
            start_index,
            page_number,
            total_pages: total,
            options,
            date_label: req.date_label,
        };
        let ops = geometry::page_ops(&spec, &req.budgets);
        pages.push(surface.render(&ops, font).clone());
    }
    Ok(pages)
}
