//! Page composition as data. `page_ops` maps one page of the worksheet to a
//! flat list of draw primitives in millimetre coordinates (A4, origin at the
//! top-left corner, y growing downward). The raster backend consumes the
//! list; keeping this side-effect free is what makes the layout testable
//! without a font or a canvas.

use crate::worksheet::layout::LineBudgets;
use crate::worksheet::{LayoutKind, SheetOptions, Worksheet};

/// A4 portrait in millimetres.
pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// Printable margin, 1.5cm on every side.
pub const MARGIN_MM: f32 = 15.0;

pub const TITLE_FONT_PT: f32 = 26.0;
pub const HEADER_FONT_PT: f32 = 12.0;
pub const CELL_FONT_PT: f32 = 16.0;
pub const ORDINAL_FONT_PT: f32 = 12.0;
pub const FOOTER_FONT_PT: f32 = 9.0;

/// Width reserved for the `N.` ordinal column left of each row.
const ORDINAL_COL_MM: f32 = 10.0;
/// Vertical gap between rows of one sentence group.
const ROW_GAP_MM: f32 = 1.0;
/// Height of the title + date/name header block.
const HEADER_BLOCK_MM: f32 = 34.0;
/// Height reserved for the page-number footer.
const FOOTER_BLOCK_MM: f32 = 8.0;

const GRID_LINE_MM: f32 = 0.25;
const RULE_LINE_MM: f32 = 0.5;

pub const SHEET_TITLE: &str = "받아쓰기 시험";
pub const NAME_BLANK: &str = "이름: ______________";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    Left,
    Center,
    Right,
}

/// One draw primitive. All lines on the worksheet are axis-aligned.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width_mm: f32,
    },
    Text {
        text: String,
        size_pt: f32,
        /// Anchor point; `y` is the top of the text box.
        x: f32,
        y: f32,
        anchor: Anchor,
    },
}

/// Everything needed to draw one page. The date label is passed in as data:
/// it is formatted once per render pass by the caller and stays an empty
/// placeholder until then.
pub struct PageSpec<'a> {
    pub sentences: &'a [String],
    pub start_index: usize,
    pub page_number: usize,
    pub total_pages: usize,
    pub options: SheetOptions,
    pub date_label: &'a str,
}

fn content_width() -> f32 {
    PAGE_WIDTH_MM - 2.0 * MARGIN_MM
}

fn body_height() -> f32 {
    PAGE_HEIGHT_MM - 2.0 * MARGIN_MM - HEADER_BLOCK_MM - FOOTER_BLOCK_MM
}

/// Vertical distance from one display line to the next, derived from the
/// page's line budget so a full page exactly fills the body.
fn row_pitch(kind: LayoutKind, budgets: &LineBudgets) -> f32 {
    body_height() / budgets.for_kind(kind) as f32
}

pub fn page_ops(spec: &PageSpec, budgets: &LineBudgets) -> Vec<DrawOp> {
    let mut ops = Vec::new();

    header_ops(spec, &mut ops);

    let pitch = row_pitch(spec.options.kind, budgets);
    let mut y = MARGIN_MM + HEADER_BLOCK_MM;

    for (i, sentence) in spec.sentences.iter().enumerate() {
        let ordinal = spec.start_index + i + 1;
        match spec.options.kind {
            LayoutKind::Grid => {
                grid_row_ops(sentence, Some(ordinal), y, pitch, &mut ops);
                y += pitch;
                if spec.options.practice_enabled {
                    for _ in 0..spec.options.practice_lines {
                        grid_row_ops("", None, y, pitch, &mut ops);
                        y += pitch;
                    }
                }
            }
            LayoutKind::Underline => {
                underline_row_ops(Some((sentence.as_str(), ordinal)), y, pitch, &mut ops);
                y += pitch;
                if spec.options.practice_enabled {
                    for _ in 0..spec.options.practice_lines {
                        underline_row_ops(None, y, pitch, &mut ops);
                        y += pitch;
                    }
                }
            }
        }
    }

    footer_ops(spec, &mut ops);
    ops
}

fn header_ops(spec: &PageSpec, ops: &mut Vec<DrawOp>) {
    ops.push(DrawOp::Text {
        text: SHEET_TITLE.to_string(),
        size_pt: TITLE_FONT_PT,
        x: PAGE_WIDTH_MM / 2.0,
        y: MARGIN_MM,
        anchor: Anchor::Center,
    });
    let info_y = MARGIN_MM + 20.0;
    ops.push(DrawOp::Text {
        text: spec.date_label.to_string(),
        size_pt: HEADER_FONT_PT,
        x: MARGIN_MM,
        y: info_y,
        anchor: Anchor::Left,
    });
    ops.push(DrawOp::Text {
        text: NAME_BLANK.to_string(),
        size_pt: HEADER_FONT_PT,
        x: PAGE_WIDTH_MM - MARGIN_MM,
        y: info_y,
        anchor: Anchor::Right,
    });
}

fn footer_ops(spec: &PageSpec, ops: &mut Vec<DrawOp>) {
    ops.push(DrawOp::Text {
        text: format!("- {} / {} -", spec.page_number, spec.total_pages),
        size_pt: FOOTER_FONT_PT,
        x: PAGE_WIDTH_MM / 2.0,
        y: PAGE_HEIGHT_MM - MARGIN_MM - FOOTER_BLOCK_MM / 2.0,
        anchor: Anchor::Center,
    });
}

/// One 11-cell grid row. `ordinal` is None for practice rows, which carry
/// no number and no characters.
fn grid_row_ops(sentence: &str, ordinal: Option<usize>, y: f32, pitch: f32, ops: &mut Vec<DrawOp>) {
    let cell_h = pitch - ROW_GAP_MM;
    let grid_x0 = MARGIN_MM + ORDINAL_COL_MM;
    let grid_w = content_width() - ORDINAL_COL_MM;
    let cell_w = grid_w / crate::worksheet::MAX_UNITS as f32;

    if let Some(n) = ordinal {
        ops.push(DrawOp::Text {
            text: format!("{n}."),
            size_pt: ORDINAL_FONT_PT,
            x: MARGIN_MM,
            y: y + (cell_h - 5.0) / 2.0,
            anchor: Anchor::Left,
        });
    }

    // Cell borders: 12 verticals, 2 horizontals
    for i in 0..=crate::worksheet::MAX_UNITS {
        let x = grid_x0 + i as f32 * cell_w;
        ops.push(DrawOp::Line {
            x1: x,
            y1: y,
            x2: x,
            y2: y + cell_h,
            width_mm: GRID_LINE_MM,
        });
    }
    for edge_y in [y, y + cell_h] {
        ops.push(DrawOp::Line {
            x1: grid_x0,
            y1: edge_y,
            x2: grid_x0 + grid_w,
            y2: edge_y,
            width_mm: GRID_LINE_MM,
        });
    }

    if ordinal.is_some() {
        for (i, ch) in Worksheet::grid_cells(sentence).into_iter().enumerate() {
            if ch == ' ' {
                continue;
            }
            ops.push(DrawOp::Text {
                text: ch.to_string(),
                size_pt: CELL_FONT_PT,
                x: grid_x0 + (i as f32 + 0.5) * cell_w,
                y: y + (cell_h - 7.0) / 2.0,
                anchor: Anchor::Center,
            });
        }
    }
}

/// A sentence written along a rule, or a blank practice rule.
fn underline_row_ops(
    sentence: Option<(&str, usize)>,
    y: f32,
    pitch: f32,
    ops: &mut Vec<DrawOp>,
) {
    let rule_y = y + pitch - ROW_GAP_MM - 2.0;
    let line_x0 = MARGIN_MM + ORDINAL_COL_MM;

    if let Some((text, n)) = sentence {
        ops.push(DrawOp::Text {
            text: format!("{n}."),
            size_pt: ORDINAL_FONT_PT,
            x: MARGIN_MM,
            y: rule_y - 8.0,
            anchor: Anchor::Left,
        });
        ops.push(DrawOp::Text {
            text: text.to_string(),
            size_pt: CELL_FONT_PT,
            x: line_x0 + 2.0,
            y: rule_y - 9.0,
            anchor: Anchor::Left,
        });
    }

    ops.push(DrawOp::Line {
        x1: line_x0,
        y1: rule_y,
        x2: PAGE_WIDTH_MM - MARGIN_MM,
        y2: rule_y,
        width_mm: RULE_LINE_MM,
    });
}
