use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;
use crate::worksheet::layout::{LineBudgets, page_slice, sentences_per_page, total_pages};
use crate::worksheet::{LayoutKind, Worksheet};

/// Terminal approximation of the printed page: header chrome, one block
/// per sentence in the active layout, page footer. The export renderer is
/// the source of truth for exact geometry; this pane only has to be
/// faithful enough to proofread by.
pub struct WorksheetView<'a> {
    pub worksheet: &'a Worksheet,
    pub current_page: usize,
    pub budgets: &'a LineBudgets,
    pub date_label: &'a str,
    pub theme: &'a Theme,
}

impl WorksheetView<'_> {
    fn grid_row(cells: &[char], blank: bool) -> String {
        let mut row = String::from("│");
        for ch in cells {
            if blank || *ch == ' ' {
                row.push_str("　");
            } else {
                row.push(*ch);
            }
            row.push('│');
        }
        row
    }
}

impl Widget for &WorksheetView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let paper = Style::default().bg(colors.paper_bg()).fg(colors.paper_fg());

        let block = Block::bordered()
            .title(" 미리보기 ")
            .border_style(Style::default().fg(colors.border()))
            .style(paper);
        let inner = block.inner(area);
        block.render(area, buf);

        let per_page = sentences_per_page(&self.worksheet.options, self.budgets);
        let total = total_pages(self.worksheet.len(), per_page);
        let (start_index, sentences) =
            page_slice(self.worksheet.sentences(), self.current_page, per_page);

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(Span::styled(
            "받아쓰기 시험",
            paper.add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("{}    이름: ______________", self.date_label),
            paper,
        )));
        lines.push(Line::from(""));

        let practice = if self.worksheet.options.practice_enabled {
            self.worksheet.options.practice_lines
        } else {
            0
        };

        for (i, sentence) in sentences.iter().enumerate() {
            let ordinal = start_index + i + 1;
            match self.worksheet.options.kind {
                LayoutKind::Grid => {
                    let cells = Worksheet::grid_cells(sentence);
                    lines.push(Line::from(Span::styled(
                        format!("{ordinal:>2}. {}", WorksheetView::grid_row(&cells, false)),
                        paper,
                    )));
                    for _ in 0..practice {
                        lines.push(Line::from(Span::styled(
                            format!("    {}", WorksheetView::grid_row(&cells, true)),
                            paper,
                        )));
                    }
                }
                LayoutKind::Underline => {
                    lines.push(Line::from(Span::styled(
                        format!("{ordinal:>2}. {sentence}"),
                        paper,
                    )));
                    for _ in 0..practice {
                        lines.push(Line::from(Span::styled(
                            "    ──────────────────────",
                            paper,
                        )));
                    }
                }
            }
            lines.push(Line::from(""));
        }

        let footer_row = inner.y + inner.height.saturating_sub(1);
        lines.truncate((footer_row.saturating_sub(inner.y)) as usize);

        Paragraph::new(lines).render(inner, buf);

        let footer = Paragraph::new(Line::from(Span::styled(
            format!("- {} / {total} -", self.current_page),
            paper,
        )))
        .alignment(Alignment::Center);
        footer.render(Rect::new(inner.x, footer_row, inner.width, 1), buf);
    }
}
