use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;
use crate::worksheet::{MAX_UNITS, Worksheet, display_units};

pub struct SentenceList<'a> {
    pub worksheet: &'a Worksheet,
    pub selected: Option<usize>,
    pub focused: bool,
    pub theme: &'a Theme,
}

impl Widget for &SentenceList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let border = if self.focused {
            colors.border_focused()
        } else {
            colors.border()
        };
        let title = format!(" 문장 ({}) ", self.worksheet.sentences().len());
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.worksheet.sentences().is_empty() {
            let hint = Paragraph::new(Line::from(Span::styled(
                "  [a] 직접 입력  [g] AI 생성",
                Style::default().fg(colors.text_dim()),
            )));
            hint.render(inner, buf);
            return;
        }

        // Keep the selected row visible in tall lists.
        let visible = inner.height as usize;
        let selected = self.selected.unwrap_or(0);
        let scroll = selected.saturating_sub(visible.saturating_sub(1));

        let mut lines: Vec<Line> = Vec::new();
        for (i, sentence) in self
            .worksheet
            .sentences()
            .iter()
            .enumerate()
            .skip(scroll)
            .take(visible)
        {
            let is_selected = self.selected == Some(i);
            let units = display_units(sentence);
            let row = format!(
                " {marker}{ordinal:>2}. {sentence}  ({units}/{MAX_UNITS})",
                marker = if is_selected { ">" } else { " " },
                ordinal = i + 1,
            );
            let style = if is_selected {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            lines.push(Line::from(Span::styled(row, style)));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}
