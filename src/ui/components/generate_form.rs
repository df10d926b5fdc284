use crossterm::event::{KeyCode, KeyEvent};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use crate::gateway::{Difficulty, SentenceLanguage, SentenceRequest};
use crate::ui::line_input::{InputResult, LineInput};
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Language,
    Grade,
    Goal,
    Difficulty,
    Count,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormResult {
    Continue,
    Submit,
    Cancel,
}

pub struct GenerateForm {
    pub language: SentenceLanguage,
    pub grade_level: u8,
    pub goal: LineInput,
    pub difficulty: Difficulty,
    pub sentence_count: usize,
    pub focused: FormField,
}

impl GenerateForm {
    pub fn new() -> Self {
        Self {
            language: SentenceLanguage::Korean,
            grade_level: 1,
            goal: LineInput::new(""),
            difficulty: Difficulty::Normal,
            sentence_count: 10,
            focused: FormField::Goal,
        }
    }

    pub fn request(&self) -> SentenceRequest {
        SentenceRequest {
            grade_level: self.grade_level,
            goal: self.goal.value().trim().to_string(),
            difficulty: self.difficulty,
            sentence_count: self.sentence_count,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.goal.value().trim().is_empty()
    }

    fn focus_next(&mut self) {
        self.focused = match self.focused {
            FormField::Language => FormField::Grade,
            FormField::Grade => FormField::Goal,
            FormField::Goal => FormField::Difficulty,
            FormField::Difficulty => FormField::Count,
            FormField::Count => FormField::Language,
        };
    }

    fn focus_prev(&mut self) {
        self.focused = match self.focused {
            FormField::Language => FormField::Count,
            FormField::Grade => FormField::Language,
            FormField::Goal => FormField::Grade,
            FormField::Difficulty => FormField::Goal,
            FormField::Count => FormField::Difficulty,
        };
    }

    fn adjust(&mut self, up: bool) {
        match self.focused {
            FormField::Language => {
                self.language = match self.language {
                    SentenceLanguage::Korean => SentenceLanguage::English,
                    SentenceLanguage::English => SentenceLanguage::Korean,
                };
            }
            FormField::Grade => {
                self.grade_level = if up {
                    (self.grade_level % 6) + 1
                } else if self.grade_level <= 1 {
                    6
                } else {
                    self.grade_level - 1
                };
            }
            FormField::Difficulty => {
                // Three states; one direction of cycling is enough.
                self.difficulty = self.difficulty.cycle();
            }
            FormField::Count => {
                self.sentence_count = if up {
                    (self.sentence_count + 1).min(30)
                } else {
                    self.sentence_count.saturating_sub(1).max(1)
                };
            }
            FormField::Goal => {}
        }
    }

    pub fn handle(&mut self, key: KeyEvent) -> FormResult {
        if self.focused == FormField::Goal {
            match key.code {
                KeyCode::Tab | KeyCode::Down => {
                    self.focus_next();
                    return FormResult::Continue;
                }
                KeyCode::BackTab | KeyCode::Up => {
                    self.focus_prev();
                    return FormResult::Continue;
                }
                _ => {}
            }
            return match self.goal.handle(key) {
                InputResult::Submit => FormResult::Submit,
                InputResult::Cancel => FormResult::Cancel,
                InputResult::Continue => FormResult::Continue,
            };
        }

        match key.code {
            KeyCode::Esc => FormResult::Cancel,
            KeyCode::Enter => FormResult::Submit,
            KeyCode::Tab | KeyCode::Down => {
                self.focus_next();
                FormResult::Continue
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_prev();
                FormResult::Continue
            }
            KeyCode::Left => {
                self.adjust(false);
                FormResult::Continue
            }
            KeyCode::Right | KeyCode::Char(' ') => {
                self.adjust(true);
                FormResult::Continue
            }
            _ => FormResult::Continue,
        }
    }
}

pub struct GenerateFormView<'a> {
    pub form: &'a GenerateForm,
    pub busy: bool,
    pub theme: &'a Theme,
}

impl GenerateFormView<'_> {
    fn field_line<'s>(
        &self,
        field: FormField,
        label: &str,
        value: String,
    ) -> Line<'s> {
        let colors = &self.theme.colors;
        let focused = self.form.focused == field;
        let marker = if focused { ">" } else { " " };
        let style = if focused {
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.fg())
        };
        Line::from(Span::styled(format!(" {marker} {label}: {value}"), style))
    }
}

impl Widget for &GenerateFormView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let form = self.form;

        Clear.render(area, buf);
        let block = Block::bordered()
            .title(" AI 문장 생성 ")
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let language = match form.language {
            SentenceLanguage::Korean => "한국어",
            SentenceLanguage::English => "영어",
        };
        let goal_display = if form.goal.value().is_empty() && form.focused != FormField::Goal {
            "(예: 받침 있는 글자)".to_string()
        } else {
            form.goal.value().to_string()
        };

        let mut lines = vec![
            Line::from(""),
            self.field_line(FormField::Language, "언어", language.to_string()),
            self.field_line(FormField::Grade, "학년", format!("{}학년", form.grade_level)),
            self.field_line(FormField::Goal, "학습 목표", goal_display),
            self.field_line(
                FormField::Difficulty,
                "난이도",
                form.difficulty.as_korean().to_string(),
            ),
            self.field_line(FormField::Count, "문장 수", form.sentence_count.to_string()),
            Line::from(""),
        ];

        if self.busy {
            lines.push(Line::from(Span::styled(
                "  문장을 생성하는 중...",
                Style::default().fg(colors.warning()),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "  [Enter] 생성  [Tab] 다음 항목  [Esc] 닫기",
                Style::default().fg(colors.text_dim()),
            )));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_focus_cycles_through_all_fields() {
        let mut form = GenerateForm::new();
        let start = form.focused;
        for _ in 0..5 {
            form.handle(key(KeyCode::Tab));
        }
        assert_eq!(form.focused, start);
    }

    #[test]
    fn test_grade_wraps_one_to_six() {
        let mut form = GenerateForm::new();
        form.focused = FormField::Grade;
        form.handle(key(KeyCode::Left));
        assert_eq!(form.grade_level, 6);
        form.handle(key(KeyCode::Right));
        assert_eq!(form.grade_level, 1);
    }

    #[test]
    fn test_count_clamps() {
        let mut form = GenerateForm::new();
        form.focused = FormField::Count;
        form.sentence_count = 1;
        form.handle(key(KeyCode::Left));
        assert_eq!(form.sentence_count, 1);
        form.sentence_count = 30;
        form.handle(key(KeyCode::Right));
        assert_eq!(form.sentence_count, 30);
    }

    #[test]
    fn test_goal_field_receives_text() {
        let mut form = GenerateForm::new();
        assert_eq!(form.focused, FormField::Goal);
        form.handle(key(KeyCode::Char('받')));
        form.handle(key(KeyCode::Char('침')));
        assert_eq!(form.goal.value(), "받침");
        assert!(form.is_complete());
    }

    #[test]
    fn test_enter_submits_esc_cancels() {
        let mut form = GenerateForm::new();
        assert_eq!(form.handle(key(KeyCode::Enter)), FormResult::Submit);
        assert_eq!(form.handle(key(KeyCode::Esc)), FormResult::Cancel);
    }
}
