mod app;
mod config;
mod event;
mod export;
mod gateway;
mod render;
mod store;
mod ui;
mod worksheet;

use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use app::{App, AppScreen, StatusKind};
use event::{AppEvent, EventHandler};
use export::ExportFormat;
use ui::components::generate_form::{FormResult, GenerateFormView};
use ui::components::sentence_list::SentenceList;
use ui::components::worksheet_view::WorksheetView;
use ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use ui::line_input::InputResult;
use worksheet::{LayoutKind, MAX_UNITS};

#[derive(Parser)]
#[command(
    name = "badasseugi",
    version,
    about = "Dictation worksheet builder for Korean elementary classrooms"
)]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Worksheet layout (grid, underline)")]
    layout: Option<String>,

    #[arg(short, long, help = "Load sentences from a file, one per line")]
    sentences: Option<String>,

    #[arg(short, long, help = "Directory exported files are written to")]
    export_dir: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let events = EventHandler::new(Duration::from_millis(100));
    let mut app = App::new(events.sender());

    if let Some(theme_name) = cli.theme
        && let Some(theme) = ui::theme::Theme::load(&theme_name)
    {
        let theme: &'static ui::theme::Theme = Box::leak(Box::new(theme));
        app.theme = theme;
    }
    if let Some(layout) = cli.layout {
        match LayoutKind::from_name(&layout) {
            Some(kind) => app.worksheet.options.kind = kind,
            None => anyhow::bail!("unknown layout {layout:?} (expected grid or underline)"),
        }
    }
    if let Some(dir) = cli.export_dir {
        app.config.export_dir = dir;
    }
    if let Some(path) = cli.sentences {
        let block = std::fs::read_to_string(&path)?;
        if let Err(e) = app.worksheet.add_lines(&block) {
            anyhow::bail!("{path}: {e}");
        }
        if !app.worksheet.is_empty() {
            app.selected = Some(0);
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => {}
            AppEvent::Resize(_, _) => {}
            AppEvent::Generated(result) => app.on_generated(result),
            AppEvent::Synthesized { sentence, result } => app.on_synthesized(sentence, result),
            AppEvent::Exported(result) => app.on_exported(result),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    // A new keypress consumes the previous status message.
    app.status = None;

    match app.screen {
        AppScreen::Editor => handle_editor_key(app, key),
        AppScreen::Generate => handle_generate_key(app, key),
        AppScreen::Settings => handle_settings_key(app, key),
    }
}

fn handle_editor_key(app: &mut App, key: KeyEvent) {
    // Input overlay swallows everything while open.
    if let Some((_, ref mut input)) = app.input {
        match input.handle(key) {
            InputResult::Submit => app.submit_input(),
            InputResult::Cancel => app.cancel_input(),
            InputResult::Continue => {}
        }
        return;
    }

    match key.code {
        // Esc only dismisses status/overlays; quitting is deliberate.
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('a') => app.open_add_input(),
        KeyCode::Char('e') => app.open_edit_input(),
        KeyCode::Char('d') | KeyCode::Delete => app.remove_selected(),
        KeyCode::Char('D') => app.clear_sentences(),
        KeyCode::Char('g') => app.screen = AppScreen::Generate,
        KeyCode::Char('s') => app.screen = AppScreen::Settings,
        KeyCode::Char('t') => app.toggle_layout(),
        KeyCode::Char('p') => app.toggle_practice(),
        KeyCode::Char('v') => app.start_synthesize(),
        KeyCode::Char('V') => app.start_synthesize_all(),
        KeyCode::Char('1') => app.start_export(ExportFormat::Pdf),
        KeyCode::Char('2') => app.start_export(ExportFormat::Png),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_page(),
        KeyCode::Right | KeyCode::Char('l') => app.next_page(),
        _ => {}
    }
}

fn handle_generate_key(app: &mut App, key: KeyEvent) {
    match app.generate_form.handle(key) {
        FormResult::Submit => app.start_generate(),
        FormResult::Cancel => {
            if !app.generating {
                app.screen = AppScreen::Editor;
            }
        }
        FormResult::Continue => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            let _ = app.config.save();
            app.screen = AppScreen::Editor;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.settings_selected = app.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.settings_selected =
                (app.settings_selected + 1).min(App::SETTINGS_FIELDS.len() - 1);
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.settings_cycle(true),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle(false),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = AppLayout::new(area);

    render_header(frame, app, layout.header);
    render_footer(frame, app, layout.footer);

    let list = SentenceList {
        worksheet: &app.worksheet,
        selected: app.selected,
        focused: app.input.is_none() && app.screen == AppScreen::Editor,
        theme: app.theme,
    };
    frame.render_widget(&list, layout.main);

    if let Some(preview_area) = layout.preview {
        let budgets = app.config.line_budgets();
        let date_label = app.date_label();
        let preview = WorksheetView {
            worksheet: &app.worksheet,
            current_page: app.current_page,
            budgets: &budgets,
            date_label: &date_label,
            theme: app.theme,
        };
        frame.render_widget(&preview, preview_area);
    }

    match app.screen {
        AppScreen::Editor => {
            if app.input.is_some() {
                render_input_popup(frame, app);
            }
        }
        AppScreen::Generate => {
            let popup = centered_rect(50, 60, area);
            let view = GenerateFormView {
                form: &app.generate_form,
                busy: app.generating,
                theme: app.theme,
            };
            frame.render_widget(&view, popup);
        }
        AppScreen::Settings => render_settings(frame, app),
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;
    let kind = match app.worksheet.options.kind {
        LayoutKind::Grid => "원고지",
        LayoutKind::Underline => "밑줄",
    };
    let busy = if app.generating {
        " | 생성 중..."
    } else if app.synthesizing {
        " | 음성 합성 중..."
    } else if app.exporting {
        " | 내보내는 중..."
    } else {
        ""
    };
    let info = format!(
        " 문장 {} | {kind} | {} / {}쪽{busy}",
        app.worksheet.len(),
        app.current_page,
        app.total_pages(),
    );
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " 받아쓰기 ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info,
            Style::default().fg(colors.text_dim()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;

    if let Some(ref status) = app.status {
        let color = match status.kind {
            StatusKind::Info => colors.warning(),
            StatusKind::Success => colors.success(),
            StatusKind::Error => colors.error(),
        };
        let line = Paragraph::new(Line::from(Span::styled(
            format!("  {}", status.message),
            Style::default().fg(color),
        )));
        frame.render_widget(line, area);
        return;
    }

    let hints = [
        "[a] 추가",
        "[e] 수정",
        "[d] 삭제",
        "[g] AI 생성",
        "[v] 음성",
        "[V] 전체 음성",
        "[t] 레이아웃",
        "[1] PDF",
        "[2] PNG",
        "[s] 설정",
        "[q] 종료",
    ];
    let lines: Vec<Line> = pack_hint_lines(&hints, area.width as usize)
        .into_iter()
        .take(area.height as usize)
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.text_dim()))))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_input_popup(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let Some((_, ref input)) = app.input else {
        return;
    };

    let area = centered_rect(50, 20, frame.area());
    let area = ratatui::layout::Rect {
        height: 3.min(area.height),
        ..area
    };
    frame.render_widget(Clear, area);

    let block = Block::bordered()
        .title(format!(" 문장 입력 (최대 {MAX_UNITS}자) "))
        .border_style(Style::default().fg(colors.border_focused()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let (before, cursor_char, after) = input.render_parts();
    let mut spans = vec![Span::styled(
        format!(" {before}"),
        Style::default().fg(colors.fg()),
    )];
    match cursor_char {
        Some(ch) => spans.push(Span::styled(
            ch.to_string(),
            Style::default().fg(colors.bg()).bg(colors.fg()),
        )),
        None => spans.push(Span::styled(" ", Style::default().bg(colors.fg()))),
    }
    spans.push(Span::styled(
        after.to_string(),
        Style::default().fg(colors.fg()),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}

fn render_settings(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let area = centered_rect(50, 60, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::bordered()
        .title(" 설정 ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let values = [
        match app.worksheet.options.kind {
            LayoutKind::Grid => "원고지".to_string(),
            LayoutKind::Underline => "밑줄".to_string(),
        },
        if app.worksheet.options.practice_enabled {
            "켬".to_string()
        } else {
            "끔".to_string()
        },
        app.worksheet.options.practice_lines.to_string(),
        app.config.export_dpi.to_string(),
    ];

    let mut lines = vec![Line::from("")];
    for (i, (label, value)) in App::SETTINGS_FIELDS.iter().zip(values.iter()).enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { ">" } else { " " };
        let style = Style::default()
            .fg(if is_selected { colors.accent() } else { colors.fg() })
            .add_modifier(if is_selected {
                Modifier::BOLD
            } else {
                Modifier::empty()
            });
        lines.push(Line::from(Span::styled(
            format!(" {indicator} {label}: < {value} >"),
            style,
        )));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "  [←/→] 변경  [Esc] 저장 후 닫기",
        Style::default().fg(colors.text_dim()),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}
