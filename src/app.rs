use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use chrono::{Datelike, Local};

use crate::config::Config;
use crate::event::AppEvent;
use crate::export::{
    ExportError, ExportFormat, ExportOutcome, ExportRequest, export_worksheet,
};
use crate::gateway::{AiGateway, GatewayError, SentenceLanguage, SentenceRequest};
use crate::store::audio_cache::{AudioCacheData, AudioStore};
use crate::ui::components::generate_form::GenerateForm;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;
use crate::worksheet::layout::{clamp_page, sentences_per_page, total_pages};
use crate::worksheet::{SheetOptions, Worksheet};

pub const AUDIO_FILE_NAME: &str = "받아쓰기_음성.wav";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Editor,
    Generate,
    Settings,
}

/// What the editor's input overlay is for, when it is open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputTarget {
    Add,
    Edit(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

pub struct StatusLine {
    pub message: String,
    pub kind: StatusKind,
}

pub struct App {
    pub screen: AppScreen,
    pub worksheet: Worksheet,
    pub current_page: usize,
    pub selected: Option<usize>,
    pub input: Option<(InputTarget, LineInput)>,
    pub generate_form: GenerateForm,
    pub theme: &'static Theme,
    pub config: Config,
    pub status: Option<StatusLine>,
    pub generating: bool,
    pub synthesizing: bool,
    pub exporting: bool,
    pub should_quit: bool,
    pub settings_selected: usize,
    audio_store: Option<AudioStore>,
    audio_cache: AudioCacheData,
    tx: mpsc::Sender<AppEvent>,
}

impl App {
    pub fn new(tx: mpsc::Sender<AppEvent>) -> Self {
        let mut config = Config::load().unwrap_or_default();
        config.validate();
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

        let audio_store = AudioStore::new().ok();
        let audio_cache = audio_store
            .as_ref()
            .map(|s| s.load())
            .unwrap_or_default();

        let options = SheetOptions {
            practice_lines: config.practice_lines,
            ..SheetOptions::default()
        };

        Self {
            screen: AppScreen::Editor,
            worksheet: Worksheet::new(options),
            current_page: 1,
            selected: None,
            input: None,
            generate_form: GenerateForm::new(),
            theme,
            config,
            status: None,
            generating: false,
            synthesizing: false,
            exporting: false,
            should_quit: false,
            settings_selected: 0,
            audio_store,
            audio_cache,
            tx,
        }
    }

    pub fn set_status(&mut self, kind: StatusKind, message: impl Into<String>) {
        self.status = Some(StatusLine {
            message: message.into(),
            kind,
        });
    }

    pub fn total_pages(&self) -> usize {
        let per = sentences_per_page(&self.worksheet.options, &self.config.line_budgets());
        total_pages(self.worksheet.len(), per)
    }

    /// Page and selection can both dangle after any mutation; re-clamp.
    fn refresh_view(&mut self) {
        self.current_page = clamp_page(self.current_page, self.total_pages());
        self.selected = match self.worksheet.len() {
            0 => None,
            n => Some(self.selected.unwrap_or(0).min(n - 1)),
        };
    }

    pub fn date_label(&self) -> String {
        let today = Local::now();
        format!("{}. {}. {}.", today.year(), today.month(), today.day())
    }

    // --- sentence mutations -----------------------------------------------

    pub fn open_add_input(&mut self) {
        self.input = Some((InputTarget::Add, LineInput::new("")));
    }

    pub fn open_edit_input(&mut self) {
        if let Some(index) = self.selected
            && let Some(text) = self.worksheet.sentences().get(index)
        {
            self.input = Some((InputTarget::Edit(index), LineInput::new(text)));
        }
    }

    pub fn submit_input(&mut self) {
        let Some((target, input)) = self.input.take() else {
            return;
        };
        let text = input.value().to_string();
        let result = match target {
            InputTarget::Add => self.worksheet.add(&text),
            InputTarget::Edit(index) => self.worksheet.edit(index, &text),
        };
        match result {
            Ok(()) => {
                if matches!(target, InputTarget::Add) {
                    self.selected = Some(self.worksheet.len() - 1);
                }
            }
            Err(e) => {
                self.set_status(StatusKind::Error, e.to_string());
                // Keep the overlay open so the text can be shortened
                // instead of retyped.
                self.input = Some((target, LineInput::new(&text)));
            }
        }
        self.refresh_view();
    }

    pub fn cancel_input(&mut self) {
        self.input = None;
    }

    pub fn remove_selected(&mut self) {
        if let Some(index) = self.selected {
            if let Err(e) = self.worksheet.remove(index) {
                self.set_status(StatusKind::Error, e.to_string());
            }
            self.refresh_view();
        }
    }

    pub fn clear_sentences(&mut self) {
        self.worksheet.clear();
        self.refresh_view();
    }

    pub fn select_next(&mut self) {
        if let Some(index) = self.selected
            && index + 1 < self.worksheet.len()
        {
            self.selected = Some(index + 1);
        }
        self.follow_selection();
    }

    pub fn select_prev(&mut self) {
        if let Some(index) = self.selected {
            self.selected = Some(index.saturating_sub(1));
        }
        self.follow_selection();
    }

    /// Keep the preview on the page holding the selected sentence.
    fn follow_selection(&mut self) {
        if let Some(index) = self.selected {
            let per = sentences_per_page(&self.worksheet.options, &self.config.line_budgets());
            self.current_page = index / per + 1;
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = clamp_page(self.current_page + 1, self.total_pages());
    }

    pub fn prev_page(&mut self) {
        self.current_page = clamp_page(self.current_page.saturating_sub(1), self.total_pages());
    }

    pub fn toggle_layout(&mut self) {
        self.worksheet.options.kind = self.worksheet.options.kind.toggled();
        self.refresh_view();
    }

    pub fn toggle_practice(&mut self) {
        self.worksheet.options.practice_enabled = !self.worksheet.options.practice_enabled;
        self.refresh_view();
    }

    // --- background work ---------------------------------------------------

    pub fn start_generate(&mut self) {
        if self.generating {
            return;
        }
        if !self.generate_form.is_complete() {
            self.set_status(StatusKind::Error, "학습 목표를 입력해주세요");
            return;
        }
        self.generating = true;
        let request = self.generate_form.request();
        let language = self.generate_form.language;
        let api_key = self.config.api_key.clone();
        let text_model = self.config.text_model.clone();
        let tts_model = self.config.tts_model.clone();
        let tx = self.tx.clone();

        thread::spawn(move || {
            let result = generate_worker(api_key, &text_model, &tts_model, &request, language);
            let _ = tx.send(AppEvent::Generated(result));
        });
    }

    pub fn on_generated(&mut self, result: Result<Vec<String>, GatewayError>) {
        self.generating = false;
        match result {
            Ok(sentences) => {
                let count = sentences.len();
                match self.worksheet.replace_all(sentences) {
                    Ok(()) => {
                        self.screen = AppScreen::Editor;
                        self.current_page = 1;
                        self.set_status(
                            StatusKind::Success,
                            format!("{count}개의 문장이 생성되었습니다"),
                        );
                    }
                    Err(e) => self.set_status(StatusKind::Error, e.to_string()),
                }
            }
            Err(e) => self.set_status(StatusKind::Error, e.to_string()),
        }
        self.refresh_view();
    }

    pub fn start_synthesize(&mut self) {
        if self.synthesizing {
            return;
        }
        let Some(index) = self.selected else {
            return;
        };
        let Some(sentence) = self.worksheet.sentences().get(index).cloned() else {
            return;
        };
        self.synthesize_text(sentence);
    }

    /// One narration covering the whole worksheet: every sentence in a
    /// single TTS pass, separated by pauses.
    pub fn start_synthesize_all(&mut self) {
        if self.synthesizing {
            return;
        }
        if self.worksheet.is_empty() {
            self.set_status(StatusKind::Error, "추가된 문장이 없습니다");
            return;
        }
        self.synthesize_text(self.worksheet.sentences().join("\n\n"));
    }

    fn synthesize_text(&mut self, sentence: String) {
        // Cache hit skips the network entirely.
        if let Some(wav) = AudioStore::get(&self.audio_cache, &sentence) {
            match self.write_audio_file(&wav) {
                Ok(path) => self.set_status(
                    StatusKind::Success,
                    format!("저장된 음성을 사용했습니다: {}", path.display()),
                ),
                Err(e) => self.set_status(StatusKind::Error, e),
            }
            return;
        }

        self.synthesizing = true;
        let api_key = self.config.api_key.clone();
        let text_model = self.config.text_model.clone();
        let tts_model = self.config.tts_model.clone();
        let tx = self.tx.clone();

        thread::spawn(move || {
            let result = synthesize_worker(api_key, &text_model, &tts_model, &sentence);
            let _ = tx.send(AppEvent::Synthesized {
                sentence,
                result,
            });
        });
    }

    pub fn on_synthesized(&mut self, sentence: String, result: Result<Vec<u8>, GatewayError>) {
        self.synthesizing = false;
        match result {
            Ok(wav) => {
                if let Some(ref store) = self.audio_store
                    && let Err(e) = store.put(&mut self.audio_cache, &sentence, &wav)
                {
                    self.set_status(StatusKind::Error, format!("음성 캐시 저장 실패: {e}"));
                }
                match self.write_audio_file(&wav) {
                    Ok(path) => self.set_status(
                        StatusKind::Success,
                        format!("음성이 저장되었습니다: {}", path.display()),
                    ),
                    Err(e) => self.set_status(StatusKind::Error, e),
                }
            }
            Err(e) => self.set_status(StatusKind::Error, e.to_string()),
        }
    }

    fn write_audio_file(&self, wav: &[u8]) -> Result<PathBuf, String> {
        let path = PathBuf::from(&self.config.export_dir).join(AUDIO_FILE_NAME);
        fs::write(&path, wav).map_err(|e| format!("음성 파일 저장 실패: {e}"))?;
        Ok(path)
    }

    pub fn start_export(&mut self, format: ExportFormat) {
        if self.exporting {
            return;
        }
        if self.worksheet.is_empty() {
            self.set_status(StatusKind::Error, "추가된 문장이 없습니다");
            return;
        }
        self.exporting = true;
        self.set_status(
            StatusKind::Info,
            format!("{} 파일을 만드는 중...", format.as_str()),
        );

        let worksheet = self.worksheet.clone();
        let budgets = self.config.line_budgets();
        let dpi = self.config.export_dpi;
        let out_dir = PathBuf::from(&self.config.export_dir);
        let font_path = self.config.font_path.clone().map(PathBuf::from);
        let date_label = self.date_label();
        let tx = self.tx.clone();

        thread::spawn(move || {
            let request = ExportRequest {
                worksheet: &worksheet,
                budgets,
                dpi,
                out_dir: &out_dir,
                format,
                date_label: &date_label,
                font_path: font_path.as_deref(),
            };
            let _ = tx.send(AppEvent::Exported(export_worksheet(&request)));
        });
    }

    pub fn on_exported(&mut self, result: Result<ExportOutcome, ExportError>) {
        self.exporting = false;
        match result {
            Ok(outcome) => self.set_status(
                StatusKind::Success,
                format!(
                    "{}페이지를 내보냈습니다: {}",
                    outcome.pages,
                    outcome
                        .files
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            ),
            Err(e) => self.set_status(StatusKind::Error, e.to_string()),
        }
    }

    // --- settings ----------------------------------------------------------

    pub const SETTINGS_FIELDS: [&'static str; 4] =
        ["레이아웃", "연습 줄 표시", "연습 줄 수", "내보내기 DPI"];

    pub fn settings_cycle(&mut self, forward: bool) {
        match self.settings_selected {
            0 => self.toggle_layout(),
            1 => self.toggle_practice(),
            2 => {
                let lines = self.worksheet.options.practice_lines;
                self.worksheet.options.practice_lines = if forward {
                    (lines + 1).min(9)
                } else {
                    lines.saturating_sub(1)
                };
                self.config.practice_lines = self.worksheet.options.practice_lines;
                self.refresh_view();
            }
            3 => {
                let step: i64 = if forward { 50 } else { -50 };
                let dpi = (self.config.export_dpi as i64 + step).clamp(72, 600);
                self.config.export_dpi = dpi as u32;
            }
            _ => {}
        }
    }
}

fn generate_worker(
    api_key: Option<String>,
    text_model: &str,
    tts_model: &str,
    request: &SentenceRequest,
    language: SentenceLanguage,
) -> Result<Vec<String>, GatewayError> {
    let gateway = AiGateway::new(api_key.as_deref(), text_model, tts_model)?;
    gateway.generate_sentences(request, language)
}

fn synthesize_worker(
    api_key: Option<String>,
    text_model: &str,
    tts_model: &str,
    text: &str,
) -> Result<Vec<u8>, GatewayError> {
    let gateway = AiGateway::new(api_key.as_deref(), text_model, tts_model)?;
    gateway.synthesize(text)
}
