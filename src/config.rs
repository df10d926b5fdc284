use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::worksheet::layout::LineBudgets;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Display lines available per page in grid layout. A tuning constant
    /// of the printable page, not a physical law.
    #[serde(default = "default_grid_line_budget")]
    pub grid_line_budget: usize,
    #[serde(default = "default_underline_line_budget")]
    pub underline_line_budget: usize,
    #[serde(default = "default_practice_lines")]
    pub practice_lines: usize,
    /// Oversampling resolution for export rasterization.
    #[serde(default = "default_export_dpi")]
    pub export_dpi: u32,
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
    /// Korean-capable font for export; system locations are probed when
    /// unset.
    #[serde(default)]
    pub font_path: Option<String>,
    /// Overrides the GEMINI_API_KEY environment variable when set.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_text_model")]
    pub text_model: String,
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
}

fn default_theme() -> String {
    "default".to_string()
}
fn default_grid_line_budget() -> usize {
    15
}
fn default_underline_line_budget() -> usize {
    10
}
fn default_practice_lines() -> usize {
    1
}
fn default_export_dpi() -> u32 {
    300
}
fn default_export_dir() -> String {
    ".".to_string()
}
fn default_text_model() -> String {
    crate::gateway::DEFAULT_TEXT_MODEL.to_string()
}
fn default_tts_model() -> String {
    crate::gateway::DEFAULT_TTS_MODEL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            grid_line_budget: default_grid_line_budget(),
            underline_line_budget: default_underline_line_budget(),
            practice_lines: default_practice_lines(),
            export_dpi: default_export_dpi(),
            export_dir: default_export_dir(),
            font_path: None,
            api_key: None,
            text_model: default_text_model(),
            tts_model: default_tts_model(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("badasseugi")
            .join("config.toml")
    }

    /// Clamp out-of-range values from hand-edited config files. Zero line
    /// budgets would starve every page; extreme DPI would allocate absurd
    /// canvases.
    pub fn validate(&mut self) {
        self.grid_line_budget = self.grid_line_budget.clamp(1, 40);
        self.underline_line_budget = self.underline_line_budget.clamp(1, 40);
        self.practice_lines = self.practice_lines.min(9);
        self.export_dpi = self.export_dpi.clamp(72, 600);
    }

    pub fn line_budgets(&self) -> LineBudgets {
        LineBudgets {
            grid: self.grid_line_budget,
            underline: self.underline_line_budget,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.grid_line_budget, 15);
        assert_eq!(config.underline_line_budget, 10);
        assert_eq!(config.export_dpi, 300);
        assert!(config.font_path.is_none());
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_config_serde_partial_file_keeps_defaults() {
        let toml_str = r#"
grid_line_budget = 20
theme = "mono"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.grid_line_budget, 20);
        assert_eq!(config.theme, "mono");
        assert_eq!(config.underline_line_budget, 10);
        assert_eq!(config.practice_lines, 1);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.grid_line_budget, deserialized.grid_line_budget);
        assert_eq!(config.export_dir, deserialized.export_dir);
        assert_eq!(config.text_model, deserialized.text_model);
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = Config::default();
        config.grid_line_budget = 0;
        config.underline_line_budget = 500;
        config.export_dpi = 10_000;
        config.practice_lines = 99;
        config.validate();
        assert_eq!(config.grid_line_budget, 1);
        assert_eq!(config.underline_line_budget, 40);
        assert_eq!(config.export_dpi, 600);
        assert_eq!(config.practice_lines, 9);
    }
}
