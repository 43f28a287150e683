use crate::api::DEFAULT_BACKEND_URL;
use crate::keybindings::KeyBindings;
use crate::theme::{Theme, DEFAULT_THEME};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    /// chrono format string used for pull request dates.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default)]
    pub keybindings: KeyBindings,
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

fn default_date_format() -> String {
    "%b %e, %Y".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            theme: default_theme(),
            date_format: default_date_format(),
            keybindings: KeyBindings::default(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Read settings from `path`, writing the defaults there first if the file
    /// does not exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let settings = Self::default();
            settings.save_to(path)?;
            return Ok(settings);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, content).context("Failed to write settings file")?;

        Ok(())
    }

    /// `$XDG_CONFIG_HOME/knightlint`, falling back to `~/.config/knightlint`.
    pub fn config_dir() -> PathBuf {
        let base = if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg_config)
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home).join(".config")
        } else {
            PathBuf::from(".")
        };
        base.join("knightlint")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn get_theme(&self) -> Result<Theme> {
        Theme::load(&self.theme)
    }

    pub fn cycle_theme(&mut self) -> Result<()> {
        let themes = Theme::list_available_themes()?;
        if themes.is_empty() {
            return Ok(());
        }

        let current_index = themes.iter().position(|t| t == &self.theme).unwrap_or(0);
        let next_index = (current_index + 1) % themes.len();
        self.theme = themes[next_index].clone();
        self.save()
    }
}
