use crate::settings::Settings;
use anyhow::{Context, Result};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_THEME: &str = "knight-night";

// Embed theme files at compile time
const BUILTIN_THEMES: &[(&str, &str)] = &[
    ("knight-night", include_str!("../themes/knight-night.toml")),
    ("knight-day", include_str!("../themes/knight-day.toml")),
    ("dracula", include_str!("../themes/dracula.toml")),
    ("nord", include_str!("../themes/nord.toml")),
    ("gruvbox-dark", include_str!("../themes/gruvbox-dark.toml")),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeColors {
    // UI colors
    pub background: String,
    pub foreground: String,
    pub border: String,
    pub border_focused: String,
    pub title: String,
    pub subtitle: String,
    pub muted: String,
    pub accent: String,

    // Status colors
    pub info: String,
    pub warning: String,
    pub error: String,
    pub success: String,

    // Selection colors
    pub selection_bg: String,
    pub selection_fg: String,
    pub cursor: String,

    // Key hint bar
    pub nav_bg: String,
    pub nav_fg: String,
    pub nav_active: String,

    // File list
    pub sidebar_bg: String,
    pub sidebar_fg: String,
    pub sidebar_selected: String,

    // Editor
    pub line_number: String,
    pub added: String,
    pub removed: String,
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    colors: ThemeColors,
}

impl Theme {
    /// Load a theme from the themes directory, falling back to the copy
    /// compiled into the binary.
    pub fn load(theme_name: &str) -> Result<Self> {
        // A read-only config dir should not stop the app from starting
        if let Err(err) = Self::create_default_themes() {
            tracing::warn!("could not write default themes: {err:#}");
        }

        let theme_path = Self::theme_path(theme_name);
        if theme_path.exists() {
            return Self::load_from_file(&theme_path, theme_name);
        }

        Self::builtin(theme_name)
    }

    pub fn builtin(theme_name: &str) -> Result<Self> {
        let (_, content) = BUILTIN_THEMES
            .iter()
            .find(|(name, _)| *name == theme_name)
            .with_context(|| format!("Theme '{theme_name}' not found"))?;
        Self::parse(content, theme_name)
    }

    fn load_from_file(path: &Path, name: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read theme file: {path:?}"))?;
        Self::parse(&content, name).with_context(|| format!("Failed to parse theme file: {path:?}"))
    }

    fn parse(content: &str, name: &str) -> Result<Self> {
        let colors: ThemeColors = toml::from_str(content)?;
        Ok(Self {
            name: name.to_string(),
            colors,
        })
    }

    fn themes_dir() -> PathBuf {
        Settings::config_dir().join("themes")
    }

    pub fn theme_path(theme_name: &str) -> PathBuf {
        Self::themes_dir().join(format!("{theme_name}.toml"))
    }

    pub fn list_available_themes() -> Result<Vec<String>> {
        Self::create_default_themes()?;
        list_themes_in(&Self::themes_dir())
    }

    pub fn create_default_themes() -> Result<()> {
        let themes_dir = Self::themes_dir();
        fs::create_dir_all(&themes_dir)?;

        // Only write missing files so user edits survive
        for (name, content) in BUILTIN_THEMES {
            let path = themes_dir.join(format!("{name}.toml"));
            if !path.exists() {
                fs::write(path, content)?;
            }
        }

        Ok(())
    }

    // Getters for colors
    pub fn bg(&self) -> Color {
        parse_color(&self.colors.background)
    }

    pub fn fg(&self) -> Color {
        parse_color(&self.colors.foreground)
    }

    pub fn border(&self) -> Color {
        parse_color(&self.colors.border)
    }

    pub fn border_focused(&self) -> Color {
        parse_color(&self.colors.border_focused)
    }

    pub fn title(&self) -> Color {
        parse_color(&self.colors.title)
    }

    pub fn subtitle(&self) -> Color {
        parse_color(&self.colors.subtitle)
    }

    pub fn muted(&self) -> Color {
        parse_color(&self.colors.muted)
    }

    pub fn accent(&self) -> Color {
        parse_color(&self.colors.accent)
    }

    pub fn info(&self) -> Color {
        parse_color(&self.colors.info)
    }

    pub fn warning(&self) -> Color {
        parse_color(&self.colors.warning)
    }

    pub fn error(&self) -> Color {
        parse_color(&self.colors.error)
    }

    pub fn success(&self) -> Color {
        parse_color(&self.colors.success)
    }

    pub fn selection_bg(&self) -> Color {
        parse_color(&self.colors.selection_bg)
    }

    pub fn selection_fg(&self) -> Color {
        parse_color(&self.colors.selection_fg)
    }

    pub fn cursor(&self) -> Color {
        parse_color(&self.colors.cursor)
    }

    pub fn nav_bg(&self) -> Color {
        parse_color(&self.colors.nav_bg)
    }

    pub fn nav_fg(&self) -> Color {
        parse_color(&self.colors.nav_fg)
    }

    pub fn nav_active(&self) -> Color {
        parse_color(&self.colors.nav_active)
    }

    pub fn sidebar_bg(&self) -> Color {
        parse_color(&self.colors.sidebar_bg)
    }

    pub fn sidebar_fg(&self) -> Color {
        parse_color(&self.colors.sidebar_fg)
    }

    pub fn sidebar_selected(&self) -> Color {
        parse_color(&self.colors.sidebar_selected)
    }

    pub fn line_number(&self) -> Color {
        parse_color(&self.colors.line_number)
    }

    pub fn added(&self) -> Color {
        parse_color(&self.colors.added)
    }

    pub fn removed(&self) -> Color {
        parse_color(&self.colors.removed)
    }
}

fn list_themes_in(dir: &Path) -> Result<Vec<String>> {
    let mut themes = Vec::new();
    if dir.exists() {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("toml") {
                if let Some(name) = path.file_stem().and_then(|s| s.to_str()) {
                    themes.push(name.to_string());
                }
            }
        }
    }
    themes.sort();
    Ok(themes)
}

/// Accepts `#rrggbb`, `rgb(r, g, b)` and the basic terminal color names.
/// Anything else renders as white.
fn parse_color(color_str: &str) -> Color {
    if let Some(hex) = color_str.strip_prefix('#') {
        if hex.len() == 6 {
            let channel = |range| u8::from_str_radix(&hex[range], 16).unwrap_or(0);
            return Color::Rgb(channel(0..2), channel(2..4), channel(4..6));
        }
    } else if let Some(rgb) = color_str
        .strip_prefix("rgb(")
        .and_then(|s| s.strip_suffix(')'))
    {
        let parts: Vec<u8> = rgb
            .split(',')
            .map(|p| p.trim().parse().unwrap_or(0))
            .collect();
        if let [r, g, b] = parts[..] {
            return Color::Rgb(r, g, b);
        }
    } else {
        match color_str.to_lowercase().as_str() {
            "black" => return Color::Black,
            "red" => return Color::Red,
            "green" => return Color::Green,
            "yellow" => return Color::Yellow,
            "blue" => return Color::Blue,
            "magenta" => return Color::Magenta,
            "cyan" => return Color::Cyan,
            "gray" | "grey" => return Color::Gray,
            "darkgray" | "darkgrey" => return Color::DarkGray,
            "lightred" => return Color::LightRed,
            "lightgreen" => return Color::LightGreen,
            "lightyellow" => return Color::LightYellow,
            "lightblue" => return Color::LightBlue,
            "lightmagenta" => return Color::LightMagenta,
            "lightcyan" => return Color::LightCyan,
            "white" => return Color::White,
            "reset" => return Color::Reset,
            _ => {}
        }
    }

    Color::White
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color_formats() {
        assert_eq!(parse_color("#1e1e2e"), Color::Rgb(0x1e, 0x1e, 0x2e));
        assert_eq!(parse_color("rgb(10, 20, 30)"), Color::Rgb(10, 20, 30));
        assert_eq!(parse_color("LightBlue"), Color::LightBlue);
        assert_eq!(parse_color("#12"), Color::White);
        assert_eq!(parse_color("chartreuse"), Color::White);
    }

    #[test]
    fn test_all_builtin_themes_parse() {
        for (name, _) in BUILTIN_THEMES {
            let theme = Theme::builtin(name).unwrap();
            assert_eq!(&theme.name, name);
        }
        assert!(Theme::builtin("missing").is_err());
    }

    #[test]
    fn test_list_themes_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.toml"), "").unwrap();
        fs::write(dir.path().join("a.toml"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        assert_eq!(list_themes_in(dir.path()).unwrap(), vec!["a", "b"]);
    }
}
