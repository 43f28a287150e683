use crate::events::Action;
use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: Vec<String>,
    #[serde(default = "default_navigate_up")]
    pub navigate_up: Vec<String>,
    #[serde(default = "default_navigate_down")]
    pub navigate_down: Vec<String>,
    #[serde(default = "default_navigate_left")]
    pub navigate_left: Vec<String>,
    #[serde(default = "default_navigate_right")]
    pub navigate_right: Vec<String>,
    #[serde(default = "default_select")]
    pub select: Vec<String>,
    #[serde(default = "default_back")]
    pub back: Vec<String>,
    #[serde(default = "default_toggle_focus")]
    pub toggle_focus: Vec<String>,
    #[serde(default = "default_page_up")]
    pub page_up: Vec<String>,
    #[serde(default = "default_page_down")]
    pub page_down: Vec<String>,
    #[serde(default = "default_go_to_top")]
    pub go_to_top: Vec<String>,
    #[serde(default = "default_go_to_bottom")]
    pub go_to_bottom: Vec<String>,
    #[serde(default = "default_refresh")]
    pub refresh: Vec<String>,
    #[serde(default = "default_cycle_theme")]
    pub cycle_theme: Vec<String>,
    #[serde(default = "default_edit")]
    pub edit: Vec<String>,
    #[serde(default = "default_analyze")]
    pub analyze: Vec<String>,
    #[serde(default = "default_recheck")]
    pub recheck: Vec<String>,
    #[serde(default = "default_commit")]
    pub commit: Vec<String>,
    #[serde(default = "default_next_tab")]
    pub next_tab: Vec<String>,
    #[serde(default = "default_prev_tab")]
    pub prev_tab: Vec<String>,
    #[serde(default = "default_sign_in")]
    pub sign_in: Vec<String>,
    #[serde(default = "default_how_it_works")]
    pub how_it_works: Vec<String>,
    #[serde(default = "default_verify_repo")]
    pub verify_repo: Vec<String>,
    #[serde(default = "default_logout")]
    pub logout: Vec<String>,
}

// Vim-style defaults with arrow-key alternatives
fn default_quit() -> Vec<String> {
    vec!["q".to_string(), "Ctrl+c".to_string()]
}

fn default_navigate_up() -> Vec<String> {
    vec!["k".to_string(), "Up".to_string()]
}

fn default_navigate_down() -> Vec<String> {
    vec!["j".to_string(), "Down".to_string()]
}

fn default_navigate_left() -> Vec<String> {
    vec!["h".to_string(), "Left".to_string()]
}

fn default_navigate_right() -> Vec<String> {
    vec!["l".to_string(), "Right".to_string()]
}

fn default_select() -> Vec<String> {
    vec!["Enter".to_string()]
}

fn default_back() -> Vec<String> {
    vec!["Esc".to_string(), "Backspace".to_string()]
}

fn default_toggle_focus() -> Vec<String> {
    vec!["Tab".to_string()]
}

fn default_page_up() -> Vec<String> {
    vec!["PageUp".to_string(), "Ctrl+u".to_string()]
}

fn default_page_down() -> Vec<String> {
    vec!["PageDown".to_string(), "Ctrl+d".to_string()]
}

fn default_go_to_top() -> Vec<String> {
    vec!["g".to_string(), "Home".to_string()]
}

fn default_go_to_bottom() -> Vec<String> {
    vec!["G".to_string(), "End".to_string()]
}

fn default_refresh() -> Vec<String> {
    vec!["r".to_string(), "F5".to_string()]
}

fn default_cycle_theme() -> Vec<String> {
    vec!["t".to_string()]
}

fn default_edit() -> Vec<String> {
    vec!["i".to_string(), "e".to_string()]
}

fn default_analyze() -> Vec<String> {
    vec!["a".to_string()]
}

fn default_recheck() -> Vec<String> {
    vec!["R".to_string()]
}

fn default_commit() -> Vec<String> {
    vec!["c".to_string()]
}

fn default_next_tab() -> Vec<String> {
    vec!["]".to_string()]
}

fn default_prev_tab() -> Vec<String> {
    vec!["[".to_string()]
}

fn default_sign_in() -> Vec<String> {
    vec!["s".to_string()]
}

fn default_how_it_works() -> Vec<String> {
    vec!["?".to_string()]
}

fn default_verify_repo() -> Vec<String> {
    vec!["v".to_string()]
}

fn default_logout() -> Vec<String> {
    vec!["L".to_string()]
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            navigate_up: default_navigate_up(),
            navigate_down: default_navigate_down(),
            navigate_left: default_navigate_left(),
            navigate_right: default_navigate_right(),
            select: default_select(),
            back: default_back(),
            toggle_focus: default_toggle_focus(),
            page_up: default_page_up(),
            page_down: default_page_down(),
            go_to_top: default_go_to_top(),
            go_to_bottom: default_go_to_bottom(),
            refresh: default_refresh(),
            cycle_theme: default_cycle_theme(),
            edit: default_edit(),
            analyze: default_analyze(),
            recheck: default_recheck(),
            commit: default_commit(),
            next_tab: default_next_tab(),
            prev_tab: default_prev_tab(),
            sign_in: default_sign_in(),
            how_it_works: default_how_it_works(),
            verify_repo: default_verify_repo(),
            logout: default_logout(),
        }
    }
}

impl KeyBindings {
    fn bindings(&self) -> [(&[String], Action); 24] {
        [
            (&self.quit, Action::Quit),
            (&self.navigate_up, Action::NavigateUp),
            (&self.navigate_down, Action::NavigateDown),
            (&self.navigate_left, Action::NavigateLeft),
            (&self.navigate_right, Action::NavigateRight),
            (&self.select, Action::Select),
            (&self.back, Action::Back),
            (&self.toggle_focus, Action::ToggleFocus),
            (&self.page_up, Action::PageUp),
            (&self.page_down, Action::PageDown),
            (&self.go_to_top, Action::Home),
            (&self.go_to_bottom, Action::End),
            (&self.refresh, Action::Refresh),
            (&self.cycle_theme, Action::CycleTheme),
            (&self.edit, Action::Edit),
            (&self.analyze, Action::Analyze),
            (&self.recheck, Action::Recheck),
            (&self.commit, Action::Commit),
            (&self.next_tab, Action::NextTab),
            (&self.prev_tab, Action::PrevTab),
            (&self.sign_in, Action::SignIn),
            (&self.how_it_works, Action::HowItWorks),
            (&self.verify_repo, Action::VerifyRepo),
            (&self.logout, Action::Logout),
        ]
    }

    /// Create a mapping from KeyEvent to Action based on the configured bindings
    pub fn create_mapping(&self) -> Result<HashMap<KeyEvent, Action>> {
        let mut map = HashMap::new();
        for (keys, action) in self.bindings() {
            for key_str in keys {
                let key_event = Self::parse_key(key_str)
                    .with_context(|| format!("Invalid key binding: {key_str}"))?;
                map.insert(key_event, action);
            }
        }
        Ok(map)
    }

    /// Parse a key string into a KeyEvent
    /// Supports formats like:
    /// - Single character: "a", "G", "?"
    /// - Special keys: "Tab", "Enter", "Esc", "Space", "Backspace"
    /// - Arrow keys: "Up", "Down", "Left", "Right"
    /// - Function keys: "F1" .. "F12"
    /// - Modified keys: "Ctrl+c", "Alt+x", "Shift+a"
    pub fn parse_key(key_str: &str) -> Result<KeyEvent> {
        let (modifier_parts, key_part) = match key_str.rsplit_once('+') {
            // "+" on its own, or a trailing "+" as in "Ctrl++", is the plus key
            Some((prefix, "")) if !prefix.is_empty() => (prefix.trim_end_matches('+'), "+"),
            Some((prefix, key)) if !prefix.is_empty() => (prefix, key),
            _ => ("", key_str),
        };

        let mut modifiers = KeyModifiers::empty();
        for modifier in modifier_parts.split('+').filter(|m| !m.is_empty()) {
            match modifier.to_lowercase().as_str() {
                "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => anyhow::bail!("Unknown modifier: {modifier}"),
            }
        }

        let code = match key_part {
            "Tab" => KeyCode::Tab,
            "Enter" => KeyCode::Enter,
            "Esc" | "Escape" => KeyCode::Esc,
            "Space" => KeyCode::Char(' '),
            "Backspace" => KeyCode::Backspace,
            "Delete" => KeyCode::Delete,
            "Up" => KeyCode::Up,
            "Down" => KeyCode::Down,
            "Left" => KeyCode::Left,
            "Right" => KeyCode::Right,
            "PageUp" => KeyCode::PageUp,
            "PageDown" => KeyCode::PageDown,
            "Home" => KeyCode::Home,
            "End" => KeyCode::End,
            key if key.starts_with('F') && key.len() > 1 => {
                let num = key[1..]
                    .parse::<u8>()
                    .with_context(|| format!("Invalid function key: {key}"))?;
                if (1..=12).contains(&num) {
                    KeyCode::F(num)
                } else {
                    anyhow::bail!("Function key out of range: {key}")
                }
            }
            s if s.chars().count() == 1 => {
                let c = s.chars().next().unwrap_or_default();
                if modifiers.contains(KeyModifiers::SHIFT) && c.is_alphabetic() {
                    KeyCode::Char(c.to_ascii_uppercase())
                } else {
                    KeyCode::Char(c)
                }
            }
            _ => anyhow::bail!("Unknown key: {key_part}"),
        };

        Ok(normalize(KeyEvent::new(code, modifiers)))
    }

    /// First configured key for an action, for the help bar.
    pub fn display_key(&self, action: Action) -> String {
        self.bindings()
            .iter()
            .find(|(_, bound)| *bound == action)
            .and_then(|(keys, _)| keys.first().cloned())
            .unwrap_or_default()
    }
}

/// Terminals disagree on whether an uppercase letter carries SHIFT; drop it
/// for characters so "G" matches either way. Kind and state are reset too.
pub fn normalize(key: KeyEvent) -> KeyEvent {
    let mut modifiers = key.modifiers;
    if matches!(key.code, KeyCode::Char(_)) {
        modifiers.remove(KeyModifiers::SHIFT);
    }
    KeyEvent::new(key.code, modifiers)
}
