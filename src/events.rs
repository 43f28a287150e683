use crate::keybindings;
use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind, MouseEvent};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Paste(String),
    Resize,
    Tick,
}

pub struct EventHandler;

impl EventHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn poll(&self, timeout: Duration) -> Result<Option<Event>> {
        if event::poll(timeout)? {
            match event::read()? {
                // Windows terminals also report releases
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Release => Ok(None),
                CrosstermEvent::Key(key) => Ok(Some(Event::Key(key))),
                CrosstermEvent::Mouse(mouse) => Ok(Some(Event::Mouse(mouse))),
                CrosstermEvent::Paste(text) => Ok(Some(Event::Paste(text))),
                CrosstermEvent::Resize(_, _) => Ok(Some(Event::Resize)),
                _ => Ok(None),
            }
        } else {
            Ok(Some(Event::Tick))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavigateUp,
    NavigateDown,
    NavigateLeft,
    NavigateRight,
    Select,
    Back,
    ToggleFocus,
    PageUp,
    PageDown,
    Home,
    End,
    Refresh,
    CycleTheme,
    Edit,
    Analyze,
    Recheck,
    Commit,
    NextTab,
    PrevTab,
    SignIn,
    HowItWorks,
    VerifyRepo,
    Logout,
}

impl Action {
    /// Get action from key event using the provided key mapping
    pub fn from_key_event(key: KeyEvent, key_mapping: &HashMap<KeyEvent, Action>) -> Option<Self> {
        key_mapping.get(&keybindings::normalize(key)).copied()
    }
}

/// What a screen does with the next key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Keys go through the action mapping.
    Normal,
    /// Keys are text for the focused editor or prompt; Esc leaves the mode.
    Insert,
}
