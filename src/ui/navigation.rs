use crate::{
    events::{Action, InputMode},
    keybindings::KeyBindings,
    screens::{pr_editor::Focus, Screen},
    theme::Theme,
};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// One entry of the key hint bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    pub key: String,
    pub label: &'static str,
}

impl Hint {
    fn new(key: impl Into<String>, label: &'static str) -> Self {
        Self {
            key: key.into(),
            label,
        }
    }

    fn bound(keys: &KeyBindings, action: Action, label: &'static str) -> Self {
        Self::new(keys.display_key(action), label)
    }
}

/// Hints for what the mounted screen accepts right now.
pub fn hints(screen: &Screen, keys: &KeyBindings) -> Vec<Hint> {
    if screen.input_mode() == InputMode::Insert {
        let editing = matches!(screen, Screen::PrEditor(editor) if editor.is_editing());
        return if editing {
            vec![Hint::new("Esc", "Stop editing"), Hint::new("Tab", "Indent")]
        } else {
            vec![Hint::new("Enter", "Submit"), Hint::new("Esc", "Cancel")]
        };
    }

    let nav = format!(
        "{}/{}",
        keys.display_key(Action::NavigateUp),
        keys.display_key(Action::NavigateDown)
    );
    let mut hints = match screen {
        Screen::Landing(_) => vec![
            Hint::new(nav, "Move"),
            Hint::bound(keys, Action::Select, "Open"),
            Hint::bound(keys, Action::SignIn, "Sign in"),
            Hint::bound(keys, Action::HowItWorks, "How it works"),
        ],
        Screen::HowItWorks(_) => vec![
            Hint::new(nav, "Scroll"),
            Hint::bound(keys, Action::SignIn, "Sign in"),
            Hint::bound(keys, Action::Back, "Back"),
        ],
        Screen::RepoList(_) => vec![
            Hint::new(grid_keys(keys), "Move"),
            Hint::bound(keys, Action::Select, "Open"),
            Hint::bound(keys, Action::VerifyRepo, "Open by name"),
            Hint::bound(keys, Action::Refresh, "Refresh"),
            Hint::bound(keys, Action::Back, "Back"),
        ],
        Screen::PrList(_) => vec![
            Hint::new(grid_keys(keys), "Move"),
            Hint::bound(keys, Action::Select, "Open"),
            Hint::bound(keys, Action::Refresh, "Refresh"),
            Hint::bound(keys, Action::Back, "Back"),
        ],
        Screen::PrEditor(editor) => {
            let mut hints = vec![Hint::bound(keys, Action::ToggleFocus, "Focus")];
            match editor.focus() {
                Focus::Files => hints.push(Hint::bound(keys, Action::Select, "Open file")),
                Focus::Editor => hints.push(Hint::bound(keys, Action::Edit, "Edit")),
                Focus::Analysis => hints.push(Hint::new(
                    format!(
                        "{}/{}",
                        keys.display_key(Action::PrevTab),
                        keys.display_key(Action::NextTab)
                    ),
                    "Tabs",
                )),
            }
            hints.extend([
                Hint::bound(keys, Action::Analyze, "Analyze"),
                Hint::bound(keys, Action::Recheck, "Recheck"),
                Hint::bound(keys, Action::Commit, "Commit"),
                Hint::bound(keys, Action::Back, "Back"),
            ]);
            hints
        }
    };

    hints.push(Hint::bound(keys, Action::CycleTheme, "Theme"));
    if !matches!(screen, Screen::Landing(_) | Screen::HowItWorks(_)) {
        hints.push(Hint::bound(keys, Action::Logout, "Logout"));
    }
    hints
}

fn grid_keys(keys: &KeyBindings) -> String {
    format!(
        "{}{}{}{}",
        keys.display_key(Action::NavigateLeft),
        keys.display_key(Action::NavigateDown),
        keys.display_key(Action::NavigateUp),
        keys.display_key(Action::NavigateRight)
    )
}

pub struct Navigation;

impl Navigation {
    pub fn render(
        f: &mut Frame,
        area: Rect,
        theme: &Theme,
        title: &str,
        hints: &[Hint],
        quit_key: &str,
    ) {
        let key_style = Style::default()
            .fg(theme.nav_active())
            .add_modifier(Modifier::BOLD);
        let label_style = Style::default().fg(theme.nav_fg());

        let mut spans = vec![Span::raw(" ")];
        for hint in hints {
            spans.push(Span::styled(hint.key.clone(), key_style));
            spans.push(Span::styled(format!(" {}  ", hint.label), label_style));
        }
        spans.push(Span::styled(
            quit_key.to_string(),
            Style::default()
                .fg(theme.error())
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(" Quit ", label_style));

        let paragraph = Paragraph::new(Line::from(spans))
            .block(
                Block::default()
                    .title(format!(" {title} "))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.border()))
                    .style(Style::default().bg(theme.nav_bg()).fg(theme.nav_fg())),
            )
            .alignment(Alignment::Center);

        f.render_widget(paragraph, area);
    }
}
