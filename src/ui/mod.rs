pub mod analysis;
pub mod cards;
pub mod editor_view;
pub mod info;
pub mod layout;
pub mod navigation;
pub mod sidebar;

pub use layout::AppLayout;
pub use navigation::Navigation;
pub use sidebar::Sidebar;

use crate::{
    app::App,
    events::Action,
    screens::{
        pr_editor::{CommitState, Focus},
        LoadState, PrEditorScreen, Screen,
    },
    theme::Theme,
};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

fn screen_title(screen: &Screen) -> String {
    match screen {
        Screen::Landing(_) => "Welcome".to_string(),
        Screen::HowItWorks(_) => "How it works".to_string(),
        Screen::RepoList(_) => "Repositories".to_string(),
        Screen::PrList(list) => format!("{} · pull requests", list.repo_name()),
        Screen::PrEditor(editor) => format!("{} · #{}", editor.repo_name(), editor.number()),
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let mut spans = vec![
        Span::styled(
            " ♞ KnightLint ",
            Style::default()
                .fg(theme.title())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.screen.route().path(), Style::default().fg(theme.muted())),
    ];
    if let Some(session) = &app.session {
        spans.push(Span::styled(
            format!("  @{}", session.username()),
            Style::default().fg(theme.accent()),
        ));
    }
    let header = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(theme.nav_bg()))
        .alignment(Alignment::Left);
    f.render_widget(header, area);
}

fn render_pr_editor(f: &mut Frame, area: Rect, screen: &mut PrEditorScreen, theme: &Theme) {
    let details = match screen.page() {
        LoadState::Loading => {
            AppLayout::render_notice(f, area, "Loading pull request...", theme);
            return;
        }
        LoadState::Failed(message) => {
            AppLayout::render_error(f, area, message, theme);
            return;
        }
        LoadState::Ready(details) => details,
    };

    let mut summary = vec![
        Span::styled(
            format!("#{} {}", details.number, details.title),
            Style::default()
                .fg(theme.title())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {} by {}", details.state.label(), details.author),
            Style::default().fg(theme.muted()),
        ),
    ];
    if let CommitState::Committing { filename, .. } = screen.commit_state() {
        summary.push(Span::styled(
            format!("  Committing {filename}..."),
            Style::default().fg(theme.info()),
        ));
    }
    let summary = Line::from(summary);
    let (summary_area, panes) = (
        Rect { height: 1, ..area },
        Rect {
            y: area.y + 1,
            height: area.height.saturating_sub(1),
            ..area
        },
    );
    f.render_widget(Paragraph::new(summary), summary_area);

    let (files_area, editor_area, analysis_area) = AppLayout::split_editor(panes);
    let focus = screen.focus();
    Sidebar {
        files: screen.files(),
        cursor: screen.file_cursor(),
        open: screen.selected_index(),
    }
    .render(f, files_area, theme, focus == Focus::Files);

    editor_view::render(f, editor_area, screen, theme, focus == Focus::Editor);
    analysis::render(f, analysis_area, screen, theme, focus == Focus::Analysis);

    if let CommitState::Prompting(prompt) = screen.commit_state() {
        AppLayout::render_prompt(f, area, prompt, None, theme);
    }
}

/// Draw the whole frame for the current app state.
pub fn draw(f: &mut Frame, app: &mut App) {
    let area = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(app.theme.bg()).fg(app.theme.fg())),
        area,
    );
    let (header, content, footer) = AppLayout::split_main(area);
    render_header(f, header, app);

    let theme = &app.theme;
    match &mut app.screen {
        Screen::Landing(screen) => info::render_landing(f, content, screen, theme),
        Screen::HowItWorks(screen) => info::render_how_it_works(f, content, screen, theme),
        Screen::RepoList(screen) => cards::render_repo_list(f, content, screen, theme),
        Screen::PrList(screen) => {
            cards::render_pr_list(f, content, screen, theme, &app.settings.date_format)
        }
        Screen::PrEditor(screen) => render_pr_editor(f, content, screen, theme),
    }

    let keys = &app.settings.keybindings;
    Navigation::render(
        f,
        footer,
        theme,
        &screen_title(&app.screen),
        &navigation::hints(&app.screen, keys),
        &keys.display_key(Action::Quit),
    );

    if let Some(alert) = &app.alert {
        AppLayout::render_alert(f, area, alert, theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::{Command, Outcome},
        requests::Slot,
        screens::test_support::{dispatches, key, session},
    };
    use crossterm::event::KeyCode;
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;

    fn editor_with_file() -> PrEditorScreen {
        let details = serde_json::from_value(json!({
            "number": 42,
            "title": "Tidy up",
            "user": "octo",
            "files": [{"filename": "a.py", "status": "modified", "raw_url": "https://raw.example/a.py"}]
        }))
        .unwrap();

        let session = session();
        let (mut screen, effects) = PrEditorScreen::mount("knightlint", 42, Some(&session));
        let page = dispatches(&effects).remove(0);
        let effects = screen.apply(Slot::Page, page.id, Outcome::PrDetails(Ok(details)));
        let load = dispatches(&effects).remove(0);
        assert!(matches!(load.command, Command::LoadFileContent { .. }));
        screen.apply(
            Slot::FileContent,
            load.id,
            Outcome::FileContent {
                filename: "a.py".to_string(),
                result: Ok("print('a')\n".to_string()),
            },
        );
        screen
    }

    fn draw_editor(screen: &mut PrEditorScreen) -> String {
        let theme = Theme::builtin("knight-night").unwrap();
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                render_pr_editor(f, area, screen, &theme)
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_commit_prompt_is_drawn() {
        let mut screen = editor_with_file();
        screen.handle_action(Action::Commit);
        screen.handle_paste("my message");

        let frame = draw_editor(&mut screen);
        assert!(frame.contains("Commit message for a.py"));
        assert!(frame.contains("my message"));
        assert!(frame.contains("0 lines added, 0 lines removed"));
    }

    #[test]
    fn test_committing_marker_is_drawn() {
        let mut screen = editor_with_file();
        screen.handle_action(Action::Commit);
        screen.handle_paste("my message");
        let sent = dispatches(&screen.handle_input(key(KeyCode::Enter)));
        assert_eq!(sent.len(), 1);

        let frame = draw_editor(&mut screen);
        assert!(frame.contains("Committing a.py..."));
        assert!(!frame.contains("Commit message for"));
    }
}
