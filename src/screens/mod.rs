//! Screen state machines.
//!
//! Screens never touch the network or the terminal. User actions and request
//! completions go in, [`Effect`]s come out, and the app carries them out.

pub mod how_it_works;
pub mod landing;
pub mod pr_editor;
pub mod pr_list;
pub mod repo_list;

use crate::{
    api::ApiError,
    engine::{Command, Dispatch, Outcome},
    events::{Action, InputMode},
    requests::{RequestId, RequestTracker, Slot},
    router::Route,
    session::Session,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub use how_it_works::HowItWorksScreen;
pub use landing::LandingScreen;
pub use pr_editor::PrEditorScreen;
pub use pr_list::PrListScreen;
pub use repo_list::RepoListScreen;

/// Work a screen asks the app to do on its behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Dispatch(Dispatch),
    Navigate(Route),
    Alert(Alert),
    /// A session was obtained from the OAuth callback.
    SignIn(Session),
    /// Go to the landing screen with the callback prompt open.
    OpenSignIn,
}

impl Effect {
    /// Allocate the next id for `slot` and wrap the command for dispatch.
    pub fn request(tracker: &mut RequestTracker, slot: Slot, command: Command) -> Self {
        let id = tracker.dispatch(slot);
        Effect::Dispatch(Dispatch { slot, id, command })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Success,
    Warning,
    Error,
}

/// A modal message, dismissed by any key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
}

impl Alert {
    pub fn new(level: AlertLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(AlertLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(AlertLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(AlertLevel::Error, message)
    }
}

/// Primary content of a data screen.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Selection in a card grid laid out row by row. The renderer sets
/// `columns` from the available width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridState {
    pub selected: usize,
    pub columns: usize,
}

impl Default for GridState {
    fn default() -> Self {
        Self {
            selected: 0,
            columns: 1,
        }
    }
}

impl GridState {
    pub fn next(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn down(&mut self, len: usize) {
        let columns = self.columns.max(1);
        if self.selected + columns < len {
            self.selected += columns;
        }
    }

    pub fn up(&mut self) {
        let columns = self.columns.max(1);
        if self.selected >= columns {
            self.selected -= columns;
        }
    }

    pub fn first(&mut self) {
        self.selected = 0;
    }

    pub fn last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Apply a navigation action; returns false for anything else.
    pub fn navigate(&mut self, action: Action, len: usize) -> bool {
        match action {
            Action::NavigateLeft => self.previous(),
            Action::NavigateRight => self.next(len),
            Action::NavigateUp | Action::PageUp => self.up(),
            Action::NavigateDown | Action::PageDown => self.down(len),
            Action::Home => self.first(),
            Action::End => self.last(len),
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
    Submit(String),
    Cancel,
    Edited,
}

/// Single-line modal text input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: String,
    pub value: String,
    /// Char index of the cursor.
    pub cursor: usize,
    /// Inline feedback shown under the input.
    pub message: Option<String>,
    /// Extra context line shown above the input.
    pub hint: Option<String>,
}

impl Prompt {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: String::new(),
            cursor: 0,
            message: None,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PromptEvent {
        match key.code {
            KeyCode::Enter => return PromptEvent::Submit(self.value.clone()),
            KeyCode::Esc => return PromptEvent::Cancel,
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.clear();
                self.cursor = 0;
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.insert(c);
            }
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                let at = self.byte_index();
                self.value.remove(at);
            }
            KeyCode::Delete if self.cursor < self.value.chars().count() => {
                let at = self.byte_index();
                self.value.remove(at);
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.value.chars().count()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.value.chars().count(),
            _ => {}
        }
        PromptEvent::Edited
    }

    /// Pasted text goes in on one line.
    pub fn paste(&mut self, text: &str) {
        for c in text.chars().filter(|c| !c.is_control()) {
            self.insert(c);
        }
    }

    fn insert(&mut self, c: char) {
        let at = self.byte_index();
        self.value.insert(at, c);
        self.cursor += 1;
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }
}

/// Backend rejections are expected traffic; transport and decode failures
/// point at a bug or an outage.
pub(crate) fn log_failure(action: &str, err: &ApiError) {
    match err {
        ApiError::Http { .. } | ApiError::MissingSession => {
            tracing::warn!(action, "request rejected: {err}")
        }
        _ => tracing::error!(action, "request failed: {err}"),
    }
}

/// The mounted screen.
#[derive(Debug)]
pub enum Screen {
    Landing(LandingScreen),
    HowItWorks(HowItWorksScreen),
    RepoList(RepoListScreen),
    PrList(PrListScreen),
    PrEditor(PrEditorScreen),
}

impl Screen {
    /// Build the screen for `route` and return the requests its mount issues.
    pub fn mount(route: &Route, session: Option<&Session>, login_url: &str) -> (Self, Vec<Effect>) {
        match route {
            Route::Landing => (
                Screen::Landing(LandingScreen::new(session.is_some(), login_url)),
                Vec::new(),
            ),
            Route::HowItWorks => (Screen::HowItWorks(HowItWorksScreen::new()), Vec::new()),
            Route::SelectRepo => {
                let (screen, effects) = RepoListScreen::mount(session);
                (Screen::RepoList(screen), effects)
            }
            Route::Repo { repo_name } => {
                let (screen, effects) = PrListScreen::mount(repo_name, session);
                (Screen::PrList(screen), effects)
            }
            Route::PullRequest { repo_name, number } => {
                let (screen, effects) = PrEditorScreen::mount(repo_name, *number, session);
                (Screen::PrEditor(screen), effects)
            }
        }
    }

    pub fn route(&self) -> Route {
        match self {
            Screen::Landing(_) => Route::Landing,
            Screen::HowItWorks(_) => Route::HowItWorks,
            Screen::RepoList(_) => Route::SelectRepo,
            Screen::PrList(screen) => Route::Repo {
                repo_name: screen.repo_name().to_string(),
            },
            Screen::PrEditor(screen) => Route::PullRequest {
                repo_name: screen.repo_name().to_string(),
                number: screen.number(),
            },
        }
    }

    pub fn input_mode(&self) -> InputMode {
        match self {
            Screen::Landing(screen) => screen.input_mode(),
            Screen::HowItWorks(_) => InputMode::Normal,
            Screen::RepoList(screen) => screen.input_mode(),
            Screen::PrList(_) => InputMode::Normal,
            Screen::PrEditor(screen) => screen.input_mode(),
        }
    }

    pub fn handle_action(&mut self, action: Action) -> Vec<Effect> {
        if action == Action::Back {
            return self.route().parent().map(Effect::Navigate).into_iter().collect();
        }

        match self {
            Screen::Landing(screen) => screen.handle_action(action),
            Screen::HowItWorks(screen) => screen.handle_action(action),
            Screen::RepoList(screen) => screen.handle_action(action),
            Screen::PrList(screen) => screen.handle_action(action),
            Screen::PrEditor(screen) => screen.handle_action(action),
        }
    }

    /// Raw key while the screen is in [`InputMode::Insert`].
    pub fn handle_input(&mut self, key: KeyEvent) -> Vec<Effect> {
        match self {
            Screen::Landing(screen) => screen.handle_input(key),
            Screen::RepoList(screen) => screen.handle_input(key),
            Screen::PrEditor(screen) => screen.handle_input(key),
            Screen::HowItWorks(_) | Screen::PrList(_) => Vec::new(),
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        match self {
            Screen::Landing(screen) => screen.handle_paste(text),
            Screen::RepoList(screen) => screen.handle_paste(text),
            Screen::PrEditor(screen) => screen.handle_paste(text),
            Screen::HowItWorks(_) | Screen::PrList(_) => {}
        }
    }

    /// Feed a request completion to the screen that issued it.
    pub fn apply(&mut self, slot: Slot, id: RequestId, outcome: Outcome) -> Vec<Effect> {
        match self {
            Screen::RepoList(screen) => screen.apply(slot, id, outcome),
            Screen::PrList(screen) => screen.apply(slot, id, outcome),
            Screen::PrEditor(screen) => screen.apply(slot, id, outcome),
            Screen::Landing(_) | Screen::HowItWorks(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crossterm::event::KeyEvent;

    pub fn session() -> Session {
        Session::new("tok", "octo").unwrap()
    }

    pub fn dispatches(effects: &[Effect]) -> Vec<Dispatch> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Dispatch(dispatch) => Some(dispatch.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn alerts(effects: &[Effect]) -> Vec<Alert> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Alert(alert) => Some(alert.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    pub fn type_text(text: &str, mut send: impl FnMut(KeyEvent) -> Vec<Effect>) {
        for c in text.chars() {
            send(key(KeyCode::Char(c)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_grid_navigation_stays_in_bounds() {
        let mut grid = GridState {
            selected: 0,
            columns: 3,
        };
        grid.down(7);
        assert_eq!(grid.selected, 3);
        grid.down(7);
        assert_eq!(grid.selected, 6);
        grid.down(7);
        assert_eq!(grid.selected, 6);
        grid.next(7);
        assert_eq!(grid.selected, 6);
        grid.up();
        grid.previous();
        assert_eq!(grid.selected, 2);
        assert!(!grid.navigate(Action::Select, 7));
    }

    #[test]
    fn test_prompt_editing() {
        let mut prompt = Prompt::new("Repository name");
        type_text("knigt", |k| {
            prompt.handle_key(k);
            Vec::new()
        });
        prompt.handle_key(key(KeyCode::Left));
        prompt.handle_key(key(KeyCode::Char('h')));
        assert_eq!(prompt.value, "knight");
        assert_eq!(
            prompt.handle_key(key(KeyCode::Enter)),
            PromptEvent::Submit("knight".to_string())
        );
        assert_eq!(prompt.handle_key(key(KeyCode::Esc)), PromptEvent::Cancel);
    }

    #[test]
    fn test_prompt_paste_drops_newlines() {
        let mut prompt = Prompt::new("Callback URL");
        prompt.paste("http://localhost:3000/select-repo?token=t\n");
        assert_eq!(prompt.value, "http://localhost:3000/select-repo?token=t");
    }

    #[test]
    fn test_mount_static_screens_issue_nothing() {
        let (screen, effects) = Screen::mount(&Route::Landing, None, "http://localhost:8000/login");
        assert!(matches!(screen, Screen::Landing(_)));
        assert!(effects.is_empty());

        let (screen, effects) = Screen::mount(&Route::HowItWorks, None, "");
        assert_eq!(screen.route(), Route::HowItWorks);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_back_follows_route_parent() {
        let session = session();
        let pr = Route::PullRequest {
            repo_name: "knightlint".to_string(),
            number: 42,
        };
        let expected = [
            (pr, Some(Route::Repo { repo_name: "knightlint".to_string() })),
            (Route::Repo { repo_name: "knightlint".to_string() }, Some(Route::SelectRepo)),
            (Route::SelectRepo, Some(Route::Landing)),
            (Route::HowItWorks, Some(Route::Landing)),
            (Route::Landing, None),
        ];
        for (route, parent) in expected {
            let (mut screen, _) = Screen::mount(&route, Some(&session), "");
            let effects = screen.handle_action(Action::Back);
            assert_eq!(effects, parent.map(Effect::Navigate).into_iter().collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_data_screens_without_session_issue_no_commands() {
        let routes = [
            Route::SelectRepo,
            Route::Repo {
                repo_name: "knightlint".to_string(),
            },
            Route::PullRequest {
                repo_name: "knightlint".to_string(),
                number: 42,
            },
        ];
        for route in routes {
            let (mut screen, effects) = Screen::mount(&route, None, "");
            assert!(dispatches(&effects).is_empty(), "{route} dispatched on mount");
            assert_eq!(screen.route(), route);

            for action in [Action::Refresh, Action::Select, Action::Analyze, Action::Commit] {
                let effects = screen.handle_action(action);
                assert!(dispatches(&effects).is_empty(), "{route} dispatched on {action:?}");
            }
        }
    }
}
