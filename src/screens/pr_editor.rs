use super::{log_failure, Alert, Effect, LoadState, Prompt, PromptEvent};
use crate::{
    api::{Analysis, CommitRequest, IssueCategory, PrDetails, PrFile},
    editor::EditorBuffer,
    engine::{Command, Outcome},
    events::{Action, InputMode},
    requests::{RequestId, RequestTracker, Slot},
    session::{Session, AUTH_REQUIRED},
    syntax_highlight::{HighlightCache, HighlightedLine},
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info, warn};

pub const LOAD_FAILED: &str = "An error occurred while loading PR details.";
pub const CONTENT_FAILED: &str = "// Failed to load file content";
pub const SELECT_FILE_FIRST: &str = "Please select a file first.";
pub const NOT_COMMITTABLE: &str = "The file content did not load, so there is nothing to commit.";
pub const COMMIT_SUCCEEDED: &str = "Changes committed successfully!";
pub const COMMIT_FAILED: &str = "Failed to commit changes.";
pub const NO_ISSUES: &str = "No issues found";
const ANALYSIS_FALLBACK: &str = "the backend did not return a result";

const PAGE_LINES: usize = 20;
const TAB_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Files,
    Editor,
    Analysis,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Files => Focus::Editor,
            Focus::Editor => Focus::Analysis,
            Focus::Analysis => Focus::Files,
        }
    }
}

/// Content of the selected file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentState {
    Loading,
    Loaded,
    /// The buffer holds the failure placeholder and must not be committed.
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisState {
    Idle,
    /// `previous` is restored if the request fails.
    Analyzing {
        recheck: bool,
        previous: Option<Analysis>,
    },
    Done(Analysis),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommitState {
    Idle,
    Prompting(Prompt),
    Committing { filename: String, content: String },
}

#[derive(Debug)]
pub struct PrEditorScreen {
    repo_name: String,
    number: u64,
    page: LoadState<PrDetails>,
    /// Highlighted row in the file list.
    file_cursor: usize,
    /// File whose content is in the buffer.
    selected: Option<usize>,
    content: ContentState,
    buffer: EditorBuffer,
    highlight: Option<HighlightCache>,
    editing: bool,
    analysis: AnalysisState,
    tab: IssueCategory,
    analysis_scroll: u16,
    commit: CommitState,
    focus: Focus,
    tracker: RequestTracker,
}

impl PrEditorScreen {
    pub fn mount(repo_name: &str, number: u64, session: Option<&Session>) -> (Self, Vec<Effect>) {
        let mut screen = Self {
            repo_name: repo_name.to_string(),
            number,
            page: LoadState::Loading,
            file_cursor: 0,
            selected: None,
            content: ContentState::Loading,
            buffer: EditorBuffer::default(),
            highlight: None,
            editing: false,
            analysis: AnalysisState::Idle,
            tab: IssueCategory::Security,
            analysis_scroll: 0,
            commit: CommitState::Idle,
            focus: Focus::Files,
            tracker: RequestTracker::new(),
        };

        if session.is_none() {
            screen.page = LoadState::Failed(AUTH_REQUIRED.to_string());
            return (screen, Vec::new());
        }

        let effects = vec![Effect::request(
            &mut screen.tracker,
            Slot::Page,
            Command::LoadPrDetails {
                repo_name: screen.repo_name.clone(),
                number,
            },
        )];
        (screen, effects)
    }

    pub fn repo_name(&self) -> &str {
        &self.repo_name
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn page(&self) -> &LoadState<PrDetails> {
        &self.page
    }

    pub fn files(&self) -> &[PrFile] {
        self.page
            .ready()
            .map(|details| details.files.as_slice())
            .unwrap_or_default()
    }

    pub fn file_cursor(&self) -> usize {
        self.file_cursor
    }

    /// Index of the file whose content is in the buffer.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_file(&self) -> Option<&PrFile> {
        self.selected.and_then(|index| self.files().get(index))
    }

    pub fn content_state(&self) -> ContentState {
        self.content
    }

    pub fn buffer(&self) -> &EditorBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut EditorBuffer {
        &mut self.buffer
    }

    /// Highlighted lines `0..end` of the loaded file under `app_theme`.
    /// Only rows edited since the last call are highlighted again.
    pub fn highlighted_lines(&mut self, app_theme: &str, end: usize) -> Option<&[HighlightedLine]> {
        if self.content != ContentState::Loaded {
            return None;
        }
        let filename = self.selected_file()?.filename.clone();
        let changed_from = self.buffer.take_changed_from();

        let reusable = self
            .highlight
            .as_ref()
            .is_some_and(|cache| cache.is_for(&filename, app_theme));
        if !reusable {
            self.highlight = HighlightCache::new(&filename, app_theme);
        } else if let (Some(cache), Some(row)) = (self.highlight.as_mut(), changed_from) {
            cache.invalidate_from(row);
        }

        let cache = self.highlight.as_mut()?;
        Some(cache.lines(self.buffer.lines(), end))
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn analysis(&self) -> &AnalysisState {
        &self.analysis
    }

    /// Result to display: the finished one, or the one being rechecked.
    pub fn shown_analysis(&self) -> Option<&Analysis> {
        match &self.analysis {
            AnalysisState::Done(analysis) => Some(analysis),
            AnalysisState::Analyzing { previous, .. } => previous.as_ref(),
            AnalysisState::Idle => None,
        }
    }

    pub fn active_tab(&self) -> IssueCategory {
        self.tab
    }

    pub fn analysis_scroll(&self) -> u16 {
        self.analysis_scroll
    }

    pub fn commit_state(&self) -> &CommitState {
        &self.commit
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn input_mode(&self) -> InputMode {
        if self.editing || matches!(self.commit, CommitState::Prompting(_)) {
            InputMode::Insert
        } else {
            InputMode::Normal
        }
    }

    pub fn handle_action(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::ToggleFocus => self.focus = self.focus.next(),
            Action::Analyze => return self.start_analysis(false),
            Action::Recheck => return self.start_analysis(true),
            Action::Commit => return self.begin_commit(),
            Action::NextTab => return self.activate_tab(self.tab_offset(1)),
            Action::PrevTab => return self.activate_tab(self.tab_offset(2)),
            Action::Edit => self.start_editing(),
            _ => return self.navigate(action),
        }
        Vec::new()
    }

    fn navigate(&mut self, action: Action) -> Vec<Effect> {
        match self.focus {
            Focus::Files => {
                let len = self.files().len();
                match action {
                    Action::NavigateUp => self.file_cursor = self.file_cursor.saturating_sub(1),
                    Action::NavigateDown if self.file_cursor + 1 < len => self.file_cursor += 1,
                    Action::Home => self.file_cursor = 0,
                    Action::End => self.file_cursor = len.saturating_sub(1),
                    Action::Select => return self.select_file(self.file_cursor),
                    _ => {}
                }
            }
            Focus::Editor => match action {
                Action::NavigateUp => self.buffer.move_up(1),
                Action::NavigateDown => self.buffer.move_down(1),
                Action::NavigateLeft => self.buffer.move_left(),
                Action::NavigateRight => self.buffer.move_right(),
                Action::PageUp => self.buffer.move_up(PAGE_LINES),
                Action::PageDown => self.buffer.move_down(PAGE_LINES),
                Action::Home => self.buffer.buffer_start(),
                Action::End => self.buffer.buffer_end(),
                Action::Select => self.start_editing(),
                _ => {}
            },
            Focus::Analysis => match action {
                Action::NavigateUp => self.analysis_scroll = self.analysis_scroll.saturating_sub(1),
                Action::NavigateDown => self.analysis_scroll = self.analysis_scroll.saturating_add(1),
                Action::PageUp => self.analysis_scroll = self.analysis_scroll.saturating_sub(10),
                Action::PageDown => self.analysis_scroll = self.analysis_scroll.saturating_add(10),
                Action::Home => self.analysis_scroll = 0,
                Action::NavigateLeft => return self.activate_tab(self.tab_offset(2)),
                Action::NavigateRight => return self.activate_tab(self.tab_offset(1)),
                _ => {}
            },
        }
        Vec::new()
    }

    fn tab_offset(&self, offset: usize) -> IssueCategory {
        let all = IssueCategory::ALL;
        let index = all.iter().position(|c| *c == self.tab).unwrap_or(0);
        all[(index + offset) % all.len()]
    }

    /// Show `category`; the first look at results while idle runs the analysis.
    pub fn activate_tab(&mut self, category: IssueCategory) -> Vec<Effect> {
        self.tab = category;
        self.analysis_scroll = 0;
        if self.analysis == AnalysisState::Idle {
            return self.start_analysis(false);
        }
        Vec::new()
    }

    /// Load `index` into the buffer. Any unsaved edits to the previous file
    /// are dropped.
    pub fn select_file(&mut self, index: usize) -> Vec<Effect> {
        let Some(file) = self.files().get(index) else {
            return Vec::new();
        };
        let command = Command::LoadFileContent {
            filename: file.filename.clone(),
            raw_url: file.raw_url.clone(),
        };
        debug!(filename = %file.filename, "selecting file");

        self.selected = Some(index);
        self.file_cursor = index;
        self.content = ContentState::Loading;
        self.buffer.set_text("");
        self.editing = false;
        vec![Effect::request(&mut self.tracker, Slot::FileContent, command)]
    }

    fn start_editing(&mut self) {
        if self.content == ContentState::Loaded {
            self.editing = true;
            self.focus = Focus::Editor;
        }
    }

    fn start_analysis(&mut self, recheck: bool) -> Vec<Effect> {
        if self.page.ready().is_none() {
            return Vec::new();
        }
        let previous = match (&self.analysis, recheck) {
            (AnalysisState::Idle, false) => None,
            (AnalysisState::Done(previous), true) => Some(previous.clone()),
            // Already running, or nothing to recheck yet
            _ => return Vec::new(),
        };

        info!(repo = %self.repo_name, pr = self.number, recheck, "requesting analysis");
        self.analysis = AnalysisState::Analyzing { recheck, previous };
        vec![Effect::request(
            &mut self.tracker,
            Slot::Analysis,
            Command::Analyze {
                repo_name: self.repo_name.clone(),
                number: self.number,
                recheck,
            },
        )]
    }

    fn begin_commit(&mut self) -> Vec<Effect> {
        if matches!(self.commit, CommitState::Committing { .. }) {
            return Vec::new();
        }
        let Some(file) = self.selected_file() else {
            return vec![Effect::Alert(Alert::warning(SELECT_FILE_FIRST))];
        };
        if self.content != ContentState::Loaded {
            return vec![Effect::Alert(Alert::warning(NOT_COMMITTABLE))];
        }

        let (added, removed) = self.buffer.line_changes();
        let prompt = Prompt::new(format!("Commit message for {}", file.filename))
            .with_hint(format!("{added} lines added, {removed} lines removed"));
        self.commit = CommitState::Prompting(prompt);
        Vec::new()
    }

    fn submit_commit(&mut self, message: &str) -> Vec<Effect> {
        let message = message.trim();
        let filename = self.selected_file().map(|file| file.filename.clone());
        let (Some(filename), false) = (filename, message.is_empty()) else {
            debug!("commit aborted");
            self.commit = CommitState::Idle;
            return Vec::new();
        };

        let content = self.buffer.text();
        info!(repo = %self.repo_name, pr = self.number, %filename, "committing file");
        self.commit = CommitState::Committing {
            filename: filename.clone(),
            content: content.clone(),
        };
        vec![Effect::request(
            &mut self.tracker,
            Slot::Commit,
            Command::Commit {
                repo_name: self.repo_name.clone(),
                number: self.number,
                request: CommitRequest {
                    file_path: filename,
                    content,
                    commit_message: message.to_string(),
                },
            },
        )]
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Vec<Effect> {
        if let CommitState::Prompting(prompt) = &mut self.commit {
            return match prompt.handle_key(key) {
                PromptEvent::Submit(message) => self.submit_commit(&message),
                PromptEvent::Cancel => {
                    self.commit = CommitState::Idle;
                    Vec::new()
                }
                PromptEvent::Edited => Vec::new(),
            };
        }

        if self.editing {
            self.edit(key);
        }
        Vec::new()
    }

    fn edit(&mut self, key: KeyEvent) {
        let buffer = &mut self.buffer;
        match key.code {
            KeyCode::Esc => self.editing = false,
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                buffer.insert_char(c)
            }
            KeyCode::Enter => buffer.newline(),
            KeyCode::Tab => buffer.insert_str(&" ".repeat(TAB_WIDTH)),
            KeyCode::Backspace => buffer.backspace(),
            KeyCode::Delete => buffer.delete(),
            KeyCode::Left => buffer.move_left(),
            KeyCode::Right => buffer.move_right(),
            KeyCode::Up => buffer.move_up(1),
            KeyCode::Down => buffer.move_down(1),
            KeyCode::PageUp => buffer.move_up(PAGE_LINES),
            KeyCode::PageDown => buffer.move_down(PAGE_LINES),
            KeyCode::Home => buffer.line_start(),
            KeyCode::End => buffer.line_end(),
            _ => {}
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        if let CommitState::Prompting(prompt) = &mut self.commit {
            prompt.paste(text);
        } else if self.editing {
            self.buffer.insert_str(text);
        }
    }

    pub fn apply(&mut self, slot: Slot, id: RequestId, outcome: Outcome) -> Vec<Effect> {
        if !self.tracker.complete(slot, id) {
            debug!(?slot, ?id, "discarding stale completion");
            return Vec::new();
        }

        match outcome {
            Outcome::PrDetails(result) => self.show_details(result),
            Outcome::FileContent { filename, result } => {
                self.show_content(&filename, result);
                Vec::new()
            }
            Outcome::Analysis { recheck, result } => self.finish_analysis(recheck, result),
            Outcome::Committed(result) => self.finish_commit(result),
            other => {
                warn!(?slot, outcome = ?other, "unexpected completion for PR editor");
                Vec::new()
            }
        }
    }

    fn show_details(
        &mut self,
        result: Result<PrDetails, crate::api::ApiError>,
    ) -> Vec<Effect> {
        match result {
            Ok(details) => {
                debug!(files = details.files.len(), "PR details loaded");
                let has_files = !details.files.is_empty();
                self.page = LoadState::Ready(details);
                if has_files {
                    return self.select_file(0);
                }
            }
            Err(err) => {
                log_failure("load PR details", &err);
                self.page = LoadState::Failed(err.user_message(LOAD_FAILED));
            }
        }
        Vec::new()
    }

    fn show_content(&mut self, filename: &str, result: Result<String, crate::api::ApiError>) {
        match result {
            Ok(content) => {
                debug!(filename, bytes = content.len(), "file content loaded");
                self.buffer.set_text(&content);
                self.content = ContentState::Loaded;
            }
            Err(err) => {
                log_failure("load file content", &err);
                self.buffer.set_text(CONTENT_FAILED);
                self.content = ContentState::Failed;
            }
        }
    }

    fn finish_analysis(
        &mut self,
        recheck: bool,
        result: Result<Analysis, crate::api::ApiError>,
    ) -> Vec<Effect> {
        let previous = match std::mem::replace(&mut self.analysis, AnalysisState::Idle) {
            AnalysisState::Analyzing { previous, .. } => previous,
            other => {
                self.analysis = other;
                return Vec::new();
            }
        };

        match result {
            Ok(analysis) => {
                info!(recheck, issues = analysis.total_issues(), "analysis finished");
                self.analysis = AnalysisState::Done(analysis);
                self.analysis_scroll = 0;
                Vec::new()
            }
            Err(err) => {
                log_failure("analyze pull request", &err);
                if let Some(previous) = previous {
                    self.analysis = AnalysisState::Done(previous);
                }
                vec![Effect::Alert(Alert::error(format!(
                    "Analysis failed: {}",
                    err.user_message(ANALYSIS_FALLBACK)
                )))]
            }
        }
    }

    fn finish_commit(
        &mut self,
        result: Result<crate::api::CommitOutcome, crate::api::ApiError>,
    ) -> Vec<Effect> {
        let committed = std::mem::replace(&mut self.commit, CommitState::Idle);
        match result {
            Ok(outcome) => {
                info!(sha = outcome.commit_sha.as_deref(), "commit created");
                if let CommitState::Committing { filename, content } = committed {
                    if self.selected_file().map(|f| f.filename.as_str()) == Some(filename.as_str()) {
                        self.buffer.rebase(&content);
                    }
                }
                let message = outcome
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| COMMIT_SUCCEEDED.to_string());
                vec![Effect::Alert(Alert::success(message))]
            }
            Err(err) => {
                log_failure("commit changes", &err);
                vec![Effect::Alert(Alert::error(err.user_message(COMMIT_FAILED)))]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, CommitOutcome, FileStatus, Issue, PrState, Severity};
    use crate::engine::Dispatch;
    use crate::screens::{test_support::*, AlertLevel};

    fn file(name: &str) -> PrFile {
        PrFile {
            filename: name.to_string(),
            status: FileStatus::Modified,
            additions: 1,
            deletions: 0,
            changes: 1,
            patch: None,
            raw_url: format!("https://raw.example/{name}"),
        }
    }

    fn details(files: Vec<PrFile>) -> PrDetails {
        PrDetails {
            number: 42,
            title: "Tidy up".to_string(),
            body: None,
            author: "octo".to_string(),
            state: PrState::Open,
            created_at: None,
            updated_at: None,
            html_url: None,
            files,
        }
    }

    fn issue(severity: Severity, description: &str) -> Issue {
        Issue {
            severity,
            description: description.to_string(),
            suggestion: None,
            filename: Some("a.py".to_string()),
            line: Some(3),
        }
    }

    /// Mount PR #42 and deliver its details; returns the screen and the
    /// dispatches made once the details arrived.
    fn ready(files: Vec<PrFile>) -> (PrEditorScreen, Vec<Dispatch>) {
        let session = session();
        let (mut screen, effects) = PrEditorScreen::mount("knightlint", 42, Some(&session));
        let page = dispatches(&effects).remove(0);
        let effects = screen.apply(Slot::Page, page.id, Outcome::PrDetails(Ok(details(files))));
        (screen, dispatches(&effects))
    }

    fn deliver_content(screen: &mut PrEditorScreen, dispatch: &Dispatch, content: &str) {
        let Command::LoadFileContent { filename, .. } = &dispatch.command else {
            panic!("not a content load: {dispatch:?}");
        };
        screen.apply(
            Slot::FileContent,
            dispatch.id,
            Outcome::FileContent {
                filename: filename.clone(),
                result: Ok(content.to_string()),
            },
        );
    }

    fn loaded_a() -> PrEditorScreen {
        let (mut screen, sent) = ready(vec![file("a.py"), file("b.py")]);
        deliver_content(&mut screen, &sent[0], "print('a')\n");
        screen
    }

    fn commit_with(screen: &mut PrEditorScreen, message: &str) -> Vec<Effect> {
        screen.handle_action(Action::Commit);
        screen.handle_paste(message);
        screen.handle_input(key(KeyCode::Enter))
    }

    #[test]
    fn test_mount_without_session() {
        let (mut screen, effects) = PrEditorScreen::mount("knightlint", 42, None);
        assert!(effects.is_empty());
        assert_eq!(screen.page(), &LoadState::Failed(AUTH_REQUIRED.to_string()));
        assert!(dispatches(&screen.handle_action(Action::Analyze)).is_empty());
    }

    #[test]
    fn test_details_failure_message() {
        let session = session();
        let (mut screen, effects) = PrEditorScreen::mount("knightlint", 42, Some(&session));
        let page = dispatches(&effects).remove(0);
        screen.apply(
            Slot::Page,
            page.id,
            Outcome::PrDetails(Err(ApiError::Decode("eof".to_string()))),
        );
        assert_eq!(screen.page(), &LoadState::Failed(LOAD_FAILED.to_string()));
    }

    #[test]
    fn test_selecting_files_fetches_each_once() {
        let (mut screen, sent) = ready(vec![file("a.py"), file("b.py")]);
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].command,
            Command::LoadFileContent {
                filename: "a.py".to_string(),
                raw_url: "https://raw.example/a.py".to_string(),
            }
        );
        deliver_content(&mut screen, &sent[0], "print('a')\n");
        assert_eq!(screen.buffer().text(), "print('a')\n");

        // Unsaved edits to a.py are dropped by the switch
        screen.handle_action(Action::Edit);
        type_text("# draft", |k| screen.handle_input(k));
        screen.handle_input(key(KeyCode::Esc));
        assert!(screen.buffer().is_modified());

        screen.handle_action(Action::ToggleFocus);
        screen.handle_action(Action::ToggleFocus);
        screen.handle_action(Action::NavigateDown);
        let sent = dispatches(&screen.handle_action(Action::Select));
        assert_eq!(sent.len(), 1);
        assert!(matches!(
            &sent[0].command,
            Command::LoadFileContent { filename, .. } if filename == "b.py"
        ));

        deliver_content(&mut screen, &sent[0], "print('b')\n");
        assert_eq!(screen.buffer().text(), "print('b')\n");
        assert!(!screen.buffer().is_modified());
        assert_eq!(screen.selected_file().unwrap().filename, "b.py");
    }

    #[test]
    fn test_highlighting_follows_edits() {
        let mut screen = loaded_a();
        let text = |lines: &[HighlightedLine]| -> String {
            lines[0].iter().map(|(_, t)| t.as_str()).collect()
        };
        let first = screen.highlighted_lines("knight-night", 10).map(text);
        assert_eq!(first.as_deref(), Some("print('a')"));

        screen.handle_action(Action::Edit);
        type_text("x = ", |k| screen.handle_input(k));
        let edited = screen.highlighted_lines("knight-night", 10).map(text);
        assert_eq!(edited.as_deref(), Some("x = print('a')"));
    }

    #[test]
    fn test_no_highlighting_until_content_loads() {
        let (mut screen, _) = ready(vec![file("a.py")]);
        assert!(screen.highlighted_lines("knight-night", 10).is_none());
    }

    #[test]
    fn test_stale_file_content_is_discarded() {
        let (mut screen, first) = ready(vec![file("a.py"), file("b.py")]);
        let second = dispatches(&screen.select_file(1));

        deliver_content(&mut screen, &second[0], "b");
        deliver_content(&mut screen, &first[0], "a");

        assert_eq!(screen.buffer().text(), "b");
        assert_eq!(screen.content_state(), ContentState::Loaded);
    }

    #[test]
    fn test_failed_content_blocks_commit() {
        let (mut screen, sent) = ready(vec![file("a.py")]);
        screen.apply(
            Slot::FileContent,
            sent[0].id,
            Outcome::FileContent {
                filename: "a.py".to_string(),
                result: Err(ApiError::Http {
                    status: 404,
                    message: None,
                }),
            },
        );
        assert_eq!(screen.buffer().text(), CONTENT_FAILED);
        assert_eq!(screen.content_state(), ContentState::Failed);

        let effects = screen.handle_action(Action::Commit);
        assert_eq!(alerts(&effects), vec![Alert::warning(NOT_COMMITTABLE)]);
        assert_eq!(screen.input_mode(), InputMode::Normal);
    }

    #[test]
    fn test_commit_without_selected_file_warns() {
        let (mut screen, sent) = ready(Vec::new());
        assert!(sent.is_empty());

        let effects = screen.handle_action(Action::Commit);
        assert!(dispatches(&effects).is_empty());
        assert_eq!(alerts(&effects), vec![Alert::warning(SELECT_FILE_FIRST)]);
    }

    #[test]
    fn test_commit_with_empty_message_is_aborted() {
        let mut screen = loaded_a();
        let effects = commit_with(&mut screen, "   ");
        assert!(effects.is_empty());
        assert_eq!(screen.commit_state(), &CommitState::Idle);
    }

    #[test]
    fn test_commit_sends_edited_buffer() {
        let mut screen = loaded_a();
        screen.handle_action(Action::Edit);
        assert!(screen.is_editing());
        screen.handle_input(key(KeyCode::End));
        screen.handle_input(key(KeyCode::Char('!')));
        screen.handle_input(key(KeyCode::Esc));
        assert!(!screen.is_editing());

        screen.handle_action(Action::Commit);
        let CommitState::Prompting(prompt) = screen.commit_state() else {
            panic!("commit prompt should be open");
        };
        assert_eq!(prompt.hint.as_deref(), Some("1 lines added, 1 lines removed"));

        screen.handle_paste("Fix greeting");
        let sent = dispatches(&screen.handle_input(key(KeyCode::Enter)));
        assert_eq!(
            sent[0].command,
            Command::Commit {
                repo_name: "knightlint".to_string(),
                number: 42,
                request: CommitRequest {
                    file_path: "a.py".to_string(),
                    content: "print('a')!\n".to_string(),
                    commit_message: "Fix greeting".to_string(),
                },
            }
        );

        // Disabled while the commit is in flight
        assert!(screen.handle_action(Action::Commit).is_empty());

        let effects = screen.apply(
            Slot::Commit,
            sent[0].id,
            Outcome::Committed(Ok(CommitOutcome::default())),
        );
        assert_eq!(alerts(&effects), vec![Alert::success(COMMIT_SUCCEEDED)]);
        assert_eq!(screen.buffer().line_changes(), (0, 0));
    }

    #[test]
    fn test_commit_failure_alert() {
        let mut screen = loaded_a();
        let sent = dispatches(&commit_with(&mut screen, "Try"));
        let effects = screen.apply(
            Slot::Commit,
            sent[0].id,
            Outcome::Committed(Err(ApiError::Http {
                status: 409,
                message: Some("Branch is protected".to_string()),
            })),
        );
        let alert = alerts(&effects).remove(0);
        assert_eq!(alert.level, AlertLevel::Error);
        assert_eq!(alert.message, "Branch is protected");
        assert_eq!(screen.commit_state(), &CommitState::Idle);
    }

    #[test]
    fn test_analysis_with_one_quality_issue() {
        let mut screen = loaded_a();
        let sent = dispatches(&screen.handle_action(Action::Analyze));
        assert_eq!(
            sent[0].command,
            Command::Analyze {
                repo_name: "knightlint".to_string(),
                number: 42,
                recheck: false,
            }
        );

        let analysis = Analysis {
            summary: "One problem".to_string(),
            code_quality_issues: vec![issue(Severity::High, "Unused variable")],
            ..Default::default()
        };
        screen.apply(
            Slot::Analysis,
            sent[0].id,
            Outcome::Analysis {
                recheck: false,
                result: Ok(analysis),
            },
        );

        let shown = screen.shown_analysis().unwrap();
        assert_eq!(shown.issues(IssueCategory::Quality).len(), 1);
        assert_eq!(shown.issues(IssueCategory::Quality)[0].severity, Severity::High);
        assert!(shown.issues(IssueCategory::Security).is_empty());
        assert!(shown.issues(IssueCategory::Performance).is_empty());
    }

    #[test]
    fn test_analyze_is_ignored_while_running() {
        let mut screen = loaded_a();
        assert_eq!(dispatches(&screen.handle_action(Action::Analyze)).len(), 1);
        assert!(screen.handle_action(Action::Analyze).is_empty());
        assert!(screen.handle_action(Action::Recheck).is_empty());
    }

    #[test]
    fn test_first_tab_activation_runs_analysis() {
        let mut screen = loaded_a();
        let sent = dispatches(&screen.handle_action(Action::NextTab));
        assert_eq!(sent.len(), 1);
        assert_eq!(screen.active_tab(), IssueCategory::Quality);

        screen.apply(
            Slot::Analysis,
            sent[0].id,
            Outcome::Analysis {
                recheck: false,
                result: Ok(Analysis::default()),
            },
        );
        assert!(screen.handle_action(Action::NextTab).is_empty());
        assert_eq!(screen.active_tab(), IssueCategory::Performance);
    }

    #[test]
    fn test_recheck_replaces_previous_result() {
        let mut screen = loaded_a();
        let first = dispatches(&screen.handle_action(Action::Analyze));
        screen.apply(
            Slot::Analysis,
            first[0].id,
            Outcome::Analysis {
                recheck: false,
                result: Ok(Analysis {
                    security_issues: vec![issue(Severity::High, "SQL injection")],
                    performance_issues: vec![issue(Severity::Low, "Slow loop")],
                    ..Default::default()
                }),
            },
        );

        let recheck = dispatches(&screen.handle_action(Action::Recheck));
        assert!(matches!(recheck[0].command, Command::Analyze { recheck: true, .. }));
        screen.apply(
            Slot::Analysis,
            recheck[0].id,
            Outcome::Analysis {
                recheck: true,
                result: Ok(Analysis {
                    code_quality_issues: vec![issue(Severity::Medium, "Long function")],
                    ..Default::default()
                }),
            },
        );

        let shown = screen.shown_analysis().unwrap();
        assert!(shown.issues(IssueCategory::Security).is_empty());
        assert!(shown.issues(IssueCategory::Performance).is_empty());
        assert_eq!(shown.issues(IssueCategory::Quality)[0].description, "Long function");
    }

    #[test]
    fn test_failed_recheck_keeps_previous_result() {
        let mut screen = loaded_a();
        let first = dispatches(&screen.handle_action(Action::Analyze));
        let previous = Analysis {
            summary: "kept".to_string(),
            ..Default::default()
        };
        screen.apply(
            Slot::Analysis,
            first[0].id,
            Outcome::Analysis {
                recheck: false,
                result: Ok(previous.clone()),
            },
        );

        let recheck = dispatches(&screen.handle_action(Action::Recheck));
        let effects = screen.apply(
            Slot::Analysis,
            recheck[0].id,
            Outcome::Analysis {
                recheck: true,
                result: Err(ApiError::Http {
                    status: 500,
                    message: Some("model overloaded".to_string()),
                }),
            },
        );

        assert_eq!(
            alerts(&effects),
            vec![Alert::error("Analysis failed: model overloaded")]
        );
        assert_eq!(screen.analysis(), &AnalysisState::Done(previous));
    }

    #[test]
    fn test_failed_first_analysis_returns_to_idle() {
        let mut screen = loaded_a();
        let sent = dispatches(&screen.handle_action(Action::Analyze));
        screen.apply(
            Slot::Analysis,
            sent[0].id,
            Outcome::Analysis {
                recheck: false,
                result: Err(ApiError::Decode("eof".to_string())),
            },
        );
        assert_eq!(screen.analysis(), &AnalysisState::Idle);
        assert_eq!(dispatches(&screen.handle_action(Action::Analyze)).len(), 1);
    }
}
