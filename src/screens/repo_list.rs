use super::{log_failure, Effect, GridState, LoadState, Prompt, PromptEvent};
use crate::{
    api::{LanguageBreakdown, RepoStats, Repository},
    engine::{Command, Outcome},
    events::{Action, InputMode},
    requests::{RequestId, RequestTracker, Slot},
    router::{self, Route},
    session::{Session, AUTH_REQUIRED},
};
use crossterm::event::KeyEvent;
use tracing::{debug, warn};

pub const LOAD_FAILED: &str = "An error occurred while loading repositories.";
pub const NO_REPOSITORIES: &str = "No repositories found.";
pub const EMPTY_NAME: &str = "Please enter a repository name.";
pub const INVALID_NAME: &str =
    "Repository names may only contain letters, digits, '.', '_' and '-'.";
pub const VERIFY_FAILED: &str =
    "An error occurred while verifying the repository. Please try again.";

/// One repository card. Stats and languages arrive later and may never
/// arrive; the card renders without them.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoCard {
    pub repo: Repository,
    pub stats: Option<RepoStats>,
    pub languages: Option<LanguageBreakdown>,
}

impl RepoCard {
    fn new(repo: Repository) -> Self {
        Self {
            repo,
            stats: None,
            languages: None,
        }
    }

    /// Language from the breakdown when known, else the one GitHub reported.
    pub fn primary_language(&self) -> Option<&str> {
        self.languages
            .as_ref()
            .and_then(LanguageBreakdown::primary)
            .or(self.repo.language.as_deref())
    }
}

#[derive(Debug)]
pub struct RepoListScreen {
    has_session: bool,
    state: LoadState<Vec<RepoCard>>,
    pub grid: GridState,
    tracker: RequestTracker,
    /// Id of the list response currently shown; enrichment dispatched before
    /// it belongs to an older list.
    loaded_with: Option<RequestId>,
    verify: Option<Prompt>,
    verifying: bool,
}

impl RepoListScreen {
    pub fn mount(session: Option<&Session>) -> (Self, Vec<Effect>) {
        let mut screen = Self {
            has_session: session.is_some(),
            state: LoadState::Loading,
            grid: GridState::default(),
            tracker: RequestTracker::new(),
            loaded_with: None,
            verify: None,
            verifying: false,
        };
        let effects = screen.load();
        (screen, effects)
    }

    fn load(&mut self) -> Vec<Effect> {
        if !self.has_session {
            self.state = LoadState::Failed(AUTH_REQUIRED.to_string());
            return Vec::new();
        }
        self.state = LoadState::Loading;
        vec![Effect::request(
            &mut self.tracker,
            Slot::Page,
            Command::LoadRepos,
        )]
    }

    pub fn state(&self) -> &LoadState<Vec<RepoCard>> {
        &self.state
    }

    pub fn cards(&self) -> &[RepoCard] {
        self.state.ready().map(Vec::as_slice).unwrap_or_default()
    }

    /// Inline text replacing the grid: the failure message or the empty notice.
    pub fn status_message(&self) -> Option<&str> {
        match &self.state {
            LoadState::Failed(message) => Some(message),
            LoadState::Ready(cards) if cards.is_empty() => Some(NO_REPOSITORIES),
            _ => None,
        }
    }

    pub fn verify_prompt(&self) -> Option<&Prompt> {
        self.verify.as_ref()
    }

    pub fn is_verifying(&self) -> bool {
        self.verifying
    }

    pub fn input_mode(&self) -> InputMode {
        if self.verify.is_some() {
            InputMode::Insert
        } else {
            InputMode::Normal
        }
    }

    pub fn handle_action(&mut self, action: Action) -> Vec<Effect> {
        let len = self.cards().len();
        if self.grid.navigate(action, len) {
            return Vec::new();
        }

        match action {
            Action::Select => match self.cards().get(self.grid.selected) {
                Some(card) => vec![Effect::Navigate(Route::Repo {
                    repo_name: card.repo.name.clone(),
                })],
                None => Vec::new(),
            },
            Action::Refresh => self.load(),
            Action::VerifyRepo if self.has_session => {
                self.verify = Some(
                    Prompt::new("Open a repository by name")
                        .with_hint("The backend checks you have access before opening it"),
                );
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Vec<Effect> {
        let Some(prompt) = self.verify.as_mut() else {
            return Vec::new();
        };

        match prompt.handle_key(key) {
            PromptEvent::Submit(_) if self.verifying => Vec::new(),
            PromptEvent::Submit(name) => {
                let name = name.trim();
                if name.is_empty() {
                    prompt.message = Some(EMPTY_NAME.to_string());
                    return Vec::new();
                }
                if !router::is_valid_repo_name(name) {
                    prompt.message = Some(INVALID_NAME.to_string());
                    return Vec::new();
                }
                prompt.message = None;
                self.verifying = true;
                vec![Effect::request(
                    &mut self.tracker,
                    Slot::Verify,
                    Command::VerifyRepo {
                        repo_name: name.to_string(),
                    },
                )]
            }
            PromptEvent::Cancel => {
                self.verify = None;
                self.verifying = false;
                self.tracker.cancel(Slot::Verify);
                Vec::new()
            }
            PromptEvent::Edited => Vec::new(),
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        if let Some(prompt) = self.verify.as_mut() {
            prompt.paste(text);
        }
    }

    pub fn apply(&mut self, slot: Slot, id: RequestId, outcome: Outcome) -> Vec<Effect> {
        match (slot, outcome) {
            (Slot::Page, Outcome::Repos(result)) => {
                if !self.tracker.complete(slot, id) {
                    debug!(?id, "discarding stale repository list");
                    return Vec::new();
                }
                match result {
                    Ok(repos) => self.show(id, repos),
                    Err(err) => {
                        log_failure("load repositories", &err);
                        self.state = LoadState::Failed(err.user_message(LOAD_FAILED));
                        Vec::new()
                    }
                }
            }
            (
                Slot::Enrichment,
                Outcome::Enriched {
                    repo_name,
                    stats,
                    languages,
                },
            ) => {
                self.enrich(id, &repo_name, stats, languages);
                Vec::new()
            }
            (Slot::Verify, Outcome::Verified { repo_name, result }) => {
                if !self.tracker.complete(slot, id) || self.verify.is_none() {
                    return Vec::new();
                }
                self.verifying = false;
                match result {
                    Ok(_) => {
                        self.verify = None;
                        vec![Effect::Navigate(Route::Repo { repo_name })]
                    }
                    Err(err) => {
                        log_failure("verify repository", &err);
                        if let Some(prompt) = self.verify.as_mut() {
                            prompt.message = Some(err.user_message(VERIFY_FAILED));
                        }
                        Vec::new()
                    }
                }
            }
            (slot, outcome) => {
                warn!(?slot, ?outcome, "unexpected completion for repository list");
                Vec::new()
            }
        }
    }

    fn show(&mut self, id: RequestId, repos: Vec<Repository>) -> Vec<Effect> {
        debug!(count = repos.len(), "repositories loaded");
        self.loaded_with = Some(id);
        self.grid.selected = self.grid.selected.min(repos.len().saturating_sub(1));

        let effects = repos
            .iter()
            .map(|repo| {
                Effect::request(
                    &mut self.tracker,
                    Slot::Enrichment,
                    Command::EnrichRepo {
                        repo_name: repo.name.clone(),
                    },
                )
            })
            .collect();
        self.state = LoadState::Ready(repos.into_iter().map(RepoCard::new).collect());
        effects
    }

    fn enrich(
        &mut self,
        id: RequestId,
        repo_name: &str,
        stats: Result<RepoStats, crate::api::ApiError>,
        languages: Result<LanguageBreakdown, crate::api::ApiError>,
    ) {
        if self.loaded_with.map_or(true, |loaded| id < loaded) {
            debug!(repo_name, "discarding enrichment for an older list");
            return;
        }
        let Some(card) = self
            .state
            .ready_mut()
            .and_then(|cards| cards.iter_mut().find(|c| c.repo.name == repo_name))
        else {
            return;
        };

        match stats {
            Ok(stats) => card.stats = Some(stats),
            Err(err) => warn!(repo_name, "failed to load repository stats: {err}"),
        }
        match languages {
            Ok(languages) => card.languages = Some(languages),
            Err(err) => warn!(repo_name, "failed to load repository languages: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::screens::test_support::*;
    use crossterm::event::KeyCode;

    fn repo(id: u64, name: &str) -> Repository {
        Repository {
            id,
            name: name.to_string(),
            description: None,
            language: Some("Python".to_string()),
            updated_at: None,
        }
    }

    fn loaded(repos: Vec<Repository>) -> (RepoListScreen, Vec<Effect>) {
        let session = session();
        let (mut screen, effects) = RepoListScreen::mount(Some(&session));
        let page = dispatches(&effects).remove(0);
        let effects = screen.apply(Slot::Page, page.id, Outcome::Repos(Ok(repos)));
        (screen, effects)
    }

    #[test]
    fn test_mount_without_session_shows_auth_error() {
        let (screen, effects) = RepoListScreen::mount(None);
        assert!(effects.is_empty());
        assert_eq!(screen.status_message(), Some(AUTH_REQUIRED));
    }

    #[test]
    fn test_mount_requests_repositories_once() {
        let session = session();
        let (_, effects) = RepoListScreen::mount(Some(&session));
        let sent = dispatches(&effects);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].command, Command::LoadRepos);
        assert_eq!(sent[0].slot, Slot::Page);
    }

    #[test]
    fn test_each_repository_is_enriched() {
        let (screen, effects) = loaded(vec![repo(1, "alpha"), repo(2, "beta")]);
        let commands: Vec<_> = dispatches(&effects).into_iter().map(|d| d.command).collect();
        assert_eq!(
            commands,
            vec![
                Command::EnrichRepo {
                    repo_name: "alpha".to_string()
                },
                Command::EnrichRepo {
                    repo_name: "beta".to_string()
                },
            ]
        );
        assert_eq!(screen.cards().len(), 2);
        assert_eq!(screen.cards()[0].repo.name, "alpha");
    }

    #[test]
    fn test_card_count_does_not_depend_on_enrichment() {
        let (mut screen, effects) = loaded(vec![repo(1, "alpha"), repo(2, "beta")]);
        let sent = dispatches(&effects);

        screen.apply(
            Slot::Enrichment,
            sent[0].id,
            Outcome::Enriched {
                repo_name: "alpha".to_string(),
                stats: Err(ApiError::Decode("bad".to_string())),
                languages: Err(ApiError::Http {
                    status: 500,
                    message: None,
                }),
            },
        );
        screen.apply(
            Slot::Enrichment,
            sent[1].id,
            Outcome::Enriched {
                repo_name: "beta".to_string(),
                stats: Ok(RepoStats {
                    open_prs: 1,
                    closed_prs: 2,
                    total_prs: 3,
                }),
                languages: Ok(LanguageBreakdown {
                    bytes: [("Rust".to_string(), 10)].into_iter().collect(),
                }),
            },
        );

        let cards = screen.cards();
        assert_eq!(cards.len(), 2);
        assert!(cards[0].stats.is_none());
        assert_eq!(cards[0].primary_language(), Some("Python"));
        assert_eq!(cards[1].stats.as_ref().unwrap().total_prs, 3);
        assert_eq!(cards[1].primary_language(), Some("Rust"));
        assert_eq!(screen.status_message(), None);
    }

    #[test]
    fn test_enrichment_for_older_list_is_ignored() {
        let (mut screen, effects) = loaded(vec![repo(1, "alpha")]);
        let old = dispatches(&effects).remove(0);

        let reload = dispatches(&screen.handle_action(Action::Refresh)).remove(0);
        screen.apply(Slot::Page, reload.id, Outcome::Repos(Ok(vec![repo(1, "alpha")])));
        screen.apply(
            Slot::Enrichment,
            old.id,
            Outcome::Enriched {
                repo_name: "alpha".to_string(),
                stats: Ok(RepoStats::default()),
                languages: Err(ApiError::MissingSession),
            },
        );
        assert!(screen.cards()[0].stats.is_none());
    }

    #[test]
    fn test_empty_and_failed_lists() {
        let (screen, effects) = loaded(Vec::new());
        assert!(effects.is_empty());
        assert_eq!(screen.status_message(), Some(NO_REPOSITORIES));

        let session = session();
        let (mut screen, effects) = RepoListScreen::mount(Some(&session));
        let page = dispatches(&effects).remove(0);
        screen.apply(
            Slot::Page,
            page.id,
            Outcome::Repos(Err(ApiError::Http {
                status: 401,
                message: Some("Bad credentials".to_string()),
            })),
        );
        assert_eq!(screen.status_message(), Some("Bad credentials"));
    }

    #[test]
    fn test_select_navigates_to_repository() {
        let (mut screen, _) = loaded(vec![repo(1, "alpha"), repo(2, "beta")]);
        screen.handle_action(Action::NavigateRight);
        assert_eq!(
            screen.handle_action(Action::Select),
            vec![Effect::Navigate(Route::Repo {
                repo_name: "beta".to_string()
            })]
        );
    }

    #[test]
    fn test_verify_prompt_rejects_empty_name() {
        let (mut screen, _) = loaded(vec![]);
        screen.handle_action(Action::VerifyRepo);
        assert_eq!(screen.input_mode(), InputMode::Insert);

        screen.handle_paste("   ");
        assert!(screen.handle_input(key(KeyCode::Enter)).is_empty());
        assert_eq!(
            screen.verify_prompt().unwrap().message.as_deref(),
            Some(EMPTY_NAME)
        );
    }

    #[test]
    fn test_verify_success_navigates() {
        let (mut screen, _) = loaded(vec![]);
        screen.handle_action(Action::VerifyRepo);
        screen.handle_paste("knightlint");
        let sent = dispatches(&screen.handle_input(key(KeyCode::Enter)));
        assert_eq!(
            sent[0].command,
            Command::VerifyRepo {
                repo_name: "knightlint".to_string()
            }
        );
        assert!(screen.is_verifying());

        let effects = screen.apply(
            Slot::Verify,
            sent[0].id,
            Outcome::Verified {
                repo_name: "knightlint".to_string(),
                result: Ok(Default::default()),
            },
        );
        assert_eq!(
            effects,
            vec![Effect::Navigate(Route::Repo {
                repo_name: "knightlint".to_string()
            })]
        );
        assert!(screen.verify_prompt().is_none());
    }

    #[test]
    fn test_verify_failure_uses_fallback() {
        let (mut screen, _) = loaded(vec![]);
        screen.handle_action(Action::VerifyRepo);
        screen.handle_paste("secret");
        let sent = dispatches(&screen.handle_input(key(KeyCode::Enter)));

        screen.apply(
            Slot::Verify,
            sent[0].id,
            Outcome::Verified {
                repo_name: "secret".to_string(),
                result: Err(ApiError::Decode("eof".to_string())),
            },
        );
        assert_eq!(
            screen.verify_prompt().unwrap().message.as_deref(),
            Some(VERIFY_FAILED)
        );
        assert!(!screen.is_verifying());
    }

    #[test]
    fn test_cancelled_verify_reply_is_ignored() {
        let (mut screen, _) = loaded(vec![]);
        screen.handle_action(Action::VerifyRepo);
        screen.handle_paste("abandoned");
        let sent = dispatches(&screen.handle_input(key(KeyCode::Enter)));
        screen.handle_input(key(KeyCode::Esc));

        // Reopened before the old reply lands
        screen.handle_action(Action::VerifyRepo);
        let effects = screen.apply(
            Slot::Verify,
            sent[0].id,
            Outcome::Verified {
                repo_name: "abandoned".to_string(),
                result: Ok(Default::default()),
            },
        );
        assert!(effects.is_empty());
        assert!(screen.verify_prompt().is_some());
    }

    #[test]
    fn test_verify_unavailable_without_session() {
        let (mut screen, _) = RepoListScreen::mount(None);
        screen.handle_action(Action::VerifyRepo);
        assert!(screen.verify_prompt().is_none());
    }
}
