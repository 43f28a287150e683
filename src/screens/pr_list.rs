use super::{log_failure, Effect, GridState, LoadState};
use crate::{
    api::PullRequest,
    engine::{Command, Outcome},
    events::Action,
    requests::{RequestId, RequestTracker, Slot},
    router::Route,
    session::{Session, AUTH_REQUIRED},
};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

pub const LOAD_FAILED: &str = "An error occurred while loading pull requests.";
pub const NO_PULL_REQUESTS: &str = "No pull requests found for this repository.";
pub const NO_DESCRIPTION: &str = "No description provided";

/// Body text for a card, or the placeholder when the author left none.
pub fn description(pr: &PullRequest) -> &str {
    pr.body
        .as_deref()
        .map(str::trim)
        .filter(|body| !body.is_empty())
        .unwrap_or(NO_DESCRIPTION)
}

/// `head → base`, with whichever side is known.
pub fn branch_badge(pr: &PullRequest) -> Option<String> {
    match (&pr.head_ref, &pr.base_ref) {
        (Some(head), Some(base)) => Some(format!("{head} → {base}")),
        (Some(head), None) => Some(head.clone()),
        (None, Some(base)) => Some(format!("→ {base}")),
        (None, None) => None,
    }
}

pub fn format_date(date: Option<&DateTime<Utc>>, format: &str) -> Option<String> {
    date.map(|date| date.format(format).to_string())
}

#[derive(Debug)]
pub struct PrListScreen {
    repo_name: String,
    has_session: bool,
    state: LoadState<Vec<PullRequest>>,
    pub grid: GridState,
    tracker: RequestTracker,
}

impl PrListScreen {
    pub fn mount(repo_name: &str, session: Option<&Session>) -> (Self, Vec<Effect>) {
        let mut screen = Self {
            repo_name: repo_name.to_string(),
            has_session: session.is_some(),
            state: LoadState::Loading,
            grid: GridState::default(),
            tracker: RequestTracker::new(),
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
            Command::LoadPullRequests {
                repo_name: self.repo_name.clone(),
            },
        )]
    }

    pub fn repo_name(&self) -> &str {
        &self.repo_name
    }

    pub fn state(&self) -> &LoadState<Vec<PullRequest>> {
        &self.state
    }

    pub fn pull_requests(&self) -> &[PullRequest] {
        self.state.ready().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn status_message(&self) -> Option<&str> {
        match &self.state {
            LoadState::Failed(message) => Some(message),
            LoadState::Ready(prs) if prs.is_empty() => Some(NO_PULL_REQUESTS),
            _ => None,
        }
    }

    pub fn handle_action(&mut self, action: Action) -> Vec<Effect> {
        let len = self.pull_requests().len();
        if self.grid.navigate(action, len) {
            return Vec::new();
        }

        match action {
            Action::Select => match self.pull_requests().get(self.grid.selected) {
                Some(pr) => vec![Effect::Navigate(Route::PullRequest {
                    repo_name: self.repo_name.clone(),
                    number: pr.number,
                })],
                None => Vec::new(),
            },
            Action::Refresh => self.load(),
            _ => Vec::new(),
        }
    }

    pub fn apply(&mut self, slot: Slot, id: RequestId, outcome: Outcome) -> Vec<Effect> {
        let result = match outcome {
            Outcome::PullRequests(result) => result,
            other => {
                warn!(?slot, outcome = ?other, "unexpected completion for pull request list");
                return Vec::new();
            }
        };
        if !self.tracker.complete(slot, id) {
            debug!(?id, "discarding stale pull request list");
            return Vec::new();
        }

        match result {
            Ok(prs) => {
                debug!(repo = %self.repo_name, count = prs.len(), "pull requests loaded");
                self.grid.selected = self.grid.selected.min(prs.len().saturating_sub(1));
                self.state = LoadState::Ready(prs);
            }
            Err(err) => {
                log_failure("load pull requests", &err);
                self.state = LoadState::Failed(err.user_message(LOAD_FAILED));
            }
        }
        Vec::new()
    }
}
