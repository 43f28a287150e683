use crate::{
    api::{
        Analysis, ApiError, BackendClient, CommitOutcome, CommitRequest, LanguageBreakdown,
        PrDetails, PullRequest, RepoStats, Repository, VerifiedRepo,
    },
    requests::{RequestId, Slot},
    session::Session,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, instrument};

/// Identifies one mounted screen instance. Completions addressed to a screen
/// that has since been replaced are dropped.
pub type ScreenId = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadRepos,
    EnrichRepo {
        repo_name: String,
    },
    VerifyRepo {
        repo_name: String,
    },
    LoadPullRequests {
        repo_name: String,
    },
    LoadPrDetails {
        repo_name: String,
        number: u64,
    },
    LoadFileContent {
        filename: String,
        raw_url: String,
    },
    Analyze {
        repo_name: String,
        number: u64,
        recheck: bool,
    },
    Commit {
        repo_name: String,
        number: u64,
        request: CommitRequest,
    },
}

/// A command tagged with the slot and id the issuing screen will expect back.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub slot: Slot,
    pub id: RequestId,
    pub command: Command,
}

#[derive(Debug)]
pub enum Outcome {
    Repos(Result<Vec<Repository>, ApiError>),
    Enriched {
        repo_name: String,
        stats: Result<RepoStats, ApiError>,
        languages: Result<LanguageBreakdown, ApiError>,
    },
    Verified {
        repo_name: String,
        result: Result<VerifiedRepo, ApiError>,
    },
    PullRequests(Result<Vec<PullRequest>, ApiError>),
    PrDetails(Result<PrDetails, ApiError>),
    FileContent {
        filename: String,
        result: Result<String, ApiError>,
    },
    Analysis {
        recheck: bool,
        result: Result<Analysis, ApiError>,
    },
    Committed(Result<CommitOutcome, ApiError>),
}

impl Outcome {
    /// The outcome a command produces when it never reaches the backend.
    fn failed(command: Command, error: fn() -> ApiError) -> Self {
        match command {
            Command::LoadRepos => Outcome::Repos(Err(error())),
            Command::EnrichRepo { repo_name } => Outcome::Enriched {
                repo_name,
                stats: Err(error()),
                languages: Err(error()),
            },
            Command::VerifyRepo { repo_name } => Outcome::Verified {
                repo_name,
                result: Err(error()),
            },
            Command::LoadPullRequests { .. } => Outcome::PullRequests(Err(error())),
            Command::LoadPrDetails { .. } => Outcome::PrDetails(Err(error())),
            Command::LoadFileContent { filename, .. } => Outcome::FileContent {
                filename,
                result: Err(error()),
            },
            Command::Analyze { recheck, .. } => Outcome::Analysis {
                recheck,
                result: Err(error()),
            },
            Command::Commit { .. } => Outcome::Committed(Err(error())),
        }
    }
}

#[derive(Debug)]
pub struct Completion {
    pub screen: ScreenId,
    pub slot: Slot,
    pub id: RequestId,
    pub outcome: Outcome,
}

/// Runs screen commands on the tokio runtime and reports each result on the
/// completion channel. There is no cancellation: a request always runs to
/// the end, and the UI decides whether the result still matters.
#[derive(Clone)]
pub struct Engine {
    client: BackendClient,
    tx: UnboundedSender<Completion>,
}

impl Engine {
    pub fn new(client: BackendClient, tx: UnboundedSender<Completion>) -> Self {
        Self { client, tx }
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    pub fn dispatch(&self, screen: ScreenId, session: Option<Session>, dispatch: Dispatch) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        let Dispatch { slot, id, command } = dispatch;

        tokio::spawn(async move {
            let outcome = execute(&client, session.as_ref(), command).await;
            // A closed channel means the UI loop has already exited.
            let _ = tx.send(Completion {
                screen,
                slot,
                id,
                outcome,
            });
        });
    }
}

#[instrument(skip_all, fields(user = session.map(Session::username)))]
pub async fn execute(client: &BackendClient, session: Option<&Session>, command: Command) -> Outcome {
    let Some(session) = session else {
        return Outcome::failed(command, || ApiError::MissingSession);
    };

    debug!("executing command");
    match command {
        Command::LoadRepos => Outcome::Repos(client.user_repos(session).await),
        Command::EnrichRepo { repo_name } => {
            let (stats, languages) = futures::future::join(
                client.repo_stats(session, &repo_name),
                client.repo_languages(session, &repo_name),
            )
            .await;
            Outcome::Enriched {
                repo_name,
                stats,
                languages,
            }
        }
        Command::VerifyRepo { repo_name } => {
            let result = client.verify_repo(session, &repo_name).await;
            Outcome::Verified { repo_name, result }
        }
        Command::LoadPullRequests { repo_name } => {
            Outcome::PullRequests(client.pull_requests(session, &repo_name).await)
        }
        Command::LoadPrDetails { repo_name, number } => {
            Outcome::PrDetails(client.pr_details(session, &repo_name, number).await)
        }
        Command::LoadFileContent { filename, raw_url } => {
            let result = client.file_content(session, &raw_url).await;
            Outcome::FileContent { filename, result }
        }
        Command::Analyze {
            repo_name,
            number,
            recheck,
        } => {
            let result = if recheck {
                client.recheck(session, &repo_name, number).await
            } else {
                client.analyze(session, &repo_name, number).await
            };
            Outcome::Analysis { recheck, result }
        }
        Command::Commit {
            repo_name,
            number,
            request,
        } => Outcome::Committed(client.commit(session, &repo_name, number, request).await),
    }
}
