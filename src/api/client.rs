use super::endpoints::*;
use super::error::ApiError;
use super::models::*;
use crate::session::Session;
use tracing::{debug, instrument};
use url::Url;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("knightlint/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Where the browser must go to start the GitHub OAuth flow.
    pub fn login_url(&self) -> Url {
        self.url_for("/login")
    }

    fn url_for(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!("{}{}", self.base_url.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        url.set_query(None);
        url
    }

    /// Full request URL, session included. The token travels in the query
    /// string because that is what the backend accepts.
    pub fn endpoint_url<E: Endpoint>(&self, session: &Session, endpoint: &E) -> Url {
        let mut url = self.url_for(E::PATH);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("token", session.token());
            if E::SENDS_USERNAME {
                query.append_pair("username", session.username());
            }
            for (key, value) in endpoint.params() {
                query.append_pair(key, &value);
            }
        }
        url
    }

    /// Execute any endpoint and decode its typed response.
    #[instrument(skip_all, fields(path = E::PATH, method = %E::METHOD))]
    pub async fn send<E: Endpoint>(
        &self,
        session: &Session,
        endpoint: &E,
    ) -> Result<E::Response, ApiError> {
        let url = self.endpoint_url(session, endpoint);
        // The request URL carries the token; keep it out of error messages
        let response = self
            .http
            .request(E::METHOD, url)
            .send()
            .await
            .map_err(|e| e.without_url())?;
        let status = response.status();
        let body = response.text().await.map_err(|e| e.without_url())?;
        debug!(status = status.as_u16(), bytes = body.len(), "backend responded");

        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: ApiError::message_from_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn user_repos(&self, session: &Session) -> Result<Vec<Repository>, ApiError> {
        Ok(self.send(session, &UserRepos).await?.repositories)
    }

    pub async fn repo_stats(&self, session: &Session, repo_name: &str) -> Result<RepoStats, ApiError> {
        self.send(
            session,
            &RepoStatsRequest {
                repo_name: repo_name.to_string(),
            },
        )
        .await
    }

    pub async fn repo_languages(
        &self,
        session: &Session,
        repo_name: &str,
    ) -> Result<LanguageBreakdown, ApiError> {
        self.send(
            session,
            &RepoLanguages {
                repo_name: repo_name.to_string(),
            },
        )
        .await
    }

    pub async fn pull_requests(
        &self,
        session: &Session,
        repo_name: &str,
    ) -> Result<Vec<PullRequest>, ApiError> {
        let response = self
            .send(
                session,
                &RepoPullRequests {
                    repo_name: repo_name.to_string(),
                },
            )
            .await?;
        Ok(response.pull_requests)
    }

    pub async fn pr_details(
        &self,
        session: &Session,
        repo_name: &str,
        pr_number: u64,
    ) -> Result<PrDetails, ApiError> {
        self.send(
            session,
            &PrDetailsRequest {
                repo_name: repo_name.to_string(),
                pr_number,
            },
        )
        .await
    }

    pub async fn file_content(&self, session: &Session, raw_url: &str) -> Result<String, ApiError> {
        let response = self
            .send(
                session,
                &FileContent {
                    raw_url: raw_url.to_string(),
                },
            )
            .await?;
        Ok(response.content)
    }

    pub async fn analyze(
        &self,
        session: &Session,
        repo_name: &str,
        pr_number: u64,
    ) -> Result<Analysis, ApiError> {
        self.send(
            session,
            &AnalyzePr {
                repo_name: repo_name.to_string(),
                pr_number,
            },
        )
        .await
    }

    pub async fn recheck(
        &self,
        session: &Session,
        repo_name: &str,
        pr_number: u64,
    ) -> Result<Analysis, ApiError> {
        self.send(
            session,
            &RecheckPr {
                repo_name: repo_name.to_string(),
                pr_number,
            },
        )
        .await
    }

    pub async fn commit(
        &self,
        session: &Session,
        repo_name: &str,
        pr_number: u64,
        request: CommitRequest,
    ) -> Result<CommitOutcome, ApiError> {
        self.send(
            session,
            &CommitChanges {
                repo_name: repo_name.to_string(),
                pr_number,
                request,
            },
        )
        .await
    }

    pub async fn verify_repo(
        &self,
        session: &Session,
        repo_name: &str,
    ) -> Result<VerifiedRepo, ApiError> {
        self.send(
            session,
            &VerifyRepo {
                repo_name: repo_name.to_string(),
            },
        )
        .await
    }
}
