//! One type per backend endpoint. Each describes its path, method, query
//! parameters and response type; [`BackendClient::send`] does the rest.
//!
//! [`BackendClient::send`]: super::BackendClient::send

use super::models::*;
use reqwest::Method;
use serde::de::DeserializeOwned;

pub trait Endpoint {
    type Response: DeserializeOwned;

    const METHOD: Method;
    const PATH: &'static str;

    /// Whether the username accompanies the token in the query string.
    const SENDS_USERNAME: bool = true;

    /// Endpoint-specific query parameters, appended after the session ones.
    fn params(&self) -> Vec<(&'static str, String)>;
}

#[derive(Debug, Clone)]
pub struct UserRepos;

impl Endpoint for UserRepos {
    type Response = UserReposResponse;
    const METHOD: Method = Method::GET;
    const PATH: &'static str = "/user-repos";

    fn params(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

#[derive(Debug, Clone)]
pub struct RepoStatsRequest {
    pub repo_name: String,
}

impl Endpoint for RepoStatsRequest {
    type Response = RepoStats;
    const METHOD: Method = Method::GET;
    const PATH: &'static str = "/repo-stats";

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![("repo_name", self.repo_name.clone())]
    }
}

#[derive(Debug, Clone)]
pub struct RepoLanguages {
    pub repo_name: String,
}

impl Endpoint for RepoLanguages {
    type Response = LanguageBreakdown;
    const METHOD: Method = Method::GET;
    const PATH: &'static str = "/repo-languages";

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![("repo_name", self.repo_name.clone())]
    }
}

#[derive(Debug, Clone)]
pub struct RepoPullRequests {
    pub repo_name: String,
}

impl Endpoint for RepoPullRequests {
    type Response = PullRequestsResponse;
    const METHOD: Method = Method::GET;
    const PATH: &'static str = "/repo-pull-requests";

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![("repo_name", self.repo_name.clone())]
    }
}

#[derive(Debug, Clone)]
pub struct PrDetailsRequest {
    pub repo_name: String,
    pub pr_number: u64,
}

impl Endpoint for PrDetailsRequest {
    type Response = PrDetails;
    const METHOD: Method = Method::GET;
    const PATH: &'static str = "/pr-details";

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("repo_name", self.repo_name.clone()),
            ("pr_number", self.pr_number.to_string()),
        ]
    }
}

/// Proxied fetch of a file's raw content.
#[derive(Debug, Clone)]
pub struct FileContent {
    pub raw_url: String,
}

impl Endpoint for FileContent {
    type Response = FileContentResponse;
    const METHOD: Method = Method::GET;
    const PATH: &'static str = "/file-content";
    const SENDS_USERNAME: bool = false;

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![("raw_url", self.raw_url.clone())]
    }
}

#[derive(Debug, Clone)]
pub struct AnalyzePr {
    pub repo_name: String,
    pub pr_number: u64,
}

impl Endpoint for AnalyzePr {
    type Response = Analysis;
    const METHOD: Method = Method::POST;
    const PATH: &'static str = "/analyze-pr";

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("repo_name", self.repo_name.clone()),
            ("pr_number", self.pr_number.to_string()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct RecheckPr {
    pub repo_name: String,
    pub pr_number: u64,
}

impl Endpoint for RecheckPr {
    type Response = Analysis;
    const METHOD: Method = Method::POST;
    const PATH: &'static str = "/recheck-pr";

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("repo_name", self.repo_name.clone()),
            ("pr_number", self.pr_number.to_string()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct CommitChanges {
    pub repo_name: String,
    pub pr_number: u64,
    pub request: CommitRequest,
}

impl Endpoint for CommitChanges {
    type Response = CommitOutcome;
    const METHOD: Method = Method::POST;
    const PATH: &'static str = "/commit-changes";

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("repo_name", self.repo_name.clone()),
            ("pr_number", self.pr_number.to_string()),
            ("file_path", self.request.file_path.clone()),
            ("content", self.request.content.clone()),
            ("commit_message", self.request.commit_message.clone()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct VerifyRepo {
    pub repo_name: String,
}

impl Endpoint for VerifyRepo {
    type Response = VerifiedRepo;
    const METHOD: Method = Method::GET;
    const PATH: &'static str = "/verify-repo";

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![("repo_name", self.repo_name.clone())]
    }
}
