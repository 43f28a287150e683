use crate::session::Session;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use thiserror::Error;
use url::Url;

static REPO_ROUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/repo/([A-Za-z0-9._-]+)$").expect("repository route pattern is valid")
});

static PR_ROUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/repo/([A-Za-z0-9._-]+)/pr/(\d+)$").expect("pull request route pattern is valid")
});

static REPO_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("repository name pattern is valid"));

/// True if `name` can appear as the `:repoName` segment of a route.
pub fn is_valid_repo_name(name: &str) -> bool {
    REPO_NAME.is_match(name)
}

#[derive(Debug, Error, PartialEq)]
pub enum RouteError {
    #[error("No screen matches path: {0}")]
    UnknownPath(String),

    #[error("Invalid location: {0}")]
    InvalidLocation(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    HowItWorks,
    SelectRepo,
    Repo { repo_name: String },
    PullRequest { repo_name: String, number: u64 },
}

/// A parsed location: the route plus any session carried in its query string.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub route: Route,
    pub session: Option<Session>,
}

impl Route {
    /// Parse a path such as `/repo/knightlint/pr/42`, optionally followed by a
    /// query string. Full URLs (e.g. the OAuth callback) are accepted too.
    pub fn parse(location: &str) -> Result<Location, RouteError> {
        let location = location.trim();
        let (path, query) = if location.starts_with("http://") || location.starts_with("https://")
        {
            let url = Url::parse(location)
                .map_err(|e| RouteError::InvalidLocation(format!("{location}: {e}")))?;
            (url.path().to_string(), url.query().map(str::to_string))
        } else {
            match location.split_once('?') {
                Some((path, query)) => (path.to_string(), Some(query.to_string())),
                None => (location.to_string(), None),
            }
        };

        Ok(Location {
            route: Self::match_path(&path)?,
            session: query.as_deref().and_then(Session::from_query),
        })
    }

    fn match_path(path: &str) -> Result<Route, RouteError> {
        let trimmed = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };

        match trimmed {
            "" | "/" => return Ok(Route::Landing),
            "/how-it-works" => return Ok(Route::HowItWorks),
            "/select-repo" => return Ok(Route::SelectRepo),
            _ => {}
        }

        if let Some(caps) = PR_ROUTE.captures(trimmed) {
            let number = caps[2]
                .parse()
                .map_err(|_| RouteError::UnknownPath(path.to_string()))?;
            return Ok(Route::PullRequest {
                repo_name: caps[1].to_string(),
                number,
            });
        }

        if let Some(caps) = REPO_ROUTE.captures(trimmed) {
            return Ok(Route::Repo {
                repo_name: caps[1].to_string(),
            });
        }

        Err(RouteError::UnknownPath(path.to_string()))
    }

    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::HowItWorks => "/how-it-works".to_string(),
            Route::SelectRepo => "/select-repo".to_string(),
            Route::Repo { repo_name } => format!("/repo/{repo_name}"),
            Route::PullRequest { repo_name, number } => format!("/repo/{repo_name}/pr/{number}"),
        }
    }

    pub fn requires_session(&self) -> bool {
        !matches!(self, Route::Landing | Route::HowItWorks)
    }

    /// Where the back action leads from this route.
    pub fn parent(&self) -> Option<Route> {
        match self {
            Route::Landing => None,
            Route::HowItWorks | Route::SelectRepo => Some(Route::Landing),
            Route::Repo { .. } => Some(Route::SelectRepo),
            Route::PullRequest { repo_name, .. } => Some(Route::Repo {
                repo_name: repo_name.clone(),
            }),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
