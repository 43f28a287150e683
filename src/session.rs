use std::fmt;
use thiserror::Error;
use url::Url;

/// Message shown by every data screen when no session is available.
pub const AUTH_REQUIRED: &str = "Authentication required. Please log in with GitHub again.";

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("The callback URL did not contain a token and username.")]
    MissingCredentials,

    #[error("Invalid callback URL: {0}")]
    InvalidUrl(String),
}

/// The signed-in user: the opaque backend token and the GitHub username.
///
/// Created when the OAuth callback is received (or from stored credentials at
/// startup) and dropped on logout. Screens receive it on mount; it is never
/// re-read from a location string afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    username: String,
}

impl Session {
    /// Returns `None` when either part is missing or blank.
    pub fn new(token: impl Into<String>, username: impl Into<String>) -> Option<Self> {
        let token = token.into().trim().to_string();
        let username = username.into().trim().to_string();
        if token.is_empty() || username.is_empty() {
            return None;
        }
        Some(Self { token, username })
    }

    /// Extract a session from a query string such as `token=abc&username=octo`.
    /// A leading `?` is accepted.
    pub fn from_query(query: &str) -> Option<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut token = None;
        let mut username = None;
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "token" => token = Some(value.into_owned()),
                "username" => username = Some(value.into_owned()),
                _ => {}
            }
        }
        Self::new(token?, username?)
    }

    /// Parse the URL the backend redirects to after the GitHub OAuth dance.
    pub fn from_callback_url(callback: &str) -> Result<Self, SessionError> {
        let url = Url::parse(callback.trim())
            .map_err(|e| SessionError::InvalidUrl(format!("{callback}: {e}")))?;
        url.query()
            .and_then(Self::from_query)
            .ok_or(SessionError::MissingCredentials)
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("username", &self.username)
            .finish()
    }
}
