use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No session: detected before any request is made.
    #[error("Authentication required. Please log in with GitHub again.")]
    MissingSession,

    /// The backend answered with a non-success status.
    #[error("Backend returned {status}: {}", message.as_deref().unwrap_or("no error message"))]
    Http { status: u16, message: Option<String> },

    #[error("Backend request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to decode backend response: {0}")]
    Decode(String),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Text to show the user: the backend's own message when it sent one,
    /// otherwise the caller's fallback for the failed action.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::MissingSession => self.to_string(),
            ApiError::Http {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Extract the message from an error body: `{"error": ...}` or FastAPI's
    /// `{"detail": ...}`.
    pub fn message_from_body(body: &str) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        ["error", "detail", "message"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .map(str::to_string)
    }
}
