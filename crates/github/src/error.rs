//! Error types for GitHub API operations.

use thiserror::Error;

/// Errors raised by the GitHub client and the operations built on it.
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("environment variable 'GITHUB_TOKEN' not defined")]
    MissingToken,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("failed to decode API response: {0}")]
    Decode(String),
}

impl GitHubError {
    /// Whether this is a 404 from the API.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// The `message` field of the API error payload, if the body carried one.
    pub fn api_message(&self) -> Option<String> {
        let Self::Api { body, .. } = self else {
            return None;
        };
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        value.get("message")?.as_str().map(str::to_string)
    }
}

/// A specialized Result type for GitHub operations.
pub type Result<T> = std::result::Result<T, GitHubError>;
