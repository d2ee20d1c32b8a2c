use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop the agent from ever accepting a question.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("{key} not found. Please set it in the secrets file or as an environment variable.")]
    MissingCredential { key: String },

    #[error("Error configuring the Gemini client: {0}")]
    ClientConfiguration(String),

    #[error("Failed to read secrets file {}: {message}", path.display())]
    SecretsFile { path: PathBuf, message: String },
}

/// Failures of a single `generateContent` call. Recoverable: the next
/// submission starts from scratch.
#[derive(Debug, Error)]
pub enum RemoteServiceError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Gemini API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("prompt was blocked ({0})")]
    Blocked(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for RemoteServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteServiceError::Timeout(err.to_string())
        } else if err.is_decode() {
            RemoteServiceError::MalformedResponse(err.to_string())
        } else {
            RemoteServiceError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Please enter a question.")]
pub struct EmptyQuery;
