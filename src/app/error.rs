use reqwest::StatusCode;
use thiserror::Error;

// Failures of a single backend call. Callers only log these; nothing is
// retried and none of them is fatal.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("todo id {0:?} cannot be used in a url path")]
    InvalidId(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid backend url {url:?}: {reason}")]
    InvalidApiUrl { url: String, reason: String },

    #[error("could not load .env: {0}")]
    DotEnv(#[from] dotenvy::Error),
}
