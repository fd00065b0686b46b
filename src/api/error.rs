//! API client error types
//!
//! Every variant is terminal for the user action that caused it; nothing here
//! is retried automatically.

use thiserror::Error;

/// Errors returned by [`super::ApiClient`]
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, timeout, broken body stream
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Body did not match the expected shape
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Success status, but a required part of the body was absent
    #[error("response is missing `{0}`")]
    MissingField(&'static str),

    /// Base URL or path could not be turned into a request URL
    #[error("invalid URL {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status, if the server got far enough to send one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Short text suitable for a status line
    pub fn summary(&self) -> String {
        match self {
            ApiError::Status { status, message } if message.is_empty() => {
                format!("HTTP {}", status)
            }
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Transport(e) if e.is_timeout() => "request timed out".to_string(),
            ApiError::Transport(e) if e.is_connect() => "could not reach the server".to_string(),
            other => other.to_string(),
        }
    }
}
