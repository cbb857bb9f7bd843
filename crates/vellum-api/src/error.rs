use reqwest::StatusCode;
use thiserror::Error;

/// Errors produced by API calls.
///
/// Transport failures and non-2xx responses are deliberately collapsed into
/// one type: callers surface both the same way (a flash notification with a
/// human-readable title) and re-raise for outer handling.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Connection, TLS, or body-decoding failure from reqwest.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Server responded {status}: {body}")]
    Status { status: StatusCode, body: String },
}

impl ApiError {
    /// The HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Transport(e) => e.status(),
            ApiError::Status { status, .. } => Some(*status),
        }
    }
}

/// Convenience alias used throughout the client crates.
pub type Result<T> = std::result::Result<T, ApiError>;
