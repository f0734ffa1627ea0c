//! Error types for the Fastly backend.

use tagpurge_core::TagpurgeError;

/// Errors that can occur when talking to the Fastly API.
#[derive(Debug, thiserror::Error)]
pub enum FastlyError {
    /// A required setting is missing.
    #[error("not configured: {0} is required")]
    NotConfigured(&'static str),

    /// The stored credentials are known to be unable to purge.
    #[error("API credentials are not valid for purging")]
    InvalidCredentials,

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request timed out.
    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The API answered with a non-success status.
    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The API answered 2xx but did not confirm the purge.
    #[error("{operation} was not confirmed: status '{status}'")]
    PurgeRejected {
        operation: &'static str,
        status: String,
    },

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Caller supplied input was rejected before sending.
    #[error(transparent)]
    InvalidInput(#[from] TagpurgeError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FastlyError {
    /// Creates a new API error.
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// Maps a reqwest error, keeping timeouts distinguishable.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                seconds: timeout_secs,
            }
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout { .. } => true,
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns true if the error was caused by the caller's input.
    pub fn is_bad_input(&self) -> bool {
        matches!(self, Self::InvalidInput(e) if e.is_bad_input())
    }
}
