//! Chat API error types.

use thiserror::Error;

/// Errors raised while talking to the chat API.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ChatError {
    #[error("network error: {message}")]
    Network { message: String },

    #[error("session rejected by the server")]
    Unauthorized,

    #[error("access denied: {message}")]
    Forbidden { message: String },

    #[error("unexpected response: HTTP {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    #[error("failed to decode response: {message}")]
    Decode { message: String },

    #[error("no session token available")]
    NoSession,

    #[error("unexpected chat error: {message}")]
    Unexpected { message: String },
}

impl ChatError {
    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates unexpected status error.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            status,
            message: message.into(),
        }
    }

    /// Creates decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates unexpected error.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Whether retrying later may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::UnexpectedStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Whether the session must be replaced before retrying.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::NoSession)
    }
}
