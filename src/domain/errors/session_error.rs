//! Session token error types.

use thiserror::Error;

/// Session token error variants.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum SessionError {
    #[error("invalid token format: {reason}")]
    InvalidFormat { reason: String },

    #[error("invalid token claims: {reason}")]
    InvalidClaims { reason: String },

    #[error("token expired")]
    Expired,

    #[error("failed to retrieve stored token: {message}")]
    RetrievalFailed { message: String },

    #[error("failed to store token: {message}")]
    StorageFailed { message: String },

    #[error("no session token available")]
    NoTokenAvailable,
}

impl SessionError {
    /// Creates invalid format error.
    #[must_use]
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            reason: reason.into(),
        }
    }

    /// Creates invalid claims error.
    #[must_use]
    pub fn invalid_claims(reason: impl Into<String>) -> Self {
        Self::InvalidClaims {
            reason: reason.into(),
        }
    }

    /// Creates retrieval failed error.
    #[must_use]
    pub fn retrieval_failed(message: impl Into<String>) -> Self {
        Self::RetrievalFailed {
            message: message.into(),
        }
    }

    /// Creates storage failed error.
    #[must_use]
    pub fn storage_failed(message: impl Into<String>) -> Self {
        Self::StorageFailed {
            message: message.into(),
        }
    }
}
