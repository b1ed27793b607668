//! Keyring-based session token storage.

use async_trait::async_trait;
use keyring::Entry;
use tracing::{debug, warn};

use crate::domain::entities::SessionToken;
use crate::domain::errors::SessionError;
use crate::domain::ports::TokenStoragePort;

const KEYRING_SERVICE: &str = "carelink";
const KEYRING_USER: &str = "session";

/// System keyring token storage adapter.
pub struct KeyringTokenStorage {
    service: String,
    user: String,
}

impl KeyringTokenStorage {
    /// Creates new storage with default names.
    #[must_use]
    pub fn new() -> Self {
        Self::with_names(KEYRING_SERVICE, KEYRING_USER)
    }

    /// Creates storage with custom names.
    #[must_use]
    pub fn with_names(service: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            user: user.into(),
        }
    }

    fn entry(&self) -> Result<Entry, SessionError> {
        Entry::new(&self.service, &self.user)
            .map_err(|e| SessionError::retrieval_failed(format!("failed to access keyring: {e}")))
    }
}

impl Default for KeyringTokenStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStoragePort for KeyringTokenStorage {
    async fn get_token(&self) -> Result<Option<SessionToken>, SessionError> {
        debug!(service = %self.service, "Retrieving session from keyring");

        match self.entry()?.get_password() {
            Ok(stored) => {
                let token = SessionToken::new(stored);
                if token.is_none() {
                    warn!("Stored session token is malformed, ignoring it");
                }
                Ok(token)
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => {
                warn!(error = %e, "Failed to retrieve session from keyring");
                Err(SessionError::retrieval_failed(e.to_string()))
            }
        }
    }

    async fn store_token(&self, token: &SessionToken) -> Result<(), SessionError> {
        debug!(service = %self.service, "Storing session in keyring");

        self.entry()?.set_password(token.as_str()).map_err(|e| {
            warn!(error = %e, "Failed to store session in keyring");
            SessionError::storage_failed(e.to_string())
        })
    }

    async fn delete_token(&self) -> Result<(), SessionError> {
        debug!(service = %self.service, "Deleting session from keyring");

        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => {
                warn!(error = %e, "Failed to delete session from keyring");
                Err(SessionError::storage_failed(e.to_string()))
            }
        }
    }
}
