//! Session resolution use case.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::application::dto::{ResolvedSession, TokenSource};
use crate::domain::entities::SessionToken;
use crate::domain::errors::SessionError;
use crate::domain::ports::TokenStoragePort;

/// Finds a usable session token.
pub struct ResolveSessionUseCase {
    storage_port: Arc<dyn TokenStoragePort>,
}

impl ResolveSessionUseCase {
    /// Creates new use case.
    #[must_use]
    pub const fn new(storage_port: Arc<dyn TokenStoragePort>) -> Self {
        Self { storage_port }
    }

    /// Resolves a session from the keyring, then from `cli_token`.
    ///
    /// Tokens that do not decode or whose `exp` has passed are skipped.
    /// When `persist` is set, a command-line token that is used gets
    /// stored in the keyring.
    ///
    /// # Errors
    /// Returns `SessionError::NoTokenAvailable` if no source yields a
    /// usable token.
    pub async fn execute(
        &self,
        cli_token: Option<String>,
        persist: bool,
    ) -> Result<ResolvedSession, SessionError> {
        self.execute_at(cli_token, persist, Utc::now()).await
    }

    /// Removes the session saved in the keyring.
    ///
    /// # Errors
    /// Returns `SessionError::StorageFailed` if the keyring rejects it.
    pub async fn forget(&self) -> Result<(), SessionError> {
        self.storage_port
            .delete_token()
            .await
            .inspect(|_| info!("Saved session removed from keyring"))
            .inspect_err(|e| warn!(error = %e, "Failed to remove saved session"))
    }

    async fn execute_at(
        &self,
        cli_token: Option<String>,
        persist: bool,
        now: DateTime<Utc>,
    ) -> Result<ResolvedSession, SessionError> {
        debug!("Checking keyring for stored session");
        match self.storage_port.get_token().await {
            Ok(Some(token)) => match Self::accept(token, TokenSource::Keyring, now) {
                Ok(session) => {
                    info!(role = %session.claims.role, "Using session from system keyring");
                    return Ok(session);
                }
                Err(e) => warn!(error = %e, "Stored session is unusable"),
            },
            Ok(None) => debug!("No session stored in keyring"),
            Err(e) => debug!(error = %e, "Failed to check keyring"),
        }

        let Some(raw) = cli_token.filter(|s| !s.trim().is_empty()) else {
            debug!("No session found in any source");
            return Err(SessionError::NoTokenAvailable);
        };

        let token = SessionToken::new(raw)
            .ok_or_else(|| SessionError::invalid_format("expected three dot-separated segments"))?;
        let session = Self::accept(token, TokenSource::CommandLine, now)?;
        info!(role = %session.claims.role, "Using session from command line / environment");

        if persist {
            match self.storage_port.store_token(&session.token).await {
                Ok(()) => info!("Session token saved to keyring"),
                Err(e) => warn!(error = %e, "Failed to save session token"),
            }
        }

        Ok(session)
    }

    fn accept(
        token: SessionToken,
        source: TokenSource,
        now: DateTime<Utc>,
    ) -> Result<ResolvedSession, SessionError> {
        let claims = token.claims()?;
        if claims.is_expired_at(now) {
            return Err(SessionError::Expired);
        }

        Ok(ResolvedSession {
            token,
            source,
            claims,
        })
    }
}
