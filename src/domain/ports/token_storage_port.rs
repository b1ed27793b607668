//! Session token storage port definition.

use async_trait::async_trait;

use crate::domain::entities::SessionToken;
use crate::domain::errors::SessionError;

/// Port for session token persistence.
#[async_trait]
pub trait TokenStoragePort: Send + Sync {
    /// Retrieves stored token.
    async fn get_token(&self) -> Result<Option<SessionToken>, SessionError>;

    /// Stores token securely.
    async fn store_token(&self, token: &SessionToken) -> Result<(), SessionError>;

    /// Deletes stored token.
    async fn delete_token(&self) -> Result<(), SessionError>;
}
