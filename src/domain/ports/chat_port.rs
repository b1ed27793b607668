//! Chat API port definition.

use async_trait::async_trait;

use crate::domain::entities::{ChatId, ChatMessageId, ChatSummary};
use crate::domain::errors::ChatError;

/// Port for the chat endpoints of the care coordination API.
#[async_trait]
pub trait ChatPort: Send + Sync {
    /// Lists the current user's chats with their read markers.
    async fn list_my_chats(&self) -> Result<Vec<ChatSummary>, ChatError>;

    /// Moves the current user's read marker in `chat_id` to `message_id`.
    async fn mark_read(&self, chat_id: ChatId, message_id: ChatMessageId)
    -> Result<(), ChatError>;
}
