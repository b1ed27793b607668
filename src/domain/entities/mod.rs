//! Domain entity definitions.

mod chat;
mod session;
mod unread;

pub use chat::{
    ChatId, ChatMessage, ChatMessageId, ChatParticipant, ChatSummary, count_unread_chats,
};
pub use session::{Role, SessionClaims, SessionToken};
pub use unread::{MAX_BADGE_COUNT, UnreadSnapshot, badge_text};
