//! Chat entities as exposed by the care coordination backend.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Chat identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Chat message identifier. Ids grow monotonically within a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatMessageId(pub i64);

impl std::fmt::Display for ChatMessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chat participant (patient, caregiver, doctor or admin).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatParticipant {
    /// User ID.
    pub id: i64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Participant kind as reported by the backend.
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Message ID.
    pub id: ChatMessageId,
    /// Message body.
    #[serde(default)]
    pub message: String,
    /// Message kind.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// When the message was sent (server local time).
    #[serde(default)]
    pub sent_at: Option<NaiveDateTime>,
    /// Author.
    pub sender: ChatParticipant,
}

/// Summary of a conversation, including its read marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    /// Chat ID.
    pub id: ChatId,
    /// Optional chat title.
    #[serde(default)]
    pub name: Option<String>,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    /// Most recent message, if any.
    #[serde(default)]
    pub last_message: Option<ChatMessage>,
    /// Last message the current user acknowledged.
    #[serde(default)]
    pub last_read_message_id: Option<ChatMessageId>,
    /// Server-side unread flag.
    #[serde(default)]
    pub has_unread_messages: bool,
    /// Members of the chat.
    #[serde(default)]
    pub participants: Vec<ChatParticipant>,
}

impl ChatSummary {
    /// Creates a chat summary with no messages.
    #[must_use]
    pub fn new(id: ChatId) -> Self {
        Self {
            id,
            name: None,
            created_at: None,
            last_message: None,
            last_read_message_id: None,
            has_unread_messages: false,
            participants: Vec::new(),
        }
    }

    /// Sets the chat name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the last message.
    #[must_use]
    pub fn with_last_message(mut self, message: ChatMessage) -> Self {
        self.last_message = Some(message);
        self
    }

    /// Sets the last read marker.
    #[must_use]
    pub const fn with_last_read(mut self, message_id: ChatMessageId) -> Self {
        self.last_read_message_id = Some(message_id);
        self
    }

    /// Sets the server-side unread flag.
    #[must_use]
    pub const fn with_unread_flag(mut self, unread: bool) -> Self {
        self.has_unread_messages = unread;
        self
    }

    /// Title for display: the chat name, else the participant names.
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }

        let names: Vec<&str> = self
            .participants
            .iter()
            .map(|p| p.name.as_str())
            .filter(|n| !n.is_empty())
            .collect();

        if names.is_empty() {
            format!("Chat #{}", self.id)
        } else {
            names.join(", ")
        }
    }

    /// Whether this chat has messages the current user has not read.
    ///
    /// The server flag wins. Otherwise the chat is unread when its last
    /// message is newer than the read marker, or when there is a last
    /// message but no marker at all.
    #[must_use]
    pub fn has_unread(&self) -> bool {
        if self.has_unread_messages {
            return true;
        }

        let Some(last_message) = &self.last_message else {
            return false;
        };

        match self.last_read_message_id {
            None => true,
            Some(last_read) => last_read < last_message.id,
        }
    }
}

/// Counts chats with unread messages.
#[must_use]
pub fn count_unread_chats(chats: &[ChatSummary]) -> usize {
    chats.iter().filter(|chat| chat.has_unread()).count()
}
