//! Unread chat snapshot.

use chrono::{DateTime, Utc};

use super::chat::{ChatSummary, count_unread_chats};

/// Badge values above this are shown as `99+`.
pub const MAX_BADGE_COUNT: usize = 99;

/// Immutable view of the unread state at one point in time.
///
/// The store replaces snapshots wholesale; nothing mutates one after it is
/// published.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnreadSnapshot {
    /// Number of conversations with unread messages.
    pub count: usize,
    /// Conversations in backend order.
    pub chats: Vec<ChatSummary>,
    /// Whether a visible refresh is in flight.
    pub is_loading: bool,
    /// Message of the last committed refresh failure.
    pub error: Option<String>,
    /// Time of the last successful refresh.
    pub last_updated: Option<DateTime<Utc>>,
}

impl UnreadSnapshot {
    /// Empty snapshot: nothing loaded, not loading, no error.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns a copy marked as loading.
    #[must_use]
    pub fn loading(&self) -> Self {
        Self {
            is_loading: true,
            ..self.clone()
        }
    }

    /// Returns the snapshot produced by a successful fetch.
    #[must_use]
    pub fn loaded(chats: Vec<ChatSummary>, at: DateTime<Utc>) -> Self {
        Self {
            count: count_unread_chats(&chats),
            chats,
            is_loading: false,
            error: None,
            last_updated: Some(at),
        }
    }

    /// Returns a copy carrying a refresh failure. Data stays as it was.
    #[must_use]
    pub fn failed(&self, error: impl Into<String>) -> Self {
        Self {
            is_loading: false,
            error: Some(error.into()),
            ..self.clone()
        }
    }

    /// Returns a copy with the loading flag set to `is_loading`.
    #[must_use]
    pub fn with_loading(&self, is_loading: bool) -> Self {
        Self {
            is_loading,
            ..self.clone()
        }
    }

    /// Whether any chat is unread.
    #[must_use]
    pub const fn has_unread(&self) -> bool {
        self.count > 0
    }

    /// Badge text for the current count.
    #[must_use]
    pub fn badge_text(&self) -> Option<String> {
        badge_text(self.count)
    }
}

/// Formats an unread badge: nothing for zero, capped at `99+`.
#[must_use]
pub fn badge_text(count: usize) -> Option<String> {
    match count {
        0 => None,
        n if n > MAX_BADGE_COUNT => Some(format!("{MAX_BADGE_COUNT}+")),
        n => Some(n.to_string()),
    }
}
