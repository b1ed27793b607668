//! Application services.

mod chat_unread_store;
mod refresh_trigger;
mod unread_notifier;

pub use chat_unread_store::{
    ChatUnreadStore, DEFAULT_POLL_INTERVAL, RefreshFuture, RefreshOptions, Subscription,
};
pub use refresh_trigger::RefreshTrigger;
pub use unread_notifier::UnreadNotifier;
