//! Domain layer with core entities, unread rules and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{ChatSummary, SessionToken, UnreadSnapshot};
pub use errors::{ChatError, SessionError};
pub use ports::{ChatPort, NotificationPort, TokenStoragePort};
