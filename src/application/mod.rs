//! Application layer with the unread store, use cases and DTOs.

/// Data transfer objects.
pub mod dto;
/// Long-lived services.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use dto::{ResolvedSession, TokenSource};
pub use services::{ChatUnreadStore, RefreshOptions, RefreshTrigger, Subscription};
pub use use_cases::{MarkChatReadUseCase, ResolveSessionUseCase};
