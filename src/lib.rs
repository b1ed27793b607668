//! carelink - terminal client for the care coordination chat backend.
//!
//! The core is [`application::ChatUnreadStore`], an observable cache of
//! unread conversations that polls the backend, coalesces concurrent
//! refreshes and never lets an older response overwrite a newer one.
//! Around it sit the REST adapter, keyring session storage, configuration
//! and a small TUI showing the unread badge and chat list.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the unread store, use cases and DTOs.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;
/// Presentation layer containing UI components and key handling.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "carelink";
