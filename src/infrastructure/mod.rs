//! Infrastructure layer with external service adapters.

/// Care coordination API client.
pub mod api;
/// Application configuration.
pub mod config;
/// Desktop notifications.
pub mod notifications;
/// Session token storage adapters.
pub mod storage;

pub use api::ChatApiClient;
pub use config::{AppConfig, CliArgs, ConfigStore, LogLevel};
pub use notifications::DesktopNotificationService;
pub use storage::KeyringTokenStorage;
