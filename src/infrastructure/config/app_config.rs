//! Application configuration.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::args::CliArgs;

pub(super) const APP_NAME: &str = "carelink";
pub(super) const APP_QUALIFIER: &str = "org";
pub(super) const APP_ORGANIZATION: &str = "carelink";

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_POLL_INTERVAL_MS: u64 = 10_000;

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, from `config.toml` merged with CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log file path.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Base URL of the care coordination API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Unread poll interval in milliseconds. Zero disables polling.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Notification configuration.
    #[serde(default)]
    pub notifications: NotificationsConfig,

    /// UI configuration.
    #[serde(default)]
    pub ui: UiConfig,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Desktop notifications when new unread chats arrive.
    #[serde(default = "default_true")]
    pub desktop: bool,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { desktop: true }
    }
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Timestamp format string (chrono format).
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    /// Show chats without unread messages in the list.
    #[serde(default = "default_true")]
    pub show_read_chats: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            timestamp_format: default_timestamp_format(),
            show_read_chats: true,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

const fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_timestamp_format() -> String {
    "%d/%m %H:%M".to_string()
}

const fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(api_url) = &args.api_url {
            self.api_url.clone_from(api_url);
        }
        if let Some(poll_interval_ms) = args.poll_interval_ms {
            self.poll_interval_ms = poll_interval_ms;
        }
        if let Some(desktop) = args.desktop_notifications {
            self.notifications.desktop = desktop;
        }
    }

    /// Poll interval as a duration.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("carelink.log"))
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            log_level: LogLevel::Info,
            api_url: default_api_url(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            notifications: NotificationsConfig::default(),
            ui: UiConfig::default(),
        }
    }
}
