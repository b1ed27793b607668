use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "carelink",
    version,
    about = "Terminal client for the caregiver, patient and doctor chat backend",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Base URL of the care coordination API.
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Unread poll interval in milliseconds (0 disables polling).
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Enable desktop notifications for new unread chats.
    #[arg(long)]
    pub desktop_notifications: Option<bool>,

    /// Session token.
    #[arg(long, env = "CARELINK_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Save the session token from --token to the system keyring.
    #[arg(long)]
    pub save_token: bool,

    /// Remove the session saved in the system keyring before starting.
    #[arg(long, conflicts_with = "save_token")]
    pub forget_token: bool,
}
