use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use carelink::application::services::{ChatUnreadStore, UnreadNotifier};
use carelink::application::use_cases::{MarkChatReadUseCase, ResolveSessionUseCase};
use carelink::infrastructure::{
    AppConfig, ChatApiClient, CliArgs, ConfigStore, DesktopNotificationService,
    KeyringTokenStorage,
};
use carelink::presentation::App;

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry().with(filter).init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let store = ConfigStore::new()?;
    let mut config = store.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

async fn create_app(args: CliArgs, config: AppConfig) -> Result<App> {
    let resolver = ResolveSessionUseCase::new(Arc::new(KeyringTokenStorage::new()));
    if args.forget_token {
        resolver.forget().await?;
    }

    let session = resolver
        .execute(args.token, args.save_token)
        .await
        .wrap_err("no usable session; pass --token or set CARELINK_TOKEN")?;

    info!(
        source = %session.source,
        role = %session.claims.role,
        api_url = %config.api_url,
        "Session resolved"
    );

    let role = session.claims.role.clone();
    let client = Arc::new(ChatApiClient::new(config.api_url.clone(), session.token)?);
    let store = ChatUnreadStore::with_poll_interval(client.clone(), config.poll_interval());
    let mark_read = MarkChatReadUseCase::new(client, store.trigger());
    let notifier = UnreadNotifier::new(Arc::new(DesktopNotificationService::new(
        config.notifications.desktop,
    )));

    Ok(App::new(store, mark_read, notifier, role, config.ui))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = load_config(&args)?;

    init_logging(&config)?;

    info!(version = carelink::VERSION, "Starting carelink");

    let app = create_app(args, config).await?;

    let mut terminal = ratatui::init();

    let result = app.run(&mut terminal).await;

    ratatui::restore();

    result
}
