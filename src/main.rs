use std::sync::Arc;

use acarder::{
  config::Config,
  plugins::{self, cron},
  state::AppState,
  storage::Storage,
};
use tracing::info;
use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "acarder=debug,sea_orm=warn".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = Config::from_env()?;

  info!("Starting acarder v{}", env!("CARGO_PKG_VERSION"));
  info!("Opening store at {}", config.database_url);

  let app = Arc::new(AppState::new(config).await?);

  let usage = app.store.storage().usage().await?;
  info!(used = usage.used, capacity = ?usage.capacity, "store ready");

  let mut tasks = plugins::App::new()
    .register(cron::SettingsLog)
    .register(cron::Backup)
    .register(cron::QuotaMonitor)
    .run(app.clone());

  tokio::signal::ctrl_c().await?;
  info!("Shutting down");
  tasks.shutdown().await;

  Ok(())
}
