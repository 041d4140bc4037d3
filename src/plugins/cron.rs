use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::time;

use crate::{
  plugins::Plugin, prelude::*, state::AppState, storage::Storage, store::Store,
};

/// Logs every payment settings change, as seen by a storefront view.
pub struct SettingsLog;

#[async_trait]
impl Plugin for SettingsLog {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let mut watch = app.store.watch_settings();
    loop {
      watch.changed().await?;
      watch.mark_seen();

      let settings = app.store.get_settings().await?;
      info!(
        upi_id = %settings.upi_id,
        has_qr = !settings.upi_qr_url.is_empty(),
        "payment settings changed"
      );
    }
  }
}

pub struct Backup;

#[async_trait]
impl Plugin for Backup {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let period = app.config.backup_interval;
    if period.is_zero() {
      info!("Auto-backups disabled via config (0 interval)");
      return Ok(());
    }

    info!("Backup service started (Interval: {})", humantime::format_duration(period));

    let mut interval = time::interval(period);

    // skip at the moment backup
    interval.tick().await;

    loop {
      interval.tick().await;

      match perform_backup(&app.store, &app.config.backup_dir).await {
        Ok(path) => info!("Backup written to {}", path.display()),
        Err(err) => error!("Auto-backup failed: {err}"),
      }
    }
  }
}

/// Writes every persisted collection into one timestamped JSON file.
pub async fn perform_backup(store: &Store, dir: &Path) -> Result<PathBuf> {
  let snapshot = store.snapshot().await?;
  let body = json::to_vec_pretty(&snapshot)?;

  tokio::fs::create_dir_all(dir).await?;
  let name = format!("acarder-{}.json", Utc::now().format("%Y%m%d-%H%M%S%.3f"));
  let path = dir.join(name);
  tokio::fs::write(&path, body).await?;

  Ok(path)
}

/// Warns when the store gets close to its quota, before writes start
/// failing.
pub struct QuotaMonitor;

/// Fraction of the quota, in percent, above which a warning is logged.
const QUOTA_WARN_PERCENT: u64 = 80;

#[async_trait]
impl Plugin for QuotaMonitor {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let mut interval = time::interval(Duration::from_secs(600));
    loop {
      interval.tick().await;

      let usage = app.store.storage().usage().await?;
      let Some(capacity) = usage.capacity else {
        debug!(used = usage.used, "storage usage (no quota)");
        continue;
      };

      let percent = usage.used * 100 / capacity.max(1);
      if percent >= QUOTA_WARN_PERCENT {
        warn!(
          "Storage {}% full ({} of {} bytes). Delete old products or shrink images.",
          percent, usage.used, capacity
        );
      } else {
        debug!(used = usage.used, capacity, "storage usage");
      }
    }
  }
}
