use std::{env, path::PathBuf};

use anyhow::Context;

use crate::{prelude::*, storage::DEFAULT_QUOTA};

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  /// `None` disables the quota.
  pub storage_quota: Option<u64>,
  /// Zero disables backups.
  pub backup_interval: Duration,
  pub backup_dir: PathBuf,
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let database_url = env::var("DATABASE_URL")
      .unwrap_or_else(|_| "sqlite:acarder.db?mode=rwc".into());

    let storage_quota = match env::var("STORAGE_QUOTA_BYTES") {
      Ok(raw) => {
        let bytes: u64 = raw
          .trim()
          .parse()
          .with_context(|| format!("invalid STORAGE_QUOTA_BYTES `{raw}`"))?;
        (bytes > 0).then_some(bytes)
      }
      Err(_) => Some(DEFAULT_QUOTA),
    };

    let backup_interval = match env::var("BACKUP_INTERVAL") {
      Ok(raw) => humantime::parse_duration(raw.trim())
        .with_context(|| format!("invalid BACKUP_INTERVAL `{raw}`"))?,
      Err(_) => Duration::from_secs(24 * 3600),
    };

    let backup_dir =
      env::var("BACKUP_DIR").map(PathBuf::from).unwrap_or_else(|_| "backups".into());

    Ok(Self { database_url, storage_quota, backup_interval, backup_dir })
  }
}
