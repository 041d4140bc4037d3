use super::{SettingsWatch, Store};
use crate::{
  model::{GlobalSettings, settings::SETTINGS_KEY},
  prelude::*,
  storage::Storage,
};

impl Store {
  /// Persisted fields merged over the defaults. Settings that fail to decode
  /// resolve to defaults and are left in storage untouched.
  pub async fn get_settings(&self) -> Result<GlobalSettings> {
    let Some(raw) = self.storage.get(SETTINGS_KEY).await? else {
      return Ok(GlobalSettings::default());
    };

    Ok(json::from_str(&raw).unwrap_or_else(|err| {
      warn!("unreadable settings, using defaults: {err}");
      GlobalSettings::default()
    }))
  }

  /// Persists the full settings object and notifies watchers.
  pub async fn save_settings(&self, settings: &GlobalSettings) -> Result<()> {
    let mut tx = self.begin().await;
    tx.stage_raw(SETTINGS_KEY, json::to_string(settings)?);
    tx.commit().await?;

    debug!(upi_id = %settings.upi_id, "settings saved");
    // nobody watching is fine
    let _ = self.settings.send(());
    Ok(())
  }

  /// Invalidation signal for settings written through this store or through
  /// any other store sharing the same backend.
  pub fn watch_settings(&self) -> SettingsWatch {
    SettingsWatch::new(self.settings.subscribe(), self.storage.changes())
  }
}
