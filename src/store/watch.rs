use tokio::sync::broadcast::{self, error::RecvError};

use crate::{model::settings::SETTINGS_KEY, prelude::*};

/// Zero-payload "settings changed" subscription. Holders re-read the
/// settings after every wakeup; the signal never carries the new value.
pub struct SettingsWatch {
  local: broadcast::Receiver<()>,
  backend: broadcast::Receiver<String>,
}

impl SettingsWatch {
  pub(super) fn new(
    local: broadcast::Receiver<()>,
    backend: broadcast::Receiver<String>,
  ) -> Self {
    Self { local, backend }
  }

  /// Resolves on the next settings write. A save through the same store is
  /// seen on both feeds; it and any other queued signals collapse into one
  /// wakeup.
  pub async fn changed(&mut self) -> Result<()> {
    loop {
      tokio::select! {
        res = self.local.recv() => match res {
          Ok(()) | Err(RecvError::Lagged(_)) => break,
          Err(RecvError::Closed) => return Err(Error::Closed),
        },
        res = self.backend.recv() => match res {
          Ok(key) if key == SETTINGS_KEY => break,
          Ok(_) => continue,
          Err(RecvError::Lagged(skipped)) => {
            trace!(skipped, "settings watch lagged");
            break;
          }
          Err(RecvError::Closed) => return Err(Error::Closed),
        },
      }
    }
    self.mark_seen();
    Ok(())
  }

  /// Drops signals already queued, e.g. right after re-reading.
  pub fn mark_seen(&mut self) {
    while self.local.try_recv().is_ok() {}
    while self.backend.try_recv().is_ok() {}
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use crate::{
    model::{GlobalSettings, Product},
    prelude::*,
    storage::Memory,
    store::Store,
  };

  async fn within<F: Future>(fut: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(1), fut)
      .await
      .expect("watch did not fire")
  }

  #[tokio::test]
  async fn test_same_store_notification() {
    let store = Store::new(Arc::new(Memory::new()));
    let mut watch = store.watch_settings();

    let settings = GlobalSettings { upi_id: "a@b".into(), ..Default::default() };
    store.save_settings(&settings).await.unwrap();

    within(watch.changed()).await.unwrap();
    assert_eq!(store.get_settings().await.unwrap().upi_id, "a@b");
  }

  #[tokio::test]
  async fn test_one_save_wakes_once() {
    let store = Store::new(Arc::new(Memory::new()));
    let mut watch = store.watch_settings();

    store.save_settings(&GlobalSettings::default()).await.unwrap();
    within(watch.changed()).await.unwrap();

    let again =
      tokio::time::timeout(Duration::from_millis(50), watch.changed()).await;
    assert!(again.is_err());
  }

  #[tokio::test]
  async fn test_other_view_notification() {
    let backend = Arc::new(Memory::new());
    let admin_view = Store::new(backend.clone());
    let user_view = Store::new(backend);
    let mut watch = user_view.watch_settings();

    let settings = GlobalSettings { upi_id: "new@upi".into(), ..Default::default() };
    admin_view.save_settings(&settings).await.unwrap();

    within(watch.changed()).await.unwrap();
    assert_eq!(user_view.get_settings().await.unwrap().upi_id, "new@upi");
  }

  #[tokio::test]
  async fn test_other_collections_do_not_wake() {
    let store = Store::new(Arc::new(Memory::new()));
    let mut watch = store.watch_settings();

    store
      .upsert(Product::new("p", "", 1, Default::default(), 1))
      .await
      .unwrap();

    let woke =
      tokio::time::timeout(Duration::from_millis(50), watch.changed()).await;
    assert!(woke.is_err());
  }

  #[tokio::test]
  async fn test_mark_seen_drops_queued_signals() {
    let store = Store::new(Arc::new(Memory::new()));
    let mut watch = store.watch_settings();

    store.save_settings(&GlobalSettings::default()).await.unwrap();
    watch.mark_seen();

    let woke =
      tokio::time::timeout(Duration::from_millis(50), watch.changed()).await;
    assert!(woke.is_err());
  }
}
