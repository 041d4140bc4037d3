use std::sync::{Mutex, PoisonError};

use dashmap::DashMap;
use tokio::sync::broadcast;

use super::{Changes, DEFAULT_QUOTA, Quota, Storage, Usage, entry_size};
use crate::prelude::*;

/// In-process backend. Cloning the `Arc` around it gives several views of
/// the same data, like two windows sharing one browser profile.
pub struct Memory {
  entries: DashMap<String, String>,
  quota: Quota,
  changes: Changes,
  write: Mutex<()>,
}

impl Memory {
  pub fn new() -> Self {
    Self::with_capacity(Some(DEFAULT_QUOTA))
  }

  pub fn unbounded() -> Self {
    Self::with_capacity(None)
  }

  pub fn with_capacity(capacity: Option<u64>) -> Self {
    Self {
      entries: DashMap::new(),
      quota: Quota { capacity },
      changes: Changes::new(),
      write: Mutex::new(()),
    }
  }

  fn used(&self) -> u64 {
    self.entries.iter().map(|entry| entry_size(entry.key(), entry.value())).sum()
  }
}

impl Default for Memory {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait::async_trait]
impl Storage for Memory {
  async fn get(&self, key: &str) -> Result<Option<String>> {
    Ok(self.entries.get(key).map(|value| value.clone()))
  }

  async fn set_many(&self, entries: Vec<(String, String)>) -> Result<()> {
    let Some((first, _)) = entries.first() else {
      return Ok(());
    };

    {
      let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);

      let needed = Quota::projected(
        self.used(),
        entries.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        |key| {
          self.entries.get(key).map_or(0, |value| entry_size(key, &value))
        },
      );
      self.quota.check(first, needed)?;

      for (key, value) in &entries {
        trace!(key = %key, bytes = value.len(), "memory write");
        self.entries.insert(key.clone(), value.clone());
      }
    }

    for (key, _) in &entries {
      self.changes.publish(key);
    }
    Ok(())
  }

  async fn remove(&self, key: &str) -> Result<()> {
    let removed = {
      let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
      self.entries.remove(key).is_some()
    };
    if removed {
      self.changes.publish(key);
    }
    Ok(())
  }

  async fn usage(&self) -> Result<Usage> {
    Ok(Usage { used: self.used(), capacity: self.quota.capacity })
  }

  fn changes(&self) -> broadcast::Receiver<String> {
    self.changes.subscribe()
  }
}

#[cfg(test)]
mod tests {
  use tokio_test::{assert_err, assert_ok};

  use super::*;

  #[tokio::test]
  async fn test_get_missing_key() {
    let storage = Memory::new();
    assert_eq!(storage.get("nothing").await.unwrap(), None);
  }

  #[tokio::test]
  async fn test_rejected_write_keeps_previous_value() {
    let storage = Memory::with_capacity(Some(16));
    assert_ok!(storage.set("k", "small".into()).await);

    let result = storage.set("k", "x".repeat(64)).await;
    assert!(matches!(result, Err(Error::StorageExhausted { .. })));
    assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("small"));
  }

  #[tokio::test]
  async fn test_set_many_is_all_or_nothing() {
    let storage = Memory::with_capacity(Some(20));
    assert_ok!(storage.set("a", "1".into()).await);

    assert_err!(
      storage
        .set_many(vec![("a".into(), "2".into()), ("b".into(), "x".repeat(30))])
        .await
    );
    assert_eq!(storage.get("a").await.unwrap().as_deref(), Some("1"));
    assert_eq!(storage.get("b").await.unwrap(), None);
  }

  #[tokio::test]
  async fn test_changes_feed() {
    let storage = Memory::new();
    let mut changes = storage.changes();

    storage.set("acarder_settings", "{}".into()).await.unwrap();
    storage.remove("acarder_settings").await.unwrap();
    storage.remove("never_written").await.unwrap();

    assert_eq!(changes.recv().await.unwrap(), "acarder_settings");
    assert_eq!(changes.recv().await.unwrap(), "acarder_settings");
    assert!(changes.try_recv().is_err());
  }

  #[tokio::test]
  async fn test_concurrent_remove_and_set_stay_within_quota() {
    let storage = std::sync::Arc::new(Memory::with_capacity(Some(64)));

    let mut tasks = Vec::new();
    for i in 0..32 {
      let storage = storage.clone();
      tasks.push(tokio::spawn(async move {
        let key = format!("k{}", i % 4);
        if i % 2 == 0 {
          let _ = storage.set(&key, "v".repeat(10)).await;
        } else {
          storage.remove(&key).await.unwrap();
        }
      }));
    }
    for task in tasks {
      task.await.unwrap();
    }

    let usage = storage.usage().await.unwrap();
    assert!(usage.used <= 64);
  }

  #[tokio::test]
  async fn test_usage_counts_keys_and_values() {
    let storage = Memory::with_capacity(Some(100));
    storage.set("ab", "cde".into()).await.unwrap();

    let usage = storage.usage().await.unwrap();
    assert_eq!(usage, Usage { used: 5, capacity: Some(100) });
  }
}
