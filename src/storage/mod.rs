//! String-keyed persistence backends.
//!
//! A backend stores opaque string values under string keys, rejects writes
//! that would exceed its byte quota and announces every changed key on a
//! broadcast feed so that other views of the same data can refresh.

mod memory;
mod sqlite;

pub use memory::Memory;
pub use sqlite::Sqlite;
use tokio::sync::broadcast;

use crate::prelude::*;

/// Default capacity, the same order as a browser origin's local storage.
pub const DEFAULT_QUOTA: u64 = 5 * 1024 * 1024;

const CHANGES_CAPACITY: usize = 64;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
  async fn get(&self, key: &str) -> Result<Option<String>>;

  async fn set(&self, key: &str, value: String) -> Result<()> {
    self.set_many(vec![(key.to_string(), value)]).await
  }

  /// Writes every entry or none of them.
  async fn set_many(&self, entries: Vec<(String, String)>) -> Result<()>;

  async fn remove(&self, key: &str) -> Result<()>;

  async fn usage(&self) -> Result<Usage>;

  /// Keys written or removed from now on, by any holder of this backend.
  fn changes(&self) -> broadcast::Receiver<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
  pub used: u64,
  pub capacity: Option<u64>,
}

fn entry_size(key: &str, value: &str) -> u64 {
  (key.len() + value.len()) as u64
}

#[derive(Debug, Clone, Copy)]
struct Quota {
  capacity: Option<u64>,
}

impl Quota {
  fn check(&self, key: &str, needed: u64) -> Result<()> {
    match self.capacity {
      Some(capacity) if needed > capacity => {
        warn!(key, needed, capacity, "storage quota exceeded");
        Err(Error::StorageExhausted { key: key.to_string(), needed, capacity })
      }
      _ => Ok(()),
    }
  }

  /// Total size after replacing `entries` in a store of size `used`.
  /// `current` returns the size of the value presently stored under a key.
  fn projected<'a>(
    used: u64,
    entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    mut current: impl FnMut(&str) -> u64,
  ) -> u64 {
    let mut latest: HashMap<&str, u64> = HashMap::new();
    for (key, value) in entries {
      latest.insert(key, entry_size(key, value));
    }

    latest
      .into_iter()
      .fold(used, |acc, (key, size)| acc.saturating_sub(current(key)) + size)
  }
}

struct Changes {
  tx: broadcast::Sender<String>,
}

impl Changes {
  fn new() -> Self {
    let (tx, _) = broadcast::channel(CHANGES_CAPACITY);
    Self { tx }
  }

  fn publish(&self, key: &str) {
    // no subscribers is fine
    let _ = self.tx.send(key.to_string());
  }

  fn subscribe(&self) -> broadcast::Receiver<String> {
    self.tx.subscribe()
  }
}
