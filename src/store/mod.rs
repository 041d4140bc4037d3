//! Typed collections over a [`Storage`] backend.
//!
//! Every mutation loads whole collections, changes them in memory and writes
//! them back in one [`Storage::set_many`] call, so a rejected write never
//! leaves one collection updated and another stale.

mod settings;
mod watch;

use tokio::sync::{Mutex, MutexGuard, broadcast};
pub use watch::SettingsWatch;

use crate::{
  model::{Collection, Record, settings::SETTINGS_KEY},
  prelude::*,
  storage::Storage,
  sv::Services,
};

pub struct Store {
  storage: Arc<dyn Storage>,
  lock: Mutex<()>,
  settings: broadcast::Sender<()>,
}

impl Store {
  pub fn new(storage: Arc<dyn Storage>) -> Self {
    let (settings, _) = broadcast::channel(16);
    Self { storage, lock: Mutex::new(()), settings }
  }

  pub fn storage(&self) -> &Arc<dyn Storage> {
    &self.storage
  }

  pub fn sv(&self) -> Services<'_> {
    Services::new(self)
  }

  /// Serializes read-modify-write sequences on this store.
  pub async fn begin(&self) -> Tx<'_> {
    Tx { store: self, _guard: self.lock.lock().await, writes: Vec::new() }
  }

  /// Whole collection in insertion order. A collection that fails to decode
  /// reads as empty.
  pub async fn list<T: Record>(&self) -> Result<Vec<T>> {
    let key = T::COLLECTION.key();
    let Some(raw) = self.storage.get(key).await? else {
      return Ok(Vec::new());
    };

    Ok(json::from_str(&raw).unwrap_or_else(|err| {
      warn!(key, "unreadable collection, treating as empty: {err}");
      Vec::new()
    }))
  }

  pub async fn get<T: Record>(&self, id: &str) -> Result<Option<T>> {
    Ok(self.list::<T>().await?.into_iter().find(|item| item.id() == id))
  }

  /// Replaces the record with the same id in place, or appends it.
  pub async fn upsert<T: Record>(&self, record: T) -> Result<()> {
    let mut tx = self.begin().await;
    let mut items = tx.load::<T>().await?;
    upsert_into(&mut items, record);
    tx.stage(&items)?;
    tx.commit().await
  }

  /// Removing an id that is not present succeeds without writing.
  pub async fn remove<T: Record>(&self, id: &str) -> Result<()> {
    let mut tx = self.begin().await;
    let mut items = tx.load::<T>().await?;
    let before = items.len();
    items.retain(|item| item.id() != id);
    if items.len() == before {
      return Ok(());
    }
    tx.stage(&items)?;
    tx.commit().await
  }

  /// Finds a record by id and rewrites it with `f`. Nothing is written when
  /// `f` fails.
  pub async fn update<T, R>(
    &self,
    id: &str,
    f: impl FnOnce(&mut T) -> Result<R> + Send,
  ) -> Result<R>
  where
    T: Record,
    R: Send,
  {
    let mut tx = self.begin().await;
    let mut items = tx.load::<T>().await?;
    let item = items
      .iter_mut()
      .find(|item| item.id() == id)
      .ok_or_else(|| Error::not_found(T::COLLECTION, id))?;

    let out = f(item)?;
    tx.stage(&items)?;
    tx.commit().await?;
    Ok(out)
  }

  /// Raw persisted values of every known key, for backups.
  pub async fn snapshot(&self) -> Result<json::Map<String, json::Value>> {
    let keys = Collection::ALL.iter().map(|c| c.key()).chain([SETTINGS_KEY]);

    let mut out = json::Map::new();
    for key in keys {
      if let Some(raw) = self.storage.get(key).await? {
        let value = json::from_str(&raw).unwrap_or(json::Value::String(raw));
        out.insert(key.to_string(), value);
      }
    }
    Ok(out)
  }
}

/// Pending writes of one read-modify-write sequence, holding the store lock.
pub struct Tx<'a> {
  store: &'a Store,
  _guard: MutexGuard<'a, ()>,
  writes: Vec<(String, String)>,
}

impl Tx<'_> {
  /// Current persisted collection. Unlike [`Store::list`] a decode error is
  /// returned, so a damaged collection is never overwritten.
  pub async fn load<T: Record>(&self) -> Result<Vec<T>> {
    match self.store.storage.get(T::COLLECTION.key()).await? {
      Some(raw) => Ok(json::from_str(&raw)?),
      None => Ok(Vec::new()),
    }
  }

  pub fn stage<T: Record>(&mut self, items: &[T]) -> Result<()> {
    let key = T::COLLECTION.key();
    let value = json::to_string(items)?;
    self.stage_raw(key, value);
    Ok(())
  }

  pub(crate) fn stage_raw(&mut self, key: &str, value: String) {
    self.writes.retain(|(staged, _)| staged != key);
    self.writes.push((key.to_string(), value));
  }

  pub(crate) async fn get_raw(&self, key: &str) -> Result<Option<String>> {
    self.store.storage.get(key).await
  }

  pub async fn commit(self) -> Result<()> {
    if self.writes.is_empty() {
      return Ok(());
    }
    self.store.storage.set_many(self.writes).await
  }
}

pub(crate) fn upsert_into<T: Record>(items: &mut Vec<T>, record: T) {
  match items.iter_mut().find(|item| item.id() == record.id()) {
    Some(slot) => *slot = record,
    None => items.push(record),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    model::{Category, Coupon, Product},
    storage::Memory,
    sv::test_utils,
  };

  #[tokio::test]
  async fn test_list_empty_collection() {
    let store = test_utils::memory_store();
    assert!(store.list::<Product>().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_upsert_replaces_in_place() {
    let store = test_utils::memory_store();

    let mut first = Product::new("A", "", 100, Category::GiftCard, 1);
    let second = Product::new("B", "", 200, Category::PrepaidCard, 2);
    store.upsert(first.clone()).await.unwrap();
    store.upsert(second.clone()).await.unwrap();

    first.price = 150;
    store.upsert(first.clone()).await.unwrap();
    store.upsert(first.clone()).await.unwrap();

    let products = store.list::<Product>().await.unwrap();
    assert_eq!(products, vec![first, second]);
  }

  #[tokio::test]
  async fn test_remove_scenario() {
    let store = test_utils::memory_store();
    let p1 = Product::new("p1", "", 500, Category::GiftCard, 10);
    let p2 = Product::new("p2", "", 1050, Category::PrepaidCard, 5);
    store.upsert(p1.clone()).await.unwrap();
    store.upsert(p2.clone()).await.unwrap();

    store.remove::<Product>(&p1.id).await.unwrap();
    store.remove::<Product>("never-existed").await.unwrap();

    assert_eq!(store.list::<Product>().await.unwrap(), vec![p2]);
  }

  #[tokio::test]
  async fn test_upsert_over_quota_keeps_state() {
    let store = Store::new(Arc::new(Memory::with_capacity(Some(400))));
    let coupon = Coupon::new("SAVE10", 10);
    store.upsert(coupon.clone()).await.unwrap();

    let mut big = Product::new("Big", "", 1, Category::GiftCard, 1);
    big.image_url = format!("data:image/jpeg;base64,{}", "A".repeat(1000));
    let result = store.upsert(big).await;

    assert!(matches!(result, Err(Error::StorageExhausted { .. })));
    assert!(store.list::<Product>().await.unwrap().is_empty());
    assert_eq!(store.list::<Coupon>().await.unwrap(), vec![coupon]);
  }

  #[tokio::test]
  async fn test_corrupt_collection_reads_empty_but_is_not_overwritten() {
    let store = test_utils::memory_store();
    store.storage().set(Collection::Coupons.key(), "{oops".into()).await.unwrap();

    assert!(store.list::<Coupon>().await.unwrap().is_empty());
    assert!(matches!(
      store.upsert(Coupon::new("X", 1)).await,
      Err(Error::Json(_))
    ));
    let raw = store.storage().get(Collection::Coupons.key()).await.unwrap();
    assert_eq!(raw.as_deref(), Some("{oops"));
  }

  #[tokio::test]
  async fn test_update_missing_record() {
    let store = test_utils::memory_store();
    let result = store
      .update::<Coupon, _>("NOPE", |coupon| {
        coupon.is_active = false;
        Ok(())
      })
      .await;

    assert!(matches!(
      result,
      Err(Error::NotFound { kind: Collection::Coupons, .. })
    ));
  }

  #[tokio::test]
  async fn test_snapshot_contains_written_keys() {
    let store = test_utils::memory_store();
    store.upsert(Coupon::new("A", 1)).await.unwrap();

    let snapshot = store.snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot["acarder_coupons"][0]["code"], "A");
  }
}
