use migration::{Migrator, MigratorTrait};
use sea_orm::{
  ActiveModelTrait, Database, DatabaseConnection, EntityTrait, Set,
  TransactionTrait,
};
use tokio::sync::broadcast;

use super::{Changes, Quota, Storage, Usage, entry_size};
use crate::{entity::kv, prelude::*};

/// Embedded SQLite backend, one `kv_entries` row per key.
pub struct Sqlite {
  db: DatabaseConnection,
  quota: Quota,
  changes: Changes,
}

impl Sqlite {
  /// Opens the database at `url` and applies pending migrations.
  pub async fn connect(url: &str, capacity: Option<u64>) -> Result<Self> {
    let db = Database::connect(url).await?;
    Migrator::up(&db, None).await?;
    Ok(Self::new(db, capacity))
  }

  pub fn new(db: DatabaseConnection, capacity: Option<u64>) -> Self {
    Self { db, quota: Quota { capacity }, changes: Changes::new() }
  }
}

#[async_trait::async_trait]
impl Storage for Sqlite {
  async fn get(&self, key: &str) -> Result<Option<String>> {
    let entry = kv::Entity::find_by_id(key).one(&self.db).await?;
    Ok(entry.map(|entry| entry.value))
  }

  async fn set_many(&self, entries: Vec<(String, String)>) -> Result<()> {
    let Some((first, _)) = entries.first() else {
      return Ok(());
    };

    let txn = self.db.begin().await?;

    let existing: HashMap<String, kv::Model> = kv::Entity::find()
      .all(&txn)
      .await?
      .into_iter()
      .map(|entry| (entry.key.clone(), entry))
      .collect();

    let used = existing.values().map(|e| entry_size(&e.key, &e.value)).sum();
    let needed = Quota::projected(
      used,
      entries.iter().map(|(k, v)| (k.as_str(), v.as_str())),
      |key| existing.get(key).map_or(0, |e| entry_size(&e.key, &e.value)),
    );
    if let Err(err) = self.quota.check(first, needed) {
      txn.rollback().await?;
      return Err(err);
    }

    let now = Utc::now().naive_utc();
    for (key, value) in &entries {
      debug!(key = %key, bytes = value.len(), "sqlite write");
      match existing.get(key) {
        Some(entry) => {
          kv::ActiveModel {
            value: Set(value.clone()),
            updated_at: Set(now),
            ..entry.clone().into()
          }
          .update(&txn)
          .await?;
        }
        None => {
          kv::ActiveModel {
            key: Set(key.clone()),
            value: Set(value.clone()),
            updated_at: Set(now),
          }
          .insert(&txn)
          .await?;
        }
      }
    }

    txn.commit().await?;

    for (key, _) in &entries {
      self.changes.publish(key);
    }
    Ok(())
  }

  async fn remove(&self, key: &str) -> Result<()> {
    let result = kv::Entity::delete_by_id(key).exec(&self.db).await?;
    if result.rows_affected > 0 {
      self.changes.publish(key);
    }
    Ok(())
  }

  async fn usage(&self) -> Result<Usage> {
    let used = kv::Entity::find()
      .all(&self.db)
      .await?
      .iter()
      .map(|e| entry_size(&e.key, &e.value))
      .sum();
    Ok(Usage { used, capacity: self.quota.capacity })
  }

  fn changes(&self) -> broadcast::Receiver<String> {
    self.changes.subscribe()
  }
}
