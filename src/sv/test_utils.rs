//! Shared test fixtures

use crate::{
  model,
  prelude::*,
  storage::{Memory, Sqlite},
  store::Store,
};

/// Store over an unbounded in-memory backend.
pub fn memory_store() -> Store {
  Store::new(Arc::new(Memory::unbounded()))
}

/// Store over an in-memory SQLite database with migrations applied.
pub async fn sqlite_store() -> Store {
  let storage = Sqlite::connect("sqlite::memory:", None).await.unwrap();
  Store::new(Arc::new(storage))
}

/// Inserts a plain user with the given balance.
pub async fn user(store: &Store, username: &str, balance: i64) -> model::User {
  let mut user = model::User::new(username, "9000000000", "password");
  user.wallet_balance = balance;
  store.upsert(user.clone()).await.unwrap();
  user
}

pub async fn product(
  store: &Store,
  name: &str,
  price: i64,
  stock: u32,
) -> model::Product {
  let product =
    model::Product::new(name, "", price, model::Category::GiftCard, stock);
  store.upsert(product.clone()).await.unwrap();
  product
}
