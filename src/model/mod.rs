//! Records persisted by the store, one JSON collection per type.

pub mod coupon;
pub mod order;
pub mod product;
pub mod settings;
pub mod transaction;
pub mod user;

use std::fmt;

use serde::{Serialize, de::DeserializeOwned};

pub use coupon::Coupon;
pub use order::{Order, OrderStatus};
pub use product::{Category, Product};
pub use settings::GlobalSettings;
pub use transaction::{Transaction, TransactionStatus, TransactionType};
pub use user::{User, UserRole};

/// Named collection of records, persisted as a single JSON array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
  Users,
  Products,
  Orders,
  Transactions,
  Coupons,
}

impl Collection {
  pub const ALL: [Collection; 5] = [
    Collection::Users,
    Collection::Products,
    Collection::Orders,
    Collection::Transactions,
    Collection::Coupons,
  ];

  pub fn key(self) -> &'static str {
    match self {
      Collection::Users => "acarder_users",
      Collection::Products => "acarder_products",
      Collection::Orders => "acarder_orders",
      Collection::Transactions => "acarder_transactions",
      Collection::Coupons => "acarder_coupons",
    }
  }
}

impl fmt::Display for Collection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Collection::Users => "user",
      Collection::Products => "product",
      Collection::Orders => "order",
      Collection::Transactions => "transaction",
      Collection::Coupons => "coupon",
    })
  }
}

/// A record stored in one of the [`Collection`]s and addressed by a string id.
pub trait Record:
  Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
  const COLLECTION: Collection;

  fn id(&self) -> &str;
}

/// Prefixed random identifier, e.g. `ord-6f1c...`.
pub(crate) fn new_id(prefix: &str) -> String {
  format!("{prefix}-{}", uuid::Uuid::new_v4())
}

/// Newest first. Storage keeps insertion order, display wants the reverse.
pub fn recent_first<T>(mut items: Vec<T>) -> Vec<T> {
  items.reverse();
  items
}
