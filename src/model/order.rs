use serde::{Deserialize, Serialize};

use super::{Collection, Product, Record, new_id};
use crate::prelude::*;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  #[default]
  Pending,
  Approved,
  Rejected,
}

/// Product name and price are copied at purchase time so the order keeps
/// its meaning after the product is edited or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: String,
  pub user_id: String,
  pub product_id: String,
  pub product_name: String,
  pub price: i64,
  pub status: OrderStatus,
  pub purchase_date: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub unlocked_content: Option<String>,
}

impl Order {
  pub fn new(user_id: &str, product: &Product, price: i64) -> Self {
    Self {
      id: new_id("ord"),
      user_id: user_id.to_string(),
      product_id: product.id.clone(),
      product_name: product.name.clone(),
      price,
      status: OrderStatus::Pending,
      purchase_date: Utc::now(),
      unlocked_content: None,
    }
  }
}

impl Record for Order {
  const COLLECTION: Collection = Collection::Orders;

  fn id(&self) -> &str {
    &self.id
  }
}
