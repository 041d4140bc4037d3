use serde::{Deserialize, Serialize};

use super::{Collection, Record, new_id};
use crate::prelude::*;

/// Shown when a product is saved without an image.
pub const PLACEHOLDER_IMAGE: &str =
  "https://placehold.co/600x400/252f3f/ffffff?text=Product+Image";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
  #[serde(rename = "Gift Card")]
  #[default]
  GiftCard,
  #[serde(rename = "Prepaid Card")]
  PrepaidCard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: String,
  pub name: String,
  pub description: String,
  pub price: i64,
  pub category: Category,
  /// `data:` URI or remote URL.
  pub image_url: String,
  pub stock: u32,
  pub created_at: DateTime<Utc>,
}

impl Product {
  pub fn new(
    name: impl Into<String>,
    description: impl Into<String>,
    price: i64,
    category: Category,
    stock: u32,
  ) -> Self {
    Self {
      id: new_id("prd"),
      name: name.into(),
      description: description.into(),
      price,
      category,
      image_url: PLACEHOLDER_IMAGE.to_string(),
      stock,
      created_at: Utc::now(),
    }
  }
}

impl Record for Product {
  const COLLECTION: Collection = Collection::Products;

  fn id(&self) -> &str {
    &self.id
  }
}
