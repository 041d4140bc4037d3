use serde::{Deserialize, Serialize};

use super::{Collection, Record};

/// Flat discount code. Identified by its normalized code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
  pub code: String,
  pub discount_amount: i64,
  pub is_active: bool,
}

impl Coupon {
  pub fn new(code: &str, discount_amount: i64) -> Self {
    Self { code: Self::normalize(code), discount_amount, is_active: true }
  }

  pub fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
  }

  /// Price after discount, never below zero.
  pub fn apply(&self, price: i64) -> i64 {
    price.saturating_sub(self.discount_amount).max(0)
  }
}

impl Record for Coupon {
  const COLLECTION: Collection = Collection::Coupons;

  fn id(&self) -> &str {
    &self.code
  }
}
