use base64::{Engine, prelude::BASE64_STANDARD};
use serde::{Deserialize, Serialize};

use super::{Collection, Record, new_id};
use crate::prelude::*;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
  #[default]
  User,
  Admin,
  SuperAdmin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: String,
  pub username: String,
  pub phone: String,
  pub password_hash: String,
  pub role: UserRole,
  pub wallet_balance: i64,
  pub is_banned: bool,
  pub created_at: DateTime<Utc>,
}

impl User {
  pub fn new(username: &str, phone: &str, password: &str) -> Self {
    Self {
      id: new_id("usr"),
      username: username.to_string(),
      phone: phone.to_string(),
      password_hash: Self::hash_password(password),
      role: UserRole::User,
      wallet_balance: 0,
      is_banned: false,
      created_at: Utc::now(),
    }
  }

  /// Base64 of the password. Not a hash; kept for compatibility with
  /// existing stored accounts.
  pub fn hash_password(password: &str) -> String {
    BASE64_STANDARD.encode(password)
  }

  pub fn check_password(&self, password: &str) -> bool {
    self.password_hash == Self::hash_password(password)
  }

  /// Adds `amount` (negative to deduct) to the wallet and returns the new
  /// balance. The balance is left unchanged on overflow.
  pub fn add_balance(&mut self, amount: i64) -> Result<i64> {
    self.wallet_balance =
      self.wallet_balance.checked_add(amount).ok_or_else(|| {
        Error::InvalidArgs(format!(
          "Wallet balance of {} would overflow",
          self.username
        ))
      })?;
    Ok(self.wallet_balance)
  }

  pub fn is_admin(&self) -> bool {
    matches!(self.role, UserRole::Admin | UserRole::SuperAdmin)
  }
}

impl Record for User {
  const COLLECTION: Collection = Collection::Users;

  fn id(&self) -> &str {
    &self.id
  }
}
