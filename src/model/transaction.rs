use serde::{Deserialize, Serialize};

use super::{Collection, Record, new_id};
use crate::prelude::*;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
  #[default]
  Deposit,
  Purchase,
  AdminAdjustment,
  Refund,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
  #[default]
  Pending,
  Success,
  Failed,
}

/// Ledger entry. `amount` is signed: purchases are negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
  pub id: String,
  pub user_id: String,
  #[serde(rename = "type")]
  pub tx_type: TransactionType,
  pub amount: i64,
  pub description: String,
  /// Payment reference supplied with a deposit request.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub utr: Option<String>,
  pub date: DateTime<Utc>,
  pub status: TransactionStatus,
}

impl Transaction {
  pub fn new(
    user_id: &str,
    tx_type: TransactionType,
    amount: i64,
    description: impl Into<String>,
    status: TransactionStatus,
  ) -> Self {
    Self {
      id: new_id("txn"),
      user_id: user_id.to_string(),
      tx_type,
      amount,
      description: description.into(),
      utr: None,
      date: Utc::now(),
      status,
    }
  }

  pub fn is_pending_deposit(&self) -> bool {
    self.tx_type == TransactionType::Deposit
      && self.status == TransactionStatus::Pending
  }
}

impl Record for Transaction {
  const COLLECTION: Collection = Collection::Transactions;

  fn id(&self) -> &str {
    &self.id
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_type_field_name() {
    let txn = Transaction::new(
      "usr-1",
      TransactionType::AdminAdjustment,
      -50,
      "Admin Adjustment",
      TransactionStatus::Success,
    );
    let value = json::to_value(&txn).unwrap();

    assert_eq!(value["type"], "admin_adjustment");
    assert_eq!(value["status"], "success");
    assert!(value.get("utr").is_none());
  }

  #[test]
  fn test_reads_entry_without_utr() {
    let raw = r#"{"id":"1700000000000","userId":"admin-1","type":"purchase",
      "amount":-500,"description":"Amazon","date":"2024-01-01T00:00:00Z",
      "status":"success"}"#;
    let txn: Transaction = json::from_str(raw).unwrap();

    assert_eq!(txn.tx_type, TransactionType::Purchase);
    assert_eq!(txn.utr, None);
  }
}
