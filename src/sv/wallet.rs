use crate::{
  model::{
    self, Collection, Transaction, TransactionStatus, TransactionType,
    recent_first,
  },
  prelude::*,
  store::Store,
};

/// Result of adjudicating a deposit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  Applied,
  /// The request was no longer pending; nothing changed.
  AlreadyHandled,
}

pub struct Wallet<'a> {
  store: &'a Store,
}

impl<'a> Wallet<'a> {
  pub fn new(store: &'a Store) -> Self {
    Self { store }
  }

  pub async fn balance(&self, user_id: &str) -> Result<i64> {
    let user = self
      .store
      .get::<model::User>(user_id)
      .await?
      .ok_or_else(|| Error::not_found(Collection::Users, user_id))?;
    Ok(user.wallet_balance)
  }

  /// Adds `amount` (negative to deduct) to the balance and records a
  /// successful ledger entry. Returns the new balance.
  pub async fn credit(
    &self,
    user_id: &str,
    amount: i64,
    description: impl Into<String>,
    tx_type: TransactionType,
  ) -> Result<i64> {
    let description = description.into();

    let mut tx = self.store.begin().await;
    let mut users = tx.load::<model::User>().await?;
    let mut ledger = tx.load::<Transaction>().await?;

    let user = users
      .iter_mut()
      .find(|user| user.id == user_id)
      .ok_or_else(|| Error::not_found(Collection::Users, user_id))?;
    let balance = user.add_balance(amount)?;

    ledger.push(Transaction::new(
      user_id,
      tx_type,
      amount,
      description,
      TransactionStatus::Success,
    ));

    tx.stage(&users)?;
    tx.stage(&ledger)?;
    tx.commit().await?;

    debug!(user_id, amount, balance, "wallet credited");
    Ok(balance)
  }

  /// Manual correction by an admin.
  pub async fn adjust(&self, user_id: &str, amount: i64) -> Result<i64> {
    if amount == 0 {
      return Err(Error::InvalidArgs("Adjustment amount must be non-zero".into()));
    }
    self
      .credit(user_id, amount, "Admin Adjustment", TransactionType::AdminAdjustment)
      .await
  }

  /// Records a user's claim of an external payment. The balance is untouched
  /// until an admin approves it.
  pub async fn request_deposit(
    &self,
    user_id: &str,
    amount: i64,
    reference: &str,
  ) -> Result<Transaction> {
    let reference = reference.trim();
    if amount <= 0 {
      return Err(Error::InvalidArgs("Deposit amount must be positive".into()));
    }
    if reference.is_empty() {
      return Err(Error::InvalidArgs("Payment reference is required".into()));
    }

    let mut tx = self.store.begin().await;
    let users = tx.load::<model::User>().await?;
    if !users.iter().any(|user| user.id == user_id) {
      return Err(Error::not_found(Collection::Users, user_id));
    }

    let mut ledger = tx.load::<Transaction>().await?;
    let mut entry = Transaction::new(
      user_id,
      TransactionType::Deposit,
      amount,
      format!("UPI Load: {reference}"),
      TransactionStatus::Pending,
    );
    entry.utr = Some(reference.to_string());
    ledger.push(entry.clone());

    tx.stage(&ledger)?;
    tx.commit().await?;

    info!(id = %entry.id, user_id, amount, "deposit requested");
    Ok(entry)
  }

  /// Marks a pending deposit successful and credits its amount exactly once.
  pub async fn approve_deposit(&self, txn_id: &str) -> Result<Outcome> {
    let mut tx = self.store.begin().await;
    let mut ledger = tx.load::<Transaction>().await?;

    let entry = find_deposit(&mut ledger, txn_id)?;
    if entry.status != TransactionStatus::Pending {
      debug!(txn_id, status = ?entry.status, "deposit already handled");
      return Ok(Outcome::AlreadyHandled);
    }

    let mut users = tx.load::<model::User>().await?;
    let user = users
      .iter_mut()
      .find(|user| user.id == entry.user_id)
      .ok_or_else(|| Error::not_found(Collection::Users, &entry.user_id))?;

    user.add_balance(entry.amount)?;
    entry.status = TransactionStatus::Success;
    info!(txn_id, user_id = %user.id, amount = entry.amount, "deposit approved");

    tx.stage(&ledger)?;
    tx.stage(&users)?;
    tx.commit().await?;
    Ok(Outcome::Applied)
  }

  /// Marks a pending deposit failed. Never touches the balance.
  pub async fn reject_deposit(&self, txn_id: &str) -> Result<Outcome> {
    let mut tx = self.store.begin().await;
    let mut ledger = tx.load::<Transaction>().await?;

    let entry = find_deposit(&mut ledger, txn_id)?;
    if entry.status != TransactionStatus::Pending {
      return Ok(Outcome::AlreadyHandled);
    }
    entry.status = TransactionStatus::Failed;
    info!(txn_id, "deposit rejected");

    tx.stage(&ledger)?;
    tx.commit().await?;
    Ok(Outcome::Applied)
  }

  /// Deposit requests awaiting review, newest first.
  pub async fn pending_deposits(&self) -> Result<Vec<Transaction>> {
    let ledger = self.store.list::<Transaction>().await?;
    Ok(recent_first(
      ledger.into_iter().filter(Transaction::is_pending_deposit).collect(),
    ))
  }

  /// A user's ledger, newest first.
  pub async fn transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
    let ledger = self.store.list::<Transaction>().await?;
    Ok(recent_first(
      ledger.into_iter().filter(|txn| txn.user_id == user_id).collect(),
    ))
  }

  /// Sum of the user's successful ledger entries. Differs from the stored
  /// balance when money moved outside the ledger, e.g. the seeded admin
  /// balance.
  pub async fn ledger_balance(&self, user_id: &str) -> Result<i64> {
    let ledger = self.store.list::<Transaction>().await?;
    Ok(
      ledger
        .iter()
        .filter(|txn| txn.user_id == user_id)
        .filter(|txn| txn.status == TransactionStatus::Success)
        .map(|txn| txn.amount)
        .sum(),
    )
  }
}

fn find_deposit<'t>(
  ledger: &'t mut [Transaction],
  txn_id: &str,
) -> Result<&'t mut Transaction> {
  let entry = ledger
    .iter_mut()
    .find(|txn| txn.id == txn_id)
    .ok_or_else(|| Error::not_found(Collection::Transactions, txn_id))?;

  if entry.tx_type != TransactionType::Deposit {
    return Err(Error::InvalidState(format!(
      "Transaction {txn_id} is not a deposit request"
    )));
  }
  Ok(entry)
}
