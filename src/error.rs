use std::io;

use sea_orm::DbErr;

use crate::model::Collection;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error(
    "storage exhausted writing `{key}`: {needed} bytes needed, capacity is {capacity}"
  )]
  StorageExhausted { key: String, needed: u64, capacity: u64 },
  #[error("{kind} `{id}` not found")]
  NotFound { kind: Collection, id: String },
  #[error("invalid state: {0}")]
  InvalidState(String),
  #[error("invalid arguments: {0}")]
  InvalidArgs(String),
  #[error("insufficient balance")]
  InsufficientBalance,
  #[error("username is already taken")]
  UsernameTaken,
  #[error("invalid username or password")]
  InvalidCredentials,
  #[error("account is banned")]
  Banned,
  #[error("forbidden: {0}")]
  Forbidden(String),
  #[error("image processing failed: {0}")]
  Image(String),
  #[error("notification channel closed")]
  Closed,

  #[error(transparent)]
  Db(#[from] DbErr),
  #[error(transparent)]
  Json(#[from] json::Error),
  #[error(transparent)]
  Io(#[from] io::Error),
}

impl Error {
  pub fn not_found(kind: Collection, id: impl Into<String>) -> Self {
    Self::NotFound { kind, id: id.into() }
  }

  /// Single message shown to the person operating the storefront.
  pub fn user_message(&self) -> String {
    match self {
      Error::StorageExhausted { .. } => "Storage limit exceeded! Cannot save \
        data. Please delete old products or images."
        .into(),
      Error::NotFound { kind, .. } => format!("The requested {kind} no longer exists."),
      Error::InvalidState(msg) | Error::InvalidArgs(msg) => msg.clone(),
      Error::InsufficientBalance => {
        "Insufficient wallet balance. Add money to your wallet first.".into()
      }
      Error::UsernameTaken => "This username is already registered.".into(),
      Error::InvalidCredentials => "Invalid username or password.".into(),
      Error::Banned => "Your account has been banned.".into(),
      Error::Forbidden(msg) => msg.clone(),
      Error::Image(_) => "Failed to process the image.".into(),
      Error::Closed | Error::Db(_) | Error::Json(_) | Error::Io(_) => {
        "Internal error, please try again later.".into()
      }
    }
  }
}
