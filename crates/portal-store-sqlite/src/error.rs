//! Error type for `portal-store-sqlite`.

use portal_core::store::{StoreError, UniqueField};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("corrupt column {column}: {value:?}")]
  Decode { column: &'static str, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl StoreError for Error {
  fn duplicate_field(&self) -> Option<UniqueField> {
    let Error::Database(tokio_rusqlite::Error::Rusqlite(
      rusqlite::Error::SqliteFailure(err, Some(msg)),
    )) = self
    else {
      return None;
    };
    if err.code != rusqlite::ErrorCode::ConstraintViolation {
      return None;
    }
    unique_column(msg)
  }
}

/// Map SQLite's `UNIQUE constraint failed: officers.mobile` message to the
/// field it names.
fn unique_column(msg: &str) -> Option<UniqueField> {
  let columns = msg.strip_prefix("UNIQUE constraint failed: ")?;
  // Only single-column constraints exist; take the first just in case.
  let first = columns.split(',').next()?.trim();
  match first.rsplit('.').next()? {
    "username" => Some(UniqueField::Username),
    "mobile" => Some(UniqueField::Mobile),
    "transaction_id" => Some(UniqueField::TransactionId),
    _ => None,
  }
}
