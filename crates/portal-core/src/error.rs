//! Error types for `portal-core`.
//!
//! These are input-parsing failures. Each maps to a validation error at the
//! HTTP boundary, so the `Display` text is what the client sees.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("Invalid mobile number")]
  InvalidMobile,

  #[error("Invalid transaction ID: must be exactly 12 digits")]
  InvalidTransactionId,

  #[error("Invalid designation: {0}")]
  UnknownDesignation(String),

  #[error("Invalid transfer type: {0}")]
  UnknownTransferType(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
