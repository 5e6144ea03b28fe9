//! Officers, their subscription state, and the identifiers they submit.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Validated identifiers ───────────────────────────────────────────────────

/// A ten-digit mobile number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mobile(String);

impl Mobile {
  pub const LEN: usize = 10;

  /// Parse a mobile number, trimming surrounding whitespace.
  pub fn parse(raw: &str) -> Result<Self> {
    let s = raw.trim();
    if is_digits(s, Self::LEN) {
      Ok(Self(s.to_owned()))
    } else {
      Err(Error::InvalidMobile)
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Mobile {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// A bank transaction reference submitted as proof of payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionId(String);

impl TransactionId {
  pub const LEN: usize = 12;

  pub fn parse(raw: &str) -> Result<Self> {
    let s = raw.trim();
    if is_digits(s, Self::LEN) {
      Ok(Self(s.to_owned()))
    } else {
      Err(Error::InvalidTransactionId)
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for TransactionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

fn is_digits(s: &str, len: usize) -> bool {
  s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

// ─── Officer ─────────────────────────────────────────────────────────────────

/// Where an officer stands in the payment-verification handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionState {
  /// No transaction submitted yet.
  Unsubscribed,
  /// Transaction submitted, awaiting manual admin verification.
  Pending,
  /// Verified by an admin. Terminal.
  Subscribed,
}

/// A registered officer as exposed to clients.
///
/// The password hash is not part of this type; see [`OfficerCredentials`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Officer {
  pub officer_id:               Uuid,
  pub name:                     String,
  pub address:                  String,
  pub mobile:                   String,
  pub username:                 String,
  pub subscribed:               bool,
  pub transaction_id:           Option<String>,
  pub transaction_submitted_at: Option<DateTime<Utc>>,
  pub subscription_date:        Option<DateTime<Utc>>,
  pub created_at:               DateTime<Utc>,
}

impl Officer {
  pub fn subscription_state(&self) -> SubscriptionState {
    match (self.subscribed, &self.transaction_id) {
      (true, _) => SubscriptionState::Subscribed,
      (false, Some(_)) => SubscriptionState::Pending,
      (false, None) => SubscriptionState::Unsubscribed,
    }
  }
}

/// An officer record together with its stored password hash.
#[derive(Debug, Clone)]
pub struct OfficerCredentials {
  pub officer:       Officer,
  pub password_hash: String,
}

/// Input to [`PortalStore::insert_officer`](crate::store::PortalStore::insert_officer).
#[derive(Debug, Clone)]
pub struct NewOfficer {
  pub name:          String,
  pub address:       String,
  pub mobile:        Mobile,
  pub username:      String,
  pub password_hash: String,
}

/// How an admin identifies the officer whose subscription to activate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfficerLookup {
  TransactionId(String),
  Username(String),
}
