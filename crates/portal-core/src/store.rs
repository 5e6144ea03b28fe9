//! The `PortalStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `portal-store-sqlite`).
//! The API layer depends on this abstraction, not on any concrete backend.
//!
//! Uniqueness of usernames, mobiles and transaction ids is the backend's
//! responsibility. Writes that would break it fail with an error whose
//! [`StoreError::duplicate_field`] names the offending field; callers never
//! pre-check.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  admin::AdminCredentials,
  exam::{ExamResult, NewExamResult},
  officer::{Mobile, NewOfficer, Officer, OfficerCredentials, TransactionId},
  transfer::{Designation, NewTransfer, TransferApplication},
};

/// Fields protected by a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
  Username,
  Mobile,
  TransactionId,
}

impl UniqueField {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Username => "username",
      Self::Mobile => "mobile",
      Self::TransactionId => "transactionId",
    }
  }
}

/// Result of [`PortalStore::attach_transaction`].
#[derive(Debug, Clone)]
pub enum AttachOutcome {
  /// The id is attached; the officer is now pending verification.
  Attached(Officer),
  UnknownOfficer,
  /// Subscribed officers never take a new transaction id.
  AlreadySubscribed,
}

/// Behaviour every backend error type must expose.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `Some` when the failed write violated a uniqueness constraint.
  fn duplicate_field(&self) -> Option<UniqueField>;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a portal store backend.
///
/// Exam results and transfer applications are append-only. Officers are
/// mutated only through the subscription handshake and password resets.
pub trait PortalStore: Send + Sync {
  type Error: StoreError;

  // ── Admin ─────────────────────────────────────────────────────────────

  /// Create the admin record unless one with `username` already exists.
  /// Returns `true` if a record was created.
  fn ensure_admin<'a>(
    &'a self,
    username: &'a str,
    password_hash: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn admin_credentials<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<AdminCredentials>, Self::Error>> + Send + 'a;

  /// Overwrite the admin password hash. Returns `false` if no such admin.
  fn set_admin_password<'a>(
    &'a self,
    username: &'a str,
    password_hash: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Officers ──────────────────────────────────────────────────────────

  /// Persist a new, unsubscribed officer. The id and `created_at` are
  /// assigned by the store.
  fn insert_officer(
    &self,
    input: NewOfficer,
  ) -> impl Future<Output = Result<Officer, Self::Error>> + Send + '_;

  fn officer_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Officer>, Self::Error>> + Send + 'a;

  fn officer_by_transaction_id<'a>(
    &'a self,
    transaction_id: &'a str,
  ) -> impl Future<Output = Result<Option<Officer>, Self::Error>> + Send + 'a;

  /// Fetch an officer together with the stored password hash, for login.
  fn officer_credentials<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<OfficerCredentials>, Self::Error>> + Send + 'a;

  /// All officers, newest first.
  fn list_officers(
    &self,
  ) -> impl Future<Output = Result<Vec<Officer>, Self::Error>> + Send + '_;

  /// Overwrite the password of the officer matching both `username` and
  /// `mobile`. Returns `false` if no officer matches.
  fn set_officer_password<'a>(
    &'a self,
    username: &'a str,
    mobile: &'a Mobile,
    password_hash: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Subscription handshake ────────────────────────────────────────────

  /// Attach `transaction_id` to an unsubscribed officer and stamp the
  /// submission time. A pending officer's previous id is replaced.
  ///
  /// Fails with a duplicate [`UniqueField::TransactionId`] error, leaving
  /// every record untouched, if another officer already holds the id.
  fn attach_transaction<'a>(
    &'a self,
    username: &'a str,
    transaction_id: &'a TransactionId,
    submitted_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<AttachOutcome, Self::Error>> + Send + 'a;

  /// Mark the officer subscribed, if and only if it is not already.
  ///
  /// Returns `false` when the officer was already subscribed (or does not
  /// exist); the stored subscription date is then left unchanged.
  fn activate_subscription(
    &self,
    officer_id: Uuid,
    activated_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Results ───────────────────────────────────────────────────────────

  fn record_result(
    &self,
    input: NewExamResult,
  ) -> impl Future<Output = Result<ExamResult, Self::Error>> + Send + '_;

  /// All results ordered by `date`, newest first.
  fn list_results(
    &self,
  ) -> impl Future<Output = Result<Vec<ExamResult>, Self::Error>> + Send + '_;

  // ── Transfers ─────────────────────────────────────────────────────────

  fn record_transfer(
    &self,
    input: NewTransfer,
  ) -> impl Future<Output = Result<TransferApplication, Self::Error>> + Send + '_;

  /// Transfer applications, newest first, optionally restricted to one
  /// designation.
  fn list_transfers<'a>(
    &'a self,
    designation: Option<&'a Designation>,
  ) -> impl Future<Output = Result<Vec<TransferApplication>, Self::Error>> + Send + 'a;
}
