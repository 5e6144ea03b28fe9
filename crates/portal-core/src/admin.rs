//! The portal administrator.
//!
//! There is exactly one admin record, keyed by [`ADMIN_USERNAME`]. It is
//! seeded at startup and only ever has its password rotated.

/// Username of the single seeded admin account.
pub const ADMIN_USERNAME: &str = "admin";

/// Stored admin credentials. Never serialised.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}
