//! Argon2 password hashing.
//!
//! Hashing is CPU-bound, so both directions run on the blocking pool.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use rand_core::OsRng;

use crate::error::ApiError;

/// A well-formed argon2id hash (default parameters) that no password matches.
/// Verifying against it costs as much as a real check.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$\
                          AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Hash `password` into a PHC string, e.g. `$argon2id$v=19$…`.
pub async fn hash_password(password: String) -> Result<String, ApiError> {
  tokio::task::spawn_blocking(move || {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map(|hash| hash.to_string())
      .map_err(|e| ApiError::Internal(format!("argon2 error: {e}").into()))
  })
  .await
  .map_err(|e| ApiError::Internal(Box::new(e)))?
}

/// Check `password` against a stored PHC string. An unparseable hash never
/// verifies.
pub async fn verify_password(password: String, hash: String) -> Result<bool, ApiError> {
  tokio::task::spawn_blocking(move || {
    let Ok(parsed) = PasswordHash::new(&hash) else {
      return false;
    };
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok()
  })
  .await
  .map_err(|e| ApiError::Internal(Box::new(e)))
}

/// Spend the same argon2 work as [`verify_password`] for an account that
/// does not exist, so failed logins take the same time either way.
pub async fn reject_unknown(password: String) -> Result<(), ApiError> {
  verify_password(password, DUMMY_HASH.to_owned()).await?;
  Ok(())
}
