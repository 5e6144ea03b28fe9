//! Admin credentials: seeding, login and password rotation.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/admin/login` | Body: `{"username","password"}` |
//! | `POST` | `/admin/reset-password` | Body: `{"password"}` |

use axum::{Json, extract::State};
use portal_core::{admin::ADMIN_USERNAME, store::PortalStore};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
  AppState, Portal,
  error::ApiError,
  extract::{JsonBody, present},
  password::{hash_password, reject_unknown, verify_password},
};

// ─── Operations ──────────────────────────────────────────────────────────────

impl<S: PortalStore> Portal<S> {
  /// Seed the admin account with `default_password` unless it already
  /// exists. Returns `true` if the account was created.
  pub async fn initialize_admin(&self, default_password: &str) -> Result<bool, ApiError> {
    let existing = self
      .store()
      .admin_credentials(ADMIN_USERNAME)
      .await
      .map_err(ApiError::store)?;
    if existing.is_some() {
      return Ok(false);
    }

    let hash = hash_password(default_password.to_owned()).await?;
    // A concurrent seeder may win the insert; the primary key settles it.
    let created = self
      .store()
      .ensure_admin(ADMIN_USERNAME, &hash)
      .await
      .map_err(ApiError::store)?;
    if created {
      tracing::warn!(
        "seeded admin account with the default password; rotate it via /admin/reset-password"
      );
    }
    Ok(created)
  }

  pub async fn verify_admin(&self, username: &str, password: &str) -> Result<(), ApiError> {
    let Some(creds) = self
      .store()
      .admin_credentials(username)
      .await
      .map_err(ApiError::store)?
    else {
      reject_unknown(password.to_owned()).await?;
      return Err(ApiError::Unauthorized);
    };

    if verify_password(password.to_owned(), creds.password_hash).await? {
      Ok(())
    } else {
      Err(ApiError::Unauthorized)
    }
  }

  pub async fn reset_admin_password(&self, new_password: &str) -> Result<(), ApiError> {
    if new_password.is_empty() {
      return Err(ApiError::Validation("Password is required".into()));
    }
    let hash = hash_password(new_password.to_owned()).await?;
    let updated = self
      .store()
      .set_admin_password(ADMIN_USERNAME, &hash)
      .await
      .map_err(ApiError::store)?;
    if !updated {
      return Err(ApiError::NotFound("Admin not found".into()));
    }
    tracing::info!("admin password rotated");
    Ok(())
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct LoginBody {
  pub username: Option<String>,
  pub password: Option<String>,
}

/// `POST /admin/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<LoginBody>,
) -> Result<Json<Value>, ApiError>
where
  S: PortalStore + 'static,
{
  let (Some(username), Some(password)) = (present(body.username), body.password) else {
    return Err(ApiError::Validation("Username and password are required".into()));
  };

  if let Err(e) = state.portal.verify_admin(&username, &password).await {
    if matches!(e, ApiError::Unauthorized) {
      tracing::warn!(%username, "failed admin login");
    }
    return Err(e);
  }
  Ok(Json(json!({ "message": "Admin login successful" })))
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetBody {
  pub password: Option<String>,
}

/// `POST /admin/reset-password`
pub async fn reset_password<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<ResetBody>,
) -> Result<Json<Value>, ApiError>
where
  S: PortalStore + 'static,
{
  let password = body.password.unwrap_or_default();
  state.portal.reset_admin_password(&password).await?;
  Ok(Json(json!({ "message": "Admin password reset successful" })))
}
