//! Officer directory: signup, login, status and password reset.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/signup` | Body: `{"name","address","mobile","username","password"}` |
//! | `POST` | `/login` | Body: `{"username","password"}` |
//! | `POST` | `/officer/status` | Body: `{"username"}`; returns `{"activated","state"}` |
//! | `POST` | `/officer/reset-password` | Body: `{"username","mobile","password"}` |
//! | `GET`  | `/admin/officers` | All officers, newest first |

use axum::{Json, extract::State};
use portal_core::{
  officer::{Mobile, NewOfficer, Officer, SubscriptionState},
  store::PortalStore,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
  AppState, Portal,
  error::ApiError,
  extract::{JsonBody, present},
  password::{hash_password, reject_unknown, verify_password},
};

// ─── Request bodies ──────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SignupBody {
  pub name:     Option<String>,
  pub address:  Option<String>,
  pub mobile:   Option<String>,
  pub username: Option<String>,
  pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginBody {
  pub username: Option<String>,
  pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusBody {
  pub username: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetBody {
  pub username: Option<String>,
  pub mobile:   Option<String>,
  pub password: Option<String>,
}

// ─── Operations ──────────────────────────────────────────────────────────────

impl<S: PortalStore> Portal<S> {
  /// Register a new officer. Uniqueness of username and mobile is left to
  /// the store; a violation comes back as a conflict.
  pub async fn signup(&self, body: SignupBody) -> Result<Officer, ApiError> {
    let mobile = Mobile::parse(body.mobile.as_deref().unwrap_or_default())?;
    let (Some(username), Some(password)) =
      (present(body.username), body.password.filter(|p| !p.is_empty()))
    else {
      return Err(ApiError::Validation("Username and password are required".into()));
    };

    let password_hash = hash_password(password).await?;
    let officer = self
      .store()
      .insert_officer(NewOfficer {
        name: present(body.name).unwrap_or_default(),
        address: present(body.address).unwrap_or_default(),
        mobile,
        username,
        password_hash,
      })
      .await
      .map_err(ApiError::store)?;

    tracing::info!(username = %officer.username, "officer registered");
    Ok(officer)
  }

  /// Unknown usernames and wrong passwords fail identically.
  pub async fn login(&self, username: &str, password: &str) -> Result<Officer, ApiError> {
    let creds = self
      .store()
      .officer_credentials(username)
      .await
      .map_err(ApiError::store)?;

    let Some(creds) = creds else {
      reject_unknown(password.to_owned()).await?;
      tracing::warn!(%username, "failed officer login");
      return Err(ApiError::Unauthorized);
    };
    if !verify_password(password.to_owned(), creds.password_hash).await? {
      tracing::warn!(%username, "failed officer login");
      return Err(ApiError::Unauthorized);
    }
    Ok(creds.officer)
  }

  /// Reset a password given the matching username and mobile pair.
  pub async fn reset_officer_password(
    &self,
    username: &str,
    mobile: &str,
    new_password: &str,
  ) -> Result<(), ApiError> {
    if new_password.is_empty() {
      return Err(ApiError::Validation("Password is required".into()));
    }
    let not_found = || ApiError::NotFound("No officer found with that username and mobile".into());
    // A malformed mobile cannot match any officer.
    let mobile = Mobile::parse(mobile).map_err(|_| not_found())?;
    let hash = hash_password(new_password.to_owned()).await?;

    let updated = self
      .store()
      .set_officer_password(username, &mobile, &hash)
      .await
      .map_err(ApiError::store)?;
    if !updated {
      return Err(not_found());
    }
    tracing::info!(%username, "officer password reset");
    Ok(())
  }

  pub async fn subscription_status(&self, username: &str) -> Result<SubscriptionState, ApiError> {
    let officer = self
      .store()
      .officer_by_username(username)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| ApiError::NotFound("Officer not found".into()))?;
    Ok(officer.subscription_state())
  }

  pub async fn list_officers(&self) -> Result<Vec<Officer>, ApiError> {
    self.store().list_officers().await.map_err(ApiError::store)
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `POST /signup`
pub async fn signup<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<SignupBody>,
) -> Result<Json<Value>, ApiError>
where
  S: PortalStore + 'static,
{
  let officer = state.portal.signup(body).await?;
  Ok(Json(json!({ "message": "Signup successful", "officer": officer })))
}

/// `POST /login`
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

  let officer = state.portal.login(&username, &password).await?;
  let subscribed = officer.subscribed;
  Ok(Json(json!({
    "message": "Login successful",
    "officer": officer,
    "subscribed": subscribed,
  })))
}

/// `POST /officer/status`
pub async fn status<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<StatusBody>,
) -> Result<Json<Value>, ApiError>
where
  S: PortalStore + 'static,
{
  let username = present(body.username)
    .ok_or_else(|| ApiError::Validation("Username is required".into()))?;
  let current = state.portal.subscription_status(&username).await?;
  Ok(Json(json!({
    "activated": current == SubscriptionState::Subscribed,
    "state": current,
  })))
}

/// `POST /officer/reset-password`
pub async fn reset_password<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<ResetBody>,
) -> Result<Json<Value>, ApiError>
where
  S: PortalStore + 'static,
{
  let (Some(username), Some(mobile), Some(password)) =
    (present(body.username), present(body.mobile), body.password)
  else {
    return Err(ApiError::Validation(
      "Username, mobile and password are required".into(),
    ));
  };

  state
    .portal
    .reset_officer_password(&username, &mobile, &password)
    .await?;
  Ok(Json(json!({ "message": "Password reset successful" })))
}

/// `GET /admin/officers`
pub async fn list<S>(State(state): State<AppState<S>>) -> Result<Json<Vec<Officer>>, ApiError>
where
  S: PortalStore + 'static,
{
  Ok(Json(state.portal.list_officers().await?))
}
