//! Transfer intake.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/transfer/apply` | Body: see [`ApplyBody`]; returns 201 + `{"message","id"}` |
//! | `GET`  | `/transfer/all` | Newest first |
//! | `GET`  | `/transfer/{designation}` | e.g. `/transfer/sri`; any configured designation |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use portal_core::{
  store::PortalStore,
  transfer::{NewTransfer, TransferApplication, TransferType},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
  AppState, Portal,
  error::ApiError,
  extract::{JsonBody, present},
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyBody {
  pub username:         Option<String>,
  /// `"One Way"` (default) or `"Mutual"`.
  pub transfer_type:    Option<String>,
  pub applicant_name:   Option<String>,
  pub working_district: Option<String>,
  pub designation:      Option<String>,
  pub date_of_joining:  Option<String>,
  pub option1:          Option<String>,
  pub option2:          Option<String>,
  pub option3:          Option<String>,
  pub contact_number:   Option<String>,
}

/// The fields every application must carry, as `(wire name, value)`.
fn required_fields(body: &ApplyBody) -> [(&'static str, &Option<String>); 7] {
  [
    ("username", &body.username),
    ("applicantName", &body.applicant_name),
    ("workingDistrict", &body.working_district),
    ("designation", &body.designation),
    ("dateOfJoining", &body.date_of_joining),
    ("option1", &body.option1),
    ("contactNumber", &body.contact_number),
  ]
}

// ─── Operations ──────────────────────────────────────────────────────────────

impl<S: PortalStore> Portal<S> {
  pub async fn apply_transfer(&self, body: ApplyBody) -> Result<TransferApplication, ApiError> {
    let missing: Vec<&str> = required_fields(&body)
      .into_iter()
      .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
      .map(|(name, _)| name)
      .collect();
    if !missing.is_empty() {
      return Err(ApiError::Validation(format!(
        "Missing required fields: {}",
        missing.join(", ")
      )));
    }

    let username = present(body.username).unwrap_or_default();
    self
      .store()
      .officer_by_username(&username)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| ApiError::NotFound("Officer not found".into()))?;

    let designation = self
      .designations()
      .parse(body.designation.as_deref().unwrap_or_default())?;
    let transfer_type = match present(body.transfer_type) {
      Some(raw) => TransferType::parse(&raw)?,
      None => TransferType::default(),
    };

    let transfer = self
      .store()
      .record_transfer(NewTransfer {
        username,
        transfer_type,
        applicant_name: present(body.applicant_name).unwrap_or_default(),
        working_district: present(body.working_district).unwrap_or_default(),
        designation,
        date_of_joining: present(body.date_of_joining).unwrap_or_default(),
        option1: present(body.option1).unwrap_or_default(),
        option2: present(body.option2),
        option3: present(body.option3),
        contact_number: present(body.contact_number).unwrap_or_default(),
      })
      .await
      .map_err(ApiError::store)?;

    tracing::info!(
      username = %transfer.username,
      designation = %transfer.designation,
      "transfer application received"
    );
    Ok(transfer)
  }

  /// All applications, or only those for `designation` (case-insensitive,
  /// must be in the configured set).
  pub async fn list_transfers(
    &self,
    designation: Option<&str>,
  ) -> Result<Vec<TransferApplication>, ApiError> {
    let designation = designation
      .map(|raw| self.designations().parse(raw))
      .transpose()?;
    self
      .store()
      .list_transfers(designation.as_ref())
      .await
      .map_err(ApiError::store)
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `POST /transfer/apply`
pub async fn apply<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<ApplyBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PortalStore + 'static,
{
  let transfer = state.portal.apply_transfer(body).await?;
  Ok((
    StatusCode::CREATED,
    Json(json!({
      "message": "Transfer application submitted",
      "id": transfer.transfer_id,
    })),
  ))
}

/// `GET /transfer/all`
pub async fn list_all<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<TransferApplication>>, ApiError>
where
  S: PortalStore + 'static,
{
  Ok(Json(state.portal.list_transfers(None).await?))
}

/// `GET /transfer/{designation}`
pub async fn list_by_designation<S>(
  State(state): State<AppState<S>>,
  Path(designation): Path<String>,
) -> Result<Json<Vec<TransferApplication>>, ApiError>
where
  S: PortalStore + 'static,
{
  Ok(Json(state.portal.list_transfers(Some(&designation)).await?))
}
