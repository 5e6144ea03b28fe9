//! The subscription handshake.
//!
//! An officer submits the bank transaction id of their payment
//! (`UNSUBSCRIBED → PENDING`); an admin verifies it out of band and activates
//! the subscription (`PENDING → SUBSCRIBED`). The transaction id stays on the
//! record after activation.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/submit-transaction` | Body: `{"username","transactionId"}`; rate limited |
//! | `POST` | `/admin/activate` | Body: `{"transactionId"}` or `{"username"}` |

use axum::{Json, extract::State};
use chrono::Utc;
use portal_core::{
  officer::{Officer, OfficerLookup, TransactionId},
  store::{AttachOutcome, PortalStore},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
  AppState, Portal,
  error::ApiError,
  extract::{JsonBody, present},
};

fn officer_not_found() -> ApiError { ApiError::NotFound("Officer not found".into()) }

fn already_subscribed() -> ApiError { ApiError::Conflict("Officer is already subscribed".into()) }

// ─── Operations ──────────────────────────────────────────────────────────────

impl<S: PortalStore> Portal<S> {
  /// Attach a transaction id to the officer, leaving it pending verification.
  pub async fn submit_transaction(
    &self,
    username: &str,
    transaction_id: &str,
  ) -> Result<Officer, ApiError> {
    let transaction_id = TransactionId::parse(transaction_id)?;

    let outcome = self
      .store()
      .attach_transaction(username, &transaction_id, Utc::now())
      .await
      .map_err(ApiError::store)?;

    match outcome {
      AttachOutcome::Attached(officer) => {
        tracing::info!(%username, %transaction_id, "transaction submitted for verification");
        Ok(officer)
      }
      AttachOutcome::UnknownOfficer => Err(officer_not_found()),
      AttachOutcome::AlreadySubscribed => Err(already_subscribed()),
    }
  }

  /// Mark the identified officer subscribed. Fails with a conflict, leaving
  /// the subscription date untouched, if that already happened.
  pub async fn activate_subscription(&self, lookup: OfficerLookup) -> Result<Officer, ApiError> {
    let found = match &lookup {
      OfficerLookup::TransactionId(id) => self.store().officer_by_transaction_id(id).await,
      OfficerLookup::Username(name) => self.store().officer_by_username(name).await,
    };
    let mut officer = found.map_err(ApiError::store)?.ok_or_else(officer_not_found)?;

    if officer.subscribed {
      return Err(already_subscribed());
    }

    let now = Utc::now();
    // The update is conditional on `subscribed = 0`; losing a race to
    // another activation shows up here as `false`.
    let activated = self
      .store()
      .activate_subscription(officer.officer_id, now)
      .await
      .map_err(ApiError::store)?;
    if !activated {
      return Err(already_subscribed());
    }

    officer.subscribed = true;
    officer.subscription_date = Some(now);
    tracing::info!(username = %officer.username, "subscription activated");
    Ok(officer)
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBody {
  pub username:       Option<String>,
  pub transaction_id: Option<String>,
}

/// `POST /submit-transaction`
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<SubmitBody>,
) -> Result<Json<Value>, ApiError>
where
  S: PortalStore + 'static,
{
  let (Some(username), Some(transaction_id)) =
    (present(body.username), present(body.transaction_id))
  else {
    return Err(ApiError::Validation(
      "Username and transaction ID are required".into(),
    ));
  };

  let officer = state.portal.submit_transaction(&username, &transaction_id).await?;
  Ok(Json(json!({
    "message": "Transaction submitted, awaiting admin verification",
    "transactionId": officer.transaction_id,
  })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateBody {
  pub transaction_id: Option<String>,
  pub username:       Option<String>,
}

/// `POST /admin/activate`. The transaction id wins when both are given.
pub async fn activate<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<ActivateBody>,
) -> Result<Json<Value>, ApiError>
where
  S: PortalStore + 'static,
{
  let lookup = match (present(body.transaction_id), present(body.username)) {
    (Some(id), _) => OfficerLookup::TransactionId(id),
    (None, Some(name)) => OfficerLookup::Username(name),
    (None, None) => {
      return Err(ApiError::Validation(
        "Transaction ID or username is required".into(),
      ));
    }
  };

  let officer = state.portal.activate_subscription(lookup).await?;
  Ok(Json(json!({ "message": "Subscription activated", "officer": officer })))
}
