//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body has the shape `{"error": "<message>"}`.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use portal_core::store::{StoreError, UniqueField};
use serde_json::json;
use thiserror::Error;

/// An error returned by a portal operation or API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Malformed or missing input.
  #[error("{0}")]
  Validation(String),

  /// Bad credentials. Deliberately says nothing about which part was wrong.
  #[error("Invalid credentials")]
  Unauthorized,

  #[error("{0}")]
  NotFound(String),

  /// Duplicate key, or the record is already in the requested state.
  #[error("{0}")]
  Conflict(String),

  #[error("Too many requests, please try again later")]
  TooManyRequests,

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map a backend failure, turning uniqueness violations into conflicts.
  pub fn store<E: StoreError>(err: E) -> Self {
    match err.duplicate_field() {
      Some(UniqueField::Username) => Self::Conflict("Username already registered".into()),
      Some(UniqueField::Mobile) => Self::Conflict("Mobile number already registered".into()),
      Some(UniqueField::TransactionId) => {
        Self::Conflict("Transaction ID already used".into())
      }
      None => Self::Internal(Box::new(err)),
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::Validation(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
      Self::Unauthorized => StatusCode::UNAUTHORIZED,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
      Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<portal_core::Error> for ApiError {
  fn from(err: portal_core::Error) -> Self { Self::Validation(err.to_string()) }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::Validation(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      Self::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        "Internal server error".to_owned()
      }
      other => other.to_string(),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
