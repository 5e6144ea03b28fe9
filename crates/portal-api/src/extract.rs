//! Request extractors.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json`, but rejections use the portal's `{"error": ...}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Trim an optional text field, treating blank values as absent.
pub(crate) fn present(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}
