//! JSON REST API for the officer portal.
//!
//! Exposes an axum [`Router`] backed by any [`portal_core::store::PortalStore`].
//! TLS, CORS and request tracing are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let portal = Portal::new(Arc::new(store), DesignationSet::default());
//! let app = portal_api::router(AppState::new(portal, limiter));
//! ```

pub mod admin;
pub mod error;
pub mod extract;
pub mod officers;
pub mod password;
pub mod portal;
pub mod rate_limit;
pub mod results;
pub mod subscription;
pub mod transfers;

use std::sync::Arc;

use axum::{
  Json, Router, middleware,
  routing::{get, post},
};
use portal_core::store::PortalStore;
use serde_json::{Value, json};

pub use error::ApiError;
pub use portal::Portal;
pub use rate_limit::RateLimiter;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub portal:  Portal<S>,
  /// Applied to `/submit-transaction` only.
  pub limiter: Arc<RateLimiter>,
}

impl<S> AppState<S> {
  pub fn new(portal: Portal<S>, limiter: RateLimiter) -> Self {
    Self { portal, limiter: Arc::new(limiter) }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      portal:  self.portal.clone(),
      limiter: Arc::clone(&self.limiter),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the fully-materialised API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: PortalStore + 'static,
{
  let limited = middleware::from_fn_with_state(Arc::clone(&state.limiter), rate_limit::limit);

  Router::new()
    .route("/health", get(health))
    // Admin
    .route("/admin/login", post(admin::login::<S>))
    .route("/admin/reset-password", post(admin::reset_password::<S>))
    .route("/admin/activate", post(subscription::activate::<S>))
    .route("/admin/officers", get(officers::list::<S>))
    // Officers
    .route("/signup", post(officers::signup::<S>))
    .route("/login", post(officers::login::<S>))
    .route("/officer/status", post(officers::status::<S>))
    .route("/officer/reset-password", post(officers::reset_password::<S>))
    .route("/submit-transaction", post(subscription::submit::<S>).route_layer(limited))
    // Results
    .route("/submit-result", post(results::submit::<S>))
    .route("/get-results", get(results::list::<S>))
    // Transfers
    .route("/transfer/apply", post(transfers::apply::<S>))
    .route("/transfer/all", get(transfers::list_all::<S>))
    .route("/transfer/{designation}", get(transfers::list_by_designation::<S>))
    .with_state(state)
}

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests;
