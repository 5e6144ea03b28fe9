//! Router-level tests against an in-memory SQLite store.

use std::{sync::Arc, time::Duration};

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use portal_core::{admin::ADMIN_USERNAME, store::PortalStore, transfer::DesignationSet};
use portal_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{AppState, Portal, RateLimiter, router};

async fn make_state_with_limit(max_submissions: usize) -> AppState<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let portal = Portal::new(Arc::new(store), DesignationSet::default());
  AppState::new(portal, RateLimiter::new(max_submissions, Duration::from_secs(60)))
}

async fn make_state() -> AppState<SqliteStore> { make_state_with_limit(100).await }

async fn send(
  state:  &AppState<SqliteStore>,
  method: &str,
  uri:    &str,
  body:   Option<Value>,
) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let req = match body {
    Some(b) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(b.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  let resp = router(state.clone()).oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, json)
}

async fn post(state: &AppState<SqliteStore>, uri: &str, body: Value) -> (StatusCode, Value) {
  send(state, "POST", uri, Some(body)).await
}

async fn get(state: &AppState<SqliteStore>, uri: &str) -> (StatusCode, Value) {
  send(state, "GET", uri, None).await
}

async fn signup(state: &AppState<SqliteStore>, username: &str, mobile: &str) {
  let (status, body) = post(
    state,
    "/signup",
    json!({
      "name": "Officer",
      "address": "Trichy",
      "mobile": mobile,
      "username": username,
      "password": "pw123456",
    }),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "signup failed: {body}");
}

fn error_of(body: &Value) -> &str { body["error"].as_str().unwrap_or_default() }

// ── Health ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_ok() {
  let state = make_state().await;
  let (status, body) = get(&state, "/health").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "ok");
}

// ── Subscription scenario ───────────────────────────────────────────────────

#[tokio::test]
async fn signup_submit_activate_scenario() {
  let state = make_state().await;

  let (status, body) = post(&state, "/signup", json!({ "mobile": "12345" })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(error_of(&body), "Invalid mobile number");

  let (status, body) = post(
    &state,
    "/signup",
    json!({ "mobile": "9876543210", "username": "o1", "password": "pw123456" }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["officer"]["subscribed"], false);

  let (status, body) = post(
    &state,
    "/submit-transaction",
    json!({ "username": "o1", "transactionId": "123456789012" }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["transactionId"], "123456789012");

  let (status, body) = post(&state, "/officer/status", json!({ "username": "o1" })).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["activated"], false);
  assert_eq!(body["state"], "PENDING");

  let (status, body) = post(
    &state,
    "/admin/activate",
    json!({ "transactionId": "123456789012" }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["officer"]["subscribed"], true);

  let (status, body) = post(
    &state,
    "/admin/activate",
    json!({ "transactionId": "123456789012" }),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(error_of(&body).contains("already subscribed"), "{body}");

  let (_, body) = post(&state, "/officer/status", json!({ "username": "o1" })).await;
  assert_eq!(body["activated"], true);
  assert_eq!(body["state"], "SUBSCRIBED");
}

#[tokio::test]
async fn second_activation_keeps_subscription_date() {
  let state = make_state().await;
  signup(&state, "o1", "9876543210").await;
  post(
    &state,
    "/submit-transaction",
    json!({ "username": "o1", "transactionId": "123456789012" }),
  )
  .await;

  let (status, _) = post(&state, "/admin/activate", json!({ "username": "o1" })).await;
  assert_eq!(status, StatusCode::OK);
  let first = state
    .portal
    .store()
    .officer_by_username("o1")
    .await
    .unwrap()
    .unwrap()
    .subscription_date;
  assert!(first.is_some());

  let (status, _) = post(&state, "/admin/activate", json!({ "username": "o1" })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let second = state
    .portal
    .store()
    .officer_by_username("o1")
    .await
    .unwrap()
    .unwrap()
    .subscription_date;
  assert_eq!(first, second);
}

#[tokio::test]
async fn activation_input_errors() {
  let state = make_state().await;

  let (status, _) = post(&state, "/admin/activate", json!({})).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, body) = post(
    &state,
    "/admin/activate",
    json!({ "transactionId": "999999999999" }),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(error_of(&body), "Officer not found");
}

#[tokio::test]
async fn transaction_id_format_is_enforced() {
  let state = make_state().await;
  signup(&state, "o1", "9876543210").await;

  for bad in ["12345678", "1234567890123", "12345678901x"] {
    let (status, _) = post(
      &state,
      "/submit-transaction",
      json!({ "username": "o1", "transactionId": bad }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {bad}");
  }

  let (status, _) = post(
    &state,
    "/submit-transaction",
    json!({ "username": "ghost", "transactionId": "123456789012" }),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reused_transaction_id_conflicts_and_mutates_nothing() {
  let state = make_state().await;
  signup(&state, "o1", "9000000001").await;
  signup(&state, "o2", "9000000002").await;

  let (status, _) = post(
    &state,
    "/submit-transaction",
    json!({ "username": "o1", "transactionId": "123456789012" }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, body) = post(
    &state,
    "/submit-transaction",
    json!({ "username": "o2", "transactionId": "123456789012" }),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(error_of(&body), "Transaction ID already used");

  let store = state.portal.store();
  let o1 = store.officer_by_username("o1").await.unwrap().unwrap();
  let o2 = store.officer_by_username("o2").await.unwrap().unwrap();
  assert_eq!(o1.transaction_id.as_deref(), Some("123456789012"));
  assert_eq!(o2.transaction_id, None);
  assert_eq!(o2.transaction_submitted_at, None);
}

#[tokio::test]
async fn subscribed_officer_cannot_resubmit() {
  let state = make_state().await;
  signup(&state, "o1", "9876543210").await;
  post(&state, "/admin/activate", json!({ "username": "o1" })).await;

  let (status, body) = post(
    &state,
    "/submit-transaction",
    json!({ "username": "o1", "transactionId": "123456789012" }),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(error_of(&body).contains("already subscribed"));
}

#[tokio::test]
async fn submit_transaction_is_rate_limited() {
  let state = make_state_with_limit(2).await;
  signup(&state, "o1", "9876543210").await;

  for id in ["123456789012", "123456789013"] {
    let (status, _) = post(
      &state,
      "/submit-transaction",
      json!({ "username": "o1", "transactionId": id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
  }

  let (status, body) = post(
    &state,
    "/submit-transaction",
    json!({ "username": "o1", "transactionId": "123456789014" }),
  )
  .await;
  assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
  assert!(body["error"].is_string());

  // Other routes are not limited.
  let (status, _) = post(&state, "/officer/status", json!({ "username": "o1" })).await;
  assert_eq!(status, StatusCode::OK);
}

// ── Officer directory ───────────────────────────────────────────────────────

#[tokio::test]
async fn signup_never_exposes_or_stores_plaintext_password() {
  let state = make_state().await;
  let (status, body) = post(
    &state,
    "/signup",
    json!({
      "name": "Kavya",
      "address": "Vellore",
      "mobile": "9876543210",
      "username": "kavya",
      "password": "s3cret-pass",
    }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert!(!body.to_string().contains("s3cret-pass"));
  assert!(body["officer"].get("password").is_none());
  assert!(body["officer"].get("passwordHash").is_none());

  let creds = state
    .portal
    .store()
    .officer_credentials("kavya")
    .await
    .unwrap()
    .unwrap();
  assert_ne!(creds.password_hash, "s3cret-pass");

  let (_, list) = get(&state, "/admin/officers").await;
  assert_eq!(list.as_array().unwrap().len(), 1);
  assert!(!list.to_string().contains("argon2"));
}

#[tokio::test]
async fn signup_requires_username_and_password() {
  let state = make_state().await;
  let (status, body) = post(&state, "/signup", json!({ "mobile": "9876543210" })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(error_of(&body), "Username and password are required");
}

#[tokio::test]
async fn duplicate_username_and_mobile_conflict() {
  let state = make_state().await;
  signup(&state, "o1", "9876543210").await;

  let (status, body) = post(
    &state,
    "/signup",
    json!({ "mobile": "9876543211", "username": "o1", "password": "pw" }),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(error_of(&body), "Username already registered");

  let (status, body) = post(
    &state,
    "/signup",
    json!({ "mobile": "9876543210", "username": "o2", "password": "pw" }),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(error_of(&body), "Mobile number already registered");
}

#[tokio::test]
async fn failed_logins_are_indistinguishable() {
  let state = make_state().await;
  signup(&state, "o1", "9876543210").await;

  let wrong_password = post(
    &state,
    "/login",
    json!({ "username": "o1", "password": "nope" }),
  )
  .await;
  let unknown_user = post(
    &state,
    "/login",
    json!({ "username": "nobody", "password": "nope" }),
  )
  .await;

  assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
  assert_eq!(wrong_password, unknown_user);
}

#[tokio::test]
async fn login_returns_profile_and_flag() {
  let state = make_state().await;
  signup(&state, "o1", "9876543210").await;

  let (status, body) = post(
    &state,
    "/login",
    json!({ "username": "o1", "password": "pw123456" }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["subscribed"], false);
  assert_eq!(body["officer"]["username"], "o1");
  assert!(body["officer"].get("password").is_none());
}

#[tokio::test]
async fn officer_password_reset_needs_username_and_mobile() {
  let state = make_state().await;
  signup(&state, "o1", "9876543210").await;

  let (status, _) = post(
    &state,
    "/officer/reset-password",
    json!({ "username": "o1", "mobile": "9000000000", "password": "newpass1" }),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = post(
    &state,
    "/officer/reset-password",
    json!({ "username": "o1", "mobile": "9876543210", "password": "newpass1" }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = post(
    &state,
    "/login",
    json!({ "username": "o1", "password": "newpass1" }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn status_of_unknown_officer_is_404() {
  let state = make_state().await;
  let (status, _) = post(&state, "/officer/status", json!({ "username": "ghost" })).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Admin ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn admin_seed_login_and_rotate() {
  let state = make_state().await;
  assert!(state.portal.initialize_admin("admin123").await.unwrap());
  assert!(!state.portal.initialize_admin("other").await.unwrap());

  let (status, _) = post(
    &state,
    "/admin/login",
    json!({ "username": ADMIN_USERNAME, "password": "admin123" }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = post(&state, "/admin/reset-password", json!({ "password": "rotated!" })).await;
  assert_eq!(status, StatusCode::OK);

  let old = post(
    &state,
    "/admin/login",
    json!({ "username": ADMIN_USERNAME, "password": "admin123" }),
  )
  .await;
  let unknown = post(
    &state,
    "/admin/login",
    json!({ "username": "root", "password": "rotated!" }),
  )
  .await;
  assert_eq!(old.0, StatusCode::UNAUTHORIZED);
  assert_eq!(old, unknown);
  assert_eq!(error_of(&old.1), "Invalid credentials");

  let (status, _) = post(
    &state,
    "/admin/login",
    json!({ "username": ADMIN_USERNAME, "password": "rotated!" }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_reset_rejects_empty_password() {
  let state = make_state().await;
  state.portal.initialize_admin("admin123").await.unwrap();
  let (status, _) = post(&state, "/admin/reset-password", json!({ "password": "" })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Results ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn results_are_listed_newest_first() {
  let state = make_state().await;
  for (user, date) in [
    ("b", "2024-02-01"),
    ("c", "2024-03-01T08:00:00Z"),
    ("a", "2024-01-01"),
  ] {
    let (status, _) = post(
      &state,
      "/submit-result",
      json!({ "username": user, "name": user, "score": 40, "total": 50, "date": date }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
  }

  let (status, body) = get(&state, "/get-results").await;
  assert_eq!(status, StatusCode::OK);
  let users: Vec<_> = body
    .as_array()
    .unwrap()
    .iter()
    .map(|r| r["username"].as_str().unwrap())
    .collect();
  assert_eq!(users, ["c", "b", "a"]);
}

#[tokio::test]
async fn result_requires_numeric_score_and_total() {
  let state = make_state().await;
  let (status, _) = post(
    &state,
    "/submit-result",
    json!({ "username": "a", "name": "A", "total": 50 }),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = post(
    &state,
    "/submit-result",
    json!({ "username": "a", "score": "lots", "total": 50 }),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = post(&state, "/submit-result", json!({ "score": 1, "total": 2 })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn numeric_strings_are_accepted_as_scores() {
  let state = make_state().await;
  let (status, _) = post(
    &state,
    "/submit-result",
    json!({ "username": "a", "name": "A", "score": "45", "total": " 50 " }),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (_, body) = get(&state, "/get-results").await;
  assert_eq!(body[0]["score"], 45.0);
  assert_eq!(body[0]["total"], 50.0);
}

#[tokio::test]
async fn out_of_range_dates_never_reach_the_ledger() {
  let state = make_state().await;
  for date in ["-0001-01-01", "+10000-01-01", "9999-12-31T23:00:00-05:00"] {
    let (status, body) = post(
      &state,
      "/submit-result",
      json!({ "username": "a", "name": "A", "score": 1, "total": 2, "date": date }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {date}");
    assert!(error_of(&body).starts_with("Invalid date"), "{body}");
  }

  let (status, _) = post(
    &state,
    "/submit-result",
    json!({ "username": "a", "name": "A", "score": 1, "total": 2, "date": "9999-12-31" }),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (status, body) = get(&state, "/get-results").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 1);
}

// ── Transfers ───────────────────────────────────────────────────────────────

fn transfer_body(username: &str, designation: &str) -> Value {
  json!({
    "username": username,
    "applicantName": "Selvi",
    "workingDistrict": "Salem",
    "designation": designation,
    "dateOfJoining": "2016-07-01",
    "option1": "Erode",
    "option2": "Karur",
    "contactNumber": "9876543210",
  })
}

#[tokio::test]
async fn lowercase_designation_is_stored_uppercase() {
  let state = make_state().await;
  signup(&state, "o1", "9876543210").await;

  let (status, body) = post(&state, "/transfer/apply", transfer_body("o1", "sri")).await;
  assert_eq!(status, StatusCode::CREATED);
  assert!(body["id"].is_string());

  let (_, sri) = get(&state, "/transfer/sri").await;
  let sri = sri.as_array().unwrap();
  assert_eq!(sri.len(), 1);
  assert_eq!(sri[0]["designation"], "SRI");
  assert_eq!(sri[0]["transferType"], "One Way");

  let (_, jri) = get(&state, "/transfer/jri").await;
  assert!(jri.as_array().unwrap().is_empty());

  let (_, all) = get(&state, "/transfer/all").await;
  assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_designation_is_rejected() {
  let state = make_state().await;
  signup(&state, "o1", "9876543210").await;

  let (status, body) = post(&state, "/transfer/apply", transfer_body("o1", "Clerk")).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(error_of(&body).contains("Clerk"));

  let (status, _) = get(&state, "/transfer/clerk").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn transfer_requires_existing_officer_and_fields() {
  let state = make_state().await;

  let (status, _) = post(&state, "/transfer/apply", transfer_body("ghost", "sri")).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, body) = post(
    &state,
    "/transfer/apply",
    json!({ "username": "ghost", "designation": "sri" }),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let message = error_of(&body);
  assert!(message.contains("applicantName"), "{message}");
  assert!(message.contains("option1"), "{message}");
  assert!(!message.contains("option2"), "{message}");
}

#[tokio::test]
async fn configured_designations_open_new_routes() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let portal = Portal::new(Arc::new(store), DesignationSet::new(["SRI", "CLERK"]));
  let state = AppState::new(portal, RateLimiter::new(100, Duration::from_secs(60)));
  signup(&state, "o1", "9876543210").await;

  let (status, _) = post(&state, "/transfer/apply", transfer_body("o1", "clerk")).await;
  assert_eq!(status, StatusCode::CREATED);
  let (status, body) = get(&state, "/transfer/clerk").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 1);

  let (status, _) = get(&state, "/transfer/tahsildar").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Request parsing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn malformed_json_uses_error_body() {
  let state = make_state().await;
  let req = Request::builder()
    .method("POST")
    .uri("/login")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{not json"))
    .unwrap();
  let resp = router(state).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let body: Value = serde_json::from_slice(&bytes).unwrap();
  assert!(body["error"].is_string());
}
