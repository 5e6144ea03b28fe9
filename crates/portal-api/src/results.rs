//! Result ledger.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/submit-result` | Body: `{"username","name","score","total","date"?}`; returns 201 |
//! | `GET`  | `/get-results` | Newest first |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use portal_core::{
  exam::{ExamResult, NewExamResult},
  store::PortalStore,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
  AppState, Portal,
  error::ApiError,
  extract::{JsonBody, present},
};

#[derive(Debug, Default, Deserialize)]
pub struct SubmitBody {
  pub username: Option<String>,
  pub name:     Option<String>,
  pub address:  Option<String>,
  pub phone:    Option<String>,
  /// JSON numbers, or strings holding numbers (`"45"`).
  pub score:    Option<Value>,
  pub total:    Option<Value>,
  /// RFC 3339 timestamp or `YYYY-MM-DD`.
  pub date:     Option<String>,
}

fn number(value: Option<&Value>) -> Option<f64> {
  let n = match value? {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }?;
  n.is_finite().then_some(n)
}

/// Years outside this range do not survive the fixed-width text encoding
/// the store orders by.
const YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

fn parse_date(raw: &str) -> Result<DateTime<Utc>, ApiError> {
  let raw = raw.trim();
  let parsed = DateTime::parse_from_rfc3339(raw)
    .map(|dt| dt.with_timezone(&Utc))
    .ok()
    .or_else(|| {
      NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|midnight| Utc.from_utc_datetime(&midnight))
    });
  parsed
    .filter(|dt| YEARS.contains(&dt.year()))
    .ok_or_else(|| ApiError::Validation(format!("Invalid date: {raw}")))
}

// ─── Operations ──────────────────────────────────────────────────────────────

impl<S: PortalStore> Portal<S> {
  pub async fn submit_result(&self, body: SubmitBody) -> Result<ExamResult, ApiError> {
    let username = present(body.username);
    let score = number(body.score.as_ref());
    let total = number(body.total.as_ref());
    let (Some(username), Some(score), Some(total)) = (username, score, total) else {
      return Err(ApiError::Validation(
        "Username, score and total are required; score and total must be numbers".into(),
      ));
    };

    let date = match present(body.date) {
      Some(raw) => parse_date(&raw)?,
      None => Utc::now(),
    };

    let result = self
      .store()
      .record_result(NewExamResult {
        name: present(body.name).unwrap_or_default(),
        address: present(body.address),
        phone: present(body.phone),
        username,
        score,
        total,
        date,
      })
      .await
      .map_err(ApiError::store)?;

    tracing::info!(username = %result.username, score, total, "result recorded");
    Ok(result)
  }

  pub async fn list_results(&self) -> Result<Vec<ExamResult>, ApiError> {
    self.store().list_results().await.map_err(ApiError::store)
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `POST /submit-result`
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<SubmitBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PortalStore + 'static,
{
  let result = state.portal.submit_result(body).await?;
  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "Result submitted", "id": result.result_id })),
  ))
}

/// `GET /get-results`
pub async fn list<S>(State(state): State<AppState<S>>) -> Result<Json<Vec<ExamResult>>, ApiError>
where
  S: PortalStore + 'static,
{
  Ok(Json(state.portal.list_results().await?))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn numbers_accept_json_numbers_and_numeric_strings() {
    assert_eq!(number(Some(&json!(45))), Some(45.0));
    assert_eq!(number(Some(&json!(" 12.5 "))), Some(12.5));
    assert_eq!(number(Some(&json!("abc"))), None);
    assert_eq!(number(Some(&json!(null))), None);
    assert_eq!(number(None), None);
  }

  #[test]
  fn dates_accept_rfc3339_and_plain_dates() {
    let d = parse_date("2024-05-01").unwrap();
    assert_eq!(d, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());

    let t = parse_date("2024-05-01T10:30:00+05:30").unwrap();
    assert_eq!(t, Utc.with_ymd_and_hms(2024, 5, 1, 5, 0, 0).unwrap());

    assert!(matches!(parse_date("01/05/2024"), Err(ApiError::Validation(_))));
  }

  #[test]
  fn dates_outside_four_digit_years_are_rejected() {
    for raw in ["-0001-01-01", "+10000-01-01", "10000-01-01"] {
      assert!(
        matches!(parse_date(raw), Err(ApiError::Validation(_))),
        "accepted {raw}"
      );
    }
    assert!(parse_date("0000-01-01").is_ok());
    assert!(parse_date("9999-12-31").is_ok());
  }
}
