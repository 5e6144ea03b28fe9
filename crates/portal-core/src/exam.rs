//! Exam results: an append-only ledger of scores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recorded exam result. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
  pub result_id: Uuid,
  pub username:  String,
  pub name:      String,
  pub address:   Option<String>,
  pub phone:     Option<String>,
  pub score:     f64,
  pub total:     f64,
  /// When the exam was taken; defaults to submission time.
  pub date:      DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewExamResult {
  pub username: String,
  pub name:     String,
  pub address:  Option<String>,
  pub phone:    Option<String>,
  pub score:    f64,
  pub total:    f64,
  pub date:     DateTime<Utc>,
}
