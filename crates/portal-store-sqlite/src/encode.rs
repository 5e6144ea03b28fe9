//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as fixed-width RFC 3339 strings in UTC
//! (microsecond precision, `Z` suffix), so `ORDER BY` on the text column is
//! chronological. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use portal_core::{
  exam::ExamResult,
  officer::{Officer, OfficerCredentials},
  transfer::{Designation, TransferApplication, TransferType},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

// ─── TransferType ─────────────────────────────────────────────────────────────

pub fn encode_transfer_type(t: TransferType) -> &'static str { t.as_str() }

pub fn decode_transfer_type(s: &str) -> Result<TransferType> {
  TransferType::parse(s).map_err(|_| Error::Decode {
    column: "transfer_type",
    value:  s.to_owned(),
  })
}

// ─── Officers ─────────────────────────────────────────────────────────────────

/// Column list shared by every officer `SELECT`, in [`RawOfficer`] order.
pub const OFFICER_COLUMNS: &str = "officer_id, name, address, mobile, username, \
   subscribed, transaction_id, transaction_submitted_at, subscription_date, \
   created_at";

/// An officer row as read from SQLite, before decoding.
pub struct RawOfficer {
  pub officer_id:               String,
  pub name:                     String,
  pub address:                  String,
  pub mobile:                   String,
  pub username:                 String,
  pub subscribed:               bool,
  pub transaction_id:           Option<String>,
  pub transaction_submitted_at: Option<String>,
  pub subscription_date:        Option<String>,
  pub created_at:               String,
}

impl RawOfficer {
  /// Read the first ten columns of `row`, laid out as [`OFFICER_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      officer_id:               row.get(0)?,
      name:                     row.get(1)?,
      address:                  row.get(2)?,
      mobile:                   row.get(3)?,
      username:                 row.get(4)?,
      subscribed:               row.get(5)?,
      transaction_id:           row.get(6)?,
      transaction_submitted_at: row.get(7)?,
      subscription_date:        row.get(8)?,
      created_at:               row.get(9)?,
    })
  }

  pub fn into_officer(self) -> Result<Officer> {
    Ok(Officer {
      officer_id:               decode_uuid(&self.officer_id)?,
      name:                     self.name,
      address:                  self.address,
      mobile:                   self.mobile,
      username:                 self.username,
      subscribed:               self.subscribed,
      transaction_id:           self.transaction_id,
      transaction_submitted_at: decode_opt_dt(self.transaction_submitted_at)?,
      subscription_date:        decode_opt_dt(self.subscription_date)?,
      created_at:               decode_dt(&self.created_at)?,
    })
  }
}

/// An officer row followed by its `password_hash` column.
pub struct RawOfficerCredentials {
  pub officer:       RawOfficer,
  pub password_hash: String,
}

impl RawOfficerCredentials {
  pub fn into_credentials(self) -> Result<OfficerCredentials> {
    Ok(OfficerCredentials {
      officer:       self.officer.into_officer()?,
      password_hash: self.password_hash,
    })
  }
}

// ─── Exam results ─────────────────────────────────────────────────────────────

pub struct RawExamResult {
  pub result_id: String,
  pub username:  String,
  pub name:      String,
  pub address:   Option<String>,
  pub phone:     Option<String>,
  pub score:     f64,
  pub total:     f64,
  pub date:      String,
}

impl RawExamResult {
  pub fn into_result(self) -> Result<ExamResult> {
    Ok(ExamResult {
      result_id: decode_uuid(&self.result_id)?,
      username:  self.username,
      name:      self.name,
      address:   self.address,
      phone:     self.phone,
      score:     self.score,
      total:     self.total,
      date:      decode_dt(&self.date)?,
    })
  }
}

// ─── Transfers ────────────────────────────────────────────────────────────────

pub struct RawTransfer {
  pub transfer_id:      String,
  pub username:         String,
  pub transfer_type:    String,
  pub applicant_name:   String,
  pub working_district: String,
  pub designation:      String,
  pub date_of_joining:  String,
  pub option1:          String,
  pub option2:          Option<String>,
  pub option3:          Option<String>,
  pub contact_number:   String,
  pub created_at:       String,
}

impl RawTransfer {
  pub fn into_transfer(self) -> Result<TransferApplication> {
    Ok(TransferApplication {
      transfer_id:      decode_uuid(&self.transfer_id)?,
      username:         self.username,
      transfer_type:    decode_transfer_type(&self.transfer_type)?,
      applicant_name:   self.applicant_name,
      working_district: self.working_district,
      designation:      Designation::from_stored(self.designation),
      date_of_joining:  self.date_of_joining,
      option1:          self.option1,
      option2:          self.option2,
      option3:          self.option3,
      contact_number:   self.contact_number,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}
