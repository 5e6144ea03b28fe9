//! Transfer applications and the designation vocabulary used to route them.

use std::{collections::BTreeSet, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Designation ─────────────────────────────────────────────────────────────

/// A job title drawn from a [`DesignationSet`]. Always uppercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Designation(String);

impl Designation {
  /// Rebuild a designation that was validated before it was persisted.
  /// The allow-list may have changed since, so no check is made here.
  pub fn from_stored(name: String) -> Self { Self(name) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Designation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// The designations accepted when none are configured.
pub const DEFAULT_DESIGNATIONS: &[&str] = &[
  "SRI",
  "JRI",
  "TYPIST",
  "STENOTYPIST",
  "DEPUTYTAHSILDAR",
  "TAHSILDAR",
];

/// The allow-list of designations. Loaded from configuration so the set can
/// grow without touching the intake logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignationSet {
  allowed: BTreeSet<String>,
}

impl DesignationSet {
  /// Build a set from raw names; entries are trimmed and uppercased, blanks
  /// are skipped.
  pub fn new<I, T>(names: I) -> Self
  where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
  {
    let allowed = names
      .into_iter()
      .map(|n| normalize(n.as_ref()))
      .filter(|n| !n.is_empty())
      .collect();
    Self { allowed }
  }

  /// Normalise `raw` and check it against the allow-list.
  pub fn parse(&self, raw: &str) -> Result<Designation> {
    let name = normalize(raw);
    if self.allowed.contains(&name) {
      Ok(Designation(name))
    } else {
      Err(Error::UnknownDesignation(raw.trim().to_owned()))
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> { self.allowed.iter().map(String::as_str) }

  pub fn len(&self) -> usize { self.allowed.len() }

  pub fn is_empty(&self) -> bool { self.allowed.is_empty() }
}

impl Default for DesignationSet {
  fn default() -> Self { Self::new(DEFAULT_DESIGNATIONS) }
}

fn normalize(raw: &str) -> String { raw.trim().to_uppercase() }

// ─── Transfer type ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransferType {
  #[default]
  #[serde(rename = "One Way")]
  OneWay,
  Mutual,
}

impl TransferType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::OneWay => "One Way",
      Self::Mutual => "Mutual",
    }
  }

  /// Accepts the display form, case-insensitively.
  pub fn parse(raw: &str) -> Result<Self> {
    match raw.trim().to_lowercase().as_str() {
      "one way" | "oneway" | "one-way" => Ok(Self::OneWay),
      "mutual" => Ok(Self::Mutual),
      _ => Err(Error::UnknownTransferType(raw.trim().to_owned())),
    }
  }
}

// ─── Application ─────────────────────────────────────────────────────────────

/// A stored transfer application. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferApplication {
  pub transfer_id:      Uuid,
  pub username:         String,
  pub transfer_type:    TransferType,
  pub applicant_name:   String,
  pub working_district: String,
  pub designation:      Designation,
  pub date_of_joining:  String,
  pub option1:          String,
  pub option2:          Option<String>,
  pub option3:          Option<String>,
  pub contact_number:   String,
  pub created_at:       DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTransfer {
  pub username:         String,
  pub transfer_type:    TransferType,
  pub applicant_name:   String,
  pub working_district: String,
  pub designation:      Designation,
  pub date_of_joining:  String,
  pub option1:          String,
  pub option2:          Option<String>,
  pub option3:          Option<String>,
  pub contact_number:   String,
}
