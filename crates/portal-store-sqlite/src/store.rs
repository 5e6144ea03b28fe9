//! [`SqliteStore`], the SQLite implementation of [`PortalStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use portal_core::{
  admin::AdminCredentials,
  exam::{ExamResult, NewExamResult},
  officer::{Mobile, NewOfficer, Officer, OfficerCredentials, TransactionId},
  store::{AttachOutcome, PortalStore},
  transfer::{Designation, NewTransfer, TransferApplication},
};

use crate::{
  Error, Result,
  encode::{
    OFFICER_COLUMNS, RawExamResult, RawOfficer, RawOfficerCredentials, RawTransfer,
    encode_dt, encode_transfer_type, encode_uuid,
  },
  schema::SCHEMA,
};

const RESULT_COLUMNS: &str =
  "result_id, username, name, address, phone, score, total, date";

const TRANSFER_COLUMNS: &str = "transfer_id, username, transfer_type, applicant_name, \
   working_district, designation, date_of_joining, option1, option2, option3, \
   contact_number, created_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A portal store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "sqlite store ready");
    Ok(store)
  }

  /// Open a scratch in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch a single officer by an arbitrary unique column.
  async fn officer_where(&self, column: &'static str, value: String) -> Result<Option<Officer>> {
    let raw: Option<RawOfficer> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {OFFICER_COLUMNS} FROM officers WHERE {column} = ?1"),
              rusqlite::params![value],
              RawOfficer::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawOfficer::into_officer).transpose()
  }
}

/// What the attach closure observed, before decoding.
enum RawAttach {
  Attached(RawOfficer),
  UnknownOfficer,
  AlreadySubscribed,
}

// ─── PortalStore impl ────────────────────────────────────────────────────────

impl PortalStore for SqliteStore {
  type Error = Error;

  // ── Admin ─────────────────────────────────────────────────────────────────

  async fn ensure_admin(&self, username: &str, password_hash: &str) -> Result<bool> {
    let username = username.to_owned();
    let password_hash = password_hash.to_owned();

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT INTO admins (username, password_hash) VALUES (?1, ?2)
           ON CONFLICT(username) DO NOTHING",
          rusqlite::params![username, password_hash],
        )?;
        Ok(n)
      })
      .await?;

    Ok(inserted == 1)
  }

  async fn admin_credentials(&self, username: &str) -> Result<Option<AdminCredentials>> {
    let username = username.to_owned();

    let creds = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT username, password_hash FROM admins WHERE username = ?1",
              rusqlite::params![username],
              |row| {
                Ok(AdminCredentials {
                  username:      row.get(0)?,
                  password_hash: row.get(1)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    Ok(creds)
  }

  async fn set_admin_password(&self, username: &str, password_hash: &str) -> Result<bool> {
    let username = username.to_owned();
    let password_hash = password_hash.to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE admins SET password_hash = ?2 WHERE username = ?1",
          rusqlite::params![username, password_hash],
        )?)
      })
      .await?;

    Ok(changed == 1)
  }

  // ── Officers ──────────────────────────────────────────────────────────────

  async fn insert_officer(&self, input: NewOfficer) -> Result<Officer> {
    let officer = Officer {
      officer_id:               Uuid::new_v4(),
      name:                     input.name,
      address:                  input.address,
      mobile:                   input.mobile.as_str().to_owned(),
      username:                 input.username,
      subscribed:               false,
      transaction_id:           None,
      transaction_submitted_at: None,
      subscription_date:        None,
      created_at:               Utc::now(),
    };

    let id_str        = encode_uuid(officer.officer_id);
    let name          = officer.name.clone();
    let address       = officer.address.clone();
    let mobile        = officer.mobile.clone();
    let username      = officer.username.clone();
    let password_hash = input.password_hash;
    let at_str        = encode_dt(officer.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO officers (
             officer_id, name, address, mobile, username, password_hash, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, name, address, mobile, username, password_hash, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(officer)
  }

  async fn officer_by_username(&self, username: &str) -> Result<Option<Officer>> {
    self.officer_where("username", username.to_owned()).await
  }

  async fn officer_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Officer>> {
    self.officer_where("transaction_id", transaction_id.to_owned()).await
  }

  async fn officer_credentials(&self, username: &str) -> Result<Option<OfficerCredentials>> {
    let username = username.to_owned();

    let raw: Option<RawOfficerCredentials> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {OFFICER_COLUMNS}, password_hash FROM officers WHERE username = ?1"
              ),
              rusqlite::params![username],
              |row| {
                Ok(RawOfficerCredentials {
                  officer:       RawOfficer::from_row(row)?,
                  password_hash: row.get(10)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawOfficerCredentials::into_credentials).transpose()
  }

  async fn list_officers(&self) -> Result<Vec<Officer>> {
    let raws: Vec<RawOfficer> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {OFFICER_COLUMNS} FROM officers ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map([], RawOfficer::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawOfficer::into_officer).collect()
  }

  async fn set_officer_password(
    &self,
    username:      &str,
    mobile:        &Mobile,
    password_hash: &str,
  ) -> Result<bool> {
    let username      = username.to_owned();
    let mobile        = mobile.as_str().to_owned();
    let password_hash = password_hash.to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE officers SET password_hash = ?3 WHERE username = ?1 AND mobile = ?2",
          rusqlite::params![username, mobile, password_hash],
        )?)
      })
      .await?;

    Ok(changed == 1)
  }

  // ── Subscription handshake ────────────────────────────────────────────────

  async fn attach_transaction(
    &self,
    username:       &str,
    transaction_id: &TransactionId,
    submitted_at:   DateTime<Utc>,
  ) -> Result<AttachOutcome> {
    let username = username.to_owned();
    let tx_str   = transaction_id.as_str().to_owned();
    let at_str   = encode_dt(submitted_at);

    // Check and update run back to back on the connection thread, so no
    // other store call can interleave between them.
    let raw = self
      .conn
      .call(move |conn| {
        let subscribed: Option<bool> = conn
          .query_row(
            "SELECT subscribed FROM officers WHERE username = ?1",
            rusqlite::params![username],
            |r| r.get(0),
          )
          .optional()?;

        match subscribed {
          None => return Ok(RawAttach::UnknownOfficer),
          Some(true) => return Ok(RawAttach::AlreadySubscribed),
          Some(false) => {}
        }

        conn.execute(
          "UPDATE officers
             SET transaction_id = ?2, transaction_submitted_at = ?3
           WHERE username = ?1 AND subscribed = 0",
          rusqlite::params![username, tx_str, at_str],
        )?;

        let officer = conn.query_row(
          &format!("SELECT {OFFICER_COLUMNS} FROM officers WHERE username = ?1"),
          rusqlite::params![username],
          RawOfficer::from_row,
        )?;
        Ok(RawAttach::Attached(officer))
      })
      .await?;

    Ok(match raw {
      RawAttach::Attached(officer) => AttachOutcome::Attached(officer.into_officer()?),
      RawAttach::UnknownOfficer => AttachOutcome::UnknownOfficer,
      RawAttach::AlreadySubscribed => AttachOutcome::AlreadySubscribed,
    })
  }

  async fn activate_subscription(&self, officer_id: Uuid, activated_at: DateTime<Utc>) -> Result<bool> {
    let id_str = encode_uuid(officer_id);
    let at_str = encode_dt(activated_at);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE officers SET subscribed = 1, subscription_date = ?2
           WHERE officer_id = ?1 AND subscribed = 0",
          rusqlite::params![id_str, at_str],
        )?)
      })
      .await?;

    Ok(changed == 1)
  }

  // ── Results ───────────────────────────────────────────────────────────────

  async fn record_result(&self, input: NewExamResult) -> Result<ExamResult> {
    let result = ExamResult {
      result_id: Uuid::new_v4(),
      username:  input.username,
      name:      input.name,
      address:   input.address,
      phone:     input.phone,
      score:     input.score,
      total:     input.total,
      date:      input.date,
    };

    let id_str   = encode_uuid(result.result_id);
    let username = result.username.clone();
    let name     = result.name.clone();
    let address  = result.address.clone();
    let phone    = result.phone.clone();
    let score    = result.score;
    let total    = result.total;
    let date_str = encode_dt(result.date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO exam_results ({RESULT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
          rusqlite::params![id_str, username, name, address, phone, score, total, date_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(result)
  }

  async fn list_results(&self) -> Result<Vec<ExamResult>> {
    let raws: Vec<RawExamResult> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RESULT_COLUMNS} FROM exam_results ORDER BY date DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawExamResult {
              result_id: row.get(0)?,
              username:  row.get(1)?,
              name:      row.get(2)?,
              address:   row.get(3)?,
              phone:     row.get(4)?,
              score:     row.get(5)?,
              total:     row.get(6)?,
              date:      row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawExamResult::into_result).collect()
  }

  // ── Transfers ─────────────────────────────────────────────────────────────

  async fn record_transfer(&self, input: NewTransfer) -> Result<TransferApplication> {
    let transfer = TransferApplication {
      transfer_id:      Uuid::new_v4(),
      username:         input.username,
      transfer_type:    input.transfer_type,
      applicant_name:   input.applicant_name,
      working_district: input.working_district,
      designation:      input.designation,
      date_of_joining:  input.date_of_joining,
      option1:          input.option1,
      option2:          input.option2,
      option3:          input.option3,
      contact_number:   input.contact_number,
      created_at:       Utc::now(),
    };

    let id_str           = encode_uuid(transfer.transfer_id);
    let username         = transfer.username.clone();
    let transfer_type    = encode_transfer_type(transfer.transfer_type);
    let applicant_name   = transfer.applicant_name.clone();
    let working_district = transfer.working_district.clone();
    let designation      = transfer.designation.as_str().to_owned();
    let date_of_joining  = transfer.date_of_joining.clone();
    let option1          = transfer.option1.clone();
    let option2          = transfer.option2.clone();
    let option3          = transfer.option3.clone();
    let contact_number   = transfer.contact_number.clone();
    let at_str           = encode_dt(transfer.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO transfers ({TRANSFER_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
          ),
          rusqlite::params![
            id_str,
            username,
            transfer_type,
            applicant_name,
            working_district,
            designation,
            date_of_joining,
            option1,
            option2,
            option3,
            contact_number,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(transfer)
  }

  async fn list_transfers(&self, designation: Option<&Designation>) -> Result<Vec<TransferApplication>> {
    let designation = designation.map(|d| d.as_str().to_owned());

    let raws: Vec<RawTransfer> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {TRANSFER_COLUMNS} FROM transfers
           WHERE ?1 IS NULL OR designation = ?1
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![designation], |row| {
            Ok(RawTransfer {
              transfer_id:      row.get(0)?,
              username:         row.get(1)?,
              transfer_type:    row.get(2)?,
              applicant_name:   row.get(3)?,
              working_district: row.get(4)?,
              designation:      row.get(5)?,
              date_of_joining:  row.get(6)?,
              option1:          row.get(7)?,
              option2:          row.get(8)?,
              option3:          row.get(9)?,
              contact_number:   row.get(10)?,
              created_at:       row.get(11)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTransfer::into_transfer).collect()
  }
}
