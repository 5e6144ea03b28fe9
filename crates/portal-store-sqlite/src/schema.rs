//! SQL schema for the portal SQLite store.
//!
//! Executed once at connection startup. Every statement is idempotent so the
//! batch can run against an existing database.

/// Full schema DDL.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Single-row in practice: only the seeded admin is ever inserted.
CREATE TABLE IF NOT EXISTS admins (
    username      TEXT PRIMARY KEY,
    password_hash TEXT NOT NULL
);

-- Uniqueness is enforced here and nowhere else. transaction_id is NULL until
-- submitted; NULLs never collide, so only real ids are unique.
CREATE TABLE IF NOT EXISTS officers (
    officer_id               TEXT PRIMARY KEY,
    name                     TEXT NOT NULL DEFAULT '',
    address                  TEXT NOT NULL DEFAULT '',
    mobile                   TEXT NOT NULL UNIQUE,
    username                 TEXT NOT NULL UNIQUE,
    password_hash            TEXT NOT NULL,
    subscribed               INTEGER NOT NULL DEFAULT 0 CHECK (subscribed IN (0, 1)),
    transaction_id           TEXT UNIQUE,
    transaction_submitted_at TEXT,
    subscription_date        TEXT,
    created_at               TEXT NOT NULL   -- RFC 3339 UTC, fixed width
);

-- Append-only.
CREATE TABLE IF NOT EXISTS exam_results (
    result_id TEXT PRIMARY KEY,
    username  TEXT NOT NULL,
    name      TEXT NOT NULL DEFAULT '',
    address   TEXT,
    phone     TEXT,
    score     REAL NOT NULL,
    total     REAL NOT NULL,
    date      TEXT NOT NULL
);

-- Append-only.
CREATE TABLE IF NOT EXISTS transfers (
    transfer_id      TEXT PRIMARY KEY,
    username         TEXT NOT NULL,
    transfer_type    TEXT NOT NULL,   -- 'One Way' | 'Mutual'
    applicant_name   TEXT NOT NULL,
    working_district TEXT NOT NULL,
    designation      TEXT NOT NULL,   -- uppercase, validated on intake
    date_of_joining  TEXT NOT NULL,
    option1          TEXT NOT NULL,
    option2          TEXT,
    option3          TEXT,
    contact_number   TEXT NOT NULL,
    created_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS officers_created_idx     ON officers(created_at);
CREATE INDEX IF NOT EXISTS exam_results_date_idx    ON exam_results(date);
CREATE INDEX IF NOT EXISTS transfers_created_idx    ON transfers(created_at);
CREATE INDEX IF NOT EXISTS transfers_designation_idx ON transfers(designation, created_at);

PRAGMA user_version = 1;
";
