//! SQL schema for the CRM SQLite store.
//!
//! Executed once when the store is opened. There are no migrations; the DDL
//! is idempotent thanks to `IF NOT EXISTS`.

/// Full schema DDL.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS contact (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name      TEXT NOT NULL CHECK (length(first_name) > 0),
    last_name       TEXT NOT NULL CHECK (length(last_name) > 0),
    -- ISO calendar date; date() normalises, so equality rejects 1999-02-30.
    birthday        TEXT NOT NULL CHECK (date(birthday) IS birthday),
    email_address   TEXT NOT NULL,
    created_at      TEXT NOT NULL,   -- fixed-width RFC 3339 UTC
    last_updated_at TEXT NOT NULL,   -- fixed-width RFC 3339 UTC
    CHECK (created_at <= last_updated_at)
);

-- Backstop only; the service rejects duplicates before they get here.
CREATE UNIQUE INDEX IF NOT EXISTS contact_email_idx ON contact(email_address);

PRAGMA user_version = 1;
";

/// Per-connection settings applied to every session.
pub const SESSION_PRAGMAS: &str = "
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;
";
