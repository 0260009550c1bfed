//! Error type for `crm-store-sqlite`.

use crm_core::contact::ContactId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// `update` or `delete_by_id` was called for an id with no row. The
  /// service checks existence first, so this signals a caller bug.
  #[error("no contact row with id {0}")]
  MissingRow(ContactId),

  #[error("unknown isolation level: {0:?}")]
  UnknownIsolationLevel(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
