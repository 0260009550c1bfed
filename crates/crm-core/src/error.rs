//! Error types for `crm-core`.

use thiserror::Error;

use crate::contact::ContactId;

/// Errors raised by [`crate::service::ContactService`].
///
/// Business-rule violations get their own variants; anything the storage
/// backend reports is carried opaquely in [`Error::Store`].
#[derive(Debug, Error)]
pub enum Error {
  #[error("Contact already exists with this email address: {0}")]
  RecordExists(String),

  #[error("No contact found with this id: {0}")]
  InvalidRecord(ContactId),

  #[error("No contact found with this email address: {0}")]
  UnknownEmail(String),

  #[error("The proposed birthday does not align with requirements: {0:?}")]
  InvalidBirthday(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
