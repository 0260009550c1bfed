//! Unit of work: one atomic transaction with its own repository.
//!
//! A [`UnitOfWorkFactory`] is built once at startup and opens a fresh
//! [`UnitOfWork`] per logical transaction. Nothing a unit of work stages
//! survives unless [`UnitOfWork::commit`] is called: dropping the unit, on any
//! path, discards uncommitted work.
//!
//! ```text
//! begin() ──▶ open ──commit()*──▶ drop / rollback() ──▶ closed
//! ```
//!
//! Work done after a commit runs in a fresh transaction and is again
//! discarded unless committed. A closed unit cannot be reopened; call
//! [`UnitOfWorkFactory::begin`] again.

use std::future::Future;

use crate::repository::ContactRepository;

/// A scoped transaction exposing a repository bound to it.
pub trait UnitOfWork: Send {
  type Error: std::error::Error + Send + Sync + 'static;
  type Contacts: ContactRepository<Error = Self::Error>;

  /// The repository bound to this unit's transaction.
  fn contacts(&mut self) -> &mut Self::Contacts;

  /// Make everything staged since the transaction opened durable.
  ///
  /// A failed commit is returned as-is; the staged work is lost and the
  /// caller must treat the whole operation as failed.
  fn commit(
    &mut self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Discard everything staged since the last commit. A no-op when nothing
  /// is staged.
  fn rollback(
    &mut self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Opens units of work. Shared process-wide; cheap to call per request.
pub trait UnitOfWorkFactory: Send + Sync {
  type UnitOfWork: UnitOfWork;

  /// Open a new transaction and bind a fresh repository to it.
  fn begin(
    &self,
  ) -> impl Future<
    Output = Result<
      Self::UnitOfWork,
      <Self::UnitOfWork as UnitOfWork>::Error,
    >,
  > + Send
  + '_;
}
