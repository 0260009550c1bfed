//! The `ContactRepository` trait.
//!
//! Implemented by storage backends (`crm-store-sqlite`) and by the in-memory
//! double in [`crate::memory`]. A repository is always bound to one unit of
//! work and sees that unit's uncommitted writes.
//!
//! Repositories know nothing about business rules. Uniqueness of email
//! addresses and existence checks before `update`/`delete_by_id` are the
//! caller's responsibility.

use std::future::Future;

use crate::contact::{Contact, ContactChanges, ContactId, NewContact};

/// CRUD access to contacts inside a single transaction.
pub trait ContactRepository: Send {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Stage a new contact for insertion. The id assigned by the store is
  /// observable through the lookups once the call returns.
  fn add(
    &mut self,
    contact: NewContact,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Every contact visible in the current transaction.
  fn get_all(
    &mut self,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + '_;

  /// Returns `None` if no contact has this id.
  fn get_by_id(
    &mut self,
    id: ContactId,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// Returns `None` if no contact has this email address.
  fn get_by_email_address<'a>(
    &'a mut self,
    email_address: &'a str,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + 'a;

  /// Apply `changes` to an existing contact and refresh `last_updated_at`.
  ///
  /// Fails with a storage error if `id` does not exist.
  fn update(
    &mut self,
    id: ContactId,
    changes: ContactChanges,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove a contact. Fails with a storage error if `id` does not exist.
  fn delete_by_id(
    &mut self,
    id: ContactId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
