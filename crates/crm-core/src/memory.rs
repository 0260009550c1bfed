//! In-memory [`UnitOfWorkFactory`] used as a test double.
//!
//! Each unit of work reads from a private copy of the committed state and
//! records every write it stages. `commit` replays those writes onto the
//! shared state under its lock; `rollback`, or dropping the unit, throws them
//! away. Rollback-by-default therefore holds here exactly as it does for the
//! SQLite store.
//!
//! Ids come from the shared counter, so two overlapping units never hand out
//! the same id. When both touch the same row, the later commit wins for the
//! fields it changes.

use std::{
  collections::BTreeMap,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
  contact::{Contact, ContactChanges, ContactId, NewContact},
  repository::ContactRepository,
  uow::{UnitOfWork, UnitOfWorkFactory},
};

#[derive(Debug, Error)]
pub enum MemoryError {
  /// `update` or `delete_by_id` was called for an id that does not exist.
  #[error("no contact row with id {0}")]
  MissingRow(ContactId),
}

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
struct MemoryState {
  contacts: BTreeMap<ContactId, Contact>,
  last_id:  i64,
}

/// A write recorded by a unit of work, replayed on commit.
#[derive(Debug, Clone)]
enum Staged {
  Insert(Contact),
  Update(ContactId, ContactChanges, DateTime<Utc>),
  Delete(ContactId),
}

impl Staged {
  fn replay(self, contacts: &mut BTreeMap<ContactId, Contact>) {
    match self {
      Staged::Insert(contact) => {
        contacts.insert(contact.id, contact);
      }
      Staged::Update(id, changes, at) => {
        if let Some(contact) = contacts.get_mut(&id) {
          contact.apply(changes, at);
        }
      }
      Staged::Delete(id) => {
        contacts.remove(&id);
      }
    }
  }
}

// ─── Store (factory) ─────────────────────────────────────────────────────────

/// Shared committed state. Cloning is cheap and every clone sees the same
/// data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Committed contacts, ordered by id.
  pub fn snapshot(&self) -> Vec<Contact> {
    self.lock().contacts.values().cloned().collect()
  }

  fn lock(&self) -> MutexGuard<'_, MemoryState> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn committed_contacts(&self) -> BTreeMap<ContactId, Contact> {
    self.lock().contacts.clone()
  }

  fn next_id(&self) -> ContactId {
    let mut state = self.lock();
    state.last_id += 1;
    ContactId(state.last_id)
  }
}

impl UnitOfWorkFactory for MemoryStore {
  type UnitOfWork = MemoryUnitOfWork;

  async fn begin(&self) -> Result<MemoryUnitOfWork, MemoryError> {
    Ok(MemoryUnitOfWork {
      contacts:  MemoryContactRepository {
        store:    self.clone(),
        contacts: self.committed_contacts(),
        staged:   Vec::new(),
      },
      committed: false,
    })
  }
}

// ─── Unit of work ────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct MemoryUnitOfWork {
  contacts:  MemoryContactRepository,
  committed: bool,
}

impl MemoryUnitOfWork {
  /// Whether `commit` has been called at least once on this unit.
  pub fn committed(&self) -> bool { self.committed }
}

impl UnitOfWork for MemoryUnitOfWork {
  type Error = MemoryError;
  type Contacts = MemoryContactRepository;

  fn contacts(&mut self) -> &mut MemoryContactRepository { &mut self.contacts }

  async fn commit(&mut self) -> Result<(), MemoryError> {
    let repo = &mut self.contacts;
    let mut shared = repo.store.lock();
    for staged in repo.staged.drain(..) {
      staged.replay(&mut shared.contacts);
    }
    repo.contacts = shared.contacts.clone();
    drop(shared);
    self.committed = true;
    Ok(())
  }

  async fn rollback(&mut self) -> Result<(), MemoryError> {
    let repo = &mut self.contacts;
    repo.staged.clear();
    repo.contacts = repo.store.committed_contacts();
    Ok(())
  }
}

// ─── Repository ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct MemoryContactRepository {
  store:    MemoryStore,
  contacts: BTreeMap<ContactId, Contact>,
  staged:   Vec<Staged>,
}

impl MemoryContactRepository {
  fn stage(&mut self, staged: Staged) {
    staged.clone().replay(&mut self.contacts);
    self.staged.push(staged);
  }
}

impl ContactRepository for MemoryContactRepository {
  type Error = MemoryError;

  async fn add(&mut self, contact: NewContact) -> Result<(), MemoryError> {
    let id = self.store.next_id();
    self.stage(Staged::Insert(contact.into_contact(id, Utc::now())));
    Ok(())
  }

  async fn get_all(&mut self) -> Result<Vec<Contact>, MemoryError> {
    Ok(self.contacts.values().cloned().collect())
  }

  async fn get_by_id(
    &mut self,
    id: ContactId,
  ) -> Result<Option<Contact>, MemoryError> {
    Ok(self.contacts.get(&id).cloned())
  }

  async fn get_by_email_address(
    &mut self,
    email_address: &str,
  ) -> Result<Option<Contact>, MemoryError> {
    Ok(
      self
        .contacts
        .values()
        .find(|c| c.email_address == email_address)
        .cloned(),
    )
  }

  async fn update(
    &mut self,
    id: ContactId,
    changes: ContactChanges,
  ) -> Result<(), MemoryError> {
    if !self.contacts.contains_key(&id) {
      return Err(MemoryError::MissingRow(id));
    }
    self.stage(Staged::Update(id, changes, Utc::now()));
    Ok(())
  }

  async fn delete_by_id(&mut self, id: ContactId) -> Result<(), MemoryError> {
    if !self.contacts.contains_key(&id) {
      return Err(MemoryError::MissingRow(id));
    }
    self.stage(Staged::Delete(id));
    Ok(())
  }
}
