//! Contact types for the single entity managed by the CRM store.
//!
//! A [`Contact`] is what a repository hands back; [`NewContact`] and
//! [`ContactChanges`] are what it accepts. Ids and timestamps are always
//! assigned by the store, never by callers.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Surrogate key assigned by the store on insert.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct ContactId(pub i64);

impl fmt::Display for ContactId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<i64> for ContactId {
  fn from(value: i64) -> Self { Self(value) }
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// A stored contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  pub id:              ContactId,
  pub first_name:      String,
  pub last_name:       String,
  pub birthday:        NaiveDate,
  /// Unique across all contacts; the service checks this before any write.
  pub email_address:   String,
  /// Set once on insert.
  pub created_at:      DateTime<Utc>,
  /// Refreshed on every update; never earlier than `created_at`.
  pub last_updated_at: DateTime<Utc>,
}

impl Contact {
  /// Apply `changes` in place and stamp `last_updated_at` with `now`.
  ///
  /// The stamp is clamped to `created_at` so a backwards clock step cannot
  /// produce a record updated before it was created.
  pub fn apply(&mut self, changes: ContactChanges, now: DateTime<Utc>) {
    if let Some(first_name) = changes.first_name {
      self.first_name = first_name;
    }
    if let Some(last_name) = changes.last_name {
      self.last_name = last_name;
    }
    if let Some(birthday) = changes.birthday {
      self.birthday = birthday;
    }
    if let Some(email_address) = changes.email_address {
      self.email_address = email_address;
    }
    self.last_updated_at = now.max(self.created_at);
  }
}

// ─── NewContact ──────────────────────────────────────────────────────────────

/// Input to [`crate::repository::ContactRepository::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
  pub first_name:    String,
  pub last_name:     String,
  pub birthday:      NaiveDate,
  pub email_address: String,
}

impl NewContact {
  /// Materialise the stored record once the store has picked an id.
  pub fn into_contact(self, id: ContactId, now: DateTime<Utc>) -> Contact {
    Contact {
      id,
      first_name: self.first_name,
      last_name: self.last_name,
      birthday: self.birthday,
      email_address: self.email_address,
      created_at: now,
      last_updated_at: now,
    }
  }
}

// ─── Partial updates ─────────────────────────────────────────────────────────

/// A typed set of field changes for
/// [`crate::repository::ContactRepository::update`]. `None` leaves the field
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactChanges {
  pub first_name:    Option<String>,
  pub last_name:     Option<String>,
  pub birthday:      Option<NaiveDate>,
  pub email_address: Option<String>,
}

impl ContactChanges {
  /// Email address this change would assign, if any.
  pub fn touches_email(&self) -> Option<&str> { self.email_address.as_deref() }
}

/// The partial-update payload as received from outside the service. The
/// birthday is still in its ISO `YYYY-MM-DD` wire form; converting it is the
/// service's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
  pub first_name:    Option<String>,
  pub last_name:     Option<String>,
  pub birthday:      Option<String>,
  pub email_address: Option<String>,
}

/// Wire format for birthdays.
pub const BIRTHDAY_FORMAT: &str = "%Y-%m-%d";

/// Parse an ISO calendar date as used on the wire.
///
/// Only unsigned four-digit years are accepted, which is the range SQLite's
/// date functions round-trip.
pub fn parse_birthday(value: &str) -> Option<NaiveDate> {
  let value = value.trim();
  let year = value.get(..4)?;
  if !year.bytes().all(|b| b.is_ascii_digit())
    || value.as_bytes().get(4) != Some(&b'-')
  {
    return None;
  }
  NaiveDate::parse_from_str(value, BIRTHDAY_FORMAT).ok()
}
