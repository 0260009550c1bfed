//! Transaction isolation as a deployment setting.
//!
//! Profiles name isolation the way relational databases do
//! (`"REPEATABLE READ"`, `"SERIALIZABLE"`, …). SQLite has no such knob, so
//! each level maps onto the closest SQLite behaviour:
//!
//! | Level | Transaction | Connection |
//! |-------|-------------|------------|
//! | `SERIALIZABLE` | `BEGIN IMMEDIATE` | |
//! | `REPEATABLE READ` | `BEGIN DEFERRED` | |
//! | `READ COMMITTED` | `BEGIN DEFERRED` | |
//! | `READ UNCOMMITTED` | `BEGIN DEFERRED` | `PRAGMA read_uncommitted = ON` |
//!
//! In WAL mode a deferred transaction reads from one snapshot, which is at
//! least as strong as repeatable read. `IMMEDIATE` takes the write lock when
//! the transaction opens, so writers are fully serialised.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum IsolationLevel {
  ReadUncommitted,
  ReadCommitted,
  #[default]
  RepeatableRead,
  Serializable,
}

impl IsolationLevel {
  /// Statement that opens a transaction at this level.
  pub fn begin_statement(self) -> &'static str {
    match self {
      Self::Serializable => "BEGIN IMMEDIATE",
      Self::RepeatableRead | Self::ReadCommitted | Self::ReadUncommitted => {
        "BEGIN DEFERRED"
      }
    }
  }

  /// Extra per-connection pragmas this level needs.
  pub fn connection_pragmas(self) -> &'static str {
    match self {
      Self::ReadUncommitted => "PRAGMA read_uncommitted = ON;",
      _ => "PRAGMA read_uncommitted = OFF;",
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::ReadUncommitted => "READ UNCOMMITTED",
      Self::ReadCommitted => "READ COMMITTED",
      Self::RepeatableRead => "REPEATABLE READ",
      Self::Serializable => "SERIALIZABLE",
    }
  }
}

impl fmt::Display for IsolationLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for IsolationLevel {
  type Err = Error;

  /// Case-insensitive; `_`, `-` and runs of whitespace all count as one
  /// space, so `repeatable_read` and `REPEATABLE  READ` both parse.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let normalised = s
      .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
      .filter(|part| !part.is_empty())
      .collect::<Vec<_>>()
      .join(" ")
      .to_ascii_uppercase();

    match normalised.as_str() {
      "READ UNCOMMITTED" => Ok(Self::ReadUncommitted),
      "READ COMMITTED" => Ok(Self::ReadCommitted),
      "REPEATABLE READ" => Ok(Self::RepeatableRead),
      "SERIALIZABLE" => Ok(Self::Serializable),
      _ => Err(Error::UnknownIsolationLevel(s.to_owned())),
    }
  }
}

impl TryFrom<String> for IsolationLevel {
  type Error = Error;

  fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

impl From<IsolationLevel> for String {
  fn from(value: IsolationLevel) -> Self { value.as_str().to_owned() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_database_style_names() {
    assert_eq!(
      "REPEATABLE READ".parse::<IsolationLevel>().unwrap(),
      IsolationLevel::RepeatableRead
    );
    assert_eq!(
      "serializable".parse::<IsolationLevel>().unwrap(),
      IsolationLevel::Serializable
    );
    assert_eq!(
      "read_committed".parse::<IsolationLevel>().unwrap(),
      IsolationLevel::ReadCommitted
    );
    assert_eq!(
      " Read  Uncommitted ".parse::<IsolationLevel>().unwrap(),
      IsolationLevel::ReadUncommitted
    );
  }

  #[test]
  fn rejects_unknown_levels() {
    let err = "SNAPSHOT".parse::<IsolationLevel>().unwrap_err();
    assert!(matches!(err, Error::UnknownIsolationLevel(s) if s == "SNAPSHOT"));
  }

  #[test]
  fn serializable_takes_the_write_lock_up_front() {
    assert_eq!(
      IsolationLevel::Serializable.begin_statement(),
      "BEGIN IMMEDIATE"
    );
    assert_eq!(
      IsolationLevel::RepeatableRead.begin_statement(),
      "BEGIN DEFERRED"
    );
  }

  #[test]
  fn display_round_trips() {
    for level in [
      IsolationLevel::ReadUncommitted,
      IsolationLevel::ReadCommitted,
      IsolationLevel::RepeatableRead,
      IsolationLevel::Serializable,
    ] {
      assert_eq!(level.to_string().parse::<IsolationLevel>().unwrap(), level);
    }
  }
}
