//! SQLite backend for the CRM contact store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on dedicated
//! connection threads without blocking the async runtime. Every unit of work
//! gets its own connection and therefore its own transaction.

mod encode;
mod schema;
mod store;

pub mod error;
pub mod isolation;

pub use error::{Error, Result};
pub use isolation::IsolationLevel;
pub use store::{SqliteContactRepository, SqliteStore, SqliteUnitOfWork};
