//! Core types, trait definitions and business rules for the CRM contact
//! service.
//!
//! No HTTP or database dependencies live here. The storage backend plugs in
//! through [`uow::UnitOfWorkFactory`]; the HTTP layer talks only to
//! [`service::ContactService`].

pub mod contact;
pub mod error;
pub mod memory;
pub mod repository;
pub mod service;
pub mod uow;
pub mod view;

pub use error::{Error, Result};
