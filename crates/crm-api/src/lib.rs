//! JSON REST API for the contact service.
//!
//! Exposes an axum [`Router`] backed by a [`ContactService`] over any
//! [`UnitOfWorkFactory`]. TLS and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let service = Arc::new(ContactService::new(store));
//! axum::serve(listener, crm_api::api_router(service)).await?;
//! ```

pub mod contacts;
pub mod error;
pub mod payload;

use std::sync::Arc;

use axum::{Router, routing::get};
use crm_core::{service::ContactService, uow::UnitOfWorkFactory};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Build a fully-materialised API router for `service`.
///
/// Unknown paths, and `{id}` segments that are not integers, answer
/// `400 {"error": "Invalid path"}`.
pub fn api_router<F>(service: Arc<ContactService<F>>) -> Router<()>
where
  F: UnitOfWorkFactory + 'static,
{
  Router::new()
    .route(
      "/contacts",
      get(contacts::list::<F>).post(contacts::create::<F>),
    )
    .route("/contacts/lookup", get(contacts::lookup::<F>))
    .route(
      "/contacts/{id}",
      get(contacts::get_one::<F>)
        .put(contacts::update::<F>)
        .delete(contacts::delete::<F>),
    )
    .fallback(contacts::fallback)
    .layer(TraceLayer::new_for_http())
    .with_state(service)
}
