//! Handlers for `/contacts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/contacts` | Body: [`CreateContactBody`]; 201 + contact |
//! | `GET`  | `/contacts` | All contacts, possibly empty |
//! | `GET`  | `/contacts/lookup` | `?email_address=`; 404 if unknown |
//! | `GET`  | `/contacts/{id}` | 404 if not found |
//! | `PUT`  | `/contacts/{id}` | Body: [`UpdateContactBody`]; 201 + contact |
//! | `DELETE` | `/contacts/{id}` | 204, empty body |

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use crm_core::{
  contact::ContactId, service::ContactService, uow::UnitOfWorkFactory,
  view::ContactView,
};
use serde::Deserialize;

use crate::{
  error::ApiError,
  payload::{CreateContactBody, UpdateContactBody},
};

type Service<F> = State<Arc<ContactService<F>>>;

fn contact_id(
  path: Result<Path<i64>, PathRejection>,
) -> Result<ContactId, ApiError> {
  path
    .map(|Path(id)| ContactId(id))
    .map_err(|_| ApiError::invalid_path())
}

fn body<T>(json: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
  json
    .map(|Json(body)| body)
    .map_err(|rejection| ApiError::field("body", rejection.body_text()))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /contacts`
pub async fn create<F>(
  State(service): Service<F>,
  payload: Result<Json<CreateContactBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  F: UnitOfWorkFactory,
{
  let valid = body(payload)?.into_valid()?;
  let contact = service
    .add(
      valid.first_name,
      valid.last_name,
      valid.birthday,
      valid.email_address,
    )
    .await?;

  tracing::info!(id = %contact.id, "contact created");
  Ok((StatusCode::CREATED, Json(contact)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /contacts`
pub async fn list<F>(
  State(service): Service<F>,
) -> Result<Json<Vec<ContactView>>, ApiError>
where
  F: UnitOfWorkFactory,
{
  Ok(Json(service.get_all_contacts().await?))
}

// ─── Lookup ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LookupParams {
  pub email_address: String,
}

/// `GET /contacts/lookup?email_address=<email>`
pub async fn lookup<F>(
  State(service): Service<F>,
  params: Result<Query<LookupParams>, QueryRejection>,
) -> Result<Json<ContactView>, ApiError>
where
  F: UnitOfWorkFactory,
{
  let Query(params) = params.map_err(|_| {
    ApiError::field("email_address", "Email address must be provided.")
  })?;
  Ok(Json(service.get_by_email_address(&params.email_address).await?))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /contacts/{id}`
pub async fn get_one<F>(
  State(service): Service<F>,
  path: Result<Path<i64>, PathRejection>,
) -> Result<Json<ContactView>, ApiError>
where
  F: UnitOfWorkFactory,
{
  let id = contact_id(path)?;
  Ok(Json(service.get_by_id(id).await?))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /contacts/{id}`: partial update, answers 201 with the new state.
pub async fn update<F>(
  State(service): Service<F>,
  path: Result<Path<i64>, PathRejection>,
  payload: Result<Json<UpdateContactBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  F: UnitOfWorkFactory,
{
  let id = contact_id(path)?;
  let patch = body(payload)?.into_patch()?;
  let contact = service.update(id, patch).await?;

  tracing::info!(%id, "contact updated");
  Ok((StatusCode::CREATED, Json(contact)))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /contacts/{id}`
pub async fn delete<F>(
  State(service): Service<F>,
  path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError>
where
  F: UnitOfWorkFactory,
{
  let id = contact_id(path)?;
  service.delete_by_id(id).await?;

  tracing::info!(%id, "contact deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Fallback ─────────────────────────────────────────────────────────────────

/// Any path the router does not know.
pub async fn fallback() -> ApiError { ApiError::invalid_path() }
