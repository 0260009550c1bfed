//! API error type and [`axum::response::IntoResponse`] implementation.

use std::collections::BTreeMap;

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Per-field validation messages, keyed by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),

  #[error("Payload validation failed")]
  Validation(FieldErrors),

  #[error(transparent)]
  Service(#[from] crm_core::Error),
}

impl ApiError {
  pub fn invalid_path() -> Self { Self::BadRequest("Invalid path".to_owned()) }

  /// A validation failure on a single field.
  pub fn field(field: &str, message: impl Into<String>) -> Self {
    let mut fields = FieldErrors::new();
    fields.insert(field.to_owned(), vec![message.into()]);
    Self::Validation(fields)
  }

  pub fn status(&self) -> StatusCode {
    use crm_core::Error as E;
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Service(e) => match e {
        E::RecordExists(_) => StatusCode::BAD_REQUEST,
        E::InvalidRecord(_) | E::UnknownEmail(_) => StatusCode::NOT_FOUND,
        E::InvalidBirthday(_) => StatusCode::UNPROCESSABLE_ENTITY,
        E::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = match &self {
      ApiError::Validation(fields) => {
        json!({ "error": self.to_string(), "fields": fields })
      }
      ApiError::Service(crm_core::Error::InvalidBirthday(_)) => {
        let message = self.to_string();
        json!({ "error": message, "fields": { "birthday": [message] } })
      }
      ApiError::Service(crm_core::Error::Store(e)) => {
        tracing::error!(error = %e, "storage failure");
        json!({ "error": "Internal server error" })
      }
      _ => json!({ "error": self.to_string() }),
    };
    (status, Json(body)).into_response()
  }
}
