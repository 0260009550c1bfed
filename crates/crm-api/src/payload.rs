//! Inbound payload schemas.
//!
//! Checks run before the service is called: required presence, string
//! length bounds, email format and, on create, the birthday format. On
//! update the birthday is passed through untouched because converting it is
//! the service's responsibility.

use chrono::NaiveDate;
use crm_core::contact::{ContactPatch, parse_birthday};
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::error::{ApiError, FieldErrors};

const BIRTHDAY_MESSAGE: &str =
  "Birthday must be a valid date in YYYY-MM-DD format.";

// ─── Create ──────────────────────────────────────────────────────────────────

/// Body accepted by `POST /contacts`.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateContactBody {
  #[validate(
    required(message = "First name must be provided."),
    length(min = 1, max = 255, message = "First name must be 1-255 characters.")
  )]
  pub first_name:    Option<String>,
  #[validate(
    required(message = "Last name must be provided."),
    length(min = 1, max = 255, message = "Last name must be 1-255 characters.")
  )]
  pub last_name:     Option<String>,
  #[validate(required(message = "Birthday must be provided."))]
  pub birthday:      Option<String>,
  #[validate(
    required(message = "Email address must be provided."),
    length(min = 3, max = 255, message = "Email address must be provided."),
    email(message = "Email address must be valid")
  )]
  pub email_address: Option<String>,
}

/// A create request that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidContact {
  pub first_name:    String,
  pub last_name:     String,
  pub birthday:      NaiveDate,
  pub email_address: String,
}

impl CreateContactBody {
  pub fn into_valid(self) -> Result<ValidContact, ApiError> {
    let mut fields = match self.validate() {
      Ok(()) => FieldErrors::new(),
      Err(errors) => collect(&errors),
    };

    let birthday = self.birthday.as_deref().and_then(|raw| {
      let parsed = parse_birthday(raw);
      if parsed.is_none() {
        fields
          .entry("birthday".to_owned())
          .or_default()
          .push(BIRTHDAY_MESSAGE.to_owned());
      }
      parsed
    });

    match (self.first_name, self.last_name, birthday, self.email_address) {
      (Some(first_name), Some(last_name), Some(birthday), Some(email_address))
        if fields.is_empty() =>
      {
        Ok(ValidContact { first_name, last_name, birthday, email_address })
      }
      _ => Err(ApiError::Validation(fields)),
    }
  }
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// Body accepted by `PUT /contacts/{id}`. Every field is optional.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateContactBody {
  #[validate(length(
    min = 1,
    max = 255,
    message = "First name must be 1-255 characters."
  ))]
  pub first_name:    Option<String>,
  #[validate(length(
    min = 1,
    max = 255,
    message = "Last name must be 1-255 characters."
  ))]
  pub last_name:     Option<String>,
  pub birthday:      Option<String>,
  #[validate(
    length(min = 3, max = 255, message = "Email address must be provided."),
    email(message = "Email address must be valid")
  )]
  pub email_address: Option<String>,
}

impl UpdateContactBody {
  pub fn into_patch(self) -> Result<ContactPatch, ApiError> {
    self.validate().map_err(|e| ApiError::Validation(collect(&e)))?;
    Ok(ContactPatch {
      first_name:    self.first_name,
      last_name:     self.last_name,
      birthday:      self.birthday,
      email_address: self.email_address,
    })
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn collect(errors: &ValidationErrors) -> FieldErrors {
  let mut fields = FieldErrors::new();
  for (field, errs) in errors.field_errors() {
    let messages = fields.entry(field.to_string()).or_default();
    for err in errs.iter() {
      messages.push(
        err
          .message
          .as_ref()
          .map(|m| m.to_string())
          .unwrap_or_else(|| err.code.to_string()),
      );
    }
  }
  fields
}
