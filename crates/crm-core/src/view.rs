//! The outbound projection of a [`Contact`].
//!
//! Only the allow-listed fields leave the service; `last_updated_at` stays
//! internal.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::contact::{Contact, ContactId};

/// Wire shape of a contact. Serialises `birthday` as `YYYY-MM-DD` and
/// `created_at` as RFC 3339.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactView {
  pub id:            ContactId,
  pub first_name:    String,
  pub last_name:     String,
  pub birthday:      NaiveDate,
  pub email_address: String,
  pub created_at:    DateTime<Utc>,
}

impl From<Contact> for ContactView {
  fn from(c: Contact) -> Self {
    Self {
      id:            c.id,
      first_name:    c.first_name,
      last_name:     c.last_name,
      birthday:      c.birthday,
      email_address: c.email_address,
      created_at:    c.created_at,
    }
  }
}

/// Project a collection of contacts.
pub fn serialize_all(contacts: Vec<Contact>) -> Vec<ContactView> {
  contacts.into_iter().map(ContactView::from).collect()
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::contact::NewContact;

  #[test]
  fn view_uses_only_allow_listed_fields() {
    let contact = NewContact {
      first_name:    "Janice".into(),
      last_name:     "Doe".into(),
      birthday:      NaiveDate::from_ymd_opt(1997, 5, 21).unwrap(),
      email_address: "janice.doe@example.com".into(),
    }
    .into_contact(
      ContactId(7),
      Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap(),
    );

    let json = serde_json::to_value(ContactView::from(contact)).unwrap();
    let obj = json.as_object().unwrap();

    let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, [
      "birthday",
      "created_at",
      "email_address",
      "first_name",
      "id",
      "last_name"
    ]);
    assert_eq!(obj["id"], 7);
    assert_eq!(obj["birthday"], "1997-05-21");
    assert_eq!(obj["created_at"], "2024-03-01T08:30:00Z");
  }
}
