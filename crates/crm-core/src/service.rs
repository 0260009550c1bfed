//! [`ContactService`], the only layer that knows the business rules.
//!
//! Every method opens exactly one unit of work and commits only after the
//! rules it guards have been checked. Early returns drop the unit of work,
//! which rolls back anything it staged.
//!
//! # Rules
//!
//! - No two contacts share an email address, on create or on update.
//! - `get_by_id`, `update` and `delete_by_id` check existence first and
//!   report [`Error::InvalidRecord`] rather than letting the repository fail.

use chrono::NaiveDate;

use crate::{
  Error, Result,
  contact::{
    ContactChanges, ContactId, ContactPatch, NewContact, parse_birthday,
  },
  repository::ContactRepository,
  uow::{UnitOfWork, UnitOfWorkFactory},
  view::{ContactView, serialize_all},
};

/// Contact use-cases over any [`UnitOfWorkFactory`].
#[derive(Debug, Clone)]
pub struct ContactService<F> {
  uow_factory: F,
}

impl<F> ContactService<F>
where
  F: UnitOfWorkFactory,
{
  pub fn new(uow_factory: F) -> Self { Self { uow_factory } }

  pub fn uow_factory(&self) -> &F { &self.uow_factory }

  async fn begin(&self) -> Result<F::UnitOfWork> {
    self.uow_factory.begin().await.map_err(Error::store)
  }

  /// Create a contact unless its email address is already on file.
  pub async fn add(
    &self,
    first_name: String,
    last_name: String,
    birthday: NaiveDate,
    email_address: String,
  ) -> Result<ContactView> {
    let mut uow = self.begin().await?;

    let existing = uow
      .contacts()
      .get_by_email_address(&email_address)
      .await
      .map_err(Error::store)?;
    if existing.is_some() {
      return Err(Error::RecordExists(email_address));
    }

    uow
      .contacts()
      .add(NewContact {
        first_name,
        last_name,
        birthday,
        email_address: email_address.clone(),
      })
      .await
      .map_err(Error::store)?;
    uow.commit().await.map_err(Error::store)?;

    let created = uow
      .contacts()
      .get_by_email_address(&email_address)
      .await
      .map_err(Error::store)?
      .ok_or(Error::UnknownEmail(email_address))?;
    Ok(created.into())
  }

  /// Every contact on file; empty when there are none.
  pub async fn get_all_contacts(&self) -> Result<Vec<ContactView>> {
    let mut uow = self.begin().await?;
    let all = uow.contacts().get_all().await.map_err(Error::store)?;
    Ok(serialize_all(all))
  }

  pub async fn get_by_id(&self, id: ContactId) -> Result<ContactView> {
    let mut uow = self.begin().await?;
    let contact = uow
      .contacts()
      .get_by_id(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::InvalidRecord(id))?;
    Ok(contact.into())
  }

  pub async fn get_by_email_address(
    &self,
    email_address: &str,
  ) -> Result<ContactView> {
    let mut uow = self.begin().await?;
    let contact = uow
      .contacts()
      .get_by_email_address(email_address)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::UnknownEmail(email_address.to_owned()))?;
    Ok(contact.into())
  }

  pub async fn delete_by_id(&self, id: ContactId) -> Result<()> {
    let mut uow = self.begin().await?;
    if uow
      .contacts()
      .get_by_id(id)
      .await
      .map_err(Error::store)?
      .is_none()
    {
      return Err(Error::InvalidRecord(id));
    }

    uow.contacts().delete_by_id(id).await.map_err(Error::store)?;
    uow.commit().await.map_err(Error::store)?;
    Ok(())
  }

  /// Apply a partial update and return the updated contact.
  ///
  /// A birthday that is not an ISO calendar date fails with
  /// [`Error::InvalidBirthday`] before anything is written. Moving to an
  /// email address owned by another contact fails with
  /// [`Error::RecordExists`]. An empty patch still refreshes
  /// `last_updated_at`.
  pub async fn update(
    &self,
    id: ContactId,
    patch: ContactPatch,
  ) -> Result<ContactView> {
    let mut uow = self.begin().await?;
    if uow
      .contacts()
      .get_by_id(id)
      .await
      .map_err(Error::store)?
      .is_none()
    {
      return Err(Error::InvalidRecord(id));
    }

    let changes = into_changes(patch)?;

    if let Some(email_address) = changes.touches_email() {
      let owner = uow
        .contacts()
        .get_by_email_address(email_address)
        .await
        .map_err(Error::store)?;
      if owner.is_some_and(|other| other.id != id) {
        return Err(Error::RecordExists(email_address.to_owned()));
      }
    }

    uow.contacts().update(id, changes).await.map_err(Error::store)?;
    uow.commit().await.map_err(Error::store)?;

    let updated = uow
      .contacts()
      .get_by_id(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::InvalidRecord(id))?;
    Ok(updated.into())
  }
}

/// Convert the wire-form patch into typed changes.
fn into_changes(patch: ContactPatch) -> Result<ContactChanges> {
  let birthday = patch
    .birthday
    .map(|raw| parse_birthday(&raw).ok_or(Error::InvalidBirthday(raw)))
    .transpose()?;

  Ok(ContactChanges {
    first_name: patch.first_name,
    last_name: patch.last_name,
    birthday,
    email_address: patch.email_address,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::memory::MemoryStore;

  fn service() -> ContactService<MemoryStore> {
    ContactService::new(MemoryStore::new())
  }

  fn date(s: &str) -> NaiveDate { parse_birthday(s).unwrap() }

  async fn add_janice(svc: &ContactService<MemoryStore>) -> ContactView {
    svc
      .add(
        "Janice".into(),
        "Doe".into(),
        date("1997-05-21"),
        "janice.doe@example.com".into(),
      )
      .await
      .unwrap()
  }

  // ── add ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn add_then_get_round_trips() {
    let svc = service();
    let created = add_janice(&svc).await;

    let fetched = svc.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched.first_name, "Janice");
    assert_eq!(fetched.last_name, "Doe");
    assert_eq!(fetched.birthday, date("1997-05-21"));
    assert_eq!(fetched.email_address, "janice.doe@example.com");
    assert_eq!(fetched, created);
  }

  #[tokio::test]
  async fn add_duplicate_email_fails_without_insert() {
    let svc = service();
    add_janice(&svc).await;

    let err = svc
      .add(
        "Janet".into(),
        "Roe".into(),
        date("1990-01-01"),
        "janice.doe@example.com".into(),
      )
      .await
      .unwrap_err();

    assert!(
      matches!(&err, Error::RecordExists(e) if e == "janice.doe@example.com")
    );
    assert_eq!(
      err.to_string(),
      "Contact already exists with this email address: janice.doe@example.com"
    );
    assert_eq!(svc.get_all_contacts().await.unwrap().len(), 1);
  }

  // ── reads ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn get_all_on_empty_store_is_empty() {
    assert!(service().get_all_contacts().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn get_missing_id_is_invalid_record() {
    let err = service().get_by_id(ContactId(45)).await.unwrap_err();
    assert!(matches!(err, Error::InvalidRecord(ContactId(45))));
    assert_eq!(err.to_string(), "No contact found with this id: 45");
  }

  #[tokio::test]
  async fn get_by_email_address_finds_contact() {
    let svc = service();
    let created = add_janice(&svc).await;

    let found = svc
      .get_by_email_address("janice.doe@example.com")
      .await
      .unwrap();
    assert_eq!(found.id, created.id);

    let err = svc
      .get_by_email_address("nobody@example.com")
      .await
      .unwrap_err();
    assert!(matches!(err, Error::UnknownEmail(_)));
  }

  // ── delete ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_is_terminal() {
    let svc = service();
    let janice = add_janice(&svc).await;
    svc
      .add(
        "Jacqueline".into(),
        "Doe".into(),
        date("1992-04-19"),
        "jacqueline.doe@example.com".into(),
      )
      .await
      .unwrap();
    let before = svc.get_all_contacts().await.unwrap().len();

    svc.delete_by_id(janice.id).await.unwrap();

    assert!(matches!(
      svc.get_by_id(janice.id).await.unwrap_err(),
      Error::InvalidRecord(_)
    ));
    assert_eq!(svc.get_all_contacts().await.unwrap().len(), before - 1);
  }

  #[tokio::test]
  async fn delete_missing_id_does_not_mutate() {
    let svc = service();
    add_janice(&svc).await;

    let err = svc.delete_by_id(ContactId(55)).await.unwrap_err();
    assert!(matches!(err, Error::InvalidRecord(ContactId(55))));
    assert_eq!(svc.get_all_contacts().await.unwrap().len(), 1);
  }

  // ── update ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn update_preserves_untouched_fields() {
    let svc = service();
    let janice = add_janice(&svc).await;

    let updated = svc
      .update(janice.id, ContactPatch {
        first_name: Some("Jamelia".into()),
        birthday: Some("1999-07-20".into()),
        ..Default::default()
      })
      .await
      .unwrap();

    assert_eq!(updated.first_name, "Jamelia");
    assert_eq!(updated.birthday, date("1999-07-20"));
    assert_eq!(updated.last_name, "Doe");
    assert_eq!(updated.email_address, "janice.doe@example.com");
    assert_eq!(updated.created_at, janice.created_at);
  }

  #[tokio::test]
  async fn update_missing_id_is_invalid_record() {
    let svc = service();
    let err = svc
      .update(ContactId(3), ContactPatch {
        first_name: Some("Nobody".into()),
        ..Default::default()
      })
      .await
      .unwrap_err();
    assert!(matches!(err, Error::InvalidRecord(ContactId(3))));
    assert!(svc.get_all_contacts().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn update_with_bad_birthday_changes_nothing() {
    let svc = service();
    let janice = add_janice(&svc).await;

    let err = svc
      .update(janice.id, ContactPatch {
        first_name: Some("Jamelia".into()),
        birthday: Some("1999-13-40".into()),
        ..Default::default()
      })
      .await
      .unwrap_err();

    assert!(matches!(&err, Error::InvalidBirthday(b) if b == "1999-13-40"));
    assert_eq!(svc.get_by_id(janice.id).await.unwrap(), janice);
  }

  #[tokio::test]
  async fn update_with_out_of_range_year_is_invalid_birthday() {
    let svc = service();
    let janice = add_janice(&svc).await;

    for raw in ["+10000-01-01", "-0001-01-01"] {
      let err = svc
        .update(janice.id, ContactPatch {
          birthday: Some(raw.into()),
          ..Default::default()
        })
        .await
        .unwrap_err();
      assert!(matches!(&err, Error::InvalidBirthday(b) if b == raw));
    }
    assert_eq!(svc.get_by_id(janice.id).await.unwrap(), janice);
  }

  #[tokio::test]
  async fn empty_update_still_refreshes_last_updated_at() {
    let svc = service();
    let janice = add_janice(&svc).await;
    let before = svc.uow_factory().snapshot()[0].last_updated_at;

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let updated = svc.update(janice.id, ContactPatch::default()).await.unwrap();

    assert_eq!(updated, janice);
    let after = svc.uow_factory().snapshot()[0].last_updated_at;
    assert!(after > before);
  }

  #[tokio::test]
  async fn update_to_taken_email_is_rejected() {
    let svc = service();
    let janice = add_janice(&svc).await;
    svc
      .add(
        "Jane".into(),
        "Doe".into(),
        date("1997-09-01"),
        "jane.doe@example.com".into(),
      )
      .await
      .unwrap();

    let err = svc
      .update(janice.id, ContactPatch {
        email_address: Some("jane.doe@example.com".into()),
        ..Default::default()
      })
      .await
      .unwrap_err();

    assert!(matches!(err, Error::RecordExists(_)));
    let emails: Vec<String> = svc
      .get_all_contacts()
      .await
      .unwrap()
      .into_iter()
      .map(|c| c.email_address)
      .collect();
    assert_eq!(emails, ["janice.doe@example.com", "jane.doe@example.com"]);
  }

  #[tokio::test]
  async fn update_may_keep_own_email() {
    let svc = service();
    let janice = add_janice(&svc).await;

    let updated = svc
      .update(janice.id, ContactPatch {
        email_address: Some("janice.doe@example.com".into()),
        last_name: Some("Roe".into()),
        ..Default::default()
      })
      .await
      .unwrap();
    assert_eq!(updated.last_name, "Roe");
  }

  // ── transactional behaviour ───────────────────────────────────────────────

  #[tokio::test]
  async fn uncommitted_adds_are_rolled_back_on_scope_exit() {
    let svc = service();
    add_janice(&svc).await;
    let before = svc.get_all_contacts().await.unwrap();

    {
      let mut uow = svc.uow_factory().begin().await.unwrap();
      uow
        .contacts()
        .add(NewContact {
          first_name:    "Ghost".into(),
          last_name:     "Writer".into(),
          birthday:      date("2000-01-01"),
          email_address: "ghost@example.com".into(),
        })
        .await
        .unwrap();
    }

    assert_eq!(svc.get_all_contacts().await.unwrap(), before);
  }
}
