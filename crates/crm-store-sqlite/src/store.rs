//! [`SqliteStore`]: the SQLite implementation of [`UnitOfWorkFactory`].

use std::path::{Path, PathBuf};

use chrono::Utc;
use crm_core::{
  contact::{Contact, ContactChanges, ContactId, NewContact},
  repository::ContactRepository,
  uow::{UnitOfWork, UnitOfWorkFactory},
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{CONTACT_COLUMNS, RawContact, encode_date, encode_dt},
  isolation::IsolationLevel,
  schema::{SCHEMA, SESSION_PRAGMAS},
};

// ─── Store (session factory) ─────────────────────────────────────────────────

/// Opens one SQLite connection per unit of work against a single database
/// file.
///
/// Build it once at startup and share it; cloning is cheap.
#[derive(Debug, Clone)]
pub struct SqliteStore {
  path:      PathBuf,
  isolation: IsolationLevel,
}

impl SqliteStore {
  /// Open (or create) the database at `path` and run schema initialisation.
  pub async fn open(
    path: impl AsRef<Path>,
    isolation: IsolationLevel,
  ) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let conn = tokio_rusqlite::Connection::open(&path).await?;
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;

    tracing::debug!(path = %path.display(), %isolation, "sqlite store ready");
    Ok(Self { path, isolation })
  }

  pub fn path(&self) -> &Path { &self.path }

  pub fn isolation(&self) -> IsolationLevel { self.isolation }
}

impl UnitOfWorkFactory for SqliteStore {
  type UnitOfWork = SqliteUnitOfWork;

  async fn begin(&self) -> Result<SqliteUnitOfWork> {
    let conn = tokio_rusqlite::Connection::open(&self.path).await?;
    let pragmas = self.isolation.connection_pragmas();
    conn
      .call(move |conn| {
        conn.execute_batch(SESSION_PRAGMAS)?;
        conn.execute_batch(pragmas)?;
        Ok(())
      })
      .await?;

    Ok(SqliteUnitOfWork {
      contacts: SqliteContactRepository {
        session: Session {
          conn,
          begin: self.isolation.begin_statement(),
          in_transaction: false,
        },
      },
    })
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// One connection, owned by exactly one unit of work.
///
/// The transaction is opened lazily by the first repository call and again
/// after every commit or rollback. Dropping the session closes the
/// connection, and SQLite rolls back whatever transaction was still open.
struct Session {
  conn:           tokio_rusqlite::Connection,
  begin:          &'static str,
  in_transaction: bool,
}

impl Session {
  async fn ensure_transaction(&mut self) -> Result<()> {
    if self.in_transaction {
      return Ok(());
    }
    let begin = self.begin;
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(begin)?;
        Ok(())
      })
      .await?;
    self.in_transaction = true;
    Ok(())
  }

  async fn commit(&mut self) -> Result<()> {
    if !self.in_transaction {
      return Ok(());
    }
    self.in_transaction = false;
    self
      .conn
      .call(|conn| {
        if let Err(e) = conn.execute_batch("COMMIT") {
          // A failed COMMIT can leave the transaction open (e.g. SQLITE_BUSY).
          // Nothing of it may survive.
          if !conn.is_autocommit() {
            let _ = conn.execute_batch("ROLLBACK");
          }
          return Err(e.into());
        }
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn rollback(&mut self) -> Result<()> {
    if !self.in_transaction {
      return Ok(());
    }
    self.in_transaction = false;
    self
      .conn
      .call(|conn| {
        if !conn.is_autocommit() {
          conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Unit of work ────────────────────────────────────────────────────────────

/// A transaction on its own connection. Dropping it without [`commit`]
/// discards all staged changes.
///
/// [`commit`]: UnitOfWork::commit
pub struct SqliteUnitOfWork {
  contacts: SqliteContactRepository,
}

impl SqliteUnitOfWork {
  /// Whether a transaction is currently open on this unit's connection.
  pub fn in_transaction(&self) -> bool { self.contacts.session.in_transaction }
}

impl UnitOfWork for SqliteUnitOfWork {
  type Error = Error;
  type Contacts = SqliteContactRepository;

  fn contacts(&mut self) -> &mut SqliteContactRepository { &mut self.contacts }

  async fn commit(&mut self) -> Result<()> {
    self.contacts.session.commit().await
  }

  async fn rollback(&mut self) -> Result<()> {
    self.contacts.session.rollback().await
  }
}

// ─── Repository ──────────────────────────────────────────────────────────────

pub struct SqliteContactRepository {
  session: Session,
}

impl SqliteContactRepository {
  async fn query_one(
    &mut self,
    sql: String,
    param: rusqlite::types::Value,
  ) -> Result<Option<Contact>> {
    self.session.ensure_transaction().await?;
    let raw: Option<RawContact> = self
      .session
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, [param], RawContact::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }
}

impl ContactRepository for SqliteContactRepository {
  type Error = Error;

  async fn add(&mut self, contact: NewContact) -> Result<()> {
    self.session.ensure_transaction().await?;

    let now = encode_dt(Utc::now());
    let birthday = encode_date(contact.birthday);

    self
      .session
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contact (
             first_name, last_name, birthday, email_address,
             created_at, last_updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![
            contact.first_name,
            contact.last_name,
            birthday,
            contact.email_address,
            now,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_all(&mut self) -> Result<Vec<Contact>> {
    self.session.ensure_transaction().await?;

    let raws: Vec<RawContact> = self
      .session
      .conn
      .call(|conn| {
        let sql = format!("SELECT {CONTACT_COLUMNS} FROM contact ORDER BY id");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawContact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }

  async fn get_by_id(&mut self, id: ContactId) -> Result<Option<Contact>> {
    self
      .query_one(
        format!("SELECT {CONTACT_COLUMNS} FROM contact WHERE id = ?1"),
        id.0.into(),
      )
      .await
  }

  async fn get_by_email_address(
    &mut self,
    email_address: &str,
  ) -> Result<Option<Contact>> {
    self
      .query_one(
        format!(
          "SELECT {CONTACT_COLUMNS} FROM contact WHERE email_address = ?1"
        ),
        email_address.to_owned().into(),
      )
      .await
  }

  async fn update(
    &mut self,
    id: ContactId,
    changes: ContactChanges,
  ) -> Result<()> {
    self.session.ensure_transaction().await?;

    let now = encode_dt(Utc::now());
    let birthday = changes.birthday.map(encode_date);

    let changed = self
      .session
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE contact SET
             first_name      = COALESCE(?1, first_name),
             last_name       = COALESCE(?2, last_name),
             birthday        = COALESCE(?3, birthday),
             email_address   = COALESCE(?4, email_address),
             last_updated_at = MAX(?5, created_at)
           WHERE id = ?6",
          rusqlite::params![
            changes.first_name,
            changes.last_name,
            birthday,
            changes.email_address,
            now,
            id.0,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::MissingRow(id));
    }
    Ok(())
  }

  async fn delete_by_id(&mut self, id: ContactId) -> Result<()> {
    self.session.ensure_transaction().await?;

    let changed = self
      .session
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM contact WHERE id = ?1",
          rusqlite::params![id.0],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::MissingRow(id));
    }
    Ok(())
  }
}
