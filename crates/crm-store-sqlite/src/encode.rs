//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (microsecond
//! precision, `Z` suffix) so that string order equals chronological order and
//! SQL `MAX()`/`<=` work on them. Birthdays are stored as `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use crm_core::contact::{BIRTHDAY_FORMAT, Contact, ContactId};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String {
  d.format(BIRTHDAY_FORMAT).to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, BIRTHDAY_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// Column list matching [`RawContact::from_row`].
pub const CONTACT_COLUMNS: &str = "id, first_name, last_name, birthday, \
                                   email_address, created_at, last_updated_at";

/// A `contact` row with every column still in its stored text form.
pub struct RawContact {
  pub id:              i64,
  pub first_name:      String,
  pub last_name:       String,
  pub birthday:        String,
  pub email_address:   String,
  pub created_at:      String,
  pub last_updated_at: String,
}

impl RawContact {
  /// Read a row selected with [`CONTACT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      first_name:      row.get(1)?,
      last_name:       row.get(2)?,
      birthday:        row.get(3)?,
      email_address:   row.get(4)?,
      created_at:      row.get(5)?,
      last_updated_at: row.get(6)?,
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      id:              ContactId(self.id),
      first_name:      self.first_name,
      last_name:       self.last_name,
      birthday:        decode_date(&self.birthday)?,
      email_address:   self.email_address,
      created_at:      decode_dt(&self.created_at)?,
      last_updated_at: decode_dt(&self.last_updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;

  #[test]
  fn timestamps_sort_as_strings() {
    let a = Utc.with_ymd_and_hms(2024, 1, 1, 9, 59, 59).unwrap();
    let b = a + Duration::milliseconds(1);
    let c = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();

    let (ea, eb, ec) = (encode_dt(a), encode_dt(b), encode_dt(c));
    assert_eq!(ea.len(), eb.len());
    assert!(ea < eb && eb < ec);
    assert_eq!(ec, "2024-01-01T10:00:00.000000Z");
    assert_eq!(decode_dt(&eb).unwrap(), b);
  }

  #[test]
  fn dates_round_trip_and_reject_garbage() {
    let d = NaiveDate::from_ymd_opt(1997, 9, 1).unwrap();
    assert_eq!(encode_date(d), "1997-09-01");
    assert_eq!(decode_date("1997-09-01").unwrap(), d);
    assert!(matches!(decode_date("1997-02-30"), Err(Error::DateParse(_))));
  }
}
