//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Enum discriminants are stored as their
//! snake_case names.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use telos_core::ontology::parse_discriminant;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn decode_opt_uuid(s: Option<&str>) -> Result<Option<Uuid>> {
  s.map(decode_uuid).transpose()
}

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn encode_opt_dt(dt: Option<DateTime<Utc>>) -> Option<String> { dt.map(encode_dt) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── Discriminants
// ────────────────────────────────────────────────────────────

pub fn decode_discriminant<T: FromStr>(field: &'static str, s: &str) -> Result<T> {
  Ok(parse_discriminant(field, s)?)
}

// ─── JSON ────────────────────────────────────────────────────────────────────

pub fn encode_opt_json(value: Option<&serde_json::Value>) -> Option<String> {
  value.map(serde_json::Value::to_string)
}

pub fn decode_opt_json(s: Option<&str>) -> Result<Option<serde_json::Value>> {
  Ok(s.map(serde_json::from_str).transpose()?)
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_keep_sub_second_precision() {
    let dt = Utc.timestamp_opt(1_760_000_000, 123_456_789).unwrap();
    assert_eq!(decode_dt(&encode_dt(dt)).unwrap(), dt);
  }

  #[test]
  fn uuids_are_lowercase_hyphenated() {
    let id = Uuid::parse_str("6F9619FF-8B86-D011-B42D-00C04FC964FF").unwrap();
    assert_eq!(encode_uuid(id), "6f9619ff-8b86-d011-b42d-00c04fc964ff");
  }

  #[test]
  fn bad_date_is_reported() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
