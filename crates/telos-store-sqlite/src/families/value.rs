use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, Transaction};
use telos_core::value::{PersonalValue, ValueFormData, ValueLevel};
use uuid::Uuid;

use super::require_row;
use crate::{
  Error, Result,
  coordinator::GraphFamily,
  encode::{
    decode_discriminant, decode_dt, decode_opt_json, decode_uuid, encode_dt,
    encode_opt_json, encode_uuid,
  },
};

const COLUMNS: &str = "id, title, description, notes, log_time, priority, value_level, \
                       life_domain, alignment_guidance";

struct RawValue {
  id:                 String,
  title:              String,
  description:        Option<String>,
  notes:              Option<String>,
  log_time:           String,
  priority:           u8,
  value_level:        String,
  life_domain:        String,
  alignment_guidance: Option<String>,
}

impl RawValue {
  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                 row.get(0)?,
      title:              row.get(1)?,
      description:        row.get(2)?,
      notes:              row.get(3)?,
      log_time:           row.get(4)?,
      priority:           row.get(5)?,
      value_level:        row.get(6)?,
      life_domain:        row.get(7)?,
      alignment_guidance: row.get(8)?,
    })
  }

  fn into_value(self) -> Result<PersonalValue> {
    Ok(PersonalValue {
      id:                 decode_uuid(&self.id)?,
      title:              self.title,
      description:        self.description,
      notes:              self.notes,
      log_time:           decode_dt(&self.log_time)?,
      priority:           self.priority,
      level:              decode_discriminant::<ValueLevel>("value_level", &self.value_level)?,
      life_domain:        self.life_domain,
      alignment_guidance: decode_opt_json(self.alignment_guidance.as_deref())?,
    })
  }
}

pub struct ValueFamily;

impl GraphFamily for ValueFamily {
  const NAME: &'static str = "personal value";

  type Form = ValueFormData;
  type Graph = PersonalValue;

  fn insert(
    tx: &Transaction<'_>,
    form: ValueFormData,
    now: DateTime<Utc>,
  ) -> Result<PersonalValue> {
    let value = PersonalValue {
      id:                 Uuid::new_v4(),
      title:              form.title,
      description:        form.description,
      notes:              form.notes,
      log_time:           now,
      priority:           form.priority,
      level:              form.level,
      life_domain:        form.life_domain,
      alignment_guidance: form.alignment_guidance,
    };
    tx.execute(
      &format!("INSERT INTO personal_values ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
      rusqlite::params![
        encode_uuid(value.id),
        value.title,
        value.description,
        value.notes,
        encode_dt(value.log_time),
        value.priority,
        value.level.as_str(),
        value.life_domain,
        encode_opt_json(value.alignment_guidance.as_ref()),
      ],
    )?;
    Ok(value)
  }

  fn update(
    tx: &Transaction<'_>,
    id: Uuid,
    form: ValueFormData,
    _now: DateTime<Utc>,
  ) -> Result<PersonalValue> {
    let affected = tx.execute(
      "UPDATE personal_values
       SET title = ?2, description = ?3, notes = ?4, priority = ?5, value_level = ?6,
           life_domain = ?7, alignment_guidance = ?8
       WHERE id = ?1",
      rusqlite::params![
        encode_uuid(id),
        form.title,
        form.description,
        form.notes,
        form.priority,
        form.level.as_str(),
        form.life_domain,
        encode_opt_json(form.alignment_guidance.as_ref()),
      ],
    )?;
    require_row(affected, Self::NAME, id)?;
    Self::fetch(tx, id)?.ok_or_else(|| Error::not_found(Self::NAME, id))
  }

  fn delete(tx: &Transaction<'_>, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    tx.execute(
      "DELETE FROM goal_relevances WHERE value_id = ?1",
      rusqlite::params![id_str],
    )?;
    let affected = tx.execute(
      "DELETE FROM personal_values WHERE id = ?1",
      rusqlite::params![id_str],
    )?;
    require_row(affected, Self::NAME, id)
  }

  fn fetch(conn: &Connection, id: Uuid) -> Result<Option<PersonalValue>> {
    let raw = conn
      .query_row(
        &format!("SELECT {COLUMNS} FROM personal_values WHERE id = ?1"),
        rusqlite::params![encode_uuid(id)],
        RawValue::from_row,
      )
      .optional()?;
    raw.map(RawValue::into_value).transpose()
  }

  fn list(conn: &Connection) -> Result<Vec<PersonalValue>> {
    let mut stmt = conn.prepare(&format!(
      "SELECT {COLUMNS} FROM personal_values ORDER BY log_time, rowid"
    ))?;
    let raws = stmt
      .query_map([], RawValue::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(RawValue::into_value).collect()
  }
}
