use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, Transaction};
use telos_core::measure::{Measure, MeasureFormData};
use uuid::Uuid;

use super::require_row;
use crate::{
  Error, Result,
  coordinator::GraphFamily,
  encode::{decode_dt, decode_uuid, encode_dt, encode_uuid},
};

const COLUMNS: &str = "id, title, unit, measure_type, description, notes, log_time";

struct RawMeasure {
  id:           String,
  title:        String,
  unit:         String,
  measure_type: String,
  description:  Option<String>,
  notes:        Option<String>,
  log_time:     String,
}

impl RawMeasure {
  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      title:        row.get(1)?,
      unit:         row.get(2)?,
      measure_type: row.get(3)?,
      description:  row.get(4)?,
      notes:        row.get(5)?,
      log_time:     row.get(6)?,
    })
  }

  fn into_measure(self) -> Result<Measure> {
    Ok(Measure {
      id:           decode_uuid(&self.id)?,
      title:        self.title,
      unit:         self.unit,
      measure_type: self.measure_type,
      description:  self.description,
      notes:        self.notes,
      log_time:     decode_dt(&self.log_time)?,
    })
  }
}

/// Measures are a lone abstraction row, but other graphs point at them.
pub struct MeasureFamily;

impl GraphFamily for MeasureFamily {
  const NAME: &'static str = "measure";

  type Form = MeasureFormData;
  type Graph = Measure;

  fn insert(tx: &Transaction<'_>, form: MeasureFormData, now: DateTime<Utc>) -> Result<Measure> {
    let measure = Measure {
      id:           Uuid::new_v4(),
      title:        form.title,
      unit:         form.unit,
      measure_type: form.measure_type,
      description:  form.description,
      notes:        form.notes,
      log_time:     now,
    };
    tx.execute(
      "INSERT INTO measures (id, title, unit, measure_type, description, notes, log_time)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
      rusqlite::params![
        encode_uuid(measure.id),
        measure.title,
        measure.unit,
        measure.measure_type,
        measure.description,
        measure.notes,
        encode_dt(measure.log_time),
      ],
    )?;
    Ok(measure)
  }

  fn update(
    tx: &Transaction<'_>,
    id: Uuid,
    form: MeasureFormData,
    _now: DateTime<Utc>,
  ) -> Result<Measure> {
    let affected = tx.execute(
      "UPDATE measures
       SET title = ?2, unit = ?3, measure_type = ?4, description = ?5, notes = ?6
       WHERE id = ?1",
      rusqlite::params![
        encode_uuid(id),
        form.title,
        form.unit,
        form.measure_type,
        form.description,
        form.notes,
      ],
    )?;
    require_row(affected, Self::NAME, id)?;
    Self::fetch(tx, id)?.ok_or_else(|| Error::not_found(Self::NAME, id))
  }

  /// Contributions keep their amount but lose the unit; targets and
  /// measurements in the measure go with it.
  fn delete(tx: &Transaction<'_>, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    tx.execute(
      "UPDATE action_goal_contributions SET measure_id = NULL WHERE measure_id = ?1",
      rusqlite::params![id_str],
    )?;
    tx.execute(
      "DELETE FROM measured_actions WHERE measure_id = ?1",
      rusqlite::params![id_str],
    )?;
    tx.execute(
      "DELETE FROM expectation_measures WHERE measure_id = ?1",
      rusqlite::params![id_str],
    )?;
    let affected =
      tx.execute("DELETE FROM measures WHERE id = ?1", rusqlite::params![id_str])?;
    require_row(affected, Self::NAME, id)
  }

  fn fetch(conn: &Connection, id: Uuid) -> Result<Option<Measure>> {
    let raw = conn
      .query_row(
        &format!("SELECT {COLUMNS} FROM measures WHERE id = ?1"),
        rusqlite::params![encode_uuid(id)],
        RawMeasure::from_row,
      )
      .optional()?;
    raw.map(RawMeasure::into_measure).transpose()
  }

  fn list(conn: &Connection) -> Result<Vec<Measure>> {
    let mut stmt =
      conn.prepare(&format!("SELECT {COLUMNS} FROM measures ORDER BY log_time, rowid"))?;
    let raws = stmt
      .query_map([], RawMeasure::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(RawMeasure::into_measure).collect()
  }
}
