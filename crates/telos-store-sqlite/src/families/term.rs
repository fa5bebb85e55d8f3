use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, Transaction};
use telos_core::term::{GoalTerm, TermStatus, TimePeriod, TimePeriodFormData, TimePeriodGraph};
use uuid::Uuid;

use super::{abstraction_of, require_row};
use crate::{
  Error, Result,
  coordinator::GraphFamily,
  encode::{decode_discriminant, decode_dt, decode_uuid, encode_dt, encode_uuid},
};

const SELECT: &str = "SELECT tp.id, tp.title, tp.description, tp.notes, tp.log_time,
                             tp.start_date, tp.end_date,
                             gt.id, gt.term_number, gt.theme, gt.reflection, gt.status
                      FROM goal_terms gt
                      JOIN time_periods tp ON tp.id = gt.time_period_id";

struct RawTerm {
  time_period_id: String,
  title:          String,
  description:    Option<String>,
  notes:          Option<String>,
  log_time:       String,
  start_date:     String,
  end_date:       String,
  term_id:        String,
  term_number:    u32,
  theme:          Option<String>,
  reflection:     Option<String>,
  status:         String,
}

impl RawTerm {
  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      time_period_id: row.get(0)?,
      title:          row.get(1)?,
      description:    row.get(2)?,
      notes:          row.get(3)?,
      log_time:       row.get(4)?,
      start_date:     row.get(5)?,
      end_date:       row.get(6)?,
      term_id:        row.get(7)?,
      term_number:    row.get(8)?,
      theme:          row.get(9)?,
      reflection:     row.get(10)?,
      status:         row.get(11)?,
    })
  }

  fn into_graph(self) -> Result<TimePeriodGraph> {
    let time_period_id = decode_uuid(&self.time_period_id)?;
    Ok(TimePeriodGraph {
      time_period: TimePeriod {
        id:          time_period_id,
        title:       self.title,
        description: self.description,
        notes:       self.notes,
        log_time:    decode_dt(&self.log_time)?,
        start_date:  decode_dt(&self.start_date)?,
        end_date:    decode_dt(&self.end_date)?,
      },
      term:        GoalTerm {
        id: decode_uuid(&self.term_id)?,
        time_period_id,
        term_number: self.term_number,
        theme: self.theme,
        reflection: self.reflection,
        status: decode_discriminant::<TermStatus>("status", &self.status)?,
      },
    })
  }
}

/// A term graph is a time period plus the goal term occupying it. Its
/// identifier is the goal term's.
pub struct TimePeriodFamily;

impl GraphFamily for TimePeriodFamily {
  const NAME: &'static str = "goal term";

  type Form = TimePeriodFormData;
  type Graph = TimePeriodGraph;

  fn insert(
    tx: &Transaction<'_>,
    form: TimePeriodFormData,
    now: DateTime<Utc>,
  ) -> Result<TimePeriodGraph> {
    let time_period = TimePeriod {
      id:          Uuid::new_v4(),
      title:       form.title,
      description: form.description,
      notes:       form.notes,
      log_time:    now,
      start_date:  form.start_date,
      end_date:    form.end_date,
    };
    tx.execute(
      "INSERT INTO time_periods (id, title, description, notes, log_time, start_date, end_date)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
      rusqlite::params![
        encode_uuid(time_period.id),
        time_period.title,
        time_period.description,
        time_period.notes,
        encode_dt(time_period.log_time),
        encode_dt(time_period.start_date),
        encode_dt(time_period.end_date),
      ],
    )?;

    let term = GoalTerm {
      id:             Uuid::new_v4(),
      time_period_id: time_period.id,
      term_number:    form.term_number,
      theme:          form.theme,
      reflection:     form.reflection,
      status:         form.status,
    };
    tx.execute(
      "INSERT INTO goal_terms (id, time_period_id, term_number, theme, reflection, status)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      rusqlite::params![
        encode_uuid(term.id),
        encode_uuid(term.time_period_id),
        term.term_number,
        term.theme,
        term.reflection,
        term.status.as_str(),
      ],
    )?;

    Ok(TimePeriodGraph { time_period, term })
  }

  fn update(
    tx: &Transaction<'_>,
    id: Uuid,
    form: TimePeriodFormData,
    _now: DateTime<Utc>,
  ) -> Result<TimePeriodGraph> {
    let time_period_id = abstraction_of(tx, "goal_terms", "time_period_id", Self::NAME, id)?;

    tx.execute(
      "UPDATE goal_terms SET term_number = ?2, theme = ?3, reflection = ?4, status = ?5
       WHERE id = ?1",
      rusqlite::params![
        encode_uuid(id),
        form.term_number,
        form.theme,
        form.reflection,
        form.status.as_str(),
      ],
    )?;
    let affected = tx.execute(
      "UPDATE time_periods
       SET title = ?2, description = ?3, notes = ?4, start_date = ?5, end_date = ?6
       WHERE id = ?1",
      rusqlite::params![
        encode_uuid(time_period_id),
        form.title,
        form.description,
        form.notes,
        encode_dt(form.start_date),
        encode_dt(form.end_date),
      ],
    )?;
    require_row(affected, Self::NAME, id)?;

    Self::fetch(tx, id)?.ok_or_else(|| Error::not_found(Self::NAME, id))
  }

  /// Goals assigned to the term stay; only their assignments go.
  fn delete(tx: &Transaction<'_>, id: Uuid) -> Result<()> {
    let time_period_id = abstraction_of(tx, "goal_terms", "time_period_id", Self::NAME, id)?;
    let id_str = encode_uuid(id);

    tx.execute(
      "DELETE FROM term_goal_assignments WHERE term_id = ?1",
      rusqlite::params![id_str],
    )?;
    tx.execute("DELETE FROM goal_terms WHERE id = ?1", rusqlite::params![id_str])?;
    let affected = tx.execute(
      "DELETE FROM time_periods WHERE id = ?1",
      rusqlite::params![encode_uuid(time_period_id)],
    )?;
    require_row(affected, Self::NAME, id)
  }

  fn fetch(conn: &Connection, id: Uuid) -> Result<Option<TimePeriodGraph>> {
    let raw = conn
      .query_row(
        &format!("{SELECT} WHERE gt.id = ?1"),
        rusqlite::params![encode_uuid(id)],
        RawTerm::from_row,
      )
      .optional()?;
    raw.map(RawTerm::into_graph).transpose()
  }

  fn list(conn: &Connection) -> Result<Vec<TimePeriodGraph>> {
    let mut stmt = conn.prepare(&format!("{SELECT} ORDER BY tp.log_time, tp.rowid"))?;
    let raws = stmt
      .query_map([], RawTerm::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(RawTerm::into_graph).collect()
  }
}
