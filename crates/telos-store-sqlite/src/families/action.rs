use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, Transaction};
use telos_core::action::{
  Action, ActionFormData, ActionGoalContribution, ActionGraph, AssignmentMethod,
  GoalContribution, MeasuredAction, Measurement,
};
use uuid::Uuid;

use super::require_row;
use crate::{
  Error, Result,
  coordinator::GraphFamily,
  encode::{
    decode_discriminant, decode_dt, decode_opt_dt, decode_opt_uuid, decode_uuid, encode_dt,
    encode_opt_dt, encode_uuid,
  },
  reconcile::reconcile,
};

const COLUMNS: &str = "id, title, description, notes, log_time, duration_minutes, start_time";

struct RawAction {
  id:               String,
  title:            String,
  description:      Option<String>,
  notes:            Option<String>,
  log_time:         String,
  duration_minutes: Option<f64>,
  start_time:       Option<String>,
}

impl RawAction {
  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      title:            row.get(1)?,
      description:      row.get(2)?,
      notes:            row.get(3)?,
      log_time:         row.get(4)?,
      duration_minutes: row.get(5)?,
      start_time:       row.get(6)?,
    })
  }

  fn into_action(self) -> Result<Action> {
    Ok(Action {
      id:               decode_uuid(&self.id)?,
      title:            self.title,
      description:      self.description,
      notes:            self.notes,
      log_time:         decode_dt(&self.log_time)?,
      duration_minutes: self.duration_minutes,
      start_time:       decode_opt_dt(self.start_time.as_deref())?,
    })
  }
}

struct RawMeasurement {
  id:         String,
  action_id:  String,
  measure_id: String,
  value:      f64,
  created_at: String,
}

impl RawMeasurement {
  fn into_composite(self) -> Result<MeasuredAction> {
    Ok(MeasuredAction {
      id:         decode_uuid(&self.id)?,
      action_id:  decode_uuid(&self.action_id)?,
      measure_id: decode_uuid(&self.measure_id)?,
      value:      self.value,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

struct RawContribution {
  id:                  String,
  action_id:           String,
  goal_id:             String,
  contribution_amount: Option<f64>,
  measure_id:          Option<String>,
  assignment_method:   String,
  confidence:          f64,
  created_at:          String,
}

impl RawContribution {
  fn into_composite(self) -> Result<ActionGoalContribution> {
    Ok(ActionGoalContribution {
      id:                  decode_uuid(&self.id)?,
      action_id:           decode_uuid(&self.action_id)?,
      goal_id:             decode_uuid(&self.goal_id)?,
      contribution_amount: self.contribution_amount,
      measure_id:          decode_opt_uuid(self.measure_id.as_deref())?,
      assignment_method:   decode_discriminant::<AssignmentMethod>(
        "assignment_method",
        &self.assignment_method,
      )?,
      confidence:          self.confidence,
      created_at:          decode_dt(&self.created_at)?,
    })
  }
}

fn load_measurements(conn: &Connection, action_id: Uuid) -> Result<Vec<MeasuredAction>> {
  let mut stmt = conn.prepare(
    "SELECT id, action_id, measure_id, value, created_at
     FROM measured_actions WHERE action_id = ?1 ORDER BY rowid",
  )?;
  let raws = stmt
    .query_map(rusqlite::params![encode_uuid(action_id)], |row| {
      Ok(RawMeasurement {
        id:         row.get(0)?,
        action_id:  row.get(1)?,
        measure_id: row.get(2)?,
        value:      row.get(3)?,
        created_at: row.get(4)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawMeasurement::into_composite).collect()
}

fn load_contributions(conn: &Connection, action_id: Uuid) -> Result<Vec<ActionGoalContribution>> {
  let mut stmt = conn.prepare(
    "SELECT id, action_id, goal_id, contribution_amount, measure_id, assignment_method,
            confidence, created_at
     FROM action_goal_contributions WHERE action_id = ?1 ORDER BY rowid",
  )?;
  let raws = stmt
    .query_map(rusqlite::params![encode_uuid(action_id)], |row| {
      Ok(RawContribution {
        id:                  row.get(0)?,
        action_id:           row.get(1)?,
        goal_id:             row.get(2)?,
        contribution_amount: row.get(3)?,
        measure_id:          row.get(4)?,
        assignment_method:   row.get(5)?,
        confidence:          row.get(6)?,
        created_at:          row.get(7)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawContribution::into_composite).collect()
}

fn assemble(conn: &Connection, raw: RawAction) -> Result<ActionGraph> {
  let action = raw.into_action()?;
  Ok(ActionGraph {
    measurements: load_measurements(conn, action.id)?,
    contributions: load_contributions(conn, action.id)?,
    action,
  })
}

fn insert_measurement(
  tx: &Transaction<'_>,
  action_id: Uuid,
  measurement: Measurement,
  now: DateTime<Utc>,
) -> Result<MeasuredAction> {
  let row = MeasuredAction {
    id: Uuid::new_v4(),
    action_id,
    measure_id: measurement.measure_id,
    value: measurement.value,
    created_at: now,
  };
  tx.execute(
    "INSERT INTO measured_actions (id, action_id, measure_id, value, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![
      encode_uuid(row.id),
      encode_uuid(row.action_id),
      encode_uuid(row.measure_id),
      row.value,
      encode_dt(row.created_at),
    ],
  )?;
  Ok(row)
}

fn insert_contribution(
  tx: &Transaction<'_>,
  action_id: Uuid,
  contribution: GoalContribution,
  now: DateTime<Utc>,
) -> Result<ActionGoalContribution> {
  let row = ActionGoalContribution {
    id: Uuid::new_v4(),
    action_id,
    goal_id: contribution.goal_id,
    contribution_amount: contribution.contribution_amount,
    measure_id: contribution.measure_id,
    assignment_method: contribution.assignment_method,
    confidence: contribution.confidence,
    created_at: now,
  };
  tx.execute(
    "INSERT INTO action_goal_contributions
       (id, action_id, goal_id, contribution_amount, measure_id, assignment_method,
        confidence, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    rusqlite::params![
      encode_uuid(row.id),
      encode_uuid(row.action_id),
      encode_uuid(row.goal_id),
      row.contribution_amount,
      row.measure_id.map(encode_uuid),
      row.assignment_method.as_str(),
      row.confidence,
      encode_dt(row.created_at),
    ],
  )?;
  Ok(row)
}

fn same_contribution(e: &ActionGoalContribution, d: &GoalContribution) -> bool {
  e.contribution_amount == d.contribution_amount
    && e.measure_id == d.measure_id
    && e.assignment_method == d.assignment_method
    && e.confidence == d.confidence
}

/// An action with its measurements and goal contributions.
pub struct ActionFamily;

impl GraphFamily for ActionFamily {
  const NAME: &'static str = "action";

  type Form = ActionFormData;
  type Graph = ActionGraph;

  fn insert(
    tx: &Transaction<'_>,
    form: ActionFormData,
    now: DateTime<Utc>,
  ) -> Result<ActionGraph> {
    let action = Action {
      id:               Uuid::new_v4(),
      title:            form.title,
      description:      form.description,
      notes:            form.notes,
      log_time:         now,
      duration_minutes: form.duration_minutes,
      start_time:       form.start_time,
    };
    tx.execute(
      &format!("INSERT INTO actions ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
      rusqlite::params![
        encode_uuid(action.id),
        action.title,
        action.description,
        action.notes,
        encode_dt(action.log_time),
        action.duration_minutes,
        encode_opt_dt(action.start_time),
      ],
    )?;

    let measurements = form
      .measurements
      .into_iter()
      .map(|m| insert_measurement(tx, action.id, m, now))
      .collect::<Result<Vec<_>>>()?;
    let contributions = form
      .contributions
      .into_iter()
      .map(|c| insert_contribution(tx, action.id, c, now))
      .collect::<Result<Vec<_>>>()?;

    Ok(ActionGraph { action, measurements, contributions })
  }

  fn update(
    tx: &Transaction<'_>,
    id: Uuid,
    form: ActionFormData,
    now: DateTime<Utc>,
  ) -> Result<ActionGraph> {
    let affected = tx.execute(
      "UPDATE actions
       SET title = ?2, description = ?3, notes = ?4, duration_minutes = ?5, start_time = ?6
       WHERE id = ?1",
      rusqlite::params![
        encode_uuid(id),
        form.title,
        form.description,
        form.notes,
        form.duration_minutes,
        encode_opt_dt(form.start_time),
      ],
    )?;
    require_row(affected, Self::NAME, id)?;

    let plan = reconcile(
      load_measurements(tx, id)?,
      form.measurements,
      |e| e.measure_id,
      |d| d.measure_id,
      |e, d| e.value == d.value,
    );
    plan.trace("measured_actions");
    for stale in plan.stale {
      tx.execute(
        "DELETE FROM measured_actions WHERE id = ?1",
        rusqlite::params![encode_uuid(stale.id)],
      )?;
    }
    for (existing, desired) in plan.changed {
      tx.execute(
        "UPDATE measured_actions SET value = ?2 WHERE id = ?1",
        rusqlite::params![encode_uuid(existing.id), desired.value],
      )?;
    }
    for desired in plan.added {
      insert_measurement(tx, id, desired, now)?;
    }

    let plan = reconcile(
      load_contributions(tx, id)?,
      form.contributions,
      |e| e.goal_id,
      |d| d.goal_id,
      same_contribution,
    );
    plan.trace("action_goal_contributions");
    for stale in plan.stale {
      tx.execute(
        "DELETE FROM action_goal_contributions WHERE id = ?1",
        rusqlite::params![encode_uuid(stale.id)],
      )?;
    }
    for (existing, desired) in plan.changed {
      tx.execute(
        "UPDATE action_goal_contributions
         SET contribution_amount = ?2, measure_id = ?3, assignment_method = ?4, confidence = ?5
         WHERE id = ?1",
        rusqlite::params![
          encode_uuid(existing.id),
          desired.contribution_amount,
          desired.measure_id.map(encode_uuid),
          desired.assignment_method.as_str(),
          desired.confidence,
        ],
      )?;
    }
    for desired in plan.added {
      insert_contribution(tx, id, desired, now)?;
    }

    Self::fetch(tx, id)?.ok_or_else(|| Error::not_found(Self::NAME, id))
  }

  fn delete(tx: &Transaction<'_>, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    tx.execute(
      "DELETE FROM measured_actions WHERE action_id = ?1",
      rusqlite::params![id_str],
    )?;
    tx.execute(
      "DELETE FROM action_goal_contributions WHERE action_id = ?1",
      rusqlite::params![id_str],
    )?;
    let affected = tx.execute("DELETE FROM actions WHERE id = ?1", rusqlite::params![id_str])?;
    require_row(affected, Self::NAME, id)
  }

  fn fetch(conn: &Connection, id: Uuid) -> Result<Option<ActionGraph>> {
    let raw = conn
      .query_row(
        &format!("SELECT {COLUMNS} FROM actions WHERE id = ?1"),
        rusqlite::params![encode_uuid(id)],
        RawAction::from_row,
      )
      .optional()?;
    raw.map(|raw| assemble(conn, raw)).transpose()
  }

  fn list(conn: &Connection) -> Result<Vec<ActionGraph>> {
    let mut stmt =
      conn.prepare(&format!("SELECT {COLUMNS} FROM actions ORDER BY log_time, rowid"))?;
    let raws = stmt
      .query_map([], RawAction::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(|raw| assemble(conn, raw)).collect()
  }
}
