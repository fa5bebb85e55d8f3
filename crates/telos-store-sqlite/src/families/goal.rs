//! The goal graph: expectation, goal, and three composite sets.
//!
//! Insert order is expectation → goal → expectation measures → relevances →
//! term assignment. Delete runs the other way, and first clears every action
//! contribution pointing at the goal.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, Transaction};
use telos_core::goal::{
  Expectation, ExpectationMeasure, Goal, GoalFormData, GoalGraph, GoalKind, GoalRelevance,
  MeasureTarget, TermGoalAssignment, ValueAlignment,
};
use uuid::Uuid;

use super::{abstraction_of, require_row};
use crate::{
  Error, Result,
  coordinator::GraphFamily,
  encode::{
    decode_discriminant, decode_dt, decode_opt_dt, decode_uuid, encode_dt, encode_opt_dt,
    encode_uuid,
  },
  reconcile::reconcile,
};

const SELECT: &str = "SELECT e.id, e.title, e.description, e.notes, e.log_time,
                             e.importance, e.urgency,
                             g.id, g.goal_kind, g.start_date, g.target_date,
                             g.action_plan, g.expected_term_length
                      FROM goals g
                      JOIN expectations e ON e.id = g.expectation_id";

// ─── Raw rows ────────────────────────────────────────────────────────────────

struct RawGoal {
  expectation_id:       String,
  title:                String,
  description:          Option<String>,
  notes:                Option<String>,
  log_time:             String,
  importance:           u8,
  urgency:              u8,
  goal_id:              String,
  goal_kind:            String,
  start_date:           Option<String>,
  target_date:          Option<String>,
  action_plan:          Option<String>,
  expected_term_length: Option<u32>,
}

impl RawGoal {
  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      expectation_id:       row.get(0)?,
      title:                row.get(1)?,
      description:          row.get(2)?,
      notes:                row.get(3)?,
      log_time:             row.get(4)?,
      importance:           row.get(5)?,
      urgency:              row.get(6)?,
      goal_id:              row.get(7)?,
      goal_kind:            row.get(8)?,
      start_date:           row.get(9)?,
      target_date:          row.get(10)?,
      action_plan:          row.get(11)?,
      expected_term_length: row.get(12)?,
    })
  }

  fn into_parts(self) -> Result<(Expectation, Goal)> {
    let expectation_id = decode_uuid(&self.expectation_id)?;
    let expectation = Expectation {
      id:          expectation_id,
      title:       self.title,
      description: self.description,
      notes:       self.notes,
      log_time:    decode_dt(&self.log_time)?,
      importance:  self.importance,
      urgency:     self.urgency,
    };
    let goal = Goal {
      id: decode_uuid(&self.goal_id)?,
      expectation_id,
      kind: decode_discriminant::<GoalKind>("goal_kind", &self.goal_kind)?,
      start_date: decode_opt_dt(self.start_date.as_deref())?,
      target_date: decode_opt_dt(self.target_date.as_deref())?,
      action_plan: self.action_plan,
      expected_term_length: self.expected_term_length,
    };
    Ok((expectation, goal))
  }
}

struct RawExpectationMeasure {
  id:             String,
  expectation_id: String,
  measure_id:     String,
  target_value:   f64,
  created_at:     String,
}

impl RawExpectationMeasure {
  fn into_composite(self) -> Result<ExpectationMeasure> {
    Ok(ExpectationMeasure {
      id:             decode_uuid(&self.id)?,
      expectation_id: decode_uuid(&self.expectation_id)?,
      measure_id:     decode_uuid(&self.measure_id)?,
      target_value:   self.target_value,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

struct RawRelevance {
  id:                 String,
  goal_id:            String,
  value_id:           String,
  alignment_strength: u8,
  relevance_notes:    Option<String>,
  created_at:         String,
}

impl RawRelevance {
  fn into_composite(self) -> Result<GoalRelevance> {
    Ok(GoalRelevance {
      id:                 decode_uuid(&self.id)?,
      goal_id:            decode_uuid(&self.goal_id)?,
      value_id:           decode_uuid(&self.value_id)?,
      alignment_strength: self.alignment_strength,
      relevance_notes:    self.relevance_notes,
      created_at:         decode_dt(&self.created_at)?,
    })
  }
}

struct RawAssignment {
  id:               String,
  term_id:          String,
  goal_id:          String,
  assignment_order: u32,
  created_at:       String,
}

impl RawAssignment {
  fn into_composite(self) -> Result<TermGoalAssignment> {
    Ok(TermGoalAssignment {
      id:               decode_uuid(&self.id)?,
      term_id:          decode_uuid(&self.term_id)?,
      goal_id:          decode_uuid(&self.goal_id)?,
      assignment_order: self.assignment_order,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

// ─── Composite loads ─────────────────────────────────────────────────────────

fn load_measures(conn: &Connection, expectation_id: Uuid) -> Result<Vec<ExpectationMeasure>> {
  let mut stmt = conn.prepare(
    "SELECT id, expectation_id, measure_id, target_value, created_at
     FROM expectation_measures WHERE expectation_id = ?1 ORDER BY rowid",
  )?;
  let raws = stmt
    .query_map(rusqlite::params![encode_uuid(expectation_id)], |row| {
      Ok(RawExpectationMeasure {
        id:             row.get(0)?,
        expectation_id: row.get(1)?,
        measure_id:     row.get(2)?,
        target_value:   row.get(3)?,
        created_at:     row.get(4)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawExpectationMeasure::into_composite).collect()
}

fn load_relevances(conn: &Connection, goal_id: Uuid) -> Result<Vec<GoalRelevance>> {
  let mut stmt = conn.prepare(
    "SELECT id, goal_id, value_id, alignment_strength, relevance_notes, created_at
     FROM goal_relevances WHERE goal_id = ?1 ORDER BY rowid",
  )?;
  let raws = stmt
    .query_map(rusqlite::params![encode_uuid(goal_id)], |row| {
      Ok(RawRelevance {
        id:                 row.get(0)?,
        goal_id:            row.get(1)?,
        value_id:           row.get(2)?,
        alignment_strength: row.get(3)?,
        relevance_notes:    row.get(4)?,
        created_at:         row.get(5)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawRelevance::into_composite).collect()
}

fn load_assignment(conn: &Connection, goal_id: Uuid) -> Result<Option<TermGoalAssignment>> {
  let raw = conn
    .query_row(
      "SELECT id, term_id, goal_id, assignment_order, created_at
       FROM term_goal_assignments WHERE goal_id = ?1",
      rusqlite::params![encode_uuid(goal_id)],
      |row| {
        Ok(RawAssignment {
          id:               row.get(0)?,
          term_id:          row.get(1)?,
          goal_id:          row.get(2)?,
          assignment_order: row.get(3)?,
          created_at:       row.get(4)?,
        })
      },
    )
    .optional()?;
  raw.map(RawAssignment::into_composite).transpose()
}

fn assemble(conn: &Connection, raw: RawGoal) -> Result<GoalGraph> {
  let (expectation, goal) = raw.into_parts()?;
  Ok(GoalGraph {
    measures: load_measures(conn, expectation.id)?,
    relevances: load_relevances(conn, goal.id)?,
    term_assignment: load_assignment(conn, goal.id)?,
    expectation,
    goal,
  })
}

// ─── Composite writes ────────────────────────────────────────────────────────

fn insert_measure(
  tx: &Transaction<'_>,
  expectation_id: Uuid,
  target: MeasureTarget,
  now: DateTime<Utc>,
) -> Result<ExpectationMeasure> {
  let row = ExpectationMeasure {
    id: Uuid::new_v4(),
    expectation_id,
    measure_id: target.measure_id,
    target_value: target.target_value,
    created_at: now,
  };
  tx.execute(
    "INSERT INTO expectation_measures (id, expectation_id, measure_id, target_value, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![
      encode_uuid(row.id),
      encode_uuid(row.expectation_id),
      encode_uuid(row.measure_id),
      row.target_value,
      encode_dt(row.created_at),
    ],
  )?;
  Ok(row)
}

fn insert_relevance(
  tx: &Transaction<'_>,
  goal_id: Uuid,
  alignment: ValueAlignment,
  now: DateTime<Utc>,
) -> Result<GoalRelevance> {
  let row = GoalRelevance {
    id: Uuid::new_v4(),
    goal_id,
    value_id: alignment.value_id,
    alignment_strength: alignment.alignment_strength,
    relevance_notes: alignment.relevance_notes,
    created_at: now,
  };
  tx.execute(
    "INSERT INTO goal_relevances
       (id, goal_id, value_id, alignment_strength, relevance_notes, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    rusqlite::params![
      encode_uuid(row.id),
      encode_uuid(row.goal_id),
      encode_uuid(row.value_id),
      row.alignment_strength,
      row.relevance_notes,
      encode_dt(row.created_at),
    ],
  )?;
  Ok(row)
}

/// Append `goal_id` to the end of `term_id`'s goal list.
fn insert_assignment(
  tx: &Transaction<'_>,
  goal_id: Uuid,
  term_id: Uuid,
  now: DateTime<Utc>,
) -> Result<TermGoalAssignment> {
  let assignment_order: u32 = tx.query_row(
    "SELECT COALESCE(MAX(assignment_order), 0) + 1
     FROM term_goal_assignments WHERE term_id = ?1",
    rusqlite::params![encode_uuid(term_id)],
    |row| row.get(0),
  )?;
  let row = TermGoalAssignment {
    id: Uuid::new_v4(),
    term_id,
    goal_id,
    assignment_order,
    created_at: now,
  };
  tx.execute(
    "INSERT INTO term_goal_assignments (id, term_id, goal_id, assignment_order, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![
      encode_uuid(row.id),
      encode_uuid(row.term_id),
      encode_uuid(row.goal_id),
      row.assignment_order,
      encode_dt(row.created_at),
    ],
  )?;
  Ok(row)
}

fn delete_by_id(tx: &Transaction<'_>, table: &str, id: Uuid) -> Result<()> {
  tx.execute(
    &format!("DELETE FROM {table} WHERE id = ?1"),
    rusqlite::params![encode_uuid(id)],
  )?;
  Ok(())
}

// ─── Family ──────────────────────────────────────────────────────────────────

/// Goals are addressed by the goal (basic) identifier.
pub struct GoalFamily;

impl GraphFamily for GoalFamily {
  const NAME: &'static str = "goal";

  type Form = GoalFormData;
  type Graph = GoalGraph;

  fn insert(tx: &Transaction<'_>, form: GoalFormData, now: DateTime<Utc>) -> Result<GoalGraph> {
    let expectation = Expectation {
      id:          Uuid::new_v4(),
      title:       form.title,
      description: form.description,
      notes:       form.notes,
      log_time:    now,
      importance:  form.importance,
      urgency:     form.urgency,
    };
    tx.execute(
      "INSERT INTO expectations
         (id, title, description, notes, log_time, importance, urgency)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
      rusqlite::params![
        encode_uuid(expectation.id),
        expectation.title,
        expectation.description,
        expectation.notes,
        encode_dt(expectation.log_time),
        expectation.importance,
        expectation.urgency,
      ],
    )?;

    let goal = Goal {
      id:                   Uuid::new_v4(),
      expectation_id:       expectation.id,
      kind:                 form.kind,
      start_date:           form.start_date,
      target_date:          form.target_date,
      action_plan:          form.action_plan,
      expected_term_length: form.expected_term_length,
    };
    tx.execute(
      "INSERT INTO goals
         (id, expectation_id, goal_kind, start_date, target_date, action_plan,
          expected_term_length)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
      rusqlite::params![
        encode_uuid(goal.id),
        encode_uuid(goal.expectation_id),
        goal.kind.as_str(),
        encode_opt_dt(goal.start_date),
        encode_opt_dt(goal.target_date),
        goal.action_plan,
        goal.expected_term_length,
      ],
    )?;

    let measures = form
      .measurement_targets
      .into_iter()
      .map(|target| insert_measure(tx, expectation.id, target, now))
      .collect::<Result<Vec<_>>>()?;
    let relevances = form
      .relevant_values
      .into_iter()
      .map(|alignment| insert_relevance(tx, goal.id, alignment, now))
      .collect::<Result<Vec<_>>>()?;
    let term_assignment = form
      .term_id
      .map(|term_id| insert_assignment(tx, goal.id, term_id, now))
      .transpose()?;

    Ok(GoalGraph { expectation, goal, measures, relevances, term_assignment })
  }

  fn update(
    tx: &Transaction<'_>,
    id: Uuid,
    form: GoalFormData,
    now: DateTime<Utc>,
  ) -> Result<GoalGraph> {
    let expectation_id = abstraction_of(tx, "goals", "expectation_id", Self::NAME, id)?;

    tx.execute(
      "UPDATE goals
       SET goal_kind = ?2, start_date = ?3, target_date = ?4, action_plan = ?5,
           expected_term_length = ?6
       WHERE id = ?1",
      rusqlite::params![
        encode_uuid(id),
        form.kind.as_str(),
        encode_opt_dt(form.start_date),
        encode_opt_dt(form.target_date),
        form.action_plan,
        form.expected_term_length,
      ],
    )?;
    let affected = tx.execute(
      "UPDATE expectations
       SET title = ?2, description = ?3, notes = ?4, importance = ?5, urgency = ?6
       WHERE id = ?1",
      rusqlite::params![
        encode_uuid(expectation_id),
        form.title,
        form.description,
        form.notes,
        form.importance,
        form.urgency,
      ],
    )?;
    require_row(affected, Self::NAME, id)?;

    // Expectation measures, keyed by measure.
    let plan = reconcile(
      load_measures(tx, expectation_id)?,
      form.measurement_targets,
      |e| e.measure_id,
      |d| d.measure_id,
      |e, d| e.target_value == d.target_value,
    );
    plan.trace("expectation_measures");
    for stale in plan.stale {
      delete_by_id(tx, "expectation_measures", stale.id)?;
    }
    for (existing, desired) in plan.changed {
      tx.execute(
        "UPDATE expectation_measures SET target_value = ?2 WHERE id = ?1",
        rusqlite::params![encode_uuid(existing.id), desired.target_value],
      )?;
    }
    for desired in plan.added {
      insert_measure(tx, expectation_id, desired, now)?;
    }

    // Relevances, keyed by value.
    let plan = reconcile(
      load_relevances(tx, id)?,
      form.relevant_values,
      |e| e.value_id,
      |d| d.value_id,
      |e, d| {
        e.alignment_strength == d.alignment_strength && e.relevance_notes == d.relevance_notes
      },
    );
    plan.trace("goal_relevances");
    for stale in plan.stale {
      delete_by_id(tx, "goal_relevances", stale.id)?;
    }
    for (existing, desired) in plan.changed {
      tx.execute(
        "UPDATE goal_relevances SET alignment_strength = ?2, relevance_notes = ?3
         WHERE id = ?1",
        rusqlite::params![
          encode_uuid(existing.id),
          desired.alignment_strength,
          desired.relevance_notes,
        ],
      )?;
    }
    for desired in plan.added {
      insert_relevance(tx, id, desired, now)?;
    }

    // Term assignment, keyed by term. Staying in the same term keeps the
    // original position.
    let plan = reconcile(
      load_assignment(tx, id)?.into_iter().collect(),
      form.term_id.into_iter().collect(),
      |e| e.term_id,
      |term_id| *term_id,
      |_, _| true,
    );
    plan.trace("term_goal_assignments");
    for stale in plan.stale {
      delete_by_id(tx, "term_goal_assignments", stale.id)?;
    }
    for term_id in plan.added {
      insert_assignment(tx, id, term_id, now)?;
    }

    Self::fetch(tx, id)?.ok_or_else(|| Error::not_found(Self::NAME, id))
  }

  fn delete(tx: &Transaction<'_>, id: Uuid) -> Result<()> {
    let expectation_id = abstraction_of(tx, "goals", "expectation_id", Self::NAME, id)?;
    let id_str = encode_uuid(id);

    for sql in [
      "DELETE FROM action_goal_contributions WHERE goal_id = ?1",
      "DELETE FROM goal_relevances WHERE goal_id = ?1",
      "DELETE FROM term_goal_assignments WHERE goal_id = ?1",
    ] {
      tx.execute(sql, rusqlite::params![id_str])?;
    }
    tx.execute(
      "DELETE FROM expectation_measures WHERE expectation_id = ?1",
      rusqlite::params![encode_uuid(expectation_id)],
    )?;
    tx.execute("DELETE FROM goals WHERE id = ?1", rusqlite::params![id_str])?;
    let affected = tx.execute(
      "DELETE FROM expectations WHERE id = ?1",
      rusqlite::params![encode_uuid(expectation_id)],
    )?;
    require_row(affected, Self::NAME, id)
  }

  fn fetch(conn: &Connection, id: Uuid) -> Result<Option<GoalGraph>> {
    let raw = conn
      .query_row(
        &format!("{SELECT} WHERE g.id = ?1"),
        rusqlite::params![encode_uuid(id)],
        RawGoal::from_row,
      )
      .optional()?;
    raw.map(|raw| assemble(conn, raw)).transpose()
  }

  fn list(conn: &Connection) -> Result<Vec<GoalGraph>> {
    let mut stmt = conn.prepare(&format!("{SELECT} ORDER BY e.log_time, e.rowid"))?;
    let raws = stmt
      .query_map([], RawGoal::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(|raw| assemble(conn, raw)).collect()
  }
}
