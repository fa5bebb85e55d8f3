//! Goals: the widest entity graph in the model.
//!
//! One logical goal spans five record types:
//!
//! | Record | Tier | Joins |
//! |--------|------|-------|
//! | [`Expectation`] | abstraction | |
//! | [`Goal`] | basic | expectation |
//! | [`ExpectationMeasure`] | composite | expectation × measure |
//! | [`GoalRelevance`] | composite | goal × personal value |
//! | [`TermGoalAssignment`] | composite | term × goal |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::ontology::{Basic, Composite, EntityGraph, abstraction};

// ─── Abstraction ─────────────────────────────────────────────────────────────

/// What is expected of the user: the descriptive half of a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expectation {
  pub id:          Uuid,
  pub title:       String,
  pub description: Option<String>,
  pub notes:       Option<String>,
  pub log_time:    DateTime<Utc>,
  /// 1..=10
  pub importance:  u8,
  /// 1..=10
  pub urgency:     u8,
}

abstraction!(Expectation);

// ─── Basic ───────────────────────────────────────────────────────────────────

/// Which flavour of goal a [`Goal`] row is.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GoalKind {
  /// May be aspirational; every date and target is optional.
  #[default]
  Goal,
  /// Specific, measurable, achievable, relevant and time-bound.
  SmartGoal,
  /// A checkpoint on the way to something larger; only a target date.
  Milestone,
}

impl GoalKind {
  pub fn as_str(self) -> &'static str { self.into() }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
  pub id:                   Uuid,
  pub expectation_id:       Uuid,
  pub kind:                 GoalKind,
  pub start_date:           Option<DateTime<Utc>>,
  pub target_date:          Option<DateTime<Utc>>,
  pub action_plan:          Option<String>,
  /// Number of terms the goal is expected to span.
  pub expected_term_length: Option<u32>,
}

impl Basic for Goal {
  fn id(&self) -> Uuid { self.id }

  fn abstraction_id(&self) -> Uuid { self.expectation_id }
}

// ─── Composites ──────────────────────────────────────────────────────────────

/// A measurable target attached to an expectation ("100 km").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectationMeasure {
  pub id:             Uuid,
  pub expectation_id: Uuid,
  pub measure_id:     Uuid,
  pub target_value:   f64,
  pub created_at:     DateTime<Utc>,
}

impl Composite for ExpectationMeasure {
  fn id(&self) -> Uuid { self.id }

  fn endpoints(&self) -> (Uuid, Uuid) { (self.expectation_id, self.measure_id) }
}

/// Declares that a goal serves a personal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRelevance {
  pub id:                 Uuid,
  pub goal_id:            Uuid,
  pub value_id:           Uuid,
  /// 1..=10
  pub alignment_strength: u8,
  pub relevance_notes:    Option<String>,
  pub created_at:         DateTime<Utc>,
}

impl Composite for GoalRelevance {
  fn id(&self) -> Uuid { self.id }

  fn endpoints(&self) -> (Uuid, Uuid) { (self.goal_id, self.value_id) }
}

/// Commits a goal to a term. A goal sits in at most one term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermGoalAssignment {
  pub id:               Uuid,
  pub term_id:          Uuid,
  pub goal_id:          Uuid,
  /// Position of the goal within its term, starting at 1.
  pub assignment_order: u32,
  pub created_at:       DateTime<Utc>,
}

impl Composite for TermGoalAssignment {
  fn id(&self) -> Uuid { self.id }

  fn endpoints(&self) -> (Uuid, Uuid) { (self.goal_id, self.term_id) }
}

// ─── Graph ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalGraph {
  pub expectation:     Expectation,
  pub goal:            Goal,
  pub measures:        Vec<ExpectationMeasure>,
  pub relevances:      Vec<GoalRelevance>,
  pub term_assignment: Option<TermGoalAssignment>,
}

impl EntityGraph for GoalGraph {
  fn id(&self) -> Uuid { self.goal.id }

  fn anchor(&self) -> (Uuid, DateTime<Utc>) {
    (self.expectation.id, self.expectation.log_time)
  }

  fn composite_ids(&self) -> Vec<Uuid> {
    self
      .measures
      .iter()
      .map(Composite::id)
      .chain(self.relevances.iter().map(Composite::id))
      .chain(self.term_assignment.iter().map(Composite::id))
      .collect()
  }
}

// ─── Form data ───────────────────────────────────────────────────────────────

/// One requested `ExpectationMeasure`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureTarget {
  pub measure_id:   Uuid,
  pub target_value: f64,
}

/// One requested `GoalRelevance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueAlignment {
  pub value_id:           Uuid,
  pub alignment_strength: u8,
  #[serde(default)]
  pub relevance_notes:    Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalFormData {
  pub title:                String,
  #[serde(default)]
  pub description:          Option<String>,
  #[serde(default)]
  pub notes:                Option<String>,
  #[serde(default = "default_rating")]
  pub importance:           u8,
  #[serde(default = "default_rating")]
  pub urgency:              u8,
  #[serde(default)]
  pub kind:                 GoalKind,
  #[serde(default)]
  pub start_date:           Option<DateTime<Utc>>,
  #[serde(default)]
  pub target_date:          Option<DateTime<Utc>>,
  #[serde(default)]
  pub action_plan:          Option<String>,
  #[serde(default)]
  pub expected_term_length: Option<u32>,
  #[serde(default)]
  pub measurement_targets:  Vec<MeasureTarget>,
  #[serde(default)]
  pub relevant_values:      Vec<ValueAlignment>,
  #[serde(default)]
  pub term_id:              Option<Uuid>,
}

fn default_rating() -> u8 { 5 }

impl GoalFormData {
  /// A plain goal with only a title; everything else empty.
  pub fn new(title: impl Into<String>) -> Self {
    Self {
      title:                title.into(),
      description:          None,
      notes:                None,
      importance:           default_rating(),
      urgency:              default_rating(),
      kind:                 GoalKind::default(),
      start_date:           None,
      target_date:          None,
      action_plan:          None,
      expected_term_length: None,
      measurement_targets:  Vec::new(),
      relevant_values:      Vec::new(),
      term_id:              None,
    }
  }

  pub fn with_target(mut self, measure_id: Uuid, target_value: f64) -> Self {
    self.measurement_targets.push(MeasureTarget { measure_id, target_value });
    self
  }

  pub fn with_value(mut self, value_id: Uuid, alignment_strength: u8) -> Self {
    self.relevant_values.push(ValueAlignment {
      value_id,
      alignment_strength,
      relevance_notes: None,
    });
    self
  }

  pub fn in_term(mut self, term_id: Uuid) -> Self {
    self.term_id = Some(term_id);
    self
  }
}
