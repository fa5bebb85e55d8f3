//! Actions: things the user actually did, with what they measured and which
//! goals they fed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::ontology::{Composite, EntityGraph, abstraction};

/// A logged action. Abstraction with no basic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
  pub id:               Uuid,
  pub title:            String,
  pub description:      Option<String>,
  pub notes:            Option<String>,
  pub log_time:         DateTime<Utc>,
  pub duration_minutes: Option<f64>,
  pub start_time:       Option<DateTime<Utc>>,
}

abstraction!(Action);

/// One measurement taken during an action ("5.2 km").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasuredAction {
  pub id:         Uuid,
  pub action_id:  Uuid,
  pub measure_id: Uuid,
  pub value:      f64,
  pub created_at: DateTime<Utc>,
}

impl Composite for MeasuredAction {
  fn id(&self) -> Uuid { self.id }

  fn endpoints(&self) -> (Uuid, Uuid) { (self.action_id, self.measure_id) }
}

/// How an action was linked to a goal.
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
pub enum AssignmentMethod {
  /// Computed by a matching algorithm.
  AutoInferred,
  /// An inferred match the user accepted.
  UserConfirmed,
  #[default]
  Manual,
}

impl AssignmentMethod {
  pub fn as_str(self) -> &'static str { self.into() }
}

/// Records that an action moved a goal forward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionGoalContribution {
  pub id:                  Uuid,
  pub action_id:           Uuid,
  pub goal_id:             Uuid,
  pub contribution_amount: Option<f64>,
  /// Unit of `contribution_amount`, if any.
  pub measure_id:          Option<Uuid>,
  pub assignment_method:   AssignmentMethod,
  /// 0.0..=1.0; 1.0 for manual or confirmed links.
  pub confidence:          f64,
  pub created_at:          DateTime<Utc>,
}

impl Composite for ActionGoalContribution {
  fn id(&self) -> Uuid { self.id }

  fn endpoints(&self) -> (Uuid, Uuid) { (self.action_id, self.goal_id) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionGraph {
  pub action:        Action,
  pub measurements:  Vec<MeasuredAction>,
  pub contributions: Vec<ActionGoalContribution>,
}

impl EntityGraph for ActionGraph {
  fn id(&self) -> Uuid { self.action.id }

  fn anchor(&self) -> (Uuid, DateTime<Utc>) { (self.action.id, self.action.log_time) }

  fn composite_ids(&self) -> Vec<Uuid> {
    self
      .measurements
      .iter()
      .map(Composite::id)
      .chain(self.contributions.iter().map(Composite::id))
      .collect()
  }
}

// ─── Form data ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
  pub measure_id: Uuid,
  pub value:      f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalContribution {
  pub goal_id:             Uuid,
  #[serde(default)]
  pub contribution_amount: Option<f64>,
  #[serde(default)]
  pub measure_id:          Option<Uuid>,
  #[serde(default)]
  pub assignment_method:   AssignmentMethod,
  #[serde(default = "full_confidence")]
  pub confidence:          f64,
}

fn full_confidence() -> f64 { 1.0 }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionFormData {
  pub title:            String,
  #[serde(default)]
  pub description:      Option<String>,
  #[serde(default)]
  pub notes:            Option<String>,
  #[serde(default)]
  pub duration_minutes: Option<f64>,
  #[serde(default)]
  pub start_time:       Option<DateTime<Utc>>,
  #[serde(default)]
  pub measurements:     Vec<Measurement>,
  #[serde(default)]
  pub contributions:    Vec<GoalContribution>,
}

impl ActionFormData {
  pub fn new(title: impl Into<String>) -> Self {
    Self {
      title:            title.into(),
      description:      None,
      notes:            None,
      duration_minutes: None,
      start_time:       None,
      measurements:     Vec::new(),
      contributions:    Vec::new(),
    }
  }

  pub fn with_measurement(mut self, measure_id: Uuid, value: f64) -> Self {
    self.measurements.push(Measurement { measure_id, value });
    self
  }

  /// A manual, fully-confident contribution to `goal_id`.
  pub fn contributing_to(mut self, goal_id: Uuid, amount: Option<f64>) -> Self {
    self.contributions.push(GoalContribution {
      goal_id,
      contribution_amount: amount,
      measure_id: None,
      assignment_method: AssignmentMethod::Manual,
      confidence: full_confidence(),
    });
    self
  }
}
