//! Business-rule validation for form data.
//!
//! This is a separate collaborator: callers run it before handing a form to a
//! [`Coordinator`](crate::coordinator::Coordinator), which never validates.

use std::fmt;

use thiserror::Error;

use crate::{
  action::ActionFormData,
  goal::{GoalFormData, GoalKind},
  measure::MeasureFormData,
  term::TimePeriodFormData,
  value::ValueFormData,
};

/// A single rule a form broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
  pub field:  &'static str,
  pub reason: String,
}

impl fmt::Display for FieldError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.field, self.reason)
  }
}

/// Every rule a form broke, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid form: {}", join(.0))]
pub struct ValidationError(pub Vec<FieldError>);

fn join(errors: &[FieldError]) -> String {
  errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

pub trait Validate {
  fn validate(&self) -> Result<(), ValidationError>;
}

// ─── Rule collector ──────────────────────────────────────────────────────────

#[derive(Default)]
struct Rules(Vec<FieldError>);

impl Rules {
  fn check(&mut self, ok: bool, field: &'static str, reason: impl Into<String>) {
    if !ok {
      self.0.push(FieldError { field, reason: reason.into() });
    }
  }

  fn title(&mut self, title: &str) {
    self.check(!title.trim().is_empty(), "title", "must not be empty");
  }

  fn rating(&mut self, value: u8, field: &'static str) {
    self.check((1..=10).contains(&value), field, format!("must be 1..=10, got {value}"));
  }

  fn finish(self) -> Result<(), ValidationError> {
    if self.0.is_empty() { Ok(()) } else { Err(ValidationError(self.0)) }
  }
}

// ─── Impls ───────────────────────────────────────────────────────────────────

impl Validate for MeasureFormData {
  fn validate(&self) -> Result<(), ValidationError> {
    let mut rules = Rules::default();
    rules.title(&self.title);
    rules.check(!self.unit.trim().is_empty(), "unit", "must not be empty");
    rules.finish()
  }
}

impl Validate for ValueFormData {
  fn validate(&self) -> Result<(), ValidationError> {
    let mut rules = Rules::default();
    rules.title(&self.title);
    rules.check(
      (1..=100).contains(&self.priority),
      "priority",
      format!("must be 1..=100, got {}", self.priority),
    );
    rules.finish()
  }
}

impl Validate for TimePeriodFormData {
  fn validate(&self) -> Result<(), ValidationError> {
    let mut rules = Rules::default();
    rules.title(&self.title);
    rules.check(
      self.start_date < self.end_date,
      "end_date",
      "must be after start_date",
    );
    rules.finish()
  }
}

impl Validate for GoalFormData {
  fn validate(&self) -> Result<(), ValidationError> {
    let mut rules = Rules::default();
    rules.title(&self.title);
    rules.rating(self.importance, "importance");
    rules.rating(self.urgency, "urgency");

    for target in &self.measurement_targets {
      rules.check(
        target.target_value > 0.0,
        "measurement_targets",
        format!("target for {} must be positive", target.measure_id),
      );
    }
    for alignment in &self.relevant_values {
      rules.rating(alignment.alignment_strength, "relevant_values");
    }

    if let (Some(start), Some(target)) = (self.start_date, self.target_date) {
      rules.check(start < target, "target_date", "must be after start_date");
    }

    match self.kind {
      GoalKind::Goal => {}
      GoalKind::SmartGoal => {
        rules.check(
          !self.measurement_targets.is_empty(),
          "measurement_targets",
          "a SMART goal must be measurable",
        );
        rules.check(self.start_date.is_some(), "start_date", "a SMART goal must be time-bound");
        rules.check(self.target_date.is_some(), "target_date", "a SMART goal must be time-bound");
        rules.check(
          self.action_plan.as_deref().is_some_and(|p| !p.trim().is_empty()),
          "action_plan",
          "a SMART goal must be actionable",
        );
      }
      GoalKind::Milestone => {
        rules.check(self.target_date.is_some(), "target_date", "a milestone needs a date");
      }
    }

    rules.finish()
  }
}

impl Validate for ActionFormData {
  fn validate(&self) -> Result<(), ValidationError> {
    let mut rules = Rules::default();
    rules.title(&self.title);

    for m in &self.measurements {
      rules.check(
        m.value > 0.0,
        "measurements",
        format!("value for {} must be positive", m.measure_id),
      );
    }
    if let Some(minutes) = self.duration_minutes {
      rules.check(minutes > 0.0, "duration_minutes", "must be positive");
    }
    rules.check(
      self.start_time.is_none() || self.duration_minutes.is_some(),
      "duration_minutes",
      "required when start_time is set",
    );
    for c in &self.contributions {
      rules.check(
        (0.0..=1.0).contains(&c.confidence),
        "contributions",
        format!("confidence for {} must be 0.0..=1.0", c.goal_id),
      );
    }

    rules.finish()
  }
}
