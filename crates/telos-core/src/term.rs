//! Time periods and goal terms: bounded windows of intentional focus.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::ontology::{Basic, EntityGraph, abstraction};

/// Default term length: ten weeks.
pub const TERM_LENGTH_DAYS: i64 = 70;

/// A span of calendar time. The abstraction behind a [`GoalTerm`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePeriod {
  pub id:          Uuid,
  pub title:       String,
  pub description: Option<String>,
  pub notes:       Option<String>,
  pub log_time:    DateTime<Utc>,
  pub start_date:  DateTime<Utc>,
  pub end_date:    DateTime<Utc>,
}

abstraction!(TimePeriod);

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
pub enum TermStatus {
  #[default]
  Planned,
  Active,
  Completed,
}

impl TermStatus {
  pub fn as_str(self) -> &'static str { self.into() }
}

/// A numbered planning term occupying one [`TimePeriod`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalTerm {
  pub id:             Uuid,
  pub time_period_id: Uuid,
  pub term_number:    u32,
  /// Optional focus area, e.g. "Health & Learning".
  pub theme:          Option<String>,
  /// Post-term reflection.
  pub reflection:     Option<String>,
  pub status:         TermStatus,
}

impl Basic for GoalTerm {
  fn id(&self) -> Uuid { self.id }

  fn abstraction_id(&self) -> Uuid { self.time_period_id }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePeriodGraph {
  pub time_period: TimePeriod,
  pub term:        GoalTerm,
}

impl EntityGraph for TimePeriodGraph {
  fn id(&self) -> Uuid { self.term.id }

  fn anchor(&self) -> (Uuid, DateTime<Utc>) {
    (self.time_period.id, self.time_period.log_time)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePeriodFormData {
  pub title:       String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub notes:       Option<String>,
  pub start_date:  DateTime<Utc>,
  pub end_date:    DateTime<Utc>,
  pub term_number: u32,
  #[serde(default)]
  pub theme:       Option<String>,
  #[serde(default)]
  pub reflection:  Option<String>,
  #[serde(default)]
  pub status:      TermStatus,
}

impl TimePeriodFormData {
  /// A ten-week term starting at `start_date`.
  pub fn ten_week_term(term_number: u32, start_date: DateTime<Utc>) -> Self {
    Self {
      title: format!("Term {term_number}"),
      description: None,
      notes: None,
      start_date,
      end_date: start_date + Duration::days(TERM_LENGTH_DAYS),
      term_number,
      theme: None,
      reflection: None,
      status: TermStatus::default(),
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn ten_week_term_ends_seventy_days_later() {
    let start = Utc.with_ymd_and_hms(2025, 10, 10, 0, 0, 0).unwrap();
    let form = TimePeriodFormData::ten_week_term(3, start);
    assert_eq!(form.title, "Term 3");
    assert_eq!(form.end_date, Utc.with_ymd_and_hms(2025, 12, 19, 0, 0, 0).unwrap());
  }
}
