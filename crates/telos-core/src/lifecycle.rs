//! Term lifecycle: where "now" falls relative to each term, and which goals
//! a term holds.
//!
//! A term's phase is computed from its dates. The stored
//! [`TermStatus`](crate::term::TermStatus) is what the user declared and may
//! lag behind it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{action::ActionGraph, goal::GoalGraph, term::TimePeriodGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TermPhase {
  Upcoming,
  /// Start and end dates inclusive.
  Active,
  Complete,
}

/// Time elapsed in a term and the number of goals committed to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermProgress {
  pub term_id:               Uuid,
  pub term_number:           u32,
  pub phase:                 TermPhase,
  pub days_elapsed:          i64,
  pub days_remaining:        i64,
  /// 0.0..=1.0
  pub percent_time_complete: f64,
  pub total_goals:           usize,
}

pub fn term_phase(term: &TimePeriodGraph, at: DateTime<Utc>) -> TermPhase {
  let period = &term.time_period;
  if at < period.start_date {
    TermPhase::Upcoming
  } else if at <= period.end_date {
    TermPhase::Active
  } else {
    TermPhase::Complete
  }
}

/// The first term active at `at`, in input order.
pub fn active_term(terms: &[TimePeriodGraph], at: DateTime<Utc>) -> Option<&TimePeriodGraph> {
  terms.iter().find(|t| term_phase(t, at) == TermPhase::Active)
}

pub fn find_term_by_number(terms: &[TimePeriodGraph], term_number: u32) -> Option<&TimePeriodGraph> {
  terms.iter().find(|t| t.term.term_number == term_number)
}

/// Goals assigned to `term_id`, by assignment order.
pub fn committed_goals(term_id: Uuid, goals: &[GoalGraph]) -> Vec<&GoalGraph> {
  let mut committed: Vec<&GoalGraph> = goals
    .iter()
    .filter(|g| g.term_assignment.as_ref().is_some_and(|a| a.term_id == term_id))
    .collect();
  committed.sort_by_key(|g| g.term_assignment.as_ref().map(|a| a.assignment_order));
  committed
}

/// Goals not committed to any term.
pub fn unassigned_goals(goals: &[GoalGraph]) -> Vec<&GoalGraph> {
  goals.iter().filter(|g| g.term_assignment.is_none()).collect()
}

/// Actions logged within the term's dates, inclusive.
pub fn actions_in_term<'a>(term: &TimePeriodGraph, actions: &'a [ActionGraph]) -> Vec<&'a ActionGraph> {
  let period = &term.time_period;
  actions
    .iter()
    .filter(|a| period.start_date <= a.action.log_time && a.action.log_time <= period.end_date)
    .collect()
}

pub fn term_progress(term: &TimePeriodGraph, goals: &[GoalGraph], at: DateTime<Utc>) -> TermProgress {
  let period = &term.time_period;
  let total_days = (period.end_date - period.start_date).num_days();
  let elapsed = (at - period.start_date).num_days();

  let percent_time_complete = if elapsed <= 0 {
    0.0
  } else if elapsed >= total_days {
    1.0
  } else {
    elapsed as f64 / total_days as f64
  };

  TermProgress {
    term_id: term.term.id,
    term_number: term.term.term_number,
    phase: term_phase(term, at),
    days_elapsed: elapsed.max(0),
    days_remaining: if at > period.end_date { 0 } else { (period.end_date - at).num_days() },
    percent_time_complete,
    total_goals: committed_goals(term.term.id, goals).len(),
  }
}

#[cfg(test)]
mod tests {
  use chrono::Duration;
  use uuid::Uuid;

  use super::*;
  use crate::{
    goal::TermGoalAssignment,
    progress::fixtures::{action, day, goal},
    term::{GoalTerm, TimePeriod, TimePeriodFormData},
  };

  fn term(term_number: u32, start: DateTime<Utc>) -> TimePeriodGraph {
    let form = TimePeriodFormData::ten_week_term(term_number, start);
    let time_period_id = Uuid::new_v4();
    TimePeriodGraph {
      time_period: TimePeriod {
        id:          time_period_id,
        title:       form.title,
        description: None,
        notes:       None,
        log_time:    start,
        start_date:  form.start_date,
        end_date:    form.end_date,
      },
      term:        GoalTerm {
        id: Uuid::new_v4(),
        time_period_id,
        term_number,
        theme: None,
        reflection: None,
        status: form.status,
      },
    }
  }

  fn assign(mut g: GoalGraph, term: &TimePeriodGraph, order: u32) -> GoalGraph {
    g.term_assignment = Some(TermGoalAssignment {
      id:               Uuid::new_v4(),
      term_id:          term.term.id,
      goal_id:          g.goal.id,
      assignment_order: order,
      created_at:       day(1),
    });
    g
  }

  #[test]
  fn phase_follows_the_dates() {
    let t = term(1, day(10));
    assert_eq!(term_phase(&t, day(9)), TermPhase::Upcoming);
    assert_eq!(term_phase(&t, day(10)), TermPhase::Active);
    assert_eq!(term_phase(&t, t.time_period.end_date), TermPhase::Active);
    assert_eq!(term_phase(&t, t.time_period.end_date + Duration::seconds(1)), TermPhase::Complete);
  }

  #[test]
  fn active_term_is_found_among_many() {
    let first = term(1, day(1) - Duration::days(70));
    let second = term(2, day(1));
    let terms = [first, second.clone()];

    assert_eq!(active_term(&terms, day(15)), Some(&second));
    assert!(active_term(&terms, day(1) + Duration::days(71)).is_none());
    assert_eq!(find_term_by_number(&terms, 2), Some(&second));
    assert!(find_term_by_number(&terms, 3).is_none());
  }

  #[test]
  fn committed_and_unassigned_goals() {
    let t = term(1, day(1));
    let second = assign(goal("Second", &[]), &t, 2);
    let first = assign(goal("First", &[]), &t, 1);
    let floating = goal("Floating", &[]);
    let goals = [second.clone(), floating.clone(), first.clone()];

    let committed = committed_goals(t.term.id, &goals);
    assert_eq!(committed, vec![&first, &second]);
    assert_eq!(unassigned_goals(&goals), vec![&floating]);
  }

  #[test]
  fn actions_are_filtered_by_term_dates() {
    let t = term(1, day(10));
    let before = action("Before", day(9), &[]);
    let during = action("During", day(20), &[]);
    let actions = [before, during.clone()];

    assert_eq!(actions_in_term(&t, &actions), vec![&during]);
  }

  #[test]
  fn term_progress_counts_days_and_goals() {
    let t = term(4, day(1));
    let goals = [assign(goal("Committed", &[]), &t, 1), goal("Floating", &[])];

    let p = term_progress(&t, &goals, day(1) + Duration::days(14));
    assert_eq!(p.term_number, 4);
    assert_eq!(p.phase, TermPhase::Active);
    assert_eq!(p.days_elapsed, 14);
    assert_eq!(p.days_remaining, 56);
    assert!((p.percent_time_complete - 0.2).abs() < 1e-9);
    assert_eq!(p.total_goals, 1);

    let before = term_progress(&t, &goals, day(1) - Duration::days(3));
    assert_eq!(before.phase, TermPhase::Upcoming);
    assert_eq!(before.days_elapsed, 0);
    assert_eq!(before.percent_time_complete, 0.0);

    let after = term_progress(&t, &goals, day(1) + Duration::days(100));
    assert_eq!(after.phase, TermPhase::Complete);
    assert_eq!(after.days_remaining, 0);
    assert_eq!(after.percent_time_complete, 1.0);
  }
}
