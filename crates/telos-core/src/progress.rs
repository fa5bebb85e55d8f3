//! Goal progress derived from logged actions.
//!
//! Pure functions over graphs already loaded from a store. Progress is
//! tracked per measure target: every action linked to a goal through an
//! [`ActionGoalContribution`] credits an amount toward each target whose
//! measure it covers.
//!
//! An explicit contribution amount is credited when its unit is the
//! target's measure, or when it carries no unit and the goal tracks a single
//! measure. Otherwise the action's own measurement in the target's measure is
//! credited, if it has one.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::{
  action::{ActionGoalContribution, ActionGraph},
  goal::GoalGraph,
};

/// Percentage of a target above which it counts as overachieved.
pub const OVERACHIEVED_PERCENT: f64 = 110.0;

type Link<'a> = (&'a ActionGraph, &'a ActionGoalContribution);

// ─── Types ───────────────────────────────────────────────────────────────────

/// Progress toward one `ExpectationMeasure` target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetProgress {
  pub measure_id: Uuid,
  pub target:     f64,
  pub total:      f64,
  /// May exceed 100. Zero when the target is not positive.
  pub percent:    f64,
  /// Never negative.
  pub remaining:  f64,
  pub complete:   bool,
  /// Actions credited toward this target.
  pub actions:    Vec<Uuid>,
}

impl TargetProgress {
  fn new(measure_id: Uuid, target: f64, total: f64, actions: Vec<Uuid>) -> Self {
    let percent = if target > 0.0 { total / target * 100.0 } else { 0.0 };
    Self {
      measure_id,
      target,
      total,
      percent,
      remaining: (target - total).max(0.0),
      complete: total >= target,
      actions,
    }
  }

  pub fn is_overachieved(&self) -> bool { self.percent > OVERACHIEVED_PERCENT }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
  pub goal_id:              Uuid,
  pub title:                String,
  pub targets:              Vec<TargetProgress>,
  /// Actions linked to the goal, whether or not they were credited.
  pub contributing_actions: usize,
  /// Mean of the target percentages; zero for a goal without targets.
  pub percent:              f64,
  /// Every target met. A goal without targets is never complete.
  pub complete:             bool,
}

/// Totals across a set of goals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSummary {
  pub total_goals:          usize,
  pub complete_goals:       usize,
  pub in_progress_goals:    usize,
  pub average_percent:      f64,
  pub contributing_actions: usize,
}

// ─── Calculation ─────────────────────────────────────────────────────────────

/// Progress of `goal` from the contributions recorded on `actions`.
pub fn goal_progress(goal: &GoalGraph, actions: &[ActionGraph]) -> GoalProgress {
  let links: Vec<Link<'_>> = actions
    .iter()
    .flat_map(|action| {
      action
        .contributions
        .iter()
        .filter(|c| c.goal_id == goal.goal.id)
        .map(move |c| (action, c))
    })
    .collect();
  progress_from_links(goal, &links)
}

/// Progress of every goal, in input order. Contributions are indexed once.
pub fn all_goal_progress(goals: &[GoalGraph], actions: &[ActionGraph]) -> Vec<GoalProgress> {
  let mut by_goal: HashMap<Uuid, Vec<Link<'_>>> = HashMap::new();
  for action in actions {
    for c in &action.contributions {
      by_goal.entry(c.goal_id).or_default().push((action, c));
    }
  }

  goals
    .iter()
    .map(|goal| {
      let links = by_goal.get(&goal.goal.id).map(Vec::as_slice).unwrap_or_default();
      progress_from_links(goal, links)
    })
    .collect()
}

pub fn summarize(progress: &[GoalProgress]) -> ProgressSummary {
  let complete_goals = progress.iter().filter(|p| p.complete).count();
  let average_percent = if progress.is_empty() {
    0.0
  } else {
    progress.iter().map(|p| p.percent).sum::<f64>() / progress.len() as f64
  };

  ProgressSummary {
    total_goals: progress.len(),
    complete_goals,
    in_progress_goals: progress.len() - complete_goals,
    average_percent,
    contributing_actions: progress.iter().map(|p| p.contributing_actions).sum(),
  }
}

fn progress_from_links(goal: &GoalGraph, links: &[Link<'_>]) -> GoalProgress {
  let single_target = goal.measures.len() == 1;

  let targets: Vec<TargetProgress> = goal
    .measures
    .iter()
    .map(|target| {
      let mut total = 0.0;
      let mut actions = Vec::new();
      for (action, contribution) in links {
        if let Some(amount) = credited(action, contribution, target.measure_id, single_target) {
          total += amount;
          actions.push(action.action.id);
        }
      }
      TargetProgress::new(target.measure_id, target.target_value, total, actions)
    })
    .collect();

  let percent = if targets.is_empty() {
    0.0
  } else {
    targets.iter().map(|t| t.percent).sum::<f64>() / targets.len() as f64
  };

  GoalProgress {
    goal_id: goal.goal.id,
    title: goal.expectation.title.clone(),
    complete: !targets.is_empty() && targets.iter().all(|t| t.complete),
    contributing_actions: links.len(),
    percent,
    targets,
  }
}

fn credited(
  action: &ActionGraph,
  contribution: &ActionGoalContribution,
  measure_id: Uuid,
  single_target: bool,
) -> Option<f64> {
  match (contribution.contribution_amount, contribution.measure_id) {
    (Some(amount), Some(unit)) if unit == measure_id => Some(amount),
    (Some(amount), None) if single_target => Some(amount),
    _ => action
      .measurements
      .iter()
      .find(|m| m.measure_id == measure_id)
      .map(|m| m.value),
  }
}


#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::{
    fixtures::{action, day, goal, link},
    *,
  };

  #[test]
  fn measurements_of_linked_actions_are_summed() {
    let km = Uuid::new_v4();
    let g = goal("Run 120km", &[(km, 120.0)]);
    let actions = vec![
      link(action("Morning run", day(2), &[(km, 5.0)]), g.goal.id, None, None),
      link(action("Long run", day(3), &[(km, 15.0)]), g.goal.id, None, None),
      action("Unlinked run", day(4), &[(km, 50.0)]),
    ];

    let p = goal_progress(&g, &actions);
    assert_eq!(p.contributing_actions, 2);
    assert_eq!(p.targets[0].total, 20.0);
    assert_eq!(p.targets[0].remaining, 100.0);
    assert!(!p.complete);
    assert!((p.percent - 100.0 / 6.0).abs() < 1e-9);
  }

  #[test]
  fn explicit_amount_in_the_target_unit_wins() {
    let km = Uuid::new_v4();
    let g = goal("Run 10km", &[(km, 10.0)]);
    let actions = vec![link(action("Run", day(2), &[(km, 8.0)]), g.goal.id, Some(12.0), Some(km))];

    let p = goal_progress(&g, &actions);
    assert_eq!(p.targets[0].total, 12.0);
    assert_eq!(p.targets[0].remaining, 0.0);
    assert!(p.complete);
    assert!(p.targets[0].is_overachieved());
  }

  #[test]
  fn unitless_amount_only_counts_for_single_target_goals() {
    let km = Uuid::new_v4();
    let hours = Uuid::new_v4();

    let single = goal("Run 10km", &[(km, 10.0)]);
    let p = goal_progress(&single, &[link(action("Run", day(2), &[]), single.goal.id, Some(4.0), None)]);
    assert_eq!(p.targets[0].total, 4.0);

    let double = goal("Train", &[(km, 10.0), (hours, 5.0)]);
    let p = goal_progress(
      &double,
      &[link(action("Run", day(2), &[(hours, 1.0)]), double.goal.id, Some(4.0), None)],
    );
    assert_eq!(p.targets[0].total, 0.0);
    assert_eq!(p.targets[1].total, 1.0);
    assert!(p.targets[0].actions.is_empty());
  }

  #[test]
  fn goal_without_targets_is_never_complete() {
    let g = goal("Be kinder", &[]);
    let p = goal_progress(&g, &[link(action("Helped", day(2), &[]), g.goal.id, Some(1.0), None)]);
    assert_eq!(p.contributing_actions, 1);
    assert_eq!(p.percent, 0.0);
    assert!(!p.complete);
  }

  #[test]
  fn all_goal_progress_keeps_input_order_and_summarizes() {
    let km = Uuid::new_v4();
    let done = goal("Run 5km", &[(km, 5.0)]);
    let open = goal("Run 50km", &[(km, 50.0)]);
    let run = action("Run", day(2), &[(km, 5.0)]);
    let run = link(link(run, done.goal.id, None, None), open.goal.id, None, None);

    let all = all_goal_progress(&[open.clone(), done.clone()], &[run]);
    assert_eq!(all[0].goal_id, open.goal.id);
    assert_eq!(all[1].goal_id, done.goal.id);
    assert!(all[1].complete);

    let summary = summarize(&all);
    assert_eq!(summary.total_goals, 2);
    assert_eq!(summary.complete_goals, 1);
    assert_eq!(summary.in_progress_goals, 1);
    assert_eq!(summary.contributing_actions, 2);
    assert!((summary.average_percent - 55.0).abs() < 1e-9);
  }

  #[test]
  fn empty_summary_is_zeroed() {
    let summary = summarize(&[]);
    assert_eq!(summary.total_goals, 0);
    assert_eq!(summary.average_percent, 0.0);
  }
}
