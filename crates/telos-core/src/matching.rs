//! Inferring which actions feed which goals.
//!
//! An action matches a goal when it was logged inside the goal's date window
//! and measured something the goal targets. If the action's title or
//! description also mentions a word from the goal's title the match is
//! confident; a unit-only match stays ambiguous until the user confirms it.
//! Pairs already linked by a contribution are never suggested again.

use serde::Serialize;
use uuid::Uuid;

use crate::{
  action::{Action, ActionGraph, AssignmentMethod, GoalContribution},
  goal::{Goal, GoalGraph},
};

/// Confidence of a match backed by both a unit and a keyword.
pub const KEYWORD_CONFIDENCE: f64 = 0.9;
/// Confidence of a match backed by a shared unit alone.
pub const UNIT_ONLY_CONFIDENCE: f64 = 0.5;
/// Default cut-off between confident and ambiguous matches.
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Title words shorter than this are not used as keywords.
const MIN_KEYWORD_LEN: usize = 4;

/// A suggested link from an action to a goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferredMatch {
  pub action_id:           Uuid,
  pub goal_id:             Uuid,
  /// The targeted measure the action was measured in.
  pub measure_id:          Uuid,
  pub contribution_amount: f64,
  pub confidence:          f64,
}

impl InferredMatch {
  /// The contribution to add to the action's form to record this match.
  pub fn contribution(&self) -> GoalContribution {
    GoalContribution {
      goal_id:             self.goal_id,
      contribution_amount: Some(self.contribution_amount),
      measure_id:          Some(self.measure_id),
      assignment_method:   AssignmentMethod::AutoInferred,
      confidence:          self.confidence,
    }
  }

  /// As [`contribution`](Self::contribution), once the user has accepted it.
  pub fn confirm(&self) -> GoalContribution {
    GoalContribution {
      assignment_method: AssignmentMethod::UserConfirmed,
      confidence: 1.0,
      ..self.contribution()
    }
  }
}

/// Whether `action` was logged between the goal's start and target dates.
/// A missing bound is open.
pub fn within_goal_window(action: &Action, goal: &Goal) -> bool {
  goal.start_date.is_none_or(|start| start <= action.log_time)
    && goal.target_date.is_none_or(|end| action.log_time <= end)
}

/// Every unlinked (action, goal) pair that matches, in action-major order.
pub fn infer_matches(actions: &[ActionGraph], goals: &[GoalGraph]) -> Vec<InferredMatch> {
  let keywords: Vec<Vec<String>> = goals.iter().map(|g| keywords(&g.expectation.title)).collect();

  let mut matches = Vec::new();
  for action in actions {
    let text = searchable_text(&action.action);
    for (goal, keywords) in goals.iter().zip(&keywords) {
      if action.contributions.iter().any(|c| c.goal_id == goal.goal.id)
        || !within_goal_window(&action.action, &goal.goal)
      {
        continue;
      }

      let Some((measure_id, amount)) = goal.measures.iter().find_map(|target| {
        action
          .measurements
          .iter()
          .find(|m| m.measure_id == target.measure_id)
          .map(|m| (m.measure_id, m.value))
      }) else {
        continue;
      };

      let confidence = if keywords.iter().any(|k| text.contains(k.as_str())) {
        KEYWORD_CONFIDENCE
      } else {
        UNIT_ONLY_CONFIDENCE
      };

      matches.push(InferredMatch {
        action_id: action.action.id,
        goal_id: goal.goal.id,
        measure_id,
        contribution_amount: amount,
        confidence,
      });
    }
  }
  matches
}

/// Split into `(confident, ambiguous)` at `threshold`, inclusive.
pub fn partition_by_confidence(
  matches: Vec<InferredMatch>,
  threshold: f64,
) -> (Vec<InferredMatch>, Vec<InferredMatch>) {
  matches.into_iter().partition(|m| m.confidence >= threshold)
}

fn keywords(title: &str) -> Vec<String> {
  title
    .split(|c: char| !c.is_alphanumeric())
    .filter(|w| w.chars().count() >= MIN_KEYWORD_LEN)
    .map(str::to_lowercase)
    .collect()
}

fn searchable_text(action: &Action) -> String {
  let mut text = action.title.to_lowercase();
  if let Some(description) = &action.description {
    text.push(' ');
    text.push_str(&description.to_lowercase());
  }
  text
}
