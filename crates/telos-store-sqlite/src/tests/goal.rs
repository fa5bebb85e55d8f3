use chrono::{TimeZone, Utc};
use telos_core::{
  Classify, FailureKind,
  action::ActionFormData,
  coordinator::{Coordinator, Planner},
  goal::{GoalFormData, GoalKind},
  ontology::EntityGraph,
};
use uuid::Uuid;

use super::{count, hours, km, row_exists, store, term, value};
use crate::{Error, SqliteStore};

const GOAL_TABLES: [&str; 5] = [
  "expectations",
  "goals",
  "expectation_measures",
  "goal_relevances",
  "term_goal_assignments",
];

async fn assert_no_goal_rows(s: &SqliteStore) {
  for table in GOAL_TABLES {
    assert_eq!(count(s, table).await, 0, "rows left in {table}");
  }
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_goal_with_measure_target() {
  let s = store().await;
  let km = km(&s).await;

  let graph = s
    .goals()
    .create(GoalFormData::new("Run 100km").with_target(km.id, 100.0))
    .await
    .unwrap();
  assert_eq!(graph.goal.expectation_id, graph.expectation.id);

  let fetched = s.goals().fetch(graph.id()).await.unwrap().unwrap();
  assert_eq!(fetched.expectation.title, "Run 100km");
  assert_eq!(fetched.measures.len(), 1);
  assert_eq!(fetched.measures[0].measure_id, km.id);
  assert_eq!(fetched.measures[0].target_value, 100.0);
  assert!(fetched.relevances.is_empty());
  assert!(fetched.term_assignment.is_none());
  assert_eq!(fetched, graph);
}

#[tokio::test]
async fn create_with_unknown_measure_is_rejected() {
  let s = store().await;

  let err = s
    .goals()
    .create(GoalFormData::new("Run 100km").with_target(Uuid::new_v4(), 100.0))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), FailureKind::ConstraintViolation);

  assert!(s.goals().list().await.unwrap().is_empty());
  assert_no_goal_rows(&s).await;
}

#[tokio::test]
async fn failing_last_composite_leaves_no_rows() {
  let s = store().await;
  let km = km(&s).await;
  let health = value(&s, "Health").await;

  // Measure and relevance rows are written before the bogus term assignment.
  let form = GoalFormData::new("Run 100km")
    .with_target(km.id, 100.0)
    .with_value(health.id, 8)
    .in_term(Uuid::new_v4());
  let err = s.goals().create(form).await.unwrap_err();
  assert!(matches!(err, Error::ConstraintViolation(_)));

  assert_no_goal_rows(&s).await;
  // Referenced rows are untouched.
  assert_eq!(count(&s, "measures").await, 1);
  assert_eq!(count(&s, "personal_values").await, 1);
}

#[tokio::test]
async fn repeated_value_in_form_is_a_constraint_violation() {
  let s = store().await;
  let health = value(&s, "Health").await;

  let form = GoalFormData::new("Sleep more")
    .with_value(health.id, 8)
    .with_value(health.id, 3);
  let err = s.goals().create(form).await.unwrap_err();
  assert_eq!(err.kind(), FailureKind::ConstraintViolation);
  assert_no_goal_rows(&s).await;
}

#[tokio::test]
async fn smart_goal_fields_are_stored() {
  let s = store().await;
  let km = km(&s).await;
  let start = Utc.with_ymd_and_hms(2025, 10, 10, 0, 0, 0).unwrap();
  let target = Utc.with_ymd_and_hms(2025, 12, 19, 0, 0, 0).unwrap();

  let mut form = GoalFormData::new("Run 100km").with_target(km.id, 100.0);
  form.kind = GoalKind::SmartGoal;
  form.start_date = Some(start);
  form.target_date = Some(target);
  form.action_plan = Some("Three runs a week".into());
  form.expected_term_length = Some(1);

  let graph = s.goals().create(form).await.unwrap();
  let fetched = s.goals().fetch(graph.goal.id).await.unwrap().unwrap();
  assert_eq!(fetched.goal.kind, GoalKind::SmartGoal);
  assert_eq!(fetched.goal.start_date, Some(start));
  assert_eq!(fetched.goal.target_date, Some(target));
  assert_eq!(fetched.goal.action_plan.as_deref(), Some("Three runs a week"));
  assert_eq!(fetched.goal.expected_term_length, Some(1));
}

#[tokio::test]
async fn recreate_after_delete_gets_new_id() {
  let s = store().await;

  let first = s.goals().create(GoalFormData::new("Read")).await.unwrap();
  s.goals().delete(first.id()).await.unwrap();
  let second = s.goals().create(GoalFormData::new("Read")).await.unwrap();

  assert_ne!(first.id(), second.id());
  assert_ne!(first.expectation.id, second.expectation.id);
  assert_eq!(s.goals().list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn list_is_oldest_first() {
  let s = store().await;
  for title in ["first", "second", "third"] {
    s.goals().create(GoalFormData::new(title)).await.unwrap();
  }

  let titles: Vec<String> = s
    .goals()
    .list()
    .await
    .unwrap()
    .into_iter()
    .map(|g| g.expectation.title)
    .collect();
  assert_eq!(titles, ["first", "second", "third"]);
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_preserves_identity() {
  let s = store().await;
  let km = km(&s).await;
  let created = s
    .goals()
    .create(GoalFormData::new("Run 100km").with_target(km.id, 100.0))
    .await
    .unwrap();

  let mut form = GoalFormData::new("Run 120km").with_target(km.id, 120.0);
  form.importance = 9;
  let updated = s.goals().update(created.id(), form).await.unwrap();

  assert_eq!(updated.anchor(), created.anchor());
  assert_eq!(updated.goal.id, created.goal.id);
  assert_eq!(updated.expectation.title, "Run 120km");
  assert_eq!(updated.expectation.importance, 9);

  let fetched = s.goals().fetch(created.id()).await.unwrap().unwrap();
  assert_eq!(fetched, updated);
}

#[tokio::test]
async fn update_keeps_matching_composites() {
  let s = store().await;
  let km = km(&s).await;
  let hours = hours(&s).await;
  let health = value(&s, "Health").await;
  let created = s
    .goals()
    .create(
      GoalFormData::new("Run 100km")
        .with_target(km.id, 100.0)
        .with_value(health.id, 8),
    )
    .await
    .unwrap();
  let target = created.measures[0].clone();
  let relevance = created.relevances[0].clone();

  let form = GoalFormData::new("Run 100km")
    .with_target(km.id, 120.0)
    .with_target(hours.id, 10.0)
    .with_value(health.id, 8);
  let updated = s.goals().update(created.id(), form).await.unwrap();

  assert_eq!(updated.measures.len(), 2);
  // Same measure: row kept, scalar changed in place.
  assert_eq!(updated.measures[0].id, target.id);
  assert_eq!(updated.measures[0].created_at, target.created_at);
  assert_eq!(updated.measures[0].target_value, 120.0);
  assert_eq!(updated.measures[1].measure_id, hours.id);
  // Unchanged relevance is untouched.
  assert_eq!(updated.relevances, vec![relevance]);
}

#[tokio::test]
async fn update_removes_dropped_composites() {
  let s = store().await;
  let km = km(&s).await;
  let health = value(&s, "Health").await;
  let created = s
    .goals()
    .create(
      GoalFormData::new("Run 100km")
        .with_target(km.id, 100.0)
        .with_value(health.id, 8),
    )
    .await
    .unwrap();

  let updated = s
    .goals()
    .update(created.id(), GoalFormData::new("Run 100km"))
    .await
    .unwrap();
  assert!(updated.measures.is_empty());
  assert!(updated.relevances.is_empty());
  assert!(updated.composite_ids().is_empty());
  assert_eq!(count(&s, "expectation_measures").await, 0);
  assert_eq!(count(&s, "goal_relevances").await, 0);
}

#[tokio::test]
async fn failed_update_rolls_back() {
  let s = store().await;
  let km = km(&s).await;
  let created = s
    .goals()
    .create(GoalFormData::new("Run 100km").with_target(km.id, 100.0))
    .await
    .unwrap();

  let form = GoalFormData::new("Run 120km").with_value(Uuid::new_v4(), 5);
  let err = s.goals().update(created.id(), form).await.unwrap_err();
  assert_eq!(err.kind(), FailureKind::ConstraintViolation);

  let fetched = s.goals().fetch(created.id()).await.unwrap().unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn update_unknown_goal_is_not_found() {
  let s = store().await;

  let err = s
    .goals()
    .update(Uuid::new_v4(), GoalFormData::new("Ghost"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { entity: "goal", .. }));
  assert_eq!(err.kind(), FailureKind::NotFound);
  assert_no_goal_rows(&s).await;
}

// ─── Terms ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn term_assignments_are_appended_in_order() {
  let s = store().await;
  let fall = term(&s, 1).await;

  let a = s
    .goals()
    .create(GoalFormData::new("a").in_term(fall.id()))
    .await
    .unwrap();
  let b = s
    .goals()
    .create(GoalFormData::new("b").in_term(fall.id()))
    .await
    .unwrap();

  assert_eq!(a.term_assignment.unwrap().assignment_order, 1);
  assert_eq!(b.term_assignment.unwrap().assignment_order, 2);
}

#[tokio::test]
async fn moving_goal_between_terms() {
  let s = store().await;
  let fall = term(&s, 1).await;
  let winter = term(&s, 2).await;
  let created = s
    .goals()
    .create(GoalFormData::new("Read").in_term(fall.id()))
    .await
    .unwrap();
  let original = created.term_assignment.clone().unwrap();

  // Same term: assignment untouched.
  let same = s
    .goals()
    .update(created.id(), GoalFormData::new("Read more").in_term(fall.id()))
    .await
    .unwrap();
  assert_eq!(same.term_assignment, Some(original.clone()));

  let moved = s
    .goals()
    .update(created.id(), GoalFormData::new("Read more").in_term(winter.id()))
    .await
    .unwrap();
  let assignment = moved.term_assignment.unwrap();
  assert_eq!(assignment.term_id, winter.id());
  assert_ne!(assignment.id, original.id);
  assert!(!row_exists(&s, "term_goal_assignments", original.id).await);

  let unassigned = s
    .goals()
    .update(created.id(), GoalFormData::new("Read more"))
    .await
    .unwrap();
  assert!(unassigned.term_assignment.is_none());
  assert_eq!(count(&s, "term_goal_assignments").await, 0);
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_removes_every_row_of_the_graph() {
  let s = store().await;
  let km = km(&s).await;
  let health = value(&s, "Health").await;
  let growth = value(&s, "Growth").await;
  let fall = term(&s, 1).await;

  let created = s
    .goals()
    .create(
      GoalFormData::new("Run 100km")
        .with_target(km.id, 100.0)
        .with_value(health.id, 8)
        .with_value(growth.id, 4)
        .in_term(fall.id()),
    )
    .await
    .unwrap();
  assert_eq!(created.composite_ids().len(), 4);

  s.goals().delete(created.id()).await.unwrap();

  for relevance in &created.relevances {
    assert!(!row_exists(&s, "goal_relevances", relevance.id).await);
  }
  assert!(s.goals().fetch(created.id()).await.unwrap().is_none());
  assert!(!row_exists(&s, "goals", created.goal.id).await);
  assert!(!row_exists(&s, "expectations", created.expectation.id).await);
  assert_no_goal_rows(&s).await;

  // Endpoints on the other side survive.
  assert!(s.values().fetch(health.id).await.unwrap().is_some());
  assert!(s.terms().fetch(fall.id()).await.unwrap().is_some());
  assert!(s.measures().fetch(km.id).await.unwrap().is_some());
}

#[tokio::test]
async fn delete_clears_action_contributions() {
  let s = store().await;
  let goal = s.goals().create(GoalFormData::new("Read")).await.unwrap();
  let action = s
    .actions()
    .create(ActionFormData::new("Read a chapter").contributing_to(goal.id(), None))
    .await
    .unwrap();

  s.goals().delete(goal.id()).await.unwrap();

  let action = s.actions().fetch(action.id()).await.unwrap().unwrap();
  assert!(action.contributions.is_empty());
  assert_eq!(count(&s, "action_goal_contributions").await, 0);
}

#[tokio::test]
async fn delete_unknown_goal_is_not_found() {
  let s = store().await;
  s.goals().create(GoalFormData::new("Keep me")).await.unwrap();

  let err = s.goals().delete(Uuid::new_v4()).await.unwrap_err();
  assert_eq!(err.kind(), FailureKind::NotFound);
  assert_eq!(count(&s, "goals").await, 1);
}
