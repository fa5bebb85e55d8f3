use chrono::{TimeZone, Utc};
use telos_core::{
  Classify, FailureKind,
  action::{ActionFormData, AssignmentMethod, GoalContribution},
  coordinator::{Coordinator, Planner},
  goal::GoalFormData,
  ontology::EntityGraph,
};
use uuid::Uuid;

use super::{count, hours, km, row_exists, store};

#[tokio::test]
async fn create_action_with_measurement_and_contribution() {
  let s = store().await;
  let km = km(&s).await;
  let goal = s
    .goals()
    .create(GoalFormData::new("Run 100km").with_target(km.id, 100.0))
    .await
    .unwrap();

  let mut form = ActionFormData::new("Morning run")
    .with_measurement(km.id, 5.2)
    .contributing_to(goal.id(), Some(5.2));
  form.duration_minutes = Some(32.5);
  form.start_time = Some(Utc.with_ymd_and_hms(2025, 10, 11, 6, 30, 0).unwrap());

  let graph = s.actions().create(form).await.unwrap();
  assert_eq!(graph.measurements[0].action_id, graph.action.id);
  assert_eq!(graph.contributions[0].assignment_method, AssignmentMethod::Manual);
  assert_eq!(graph.contributions[0].confidence, 1.0);

  let fetched = s.actions().fetch(graph.id()).await.unwrap().unwrap();
  assert_eq!(fetched, graph);
  assert_eq!(fetched.action.duration_minutes, Some(32.5));
}

#[tokio::test]
async fn contribution_to_unknown_goal_is_rejected() {
  let s = store().await;
  let km = km(&s).await;

  let form = ActionFormData::new("Morning run")
    .with_measurement(km.id, 5.2)
    .contributing_to(Uuid::new_v4(), None);
  let err = s.actions().create(form).await.unwrap_err();
  assert_eq!(err.kind(), FailureKind::ConstraintViolation);

  assert_eq!(count(&s, "actions").await, 0);
  assert_eq!(count(&s, "measured_actions").await, 0);
}

#[tokio::test]
async fn update_reconciles_measurements_and_contributions() {
  let s = store().await;
  let km = km(&s).await;
  let hours = hours(&s).await;
  let run = s.goals().create(GoalFormData::new("Run")).await.unwrap();
  let rest = s.goals().create(GoalFormData::new("Rest")).await.unwrap();

  let created = s
    .actions()
    .create(
      ActionFormData::new("Morning run")
        .with_measurement(km.id, 5.0)
        .contributing_to(run.id(), Some(5.0))
        .contributing_to(rest.id(), None),
    )
    .await
    .unwrap();
  let run_contribution = created.contributions[0].clone();
  let rest_contribution = created.contributions[1].clone();

  let mut form = ActionFormData::new("Morning run")
    .with_measurement(km.id, 5.5)
    .with_measurement(hours.id, 0.5);
  form.contributions.push(GoalContribution {
    goal_id:             run.id(),
    contribution_amount: Some(5.5),
    measure_id:          Some(km.id),
    assignment_method:   AssignmentMethod::UserConfirmed,
    confidence:          0.9,
  });
  let updated = s.actions().update(created.id(), form).await.unwrap();

  assert_eq!(updated.action.id, created.action.id);
  assert_eq!(updated.action.log_time, created.action.log_time);

  assert_eq!(updated.measurements.len(), 2);
  assert_eq!(updated.measurements[0].id, created.measurements[0].id);
  assert_eq!(updated.measurements[0].value, 5.5);

  assert_eq!(updated.contributions.len(), 1);
  let contribution = &updated.contributions[0];
  assert_eq!(contribution.id, run_contribution.id);
  assert_eq!(contribution.created_at, run_contribution.created_at);
  assert_eq!(contribution.measure_id, Some(km.id));
  assert_eq!(contribution.assignment_method, AssignmentMethod::UserConfirmed);
  assert_eq!(contribution.confidence, 0.9);
  assert!(!row_exists(&s, "action_goal_contributions", rest_contribution.id).await);
}

#[tokio::test]
async fn delete_action_removes_composites() {
  let s = store().await;
  let km = km(&s).await;
  let goal = s.goals().create(GoalFormData::new("Run")).await.unwrap();
  let created = s
    .actions()
    .create(
      ActionFormData::new("Morning run")
        .with_measurement(km.id, 5.0)
        .contributing_to(goal.id(), None),
    )
    .await
    .unwrap();

  s.actions().delete(created.id()).await.unwrap();

  for id in created.composite_ids() {
    assert!(!row_exists(&s, "measured_actions", id).await);
    assert!(!row_exists(&s, "action_goal_contributions", id).await);
  }
  assert!(s.actions().fetch(created.id()).await.unwrap().is_none());
  assert!(s.goals().fetch(goal.id()).await.unwrap().is_some());
}

#[tokio::test]
async fn update_and_delete_unknown_action_are_not_found() {
  let s = store().await;

  let err = s
    .actions()
    .update(Uuid::new_v4(), ActionFormData::new("Ghost"))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), FailureKind::NotFound);

  let err = s.actions().delete(Uuid::new_v4()).await.unwrap_err();
  assert_eq!(err.kind(), FailureKind::NotFound);
}
