use telos_core::{Classify, FailureKind};
use uuid::Uuid;

use super::{count, store};
use crate::Error;

#[tokio::test]
async fn body_error_rolls_back_earlier_writes() {
  let s = store().await;

  let err = s
    .with_transaction("test", |tx| {
      tx.execute(
        "INSERT INTO measures (id, title, unit, measure_type, log_time)
         VALUES (?1, 'Distance', 'km', 'distance', '2025-10-10T00:00:00+00:00')",
        rusqlite::params![Uuid::new_v4().to_string()],
      )?;
      Err::<(), _>(Error::not_found("measure", Uuid::nil()))
    })
    .await
    .unwrap_err();

  assert_eq!(err.kind(), FailureKind::NotFound);
  assert_eq!(count(&s, "measures").await, 0);
}

#[tokio::test]
async fn committed_body_returns_its_value() {
  let s = store().await;

  let inserted = s
    .with_transaction("test", |tx| {
      Ok(tx.execute(
        "INSERT INTO measures (id, title, unit, measure_type, log_time)
         VALUES (?1, 'Distance', 'km', 'distance', '2025-10-10T00:00:00+00:00')",
        rusqlite::params![Uuid::new_v4().to_string()],
      )?)
    })
    .await
    .unwrap();

  assert_eq!(inserted, 1);
  assert_eq!(count(&s, "measures").await, 1);
}

#[tokio::test]
async fn foreign_keys_are_enforced() {
  let s = store().await;

  let err = s
    .with_transaction("test", |tx| {
      tx.execute(
        "INSERT INTO goal_terms (id, time_period_id, term_number, status)
         VALUES (?1, ?2, 1, 'planned')",
        rusqlite::params![Uuid::new_v4().to_string(), Uuid::new_v4().to_string()],
      )?;
      Ok(())
    })
    .await
    .unwrap_err();

  assert!(matches!(err, Error::ConstraintViolation(_)));
  assert_eq!(count(&s, "goal_terms").await, 0);
}
