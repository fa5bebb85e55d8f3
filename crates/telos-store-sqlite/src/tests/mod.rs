//! Integration tests for the coordinators against an in-memory database.

mod action;
mod goal;
mod transaction;

use chrono::{TimeZone, Utc};
use telos_core::{
  coordinator::{Coordinator, Planner},
  measure::{Measure, MeasureFormData},
  term::{TimePeriodFormData, TimePeriodGraph},
  value::{PersonalValue, ValueFormData, ValueLevel},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// Row count of `table`, read outside any coordinator.
async fn count(s: &SqliteStore, table: &'static str) -> i64 {
  s.read(move |conn| {
    Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?)
  })
  .await
  .unwrap()
}

async fn row_exists(s: &SqliteStore, table: &'static str, id: Uuid) -> bool {
  s.read(move |conn| {
    let n: i64 = conn.query_row(
      &format!("SELECT COUNT(*) FROM {table} WHERE id = ?1"),
      rusqlite::params![id.hyphenated().to_string()],
      |row| row.get(0),
    )?;
    Ok(n > 0)
  })
  .await
  .unwrap()
}

async fn km(s: &SqliteStore) -> Measure {
  s.measures()
    .create(MeasureFormData::new("Distance", "km", "distance"))
    .await
    .unwrap()
}

async fn hours(s: &SqliteStore) -> Measure {
  s.measures()
    .create(MeasureFormData::new("Time", "hours", "time"))
    .await
    .unwrap()
}

async fn value(s: &SqliteStore, title: &str) -> PersonalValue {
  s.values()
    .create(ValueFormData::new(title, ValueLevel::Major))
    .await
    .unwrap()
}

async fn term(s: &SqliteStore, term_number: u32) -> TimePeriodGraph {
  let start = Utc.with_ymd_and_hms(2025, 10, 10, 0, 0, 0).unwrap();
  s.terms()
    .create(TimePeriodFormData::ten_week_term(term_number, start))
    .await
    .unwrap()
}
