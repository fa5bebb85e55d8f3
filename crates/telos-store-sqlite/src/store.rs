//! [`SqliteStore`]: the storage primitive every coordinator writes through.

use std::path::Path;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use telos_core::{
  action::{ActionFormData, ActionGraph},
  coordinator::{Coordinator, Planner},
  goal::{GoalFormData, GoalGraph},
  measure::{Measure, MeasureFormData},
  term::{TimePeriodFormData, TimePeriodGraph},
  value::{PersonalValue, ValueFormData},
};
use tracing::{debug, warn};

use crate::{
  Error, Result,
  coordinator::GraphCoordinator,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Telos store backed by a single SQLite file.
///
/// The wrapped [`tokio_rusqlite::Connection`] owns the only
/// `rusqlite::Connection` on a dedicated thread and runs submitted closures
/// one at a time. That thread is the single writer: two transactions against
/// one store never interleave, and nobody using this handle can observe a
/// half-written graph.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `body` inside one `BEGIN IMMEDIATE … COMMIT` transaction.
  ///
  /// Every write `body` issues commits together if it returns `Ok`. If it
  /// returns `Err`, or any statement fails, the transaction is rolled back
  /// and the error is returned unchanged. The body runs to completion on the
  /// connection thread even if the returned future is dropped.
  pub async fn with_transaction<T, F>(&self, op: &'static str, body: F) -> Result<T>
  where
    F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        match body(&tx) {
          Ok(value) => {
            tx.commit()?;
            Ok(Ok(value))
          }
          // Dropping `tx` rolls it back.
          Err(e) => Ok(Err(e)),
        }
      })
      .await
      .map_err(Error::from)
      .and_then(|inner| inner);

    match &outcome {
      Ok(_) => debug!(op, "transaction committed"),
      Err(e) => warn!(op, error = %e, "transaction rolled back"),
    }
    outcome
  }

  /// Run `body` against a consistent read snapshot.
  pub async fn read<T, F>(&self, body: F) -> Result<T>
  where
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        Ok(body(&tx))
      })
      .await?
  }
}

// ─── Planner impl ────────────────────────────────────────────────────────────

impl Planner for SqliteStore {
  type Error = Error;

  fn measures(
    &self,
  ) -> impl Coordinator<Form = MeasureFormData, Graph = Measure, Error = Error> + Clone + 'static
  {
    GraphCoordinator::<crate::families::MeasureFamily>::new(self.clone())
  }

  fn values(
    &self,
  ) -> impl Coordinator<Form = ValueFormData, Graph = PersonalValue, Error = Error> + Clone + 'static
  {
    GraphCoordinator::<crate::families::ValueFamily>::new(self.clone())
  }

  fn terms(
    &self,
  ) -> impl Coordinator<Form = TimePeriodFormData, Graph = TimePeriodGraph, Error = Error>
  + Clone
  + 'static {
    GraphCoordinator::<crate::families::TimePeriodFamily>::new(self.clone())
  }

  fn goals(
    &self,
  ) -> impl Coordinator<Form = GoalFormData, Graph = GoalGraph, Error = Error> + Clone + 'static {
    GraphCoordinator::<crate::families::GoalFamily>::new(self.clone())
  }

  fn actions(
    &self,
  ) -> impl Coordinator<Form = ActionFormData, Graph = ActionGraph, Error = Error> + Clone + 'static
  {
    GraphCoordinator::<crate::families::ActionFamily>::new(self.clone())
  }
}
