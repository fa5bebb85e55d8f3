//! [`GraphCoordinator`]: one generic [`Coordinator`] for every entity family.
//!
//! Each family supplies its row-level graph operations through
//! [`GraphFamily`]; the coordinator wraps each of them in a single
//! [`SqliteStore::with_transaction`] call.

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Transaction};
use telos_core::{coordinator::Coordinator, ontology::EntityGraph};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{Error, Result, SqliteStore};

/// The row-level operations behind one entity family.
///
/// Write operations receive the open transaction and must issue parent
/// inserts before child inserts, and child deletes before parent deletes.
/// Returning `Err` from any of them rolls the whole transaction back.
pub trait GraphFamily: Send + Sync + 'static {
  /// Entity name used in logs and not-found errors.
  const NAME: &'static str;

  type Form: Send + 'static;
  type Graph: EntityGraph + Send + 'static;

  fn insert(tx: &Transaction<'_>, form: Self::Form, now: DateTime<Utc>) -> Result<Self::Graph>;

  fn update(
    tx: &Transaction<'_>,
    id: Uuid,
    form: Self::Form,
    now: DateTime<Utc>,
  ) -> Result<Self::Graph>;

  fn delete(tx: &Transaction<'_>, id: Uuid) -> Result<()>;

  fn fetch(conn: &Connection, id: Uuid) -> Result<Option<Self::Graph>>;

  fn list(conn: &Connection) -> Result<Vec<Self::Graph>>;
}

/// Coordinates atomic graph writes for family `F` against one store.
pub struct GraphCoordinator<F> {
  store:  SqliteStore,
  family: PhantomData<fn() -> F>,
}

impl<F> GraphCoordinator<F> {
  pub fn new(store: SqliteStore) -> Self {
    Self { store, family: PhantomData }
  }
}

impl<F> Clone for GraphCoordinator<F> {
  fn clone(&self) -> Self { Self::new(self.store.clone()) }
}

impl<F: GraphFamily> Coordinator for GraphCoordinator<F> {
  type Form = F::Form;
  type Graph = F::Graph;
  type Error = Error;

  #[instrument(skip_all, fields(family = F::NAME))]
  async fn create(&self, form: F::Form) -> Result<F::Graph> {
    let graph = self
      .store
      .with_transaction("create", move |tx| F::insert(tx, form, Utc::now()))
      .await?;
    info!(id = %graph.id(), "graph created");
    Ok(graph)
  }

  #[instrument(skip(self, form), fields(family = F::NAME))]
  async fn update(&self, id: Uuid, form: F::Form) -> Result<F::Graph> {
    let graph = self
      .store
      .with_transaction("update", move |tx| F::update(tx, id, form, Utc::now()))
      .await?;
    info!("graph updated");
    Ok(graph)
  }

  #[instrument(skip(self), fields(family = F::NAME))]
  async fn delete(&self, id: Uuid) -> Result<()> {
    self
      .store
      .with_transaction("delete", move |tx| F::delete(tx, id))
      .await?;
    info!("graph deleted");
    Ok(())
  }

  async fn fetch(&self, id: Uuid) -> Result<Option<F::Graph>> {
    self.store.read(move |conn| F::fetch(conn, id)).await
  }

  async fn list(&self) -> Result<Vec<F::Graph>> {
    self.store.read(F::list).await
  }
}
