//! The `Coordinator` trait: atomic create/update/delete of one entity graph.
//!
//! A coordinator trusts its caller: form data arrives already validated (see
//! [`crate::validate`]) and is only inspected to route inserts. Every write
//! operation runs as a single storage transaction, inserting parents before
//! children and deleting children before parents.
//!
//! Concurrent updates of the same graph are last-writer-wins; there is no
//! version check.

use std::future::Future;

use uuid::Uuid;

use crate::{
  action::{ActionFormData, ActionGraph},
  error::Classify,
  goal::{GoalFormData, GoalGraph},
  measure::{Measure, MeasureFormData},
  ontology::EntityGraph,
  term::{TimePeriodFormData, TimePeriodGraph},
  value::{PersonalValue, ValueFormData},
};

/// Atomic graph operations for one entity family.
///
/// Lifecycle per graph: `nonexistent → created → [updated]* → deleted`.
pub trait Coordinator: Send + Sync {
  type Form: Send + 'static;
  type Graph: EntityGraph + Send + 'static;
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  /// Insert the whole graph. On failure nothing is left behind.
  fn create(
    &self,
    form: Self::Form,
  ) -> impl Future<Output = Result<Self::Graph, Self::Error>> + Send + '_;

  /// Replace the mutable parts of the graph identified by `id`, keeping the
  /// abstraction's identifier and `log_time`. Fails with a not-found error if
  /// no such graph exists.
  fn update(
    &self,
    id: Uuid,
    form: Self::Form,
  ) -> impl Future<Output = Result<Self::Graph, Self::Error>> + Send + '_;

  /// Remove the graph in reverse dependency order. Fails with a not-found
  /// error if no such graph exists.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Load one graph. Returns `None` if not found.
  fn fetch(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Self::Graph>, Self::Error>> + Send + '_;

  /// Load every graph of the family, oldest first.
  fn list(&self) -> impl Future<Output = Result<Vec<Self::Graph>, Self::Error>> + Send + '_;
}

/// A backend able to hand out a coordinator for every family.
///
/// Higher layers (`telos-api`) depend on this abstraction, not on any
/// concrete backend.
pub trait Planner: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  fn measures(
    &self,
  ) -> impl Coordinator<Form = MeasureFormData, Graph = Measure, Error = Self::Error>
  + Clone
  + 'static;

  fn values(
    &self,
  ) -> impl Coordinator<Form = ValueFormData, Graph = PersonalValue, Error = Self::Error>
  + Clone
  + 'static;

  fn terms(
    &self,
  ) -> impl Coordinator<Form = TimePeriodFormData, Graph = TimePeriodGraph, Error = Self::Error>
  + Clone
  + 'static;

  fn goals(
    &self,
  ) -> impl Coordinator<Form = GoalFormData, Graph = GoalGraph, Error = Self::Error>
  + Clone
  + 'static;

  fn actions(
    &self,
  ) -> impl Coordinator<Form = ActionFormData, Graph = ActionGraph, Error = Self::Error>
  + Clone
  + 'static;
}
