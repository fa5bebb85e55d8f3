//! The three ontological tiers every persisted record belongs to.
//!
//! - An **abstraction** describes what could exist ("the idea of running
//!   100km"). Its identifier and `log_time` never change once assigned.
//! - A **basic** is a concrete instance pointing at exactly one abstraction.
//!   That foreign key is fixed at creation.
//! - A **composite** is a junction row joining two records, carrying only
//!   relationship-scoped data.
//!
//! Entities are plain records. Derived business logic (progress, term
//! activity) and field validation live elsewhere.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Shape contracts ─────────────────────────────────────────────────────────

pub trait Abstraction {
  fn id(&self) -> Uuid;
  fn title(&self) -> &str;
  /// Creation timestamp; survives every update of the surrounding graph.
  fn log_time(&self) -> DateTime<Utc>;
}

pub trait Basic {
  fn id(&self) -> Uuid;
  fn abstraction_id(&self) -> Uuid;
}

pub trait Composite {
  fn id(&self) -> Uuid;
  /// The two identifiers this row joins, owner side first.
  fn endpoints(&self) -> (Uuid, Uuid);
}

/// The full set of rows representing one logical domain object.
pub trait EntityGraph {
  /// The identifier callers pass to `update` and `delete`.
  fn id(&self) -> Uuid;
  /// Identity anchor of the graph: its abstraction's id and `log_time`.
  fn anchor(&self) -> (Uuid, DateTime<Utc>);
  /// Identifiers of every composite currently attached to the graph.
  fn composite_ids(&self) -> Vec<Uuid> { Vec::new() }
}

// ─── Discriminants ───────────────────────────────────────────────────────────

/// Parse a stored discriminant column (e.g. `goal_kind`) into its enum.
pub fn parse_discriminant<T: FromStr>(field: &'static str, value: &str) -> Result<T> {
  value.parse().map_err(|_| Error::UnknownDiscriminant {
    field,
    value: value.to_owned(),
  })
}

/// Abstractions that stand alone (no basic) are their own graph.
macro_rules! standalone_graph {
  ($ty:ty) => {
    impl $crate::ontology::EntityGraph for $ty {
      fn id(&self) -> ::uuid::Uuid { self.id }

      fn anchor(&self) -> (::uuid::Uuid, ::chrono::DateTime<::chrono::Utc>) {
        (self.id, self.log_time)
      }
    }
  };
}

macro_rules! abstraction {
  ($ty:ty) => {
    impl $crate::ontology::Abstraction for $ty {
      fn id(&self) -> ::uuid::Uuid { self.id }

      fn title(&self) -> &str { &self.title }

      fn log_time(&self) -> ::chrono::DateTime<::chrono::Utc> { self.log_time }
    }
  };
}

pub(crate) use {abstraction, standalone_graph};
