//! SQLite backend for Telos.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every coordinated write is one
//! `BEGIN IMMEDIATE` transaction on that thread.

mod coordinator;
mod encode;
mod families;
mod reconcile;
mod schema;
mod store;

pub mod error;

pub use coordinator::{GraphCoordinator, GraphFamily};
pub use error::{Error, Result};
pub use families::{ActionFamily, GoalFamily, MeasureFamily, TimePeriodFamily, ValueFamily};
pub use store::SqliteStore;

pub type MeasureCoordinator = GraphCoordinator<MeasureFamily>;
pub type ValueCoordinator = GraphCoordinator<ValueFamily>;
pub type TermCoordinator = GraphCoordinator<TimePeriodFamily>;
pub type GoalCoordinator = GraphCoordinator<GoalFamily>;
pub type ActionCoordinator = GraphCoordinator<ActionFamily>;

#[cfg(test)]
mod tests;
