//! Core types and trait definitions for Telos, a personal goal tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! holds the entity model (abstractions, basics, composites), the form data
//! callers assemble, the `Coordinator` contract backends implement, and the
//! validation rules callers run before coordinating a write.
//!
//! Derived figures live beside the model, never on it: [`progress`] for goal
//! completion, [`matching`] for suggested action-goal links and
//! [`lifecycle`] for term phases.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod ontology;

pub mod action;
pub mod coordinator;
pub mod error;
pub mod goal;
pub mod lifecycle;
pub mod matching;
pub mod measure;
pub mod progress;
pub mod term;
pub mod validate;
pub mod value;

pub use error::{Classify, Error, FailureKind, Result};
