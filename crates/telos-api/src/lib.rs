//! JSON REST API for Telos.
//!
//! Exposes an axum [`Router`] backed by any [`telos_core::coordinator::Planner`].
//! Forms are validated here, before they reach a coordinator. Progress and
//! suggested matches are computed on read and never stored. Auth, TLS, and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", telos_api::api_router(&store))
//! ```

pub mod error;
pub mod etag;
pub mod extract;
pub mod graphs;
pub mod progress;

use axum::Router;
use telos_core::coordinator::Planner;

pub use error::ApiError;
use graphs::family_router;
use progress::{Coordinators, progress_router};

/// Build a fully-materialised API router over `planner`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<P: Planner>(planner: &P) -> Router<()> {
  Router::new()
    .merge(family_router("/measures", planner.measures()))
    .merge(family_router("/values", planner.values()))
    .merge(family_router("/terms", planner.terms()))
    .merge(family_router("/goals", planner.goals()))
    .merge(family_router("/actions", planner.actions()))
    .merge(progress_router(Coordinators {
      goals:   planner.goals(),
      actions: planner.actions(),
      terms:   planner.terms(),
    }))
}
