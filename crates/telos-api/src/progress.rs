//! Read-only handlers for figures derived from stored graphs.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/progress` | Every goal's progress, a summary and unassigned goals |
//! | `GET`  | `/progress/goals/{id}` | 404 if the goal is absent |
//! | `GET`  | `/progress/terms/{id}` | Optional `?at=<rfc3339>`; 404 if the term is absent |
//! | `GET`  | `/progress/current-term` | Optional `?at=<rfc3339>`; 404 when no term is active |
//! | `GET`  | `/matches` | Suggested links; optional `?threshold=0.7` |

use std::future::Future;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use telos_core::{
  action::ActionGraph,
  coordinator::Coordinator,
  goal::GoalGraph,
  lifecycle::{self, TermProgress},
  matching::{self, InferredMatch},
  progress::{self, GoalProgress, ProgressSummary},
  term::TimePeriodGraph,
};
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Path, Query},
};

// ─── Sources ─────────────────────────────────────────────────────────────────

/// The graphs derived figures are computed from.
pub trait GraphSource: Clone + Send + Sync + 'static {
  fn goals(&self) -> impl Future<Output = Result<Vec<GoalGraph>, ApiError>> + Send;
  fn actions(&self) -> impl Future<Output = Result<Vec<ActionGraph>, ApiError>> + Send;
  fn terms(&self) -> impl Future<Output = Result<Vec<TimePeriodGraph>, ApiError>> + Send;
}

/// A [`GraphSource`] over three coordinators.
#[derive(Clone)]
pub struct Coordinators<G, A, T> {
  pub goals:   G,
  pub actions: A,
  pub terms:   T,
}

impl<G, A, T> GraphSource for Coordinators<G, A, T>
where
  G: Coordinator<Graph = GoalGraph> + Clone + 'static,
  A: Coordinator<Graph = ActionGraph> + Clone + 'static,
  T: Coordinator<Graph = TimePeriodGraph> + Clone + 'static,
{
  async fn goals(&self) -> Result<Vec<GoalGraph>, ApiError> {
    self.goals.list().await.map_err(ApiError::from_store)
  }

  async fn actions(&self) -> Result<Vec<ActionGraph>, ApiError> {
    self.actions.list().await.map_err(ApiError::from_store)
  }

  async fn terms(&self) -> Result<Vec<TimePeriodGraph>, ApiError> {
    self.terms.list().await.map_err(ApiError::from_store)
  }
}

pub fn progress_router<S: GraphSource>(source: S) -> Router<()> {
  Router::new()
    .route("/progress", get(overview::<S>))
    .route("/progress/goals/{id}", get(goal::<S>))
    .route("/progress/terms/{id}", get(term::<S>))
    .route("/progress/current-term", get(current_term::<S>))
    .route("/matches", get(matches::<S>))
    .with_state(source)
}

// ─── Goals ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Overview {
  pub goals:            Vec<GoalProgress>,
  pub summary:          ProgressSummary,
  pub unassigned_goals: Vec<Uuid>,
}

/// `GET /progress`
pub async fn overview<S: GraphSource>(State(source): State<S>) -> Result<Json<Overview>, ApiError> {
  let goals = source.goals().await?;
  let actions = source.actions().await?;

  let all = progress::all_goal_progress(&goals, &actions);
  Ok(Json(Overview {
    summary:          progress::summarize(&all),
    unassigned_goals: lifecycle::unassigned_goals(&goals).iter().map(|g| g.goal.id).collect(),
    goals:            all,
  }))
}

/// `GET /progress/goals/{id}`
pub async fn goal<S: GraphSource>(
  State(source): State<S>,
  Path(id): Path<Uuid>,
) -> Result<Json<GoalProgress>, ApiError> {
  let goals = source.goals().await?;
  let goal = goals
    .iter()
    .find(|g| g.goal.id == id)
    .ok_or_else(|| ApiError::NotFound(format!("goal {id} not found")))?;

  let actions = source.actions().await?;
  Ok(Json(progress::goal_progress(goal, &actions)))
}

// ─── Terms ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AtParams {
  /// Defaults to now.
  pub at: Option<DateTime<Utc>>,
}

/// `GET /progress/terms/{id}[?at=<rfc3339>]`
pub async fn term<S: GraphSource>(
  State(source): State<S>,
  Path(id): Path<Uuid>,
  Query(params): Query<AtParams>,
) -> Result<Json<TermProgress>, ApiError> {
  let terms = source.terms().await?;
  let term = terms
    .iter()
    .find(|t| t.term.id == id)
    .ok_or_else(|| ApiError::NotFound(format!("goal term {id} not found")))?;

  let goals = source.goals().await?;
  let at = params.at.unwrap_or_else(Utc::now);
  Ok(Json(lifecycle::term_progress(term, &goals, at)))
}

/// `GET /progress/current-term[?at=<rfc3339>]`
pub async fn current_term<S: GraphSource>(
  State(source): State<S>,
  Query(params): Query<AtParams>,
) -> Result<Json<TermProgress>, ApiError> {
  let at = params.at.unwrap_or_else(Utc::now);
  let terms = source.terms().await?;
  let term = lifecycle::active_term(&terms, at)
    .ok_or_else(|| ApiError::NotFound(format!("no term active at {at}")))?;

  let goals = source.goals().await?;
  Ok(Json(lifecycle::term_progress(term, &goals, at)))
}

// ─── Matches ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MatchParams {
  pub threshold: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct Matches {
  pub confident: Vec<InferredMatch>,
  pub ambiguous: Vec<InferredMatch>,
}

/// `GET /matches[?threshold=<0.0..=1.0>]`
pub async fn matches<S: GraphSource>(
  State(source): State<S>,
  Query(params): Query<MatchParams>,
) -> Result<Json<Matches>, ApiError> {
  let threshold = params.threshold.unwrap_or(matching::DEFAULT_THRESHOLD);
  if !(0.0..=1.0).contains(&threshold) {
    return Err(ApiError::Rejected(
      StatusCode::BAD_REQUEST,
      format!("threshold {threshold} is outside 0.0..=1.0"),
    ));
  }

  let actions = source.actions().await?;
  let goals = source.goals().await?;
  let (confident, ambiguous) =
    matching::partition_by_confidence(matching::infer_matches(&actions, &goals), threshold);
  Ok(Json(Matches { confident, ambiguous }))
}
