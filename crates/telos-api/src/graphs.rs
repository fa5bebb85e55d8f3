//! Handlers shared by every entity family.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/{family}` | Oldest first |
//! | `POST`   | `/{family}` | Validated, then created; 201 + `ETag` |
//! | `GET`    | `/{family}/{id}` | 304 on matching `If-None-Match`, 404 if absent |
//! | `PUT`    | `/{family}/{id}` | Validated, then updated; `ETag` |
//! | `DELETE` | `/{family}/{id}` | 204 |

use axum::{
  Json, Router,
  extract::State,
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
  routing::get,
};
use serde::{Serialize, de::DeserializeOwned};
use telos_core::{coordinator::Coordinator, validate::Validate};
use uuid::Uuid;

use crate::{
  error::ApiError,
  etag::{compute_etag, none_match},
  extract,
};

/// Mount the five graph routes for one coordinator under `path`.
pub fn family_router<C>(path: &str, coordinator: C) -> Router<()>
where
  C: Coordinator + Clone + 'static,
  C::Form: DeserializeOwned + Validate,
  C::Graph: Serialize,
{
  Router::new()
    .route(path, get(list::<C>).post(create::<C>))
    .route(
      &format!("{path}/{{id}}"),
      get(get_one::<C>).put(update::<C>).delete(delete_one::<C>),
    )
    .with_state(coordinator)
}

fn with_etag<G: Serialize>(status: StatusCode, graph: &G) -> Result<Response, ApiError> {
  let etag = compute_etag(graph).map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((status, [(header::ETAG, etag)], Json(graph)).into_response())
}

// ─── List ────────────────────────────────────────────────────────────────────

pub async fn list<C>(State(coordinator): State<C>) -> Result<Json<Vec<C::Graph>>, ApiError>
where
  C: Coordinator,
  C::Graph: Serialize,
{
  let graphs = coordinator.list().await.map_err(ApiError::from_store)?;
  Ok(Json(graphs))
}

// ─── Create ──────────────────────────────────────────────────────────────────

pub async fn create<C>(
  State(coordinator): State<C>,
  extract::Json(form): extract::Json<C::Form>,
) -> Result<Response, ApiError>
where
  C: Coordinator,
  C::Form: Validate,
  C::Graph: Serialize,
{
  form.validate()?;
  let graph = coordinator.create(form).await.map_err(ApiError::from_store)?;
  with_etag(StatusCode::CREATED, &graph)
}

// ─── Get one ─────────────────────────────────────────────────────────────────

pub async fn get_one<C>(
  State(coordinator): State<C>,
  extract::Path(id): extract::Path<Uuid>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  C: Coordinator,
  C::Graph: Serialize,
{
  let graph = coordinator
    .fetch(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("{id} not found")))?;

  let etag = compute_etag(&graph).map_err(|e| ApiError::Store(Box::new(e)))?;
  if headers
    .get(header::IF_NONE_MATCH)
    .is_some_and(|v| none_match(v, &etag))
  {
    return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
  }
  Ok((StatusCode::OK, [(header::ETAG, etag)], Json(graph)).into_response())
}

// ─── Update ──────────────────────────────────────────────────────────────────

pub async fn update<C>(
  State(coordinator): State<C>,
  extract::Path(id): extract::Path<Uuid>,
  extract::Json(form): extract::Json<C::Form>,
) -> Result<Response, ApiError>
where
  C: Coordinator,
  C::Form: Validate,
  C::Graph: Serialize,
{
  form.validate()?;
  let graph = coordinator.update(id, form).await.map_err(ApiError::from_store)?;
  with_etag(StatusCode::OK, &graph)
}

// ─── Delete ──────────────────────────────────────────────────────────────────

pub async fn delete_one<C>(
  State(coordinator): State<C>,
  extract::Path(id): extract::Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  C: Coordinator,
{
  coordinator.delete(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
