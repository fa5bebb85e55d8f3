//! HTTP server wiring for Telos.
//!
//! Puts the JSON API from `telos-api` behind Basic auth and request tracing.
//! The binary in `main.rs` supplies configuration and a SQLite store.

pub mod auth;
pub mod error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use serde::Deserialize;
use telos_core::coordinator::Planner;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, require_auth};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TELOS_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  pub auth_username:      String,
  pub auth_password_hash: String,
}

impl ServerConfig {
  pub fn auth(&self) -> AuthConfig {
    AuthConfig {
      username:      self.auth_username.clone(),
      password_hash: self.auth_password_hash.clone(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application: `/api/*` over `planner`, authenticated and
/// traced.
pub fn app<P: Planner>(planner: &P, auth: AuthConfig) -> Router {
  Router::new()
    .nest("/api", telos_api::api_router(planner))
    .layer(middleware::from_fn_with_state(Arc::new(auth), require_auth))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
  use rand_core::OsRng;
  use telos_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  async fn make_app(password: &str) -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    app(&store, AuthConfig { username: "user".to_string(), password_hash: hash })
  }

  fn auth_header(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  #[tokio::test]
  async fn missing_credentials_get_401_with_challenge() {
    let app = make_app("secret").await;
    let req = Request::builder().uri("/api/goals").body(Body::empty()).unwrap();

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let challenge = resp.headers()[header::WWW_AUTHENTICATE].to_str().unwrap();
    assert!(challenge.starts_with("Basic"), "challenge: {challenge}");
  }

  #[tokio::test]
  async fn valid_credentials_reach_the_api() {
    let app = make_app("secret").await;
    let req = Request::builder()
      .uri("/api/goals")
      .header(header::AUTHORIZATION, auth_header("user", "secret"))
      .body(Body::empty())
      .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"[]");
  }

  #[tokio::test]
  async fn wrong_password_is_rejected_before_any_write() {
    let app = make_app("secret").await;
    let req = Request::builder()
      .method("POST")
      .uri("/api/goals")
      .header(header::AUTHORIZATION, auth_header("user", "wrong"))
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(r#"{"title":"Run 100km"}"#))
      .unwrap();

    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
      .uri("/api/goals")
      .header(header::AUTHORIZATION, auth_header("user", "secret"))
      .body(Body::empty())
      .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"[]");
  }
}
