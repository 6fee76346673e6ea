//! HTTP server wiring for Rollcall.
//!
//! Mounts [`rollcall_api::api_router`] under `/api` with request tracing.
//! The binary in `main.rs` adds configuration loading and the listener.

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use rollcall_core::store::WorshipStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `rollcall.toml` and
/// `ROLLCALL_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  /// SQLite database file. A leading `~/` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/rollcall/rollcall.db") }

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router for `store`.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: WorshipStore + Clone + 'static,
{
  Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", rollcall_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &std::path::Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use rollcall_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  async fn test_app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    app(Arc::new(store))
  }

  #[tokio::test]
  async fn health_check() {
    let resp = test_app()
      .await
      .oneshot(Request::get("/health").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn api_is_nested() {
    let app = test_app().await;

    let req = Request::post("/api/classes")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(r#"{"grade":"high","name":"3"}"#))
      .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
      .oneshot(Request::get("/api/classes").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let classes: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(classes[0]["name"], "3");
  }

  #[tokio::test]
  async fn unknown_route_is_404() {
    let resp = test_app()
      .await
      .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[test]
  fn config_defaults_apply() {
    let cfg: ServerConfig = config::Config::builder()
      .set_override("port", 9000)
      .unwrap()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:9000");
    assert_eq!(cfg.store_path, PathBuf::from("~/.local/share/rollcall/rollcall.db"));
  }

  #[test]
  fn tilde_only_expands_at_start() {
    let plain = PathBuf::from("/var/lib/rollcall.db");
    assert_eq!(expand_tilde(&plain), plain);
    let odd = PathBuf::from("data/~/x.db");
    assert_eq!(expand_tilde(&odd), odd);
  }
}
