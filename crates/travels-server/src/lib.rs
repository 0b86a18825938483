//! Process wiring for the travels service: configuration, bulk loading and
//! the traced HTTP application.

pub mod load;

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use travels_core::store::TravelStore;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TRAVELS_*` environment variables. Every key is optional.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:         String,
  pub port:         u16,
  /// Directory holding the extracted `users_N.json`, `locations_N.json`,
  /// `visits_N.json` and `options.txt`.
  pub data_dir:     PathBuf,
  /// Archive whose modification time is used when `options.txt` is missing.
  pub archive_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:         "0.0.0.0".to_string(),
      port:         80,
      data_dir:     PathBuf::from("/tmp/data"),
      archive_path: PathBuf::from("/tmp/data/data.zip"),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Application ──────────────────────────────────────────────────────────────

/// The API router with request tracing.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: TravelStore + 'static,
{
  travels_api::api_router(store).layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use tower::ServiceExt as _;
  use travels_store_memory::MemoryStore;

  #[test]
  fn config_defaults_fill_missing_keys() {
    let settings = config::Config::builder()
      .set_override("port", 8080)
      .unwrap()
      .build()
      .unwrap();
    let cfg: ServerConfig = settings.try_deserialize().unwrap();
    assert_eq!(cfg.address(), "0.0.0.0:8080");
    assert_eq!(cfg.data_dir, PathBuf::from("/tmp/data"));
    assert_eq!(cfg.archive_path, PathBuf::from("/tmp/data/data.zip"));
  }

  #[tokio::test]
  async fn traced_app_serves_api() {
    let store = Arc::new(MemoryStore::new(0));
    let req = Request::builder()
      .uri("/users/1")
      .body(Body::empty())
      .unwrap();
    let resp = app(store).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
