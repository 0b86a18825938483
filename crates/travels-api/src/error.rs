//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store error by the [`travels_core::Error`] in its source
  /// chain; anything else is an internal failure.
  pub fn from_store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    let core = std::iter::successors(
      Some(&err as &(dyn std::error::Error + 'static)),
      |e| e.source(),
    )
    .find_map(|e| e.downcast_ref::<travels_core::Error>());

    match core {
      Some(core) => Self::from_core(core),
      None => Self::Store(Box::new(err)),
    }
  }

  fn from_core(err: &travels_core::Error) -> Self {
    use travels_core::Error as E;
    match err {
      E::NotFound(..) => Self::NotFound(err.to_string()),
      E::InvalidFilter(_) | E::ValidationFailed(_) | E::IdentityMismatch { .. } => {
        Self::BadRequest(err.to_string())
      }
    }
  }
}

impl From<travels_core::Error> for ApiError {
  fn from(err: travels_core::Error) -> Self { Self::from_core(&err) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::debug!(%status, error = %self, "request failed");
    // Clients expect an empty object whatever went wrong.
    (status, Json(json!({}))).into_response()
  }
}
