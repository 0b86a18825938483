//! JSON HTTP API for the travels service.
//!
//! Exposes an axum [`Router`] backed by any [`travels_core::store::TravelStore`].
//! Tracing middleware and transport concerns are the caller's responsibility.

pub mod entities;
pub mod error;
pub mod queries;

use std::sync::Arc;

use axum::{Router, routing::get};
use travels_core::store::TravelStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: TravelStore + 'static,
{
  Router::new()
    .route(
      "/users/{id}",
      get(entities::get_user::<S>).post(entities::write_user::<S>),
    )
    .route(
      "/locations/{id}",
      get(entities::get_location::<S>).post(entities::write_location::<S>),
    )
    .route(
      "/visits/{id}",
      get(entities::get_visit::<S>).post(entities::write_visit::<S>),
    )
    .route("/users/{id}/visits", get(queries::visits_of_user::<S>))
    .route("/locations/{id}/avg", get(queries::average_mark::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────
