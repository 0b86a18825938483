//! Handlers for single-record reads and writes.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users/:id`, `/locations/:id`, `/visits/:id` | 404 if absent or non-numeric |
//! | `POST` | `/users/:id`, `/locations/:id`, `/visits/:id` | `:id` may be `new`; partial body on update; returns `{}` |

use std::sync::Arc;

use axum::{
  Json,
  body::Bytes,
  extract::{Path, State},
  http::header,
  response::{IntoResponse, Response},
};
use serde_json::json;
use travels_core::{
  entity::{EntityKind, Id, Location, User, Visit},
  patch::{LocationPatch, UserPatch, VisitPatch, WriteTarget},
  store::TravelStore,
};

use crate::error::ApiError;

/// Parse a numeric path id; anything else addresses nothing.
pub(crate) fn parse_id(kind: EntityKind, raw: &str) -> Result<Id, ApiError> {
  raw
    .parse()
    .map_err(|_| ApiError::NotFound(format!("{kind} {raw:?} not found")))
}

fn found<T>(kind: EntityKind, id: Id, record: Option<T>) -> Result<Json<T>, ApiError> {
  record
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("{kind} {id} not found")))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /users/:id`
pub async fn get_user<S>(
  State(store): State<Arc<S>>,
  Path(raw): Path<String>,
) -> Result<Json<User>, ApiError>
where
  S: TravelStore,
{
  let id = parse_id(EntityKind::User, &raw)?;
  let user = store.get_user(id).await.map_err(ApiError::from_store)?;
  found(EntityKind::User, id, user)
}

/// `GET /locations/:id`
pub async fn get_location<S>(
  State(store): State<Arc<S>>,
  Path(raw): Path<String>,
) -> Result<Json<Location>, ApiError>
where
  S: TravelStore,
{
  let id = parse_id(EntityKind::Location, &raw)?;
  let location = store.get_location(id).await.map_err(ApiError::from_store)?;
  found(EntityKind::Location, id, location)
}

/// `GET /visits/:id`
pub async fn get_visit<S>(
  State(store): State<Arc<S>>,
  Path(raw): Path<String>,
) -> Result<Json<Visit>, ApiError>
where
  S: TravelStore,
{
  let id = parse_id(EntityKind::Visit, &raw)?;
  let visit = store.get_visit(id).await.map_err(ApiError::from_store)?;
  found(EntityKind::Visit, id, visit)
}

// ─── Write ────────────────────────────────────────────────────────────────────

/// Write responses always close the connection, successful or not.
fn closing(result: Result<(), ApiError>) -> Response {
  let response = match result {
    Ok(()) => Json(json!({})).into_response(),
    Err(e) => e.into_response(),
  };
  ([(header::CONNECTION, "close")], response).into_response()
}

/// `POST /users/:id`, where `:id` is a numeric id or `new`.
pub async fn write_user<S>(
  State(store): State<Arc<S>>,
  Path(raw): Path<String>,
  body: Bytes,
) -> Response
where
  S: TravelStore,
{
  closing(apply_user(store.as_ref(), &raw, &body).await)
}

async fn apply_user<S: TravelStore>(store: &S, raw: &str, body: &[u8]) -> Result<(), ApiError> {
  let target = WriteTarget::parse(EntityKind::User, raw)?;
  let patch = UserPatch::from_json(body)?;
  store.write_user(target, patch).await.map_err(ApiError::from_store)?;
  Ok(())
}

/// `POST /locations/:id`
pub async fn write_location<S>(
  State(store): State<Arc<S>>,
  Path(raw): Path<String>,
  body: Bytes,
) -> Response
where
  S: TravelStore,
{
  closing(apply_location(store.as_ref(), &raw, &body).await)
}

async fn apply_location<S: TravelStore>(
  store: &S,
  raw: &str,
  body: &[u8],
) -> Result<(), ApiError> {
  let target = WriteTarget::parse(EntityKind::Location, raw)?;
  let patch = LocationPatch::from_json(body)?;
  store.write_location(target, patch).await.map_err(ApiError::from_store)?;
  Ok(())
}

/// `POST /visits/:id`
pub async fn write_visit<S>(
  State(store): State<Arc<S>>,
  Path(raw): Path<String>,
  body: Bytes,
) -> Response
where
  S: TravelStore,
{
  closing(apply_visit(store.as_ref(), &raw, &body).await)
}

async fn apply_visit<S: TravelStore>(store: &S, raw: &str, body: &[u8]) -> Result<(), ApiError> {
  let target = WriteTarget::parse(EntityKind::Visit, raw)?;
  let patch = VisitPatch::from_json(body)?;
  store.write_visit(target, patch).await.map_err(ApiError::from_store)?;
  Ok(())
}
