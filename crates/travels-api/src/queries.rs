//! Handlers for the filtered aggregate endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users/:id/visits` | `{"visits":[{mark, visited_at, place}]}` sorted by `visited_at` |
//! | `GET`  | `/locations/:id/avg` | `{"avg": <mean mark, 5 decimal places>}` |
//!
//! Both accept `fromDate`, `toDate`, `fromAge`, `toAge`, `toDistance`,
//! `gender` and `country`. A malformed filter is a 400 unless the addressed
//! record does not exist, which is a 404.

use std::{collections::HashMap, sync::Arc};

use axum::{
  Json,
  extract::{Path, RawQuery, State},
};
use travels_core::{
  entity::{Average, EntityKind, ShortVisits},
  filter::{VisitFilter, decode_query_component},
  store::TravelStore,
};

use crate::{entities::parse_id, error::ApiError};

/// Split a query string into name/value pairs. Names are decoded here;
/// values stay raw so the filter can report undecodable ones. The first
/// occurrence of a repeated name wins.
fn raw_params(query: Option<&str>) -> HashMap<String, String> {
  let mut params = HashMap::new();
  for pair in query.unwrap_or_default().split('&').filter(|p| !p.is_empty()) {
    let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
    let name = decode_query_component(name).unwrap_or_else(|| name.to_owned());
    params.entry(name).or_insert_with(|| value.to_owned());
  }
  params
}

/// `GET /users/:id/visits[?filters]`
pub async fn visits_of_user<S>(
  State(store): State<Arc<S>>,
  Path(raw): Path<String>,
  RawQuery(query): RawQuery,
) -> Result<Json<ShortVisits>, ApiError>
where
  S: TravelStore,
{
  let id = parse_id(EntityKind::User, &raw)?;
  let filter = match VisitFilter::parse(&raw_params(query.as_deref())) {
    Ok(filter) => filter,
    Err(e) => {
      if store.get_user(id).await.map_err(ApiError::from_store)?.is_none() {
        return Err(ApiError::NotFound(format!("user {id} not found")));
      }
      return Err(e.into());
    }
  };

  let visits = store
    .visits_of_user(id, &filter)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(ShortVisits { visits }))
}

/// `GET /locations/:id/avg[?filters]`
pub async fn average_mark<S>(
  State(store): State<Arc<S>>,
  Path(raw): Path<String>,
  RawQuery(query): RawQuery,
) -> Result<Json<Average>, ApiError>
where
  S: TravelStore,
{
  let id = parse_id(EntityKind::Location, &raw)?;
  let filter = match VisitFilter::parse(&raw_params(query.as_deref())) {
    Ok(filter) => filter,
    Err(e) => {
      if store.get_location(id).await.map_err(ApiError::from_store)?.is_none() {
        return Err(ApiError::NotFound(format!("location {id} not found")));
      }
      return Err(e.into());
    }
  };

  let avg = store
    .average_mark(id, &filter)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(Average { avg }))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn raw_params_keep_values_encoded() {
    let params = raw_params(Some("country=Costa%20Rica&gender=f&gender=m&flag"));
    assert_eq!(params["country"], "Costa%20Rica");
    assert_eq!(params["gender"], "f");
    assert_eq!(params["flag"], "");
  }

  #[test]
  fn raw_params_decode_names() {
    let params = raw_params(Some("from%44ate=%31%30&to+Age=5"));
    assert_eq!(params["fromDate"], "%31%30");
    assert_eq!(params["to Age"], "5");
  }

  #[test]
  fn missing_query_is_empty() {
    assert!(raw_params(None).is_empty());
  }
}
