//! The two filtered aggregate queries.
//!
//! Both recompute every candidate visit's profile from the current user and
//! location before filtering, rather than trusting the cached copy.

use travels_core::{
  Error, Result,
  entity::{EntityKind, Id, Location, ShortVisit, User, Visit},
  filter::VisitFilter,
};

use crate::{
  enrich::enrich,
  index::{Bucket, VisitIndex},
  tables::Tables,
};

/// Enriched visits filed under `id` that pass `filter`.
fn candidates(
  tables: &Tables,
  index: &VisitIndex,
  reference: i64,
  bucket: Bucket,
  id: Id,
  filter: &VisitFilter,
) -> Vec<Visit> {
  let visits = index
    .visits_for(bucket, id)
    .filter_map(|visit| tables.get::<Visit>(visit))
    .map(|visit| enrich(tables, reference, visit.clone()));
  filter.apply(visits)
}

pub fn visits_of_user(
  tables: &Tables,
  index: &VisitIndex,
  reference: i64,
  user: Id,
  filter: &VisitFilter,
) -> Result<Vec<ShortVisit>> {
  if tables.get::<User>(user).is_none() {
    return Err(Error::NotFound(EntityKind::User, Some(user)));
  }

  let mut visits: Vec<ShortVisit> =
    candidates(tables, index, reference, Bucket::User, user, filter)
      .into_iter()
      .map(|visit| ShortVisit {
        mark:       visit.mark,
        visited_at: visit.visited_at,
        place:      tables
          .get::<Location>(visit.location)
          .map(|l| l.place.clone())
          .unwrap_or_default(),
      })
      .collect();

  // Ties have no secondary key.
  visits.sort_unstable_by_key(|v| v.visited_at);
  Ok(visits)
}

pub fn average_mark(
  tables: &Tables,
  index: &VisitIndex,
  reference: i64,
  location: Id,
  filter: &VisitFilter,
) -> Result<f64> {
  if tables.get::<Location>(location).is_none() {
    return Err(Error::NotFound(EntityKind::Location, Some(location)));
  }

  let visits = candidates(tables, index, reference, Bucket::Location, location, filter);
  if visits.is_empty() {
    return Ok(0.0);
  }
  let sum: u64 = visits.iter().map(|v| u64::from(v.mark)).sum();
  Ok(round_mark(sum as f64 / visits.len() as f64))
}

/// Round to five decimal places, half up on the sixth digit.
///
/// Both scalings truncate; the sixth digit is whatever truncation leaves, so
/// `3.666666…` becomes `3.66667`.
pub fn round_mark(mean: f64) -> f64 {
  let mut scaled = (mean * 100_000.0) as i64;
  let sixth = (mean * 1_000_000.0) as i64 - scaled * 10;
  if sixth >= 5 {
    scaled += 1;
  }
  scaled as f64 / 100_000.0
}
