//! [`MemoryStore`], the in-memory implementation of [`TravelStore`].

use std::{collections::HashSet, sync::Arc};

use parking_lot::RwLock;
use travels_core::{
  Result,
  entity::{EntityKind, Id, Location, ShortVisit, User, Visit},
  filter::VisitFilter,
  patch::{LocationPatch, UserPatch, VisitPatch, WriteTarget},
  store::TravelStore,
};

use crate::{
  aggregate,
  enrich::{enrich, profile},
  index::{Bucket, VisitIndex},
  tables::{Record, Tables},
};

// ─── State ───────────────────────────────────────────────────────────────────

/// Everything guarded by the store lock. The entity maps and the index are
/// only ever mutated together, under the write guard.
#[derive(Debug, Default)]
struct State {
  tables: Tables,
  index:  VisitIndex,
}

impl State {
  /// Store `visit` with a freshly computed profile and move it between
  /// index buckets if its foreign keys changed.
  fn commit_visit(&mut self, reference: i64, visit: Visit) -> Visit {
    let visit = enrich(&self.tables, reference, visit);
    let previous = self
      .tables
      .get::<Visit>(visit.id)
      .map(|old| (old.user, old.location));
    self.index.reindex_visit(
      previous.map(|(user, _)| user),
      previous.map(|(_, location)| location),
      &visit,
    );
    self.tables.put(visit.clone());
    visit
  }

  /// Recompute the cached profile of every visit filed under `id`.
  fn refresh_profiles(&mut self, reference: i64, bucket: Bucket, id: Id) {
    let ids: Vec<Id> = self.index.visits_for(bucket, id).collect();
    for visit_id in ids {
      let Some(visit) = self.tables.get::<Visit>(visit_id) else { continue };
      let fresh = profile(&self.tables, reference, visit);
      if let Some(visit) = self.tables.get_mut::<Visit>(visit_id) {
        visit.profile = fresh;
      }
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Record counts, for logging after a bulk load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
  pub users:     usize,
  pub locations: usize,
  pub visits:    usize,
}

/// A travels store held entirely in memory.
///
/// Clones share the same maps and lock.
#[derive(Clone)]
pub struct MemoryStore {
  state:     Arc<RwLock<State>>,
  /// Unix seconds that ages are computed against.
  reference: i64,
}

impl MemoryStore {
  /// An empty store computing ages relative to `reference`.
  pub fn new(reference: i64) -> Self {
    Self { state: Arc::new(RwLock::new(State::default())), reference }
  }

  /// Build a store from bulk-loaded records.
  ///
  /// Records are trusted as-is. Every visit is enriched once and the index
  /// is built over the final visit set.
  pub fn seed(
    reference: i64,
    users: impl IntoIterator<Item = User>,
    locations: impl IntoIterator<Item = Location>,
    visits: impl IntoIterator<Item = Visit>,
  ) -> Self {
    let mut tables = Tables::default();
    for user in users {
      tables.put(user);
    }
    for location in locations {
      tables.put(location);
    }
    let visits: Vec<Visit> = visits
      .into_iter()
      .map(|visit| enrich(&tables, reference, visit))
      .collect();
    for visit in visits {
      tables.put(visit);
    }
    let index = VisitIndex::build(tables.visits());

    Self { state: Arc::new(RwLock::new(State { tables, index })), reference }
  }

  pub fn reference(&self) -> i64 { self.reference }

  pub fn counts(&self) -> Counts {
    let state = self.state.read();
    Counts {
      users:     state.tables.len::<User>(),
      locations: state.tables.len::<Location>(),
      visits:    state.tables.len::<Visit>(),
    }
  }

  /// Ids of the visits filed under a user or location; empty if none.
  pub fn visits_for(&self, bucket: Bucket, id: Id) -> HashSet<Id> {
    self.state.read().index.visits_for(bucket, id).collect()
  }

  fn get<R: Record>(&self, id: Id) -> Option<R> {
    self.state.read().tables.get::<R>(id).cloned()
  }
}

// ─── TravelStore impl ────────────────────────────────────────────────────────

impl TravelStore for MemoryStore {
  type Error = travels_core::Error;

  // ── Lookups ───────────────────────────────────────────────────────────────

  async fn get_user(&self, id: Id) -> Result<Option<User>> { Ok(self.get(id)) }

  async fn get_location(&self, id: Id) -> Result<Option<Location>> {
    Ok(self.get(id))
  }

  async fn get_visit(&self, id: Id) -> Result<Option<Visit>> { Ok(self.get(id)) }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn write_user(&self, target: WriteTarget, patch: UserPatch) -> Result<User> {
    let mut state = self.state.write();
    let current = match target {
      WriteTarget::Existing(id) => state.tables.get::<User>(id),
      WriteTarget::New => None,
    };
    let user = patch.resolve(target, current)?;

    state.tables.put(user.clone());
    state.refresh_profiles(self.reference, Bucket::User, user.id);
    tracing::debug!(id = user.id, ?target, "user written");
    Ok(user)
  }

  async fn write_location(
    &self,
    target: WriteTarget,
    patch:  LocationPatch,
  ) -> Result<Location> {
    let mut state = self.state.write();
    let current = match target {
      WriteTarget::Existing(id) => state.tables.get::<Location>(id),
      WriteTarget::New => None,
    };
    let location = patch.resolve(target, current)?;

    state.tables.put(location.clone());
    state.refresh_profiles(self.reference, Bucket::Location, location.id);
    tracing::debug!(id = location.id, ?target, "location written");
    Ok(location)
  }

  async fn write_visit(&self, target: WriteTarget, patch: VisitPatch) -> Result<Visit> {
    let mut state = self.state.write();
    let current = match target {
      WriteTarget::Existing(id) => state.tables.get::<Visit>(id),
      WriteTarget::New => None,
    };
    let tables = &state.tables;
    let visit = patch.resolve(target, current, |kind: EntityKind, id| {
      tables.contains(kind, id)
    })?;

    let visit = state.commit_visit(self.reference, visit);
    tracing::debug!(
      id = visit.id,
      user = visit.user,
      location = visit.location,
      ?target,
      "visit written"
    );
    Ok(visit)
  }

  // ── Aggregates ────────────────────────────────────────────────────────────

  async fn visits_of_user<'a>(
    &'a self,
    user: Id,
    filter: &'a VisitFilter,
  ) -> Result<Vec<ShortVisit>> {
    let state = self.state.read();
    aggregate::visits_of_user(&state.tables, &state.index, self.reference, user, filter)
  }

  async fn average_mark<'a>(&'a self, location: Id, filter: &'a VisitFilter) -> Result<f64> {
    let state = self.state.read();
    aggregate::average_mark(&state.tables, &state.index, self.reference, location, filter)
  }
}
