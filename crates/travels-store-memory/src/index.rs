//! Secondary indices from users and locations to their visits.

use std::collections::{HashMap, HashSet};

use travels_core::entity::{Id, Visit};

/// Which foreign key of a visit a bucket is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
  User,
  Location,
}

/// Visit ids grouped by user and by location.
///
/// Each stored visit id sits in exactly one user bucket and one location
/// bucket, matching its current foreign keys. Empty buckets are dropped.
#[derive(Debug, Default)]
pub struct VisitIndex {
  by_user:     HashMap<Id, HashSet<Id>>,
  by_location: HashMap<Id, HashSet<Id>>,
}

impl VisitIndex {
  /// Build the index from scratch over `visits`.
  pub fn build<'a>(visits: impl IntoIterator<Item = &'a Visit>) -> Self {
    let mut index = Self::default();
    for visit in visits {
      index.index_visit(visit);
    }
    index
  }

  /// Add `visit` to the buckets of its user and location.
  pub fn index_visit(&mut self, visit: &Visit) {
    self.by_user.entry(visit.user).or_default().insert(visit.id);
    self.by_location.entry(visit.location).or_default().insert(visit.id);
  }

  /// Move `visit` out of the buckets it was filed under before the write
  /// and into the buckets for its current keys. `None` means the visit was
  /// not previously stored.
  ///
  /// The caller holds the store's exclusive lock, so the move is never
  /// observed half done.
  pub fn reindex_visit(
    &mut self,
    old_user: Option<Id>,
    old_location: Option<Id>,
    visit: &Visit,
  ) {
    if let Some(old) = old_user.filter(|&old| old != visit.user) {
      remove(&mut self.by_user, old, visit.id);
    }
    if let Some(old) = old_location.filter(|&old| old != visit.location) {
      remove(&mut self.by_location, old, visit.id);
    }
    self.index_visit(visit);
  }

  /// Visit ids filed under `id`; empty if the key has no visits.
  pub fn visits_for(&self, bucket: Bucket, id: Id) -> impl Iterator<Item = Id> + '_ {
    let map = match bucket {
      Bucket::User => &self.by_user,
      Bucket::Location => &self.by_location,
    };
    map.get(&id).into_iter().flatten().copied()
  }
}

fn remove(map: &mut HashMap<Id, HashSet<Id>>, key: Id, visit: Id) {
  if let Some(bucket) = map.get_mut(&key) {
    bucket.remove(&visit);
    if bucket.is_empty() {
      map.remove(&key);
    }
  }
}
