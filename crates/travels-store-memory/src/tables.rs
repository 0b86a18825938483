//! The authoritative id-to-record maps.

use std::collections::HashMap;

use travels_core::entity::{EntityKind, Id, Location, User, Visit};

/// The three entity maps. Only the store's mutation path writes to them.
#[derive(Debug, Default)]
pub struct Tables {
  users:     HashMap<Id, User>,
  locations: HashMap<Id, Location>,
  visits:    HashMap<Id, Visit>,
}

/// A record kind held in [`Tables`].
pub trait Record: Clone + Send + Sync + 'static {
  const KIND: EntityKind;

  fn id(&self) -> Id;
  fn map(tables: &Tables) -> &HashMap<Id, Self>;
  fn map_mut(tables: &mut Tables) -> &mut HashMap<Id, Self>;
}

impl Record for User {
  const KIND: EntityKind = EntityKind::User;

  fn id(&self) -> Id { self.id }
  fn map(tables: &Tables) -> &HashMap<Id, Self> { &tables.users }
  fn map_mut(tables: &mut Tables) -> &mut HashMap<Id, Self> { &mut tables.users }
}

impl Record for Location {
  const KIND: EntityKind = EntityKind::Location;

  fn id(&self) -> Id { self.id }
  fn map(tables: &Tables) -> &HashMap<Id, Self> { &tables.locations }
  fn map_mut(tables: &mut Tables) -> &mut HashMap<Id, Self> { &mut tables.locations }
}

impl Record for Visit {
  const KIND: EntityKind = EntityKind::Visit;

  fn id(&self) -> Id { self.id }
  fn map(tables: &Tables) -> &HashMap<Id, Self> { &tables.visits }
  fn map_mut(tables: &mut Tables) -> &mut HashMap<Id, Self> { &mut tables.visits }
}

impl Tables {
  pub fn get<R: Record>(&self, id: Id) -> Option<&R> { R::map(self).get(&id) }

  pub(crate) fn get_mut<R: Record>(&mut self, id: Id) -> Option<&mut R> {
    R::map_mut(self).get_mut(&id)
  }

  /// Insert `record`, fully replacing any record stored under the same id.
  /// Returns the replaced record.
  pub fn put<R: Record>(&mut self, record: R) -> Option<R> {
    R::map_mut(self).insert(record.id(), record)
  }

  pub fn contains(&self, kind: EntityKind, id: Id) -> bool {
    match kind {
      EntityKind::User => self.users.contains_key(&id),
      EntityKind::Location => self.locations.contains_key(&id),
      EntityKind::Visit => self.visits.contains_key(&id),
    }
  }

  pub fn len<R: Record>(&self) -> usize { R::map(self).len() }

  pub(crate) fn visits(&self) -> impl Iterator<Item = &Visit> { self.visits.values() }
}
