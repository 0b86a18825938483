//! The `TravelStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `travels-store-memory`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  entity::{Id, Location, ShortVisit, User, Visit},
  filter::VisitFilter,
  patch::{LocationPatch, UserPatch, VisitPatch, WriteTarget},
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a travels store backend.
///
/// Writes accept partial bodies; the backend merges them over the stored
/// record, validates, and commits all-or-nothing. Reads may run concurrently
/// with each other and with writes.
///
/// Errors that correspond to a [`crate::Error`] variant must expose it through
/// their [`source`](std::error::Error::source) chain (or be that type) so the
/// HTTP layer can classify them.
pub trait TravelStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Lookups ───────────────────────────────────────────────────────────

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Id,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn get_location(
    &self,
    id: Id,
  ) -> impl Future<Output = Result<Option<Location>, Self::Error>> + Send + '_;

  fn get_visit(
    &self,
    id: Id,
  ) -> impl Future<Output = Result<Option<Visit>, Self::Error>> + Send + '_;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Create or update a user and return the committed record.
  fn write_user(
    &self,
    target: WriteTarget,
    patch: UserPatch,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn write_location(
    &self,
    target: WriteTarget,
    patch: LocationPatch,
  ) -> impl Future<Output = Result<Location, Self::Error>> + Send + '_;

  /// Create or update a visit. Dangling `user`/`location` references fail
  /// validation.
  fn write_visit(
    &self,
    target: WriteTarget,
    patch: VisitPatch,
  ) -> impl Future<Output = Result<Visit, Self::Error>> + Send + '_;

  // ── Aggregates ────────────────────────────────────────────────────────

  /// The user's visits that pass `filter`, projected to [`ShortVisit`] and
  /// sorted ascending by `visited_at`. Fails with not-found if the user does
  /// not exist.
  fn visits_of_user<'a>(
    &'a self,
    user: Id,
    filter: &'a VisitFilter,
  ) -> impl Future<Output = Result<Vec<ShortVisit>, Self::Error>> + Send + 'a;

  /// Mean mark of the location's visits that pass `filter`, rounded to five
  /// decimal places; `0` when nothing passes. Fails with not-found if the
  /// location does not exist.
  fn average_mark<'a>(
    &'a self,
    location: Id,
    filter: &'a VisitFilter,
  ) -> impl Future<Output = Result<f64, Self::Error>> + Send + 'a;
}
