//! Entity records: users, locations and the visits linking them.
//!
//! Records serialise to their wire shape. A [`Visit`] additionally carries a
//! [`VisitProfile`] of fields copied from its user and location; the profile
//! is a denormalised cache and never appears on the wire.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier shared by all three entity kinds.
pub type Id = u32;

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// The three entity kinds held by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
  User,
  Location,
  Visit,
}

impl fmt::Display for EntityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::User => "user",
      Self::Location => "location",
      Self::Visit => "visit",
    })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
  #[serde(rename = "m")]
  Male,
  #[serde(rename = "f")]
  Female,
}

impl Gender {
  /// Parse the single-letter wire form; anything but `m` or `f` is rejected.
  pub fn from_code(code: &str) -> Option<Self> {
    match code {
      "m" => Some(Self::Male),
      "f" => Some(Self::Female),
      _ => None,
    }
  }

  pub fn code(self) -> &'static str {
    match self {
      Self::Male => "m",
      Self::Female => "f",
    }
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:         Id,
  pub first_name: String,
  pub last_name:  String,
  pub email:      String,
  pub gender:     Gender,
  /// Seconds since the Unix epoch; may be negative.
  pub birth_date: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
  pub id:       Id,
  pub place:    String,
  pub country:  String,
  pub city:     String,
  pub distance: u32,
}

/// Fields copied onto a visit from the user and location it references.
///
/// Missing references leave the corresponding fields at their zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitProfile {
  /// Visitor's age relative to the store's reference instant.
  pub age:      i32,
  pub gender:   Option<Gender>,
  pub country:  String,
  pub distance: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
  pub id:         Id,
  pub user:       Id,
  pub location:   Id,
  pub visited_at: i64,
  pub mark:       u8,
  #[serde(skip)]
  pub profile:    VisitProfile,
}

// ─── Query results ───────────────────────────────────────────────────────────

/// The reduced projection of a visit returned by the per-user visit listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortVisit {
  pub mark:       u8,
  pub visited_at: i64,
  pub place:      String,
}

/// Wire envelope for the per-user visit listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShortVisits {
  pub visits: Vec<ShortVisit>,
}

/// Wire envelope for the per-location average mark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Average {
  pub avg: f64,
}
