//! Copying user and location fields onto visits.

use chrono::{DateTime, Datelike as _};
use travels_core::entity::{Location, User, Visit, VisitProfile};

use crate::tables::Tables;

/// Age in whole years at `reference` for someone born at `birth_date`, both
/// in Unix seconds.
///
/// The elapsed seconds are read as a timestamp and 1970 is subtracted from
/// its calendar year. This is not a calendar age: leap days shift the
/// boundary by up to a few days. Clients of the service expect exactly this
/// arithmetic.
pub fn age_at(reference: i64, birth_date: i64) -> i32 {
  DateTime::from_timestamp(reference.saturating_sub(birth_date), 0)
    .map(|elapsed| elapsed.year() - 1970)
    .unwrap_or_default()
}

/// The profile `visit` should carry given the current user and location.
/// A missing user or location leaves its fields at their zero value.
pub fn profile(tables: &Tables, reference: i64, visit: &Visit) -> VisitProfile {
  let mut profile = VisitProfile::default();
  if let Some(user) = tables.get::<User>(visit.user) {
    profile.age = age_at(reference, user.birth_date);
    profile.gender = Some(user.gender);
  }
  if let Some(location) = tables.get::<Location>(visit.location) {
    profile.country.clone_from(&location.country);
    profile.distance = location.distance;
  }
  profile
}

pub fn enrich(tables: &Tables, reference: i64, mut visit: Visit) -> Visit {
  visit.profile = profile(tables, reference, &visit);
  visit
}

#[cfg(test)]
mod tests {
  use travels_core::entity::Gender;

  use super::*;

  // 2017-08-21T00:00:00Z
  const REFERENCE: i64 = 1_503_273_600;

  #[test]
  fn age_counts_elapsed_years() {
    // 1987-08-21T00:00:00Z, exactly thirty years earlier.
    assert_eq!(age_at(REFERENCE, 556_502_400), 30);
    // Born a day later the calendar age would be 29, but the elapsed span is
    // laid over 1970..2000, which has one leap day fewer than 1987..2017.
    assert_eq!(age_at(REFERENCE, 556_502_400 + 86_400), 30);
    assert_eq!(age_at(REFERENCE, 556_502_400 + 2 * 86_400), 29);
  }

  #[test]
  fn age_handles_pre_epoch_births() {
    // 1930-01-01T00:00:00Z
    assert_eq!(age_at(REFERENCE, -1_262_304_000), 87);
  }

  #[test]
  fn missing_references_leave_zero_profile() {
    let tables = Tables::default();
    let visit = Visit {
      id:         1,
      user:       7,
      location:   8,
      visited_at: 1_000_000_000,
      mark:       2,
      profile:    VisitProfile::default(),
    };
    assert_eq!(enrich(&tables, REFERENCE, visit).profile, VisitProfile::default());
  }

  #[test]
  fn copies_user_and_location_fields() {
    let mut tables = Tables::default();
    tables.put(User {
      id:         7,
      first_name: "Ann".into(),
      last_name:  "Li".into(),
      email:      "a@b.c".into(),
      gender:     Gender::Male,
      birth_date: 556_502_400,
    });
    tables.put(Location {
      id:       8,
      place:    "Pier".into(),
      country:  "Peru".into(),
      city:     "Lima".into(),
      distance: 42,
    });
    let visit = Visit {
      id:         1,
      user:       7,
      location:   8,
      visited_at: 1_000_000_000,
      mark:       2,
      profile:    VisitProfile::default(),
    };

    let profile = enrich(&tables, REFERENCE, visit).profile;
    assert_eq!(profile, VisitProfile {
      age:      30,
      gender:   Some(Gender::Male),
      country:  "Peru".into(),
      distance: 42,
    });
  }
}
