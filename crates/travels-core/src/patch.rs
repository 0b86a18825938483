//! Partial-update bodies accepted by the write endpoints.
//!
//! Every body field is a tri-state [`Field`]: absent from the JSON object,
//! explicitly `null`, or carrying a value. An absent field keeps the current
//! value on update and is a validation failure on create; an explicit `null`
//! is always a validation failure.
//!
//! Present values are held as untyped JSON until the patch is resolved. The
//! checks then run in a fixed order: nulls, existence of the target record,
//! then each field's type and constraints in turn. The first failing check
//! aborts the whole write, so a resolved record is either fully valid or not
//! produced.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{
  Error, Result,
  entity::{EntityKind, Gender, Id, Location, User, Visit, VisitProfile},
};

// ─── Limits ──────────────────────────────────────────────────────────────────

pub const NAME_MAX_CHARS: usize = 50;
pub const EMAIL_MAX_CHARS: usize = 100;
pub const COUNTRY_MAX_CHARS: usize = 50;
pub const CITY_MAX_CHARS: usize = 50;

/// 1930-01-01T00:00:00Z.
pub const BIRTH_DATE_MIN: i64 = -1_262_304_000;
/// 1999-01-01T23:59:59Z.
pub const BIRTH_DATE_MAX: i64 = 915_235_199;

/// 2000-01-01T00:00:00Z.
pub const VISITED_AT_MIN: i64 = 946_684_800;
/// 2015-01-01T23:59:59Z.
pub const VISITED_AT_MAX: i64 = 1_420_156_799;

pub const MARK_MAX: i64 = 5;

// ─── Field ───────────────────────────────────────────────────────────────────

/// One field of a partial-update body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Field<T> {
  /// The key was not present in the body.
  #[default]
  Absent,
  /// The key was present with a JSON `null`.
  Null,
  Value(T),
}

impl<T> Field<T> {
  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }

  /// Convert a present value, leaving `Absent` and `Null` untouched.
  pub fn try_map<U>(self, f: impl FnOnce(T) -> Result<U>) -> Result<Field<U>> {
    Ok(match self {
      Self::Absent => Field::Absent,
      Self::Null => Field::Null,
      Self::Value(v) => Field::Value(f(v)?),
    })
  }

  /// Take the supplied value, falling back to `current` when absent.
  ///
  /// A missing fallback (i.e. the record is being created) and an explicit
  /// `null` are both validation failures.
  fn or_current(self, name: &str, current: Option<T>) -> Result<T> {
    match self {
      Self::Value(v) => Ok(v),
      Self::Absent => current
        .ok_or_else(|| Error::ValidationFailed(format!("missing field `{name}`"))),
      Self::Null => Err(Error::ValidationFailed(format!("`{name}` must not be null"))),
    }
  }
}

// `#[serde(default)]` on the containing struct maps a missing key to
// `Absent`; this impl only ever sees keys that are present.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    Ok(match Option::<T>::deserialize(deserializer)? {
      Some(v) => Self::Value(v),
      None => Self::Null,
    })
  }
}

// ─── Write target ────────────────────────────────────────────────────────────

/// The record addressed by a write request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteTarget {
  /// Create a record under the id carried in the body.
  New,
  /// Update the record with this id in place.
  Existing(Id),
}

impl WriteTarget {
  /// Parse the id token from a request path. `new` selects creation; any
  /// other non-numeric token addresses nothing and is reported as not found.
  pub fn parse(kind: EntityKind, token: &str) -> Result<Self> {
    if token == "new" {
      return Ok(Self::New);
    }
    token
      .parse::<Id>()
      .map(Self::Existing)
      .map_err(|_| Error::NotFound(kind, None))
  }
}

/// Resolve the record id from the target and the body's own `id` field.
fn resolve_id(target: WriteTarget, body: Field<i64>) -> Result<Id> {
  match target {
    WriteTarget::New => {
      let id = body.or_current("id", None)?;
      to_id("id", id)
    }
    WriteTarget::Existing(target) => {
      let id = match body {
        Field::Value(v) => to_id("id", v)?,
        Field::Absent => target,
        Field::Null => {
          return Err(Error::ValidationFailed("`id` must not be null".into()));
        }
      };
      if id != target {
        return Err(Error::IdentityMismatch { target, body: id });
      }
      Ok(id)
    }
  }
}

fn to_id(name: &str, raw: i64) -> Result<Id> {
  match Id::try_from(raw) {
    Ok(id) if id > 0 => Ok(id),
    _ => Err(Error::ValidationFailed(format!("`{name}` must be a positive id, got {raw}"))),
  }
}

fn check_chars(name: &str, value: String, max: usize) -> Result<String> {
  let count = value.chars().count();
  if count > max {
    return Err(Error::ValidationFailed(format!(
      "`{name}` is {count} characters long, the limit is {max}"
    )));
  }
  Ok(value)
}

fn check_range(name: &str, value: i64, min: i64, max: i64) -> Result<i64> {
  if !(min..=max).contains(&value) {
    return Err(Error::ValidationFailed(format!(
      "`{name}` = {value} is outside [{min}, {max}]"
    )));
  }
  Ok(value)
}

fn reject_nulls(fields: &[(&str, bool)]) -> Result<()> {
  match fields.iter().find(|(_, null)| *null) {
    Some((name, _)) => Err(Error::ValidationFailed(format!("`{name}` must not be null"))),
    None => Ok(()),
  }
}

fn int_or(name: &str, field: Field<Value>, current: Option<i64>) -> Result<i64> {
  int(name, field)?.or_current(name, current)
}

fn int(name: &str, field: Field<Value>) -> Result<Field<i64>> {
  field.try_map(|value| {
    value.as_i64().ok_or_else(|| {
      Error::ValidationFailed(format!("`{name}` must be an integer, got {value}"))
    })
  })
}

fn text_or(name: &str, field: Field<Value>, current: Option<String>) -> Result<String> {
  field
    .try_map(|value| match value {
      Value::String(s) => Ok(s),
      other => Err(Error::ValidationFailed(format!("`{name}` must be a string, got {other}"))),
    })?
    .or_current(name, current)
}

// ─── User ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserPatch {
  pub id:         Field<Value>,
  pub first_name: Field<Value>,
  pub last_name:  Field<Value>,
  pub email:      Field<Value>,
  pub gender:     Field<Value>,
  pub birth_date: Field<Value>,
}

impl UserPatch {
  /// Decode a request body. Malformed JSON and non-object bodies are
  /// validation failures; field types are checked by [`Self::resolve`].
  pub fn from_json(body: &[u8]) -> Result<Self> { Ok(serde_json::from_slice(body)?) }

  /// Merge over `current` (the stored record for an update, `None` for a
  /// create) and validate in the order id, first name, last name, gender,
  /// birth date, email.
  pub fn resolve(self, target: WriteTarget, current: Option<&User>) -> Result<User> {
    reject_nulls(&[
      ("id", self.id.is_null()),
      ("first_name", self.first_name.is_null()),
      ("last_name", self.last_name.is_null()),
      ("email", self.email.is_null()),
      ("gender", self.gender.is_null()),
      ("birth_date", self.birth_date.is_null()),
    ])?;
    let current = require_current(EntityKind::User, target, current)?;

    let id = resolve_id(target, int("id", self.id)?)?;
    let first_name = check_chars(
      "first_name",
      text_or("first_name", self.first_name, current.map(|u| u.first_name.clone()))?,
      NAME_MAX_CHARS,
    )?;
    let last_name = check_chars(
      "last_name",
      text_or("last_name", self.last_name, current.map(|u| u.last_name.clone()))?,
      NAME_MAX_CHARS,
    )?;
    let code = text_or("gender", self.gender, current.map(|u| u.gender.code().to_owned()))?;
    let gender = Gender::from_code(&code).ok_or_else(|| {
      Error::ValidationFailed(format!("`gender` must be \"m\" or \"f\", got {code:?}"))
    })?;
    let birth_date = check_range(
      "birth_date",
      int_or("birth_date", self.birth_date, current.map(|u| u.birth_date))?,
      BIRTH_DATE_MIN,
      BIRTH_DATE_MAX,
    )?;
    let email = check_chars(
      "email",
      text_or("email", self.email, current.map(|u| u.email.clone()))?,
      EMAIL_MAX_CHARS,
    )?;

    Ok(User { id, first_name, last_name, email, gender, birth_date })
  }
}

/// An update must address a stored record; a create has no current record.
fn require_current<T>(
  kind: EntityKind,
  target: WriteTarget,
  current: Option<&T>,
) -> Result<Option<&T>> {
  match target {
    WriteTarget::New => Ok(None),
    WriteTarget::Existing(id) => current
      .map(Some)
      .ok_or(Error::NotFound(kind, Some(id))),
  }
}

// ─── Location ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocationPatch {
  pub id:       Field<Value>,
  pub place:    Field<Value>,
  pub country:  Field<Value>,
  pub city:     Field<Value>,
  pub distance: Field<Value>,
}

impl LocationPatch {
  pub fn from_json(body: &[u8]) -> Result<Self> { Ok(serde_json::from_slice(body)?) }

  /// Merge and validate in the order id, country, city, place, distance.
  pub fn resolve(
    self,
    target: WriteTarget,
    current: Option<&Location>,
  ) -> Result<Location> {
    reject_nulls(&[
      ("id", self.id.is_null()),
      ("place", self.place.is_null()),
      ("country", self.country.is_null()),
      ("city", self.city.is_null()),
      ("distance", self.distance.is_null()),
    ])?;
    let current = require_current(EntityKind::Location, target, current)?;

    let id = resolve_id(target, int("id", self.id)?)?;
    let country = check_chars(
      "country",
      text_or("country", self.country, current.map(|l| l.country.clone()))?,
      COUNTRY_MAX_CHARS,
    )?;
    let city = check_chars(
      "city",
      text_or("city", self.city, current.map(|l| l.city.clone()))?,
      CITY_MAX_CHARS,
    )?;
    let place = text_or("place", self.place, current.map(|l| l.place.clone()))?;
    let distance = int_or("distance", self.distance, current.map(|l| i64::from(l.distance)))?;
    let distance = u32::try_from(distance).map_err(|_| {
      Error::ValidationFailed(format!("`distance` must be non-negative, got {distance}"))
    })?;

    Ok(Location { id, place, country, city, distance })
  }
}

// ─── Visit ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VisitPatch {
  pub id:         Field<Value>,
  pub user:       Field<Value>,
  pub location:   Field<Value>,
  pub visited_at: Field<Value>,
  pub mark:       Field<Value>,
}

impl VisitPatch {
  pub fn from_json(body: &[u8]) -> Result<Self> { Ok(serde_json::from_slice(body)?) }

  /// Merge and validate in the order id, user, location, visited-at, mark.
  ///
  /// `exists` answers whether a referenced user or location is stored. A
  /// dangling reference is a validation failure, not a not-found: only the
  /// record named by the target can be missing.
  ///
  /// The returned visit carries an empty profile; enrichment is the store's
  /// job.
  pub fn resolve(
    self,
    target: WriteTarget,
    current: Option<&Visit>,
    exists: impl Fn(EntityKind, Id) -> bool,
  ) -> Result<Visit> {
    reject_nulls(&[
      ("id", self.id.is_null()),
      ("user", self.user.is_null()),
      ("location", self.location.is_null()),
      ("visited_at", self.visited_at.is_null()),
      ("mark", self.mark.is_null()),
    ])?;
    let current = require_current(EntityKind::Visit, target, current)?;

    let id = resolve_id(target, int("id", self.id)?)?;
    let user = reference(
      "user",
      int_or("user", self.user, current.map(|v| i64::from(v.user)))?,
      EntityKind::User,
      &exists,
    )?;
    let location = reference(
      "location",
      int_or("location", self.location, current.map(|v| i64::from(v.location)))?,
      EntityKind::Location,
      &exists,
    )?;
    let visited_at = check_range(
      "visited_at",
      int_or("visited_at", self.visited_at, current.map(|v| v.visited_at))?,
      VISITED_AT_MIN,
      VISITED_AT_MAX,
    )?;
    let mark = check_range(
      "mark",
      int_or("mark", self.mark, current.map(|v| i64::from(v.mark)))?,
      0,
      MARK_MAX,
    )?;

    Ok(Visit {
      id,
      user,
      location,
      visited_at,
      // Range-checked to 0..=5 above.
      mark: mark as u8,
      profile: VisitProfile::default(),
    })
  }
}

fn reference(
  name: &str,
  raw: i64,
  kind: EntityKind,
  exists: &impl Fn(EntityKind, Id) -> bool,
) -> Result<Id> {
  let id = to_id(name, raw)?;
  if !exists(kind, id) {
    return Err(Error::ValidationFailed(format!("`{name}` references unknown {kind} {id}")));
  }
  Ok(id)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ann() -> User {
    User {
      id:         5,
      first_name: "Ann".into(),
      last_name:  "Li".into(),
      email:      "a@b.c".into(),
      gender:     Gender::Female,
      birth_date: 0,
    }
  }

  #[test]
  fn field_distinguishes_absent_null_and_value() {
    let patch = UserPatch::from_json(br#"{"email": null, "first_name": "Bo"}"#).unwrap();
    assert_eq!(patch.id, Field::Absent);
    assert_eq!(patch.email, Field::Null);
    assert_eq!(patch.first_name, Field::Value(Value::from("Bo")));
  }

  #[test]
  fn write_target_parsing() {
    assert_eq!(WriteTarget::parse(EntityKind::User, "new").unwrap(), WriteTarget::New);
    assert_eq!(
      WriteTarget::parse(EntityKind::User, "17").unwrap(),
      WriteTarget::Existing(17)
    );
    assert!(matches!(
      WriteTarget::parse(EntityKind::Visit, "bad"),
      Err(Error::NotFound(EntityKind::Visit, None))
    ));
  }

  #[test]
  fn create_user_from_full_body() {
    let body = br#"{"id":5,"first_name":"Ann","last_name":"Li","email":"a@b.c","gender":"f","birth_date":0}"#;
    let user = UserPatch::from_json(body).unwrap().resolve(WriteTarget::New, None).unwrap();
    assert_eq!(user, ann());
  }

  #[test]
  fn create_user_with_missing_field_fails() {
    let body = br#"{"id":5,"first_name":"Ann","last_name":"Li","gender":"f","birth_date":0}"#;
    let err = UserPatch::from_json(body)
      .unwrap()
      .resolve(WriteTarget::New, None)
      .unwrap_err();
    assert!(matches!(err, Error::ValidationFailed(ref m) if m.contains("email")));
  }

  #[test]
  fn bad_gender_fails_validation() {
    let body = br#"{"id":5,"first_name":"Ann","last_name":"Li","email":"a@b.c","gender":"x","birth_date":0}"#;
    let err = UserPatch::from_json(body)
      .unwrap()
      .resolve(WriteTarget::New, None)
      .unwrap_err();
    assert!(matches!(err, Error::ValidationFailed(ref m) if m.contains("gender")));
  }

  #[test]
  fn validation_reports_first_failing_field() {
    // Both the last name and the birth date are invalid; last name is
    // checked first.
    let long = "x".repeat(NAME_MAX_CHARS + 1);
    let body = format!(r#"{{"last_name":"{long}","birth_date":1}}"#);
    let err = UserPatch::from_json(body.as_bytes())
      .unwrap()
      .resolve(WriteTarget::Existing(5), Some(&ann()))
      .unwrap_err();
    assert!(matches!(err, Error::ValidationFailed(ref m) if m.contains("last_name")));
  }

  #[test]
  fn name_limit_counts_code_points() {
    let name = "ё".repeat(NAME_MAX_CHARS);
    let patch = UserPatch { first_name: Field::Value(name.as_str().into()), ..Default::default() };
    let user = patch.resolve(WriteTarget::Existing(5), Some(&ann())).unwrap();
    assert_eq!(user.first_name, name);
  }

  #[test]
  fn update_keeps_absent_fields() {
    let patch = UserPatch::from_json(br#"{"birth_date": 100}"#).unwrap();
    let user = patch.resolve(WriteTarget::Existing(5), Some(&ann())).unwrap();
    assert_eq!(user, User { birth_date: 100, ..ann() });
  }

  #[test]
  fn update_of_missing_record_is_not_found() {
    let err = UserPatch::default()
      .resolve(WriteTarget::Existing(9), None)
      .unwrap_err();
    assert!(matches!(err, Error::NotFound(EntityKind::User, Some(9))));
  }

  #[test]
  fn null_is_rejected_even_on_update() {
    let patch = UserPatch::from_json(br#"{"email": null}"#).unwrap();
    let err = patch.resolve(WriteTarget::Existing(5), Some(&ann())).unwrap_err();
    assert!(matches!(err, Error::ValidationFailed(_)));
  }

  #[test]
  fn body_id_must_match_target() {
    let patch = UserPatch::from_json(br#"{"id": 6}"#).unwrap();
    let err = patch.resolve(WriteTarget::Existing(5), Some(&ann())).unwrap_err();
    assert!(matches!(err, Error::IdentityMismatch { target: 5, body: 6 }));
  }

  #[test]
  fn malformed_body_is_validation_failure() {
    let bodies: [&[u8]; 3] = [b"not json", b"42", b"\"text\""];
    for body in bodies {
      let err = UserPatch::from_json(body).unwrap_err();
      assert!(matches!(err, Error::ValidationFailed(_)));
    }
  }

  #[test]
  fn wrong_type_fails_at_its_field() {
    let patch = UserPatch::from_json(br#"{"birth_date": "soon"}"#).unwrap();
    let err = patch.resolve(WriteTarget::Existing(5), Some(&ann())).unwrap_err();
    assert!(matches!(err, Error::ValidationFailed(ref m) if m.contains("birth_date")));

    let patch = UserPatch::from_json(br#"{"first_name": 7}"#).unwrap();
    let err = patch.resolve(WriteTarget::Existing(5), Some(&ann())).unwrap_err();
    assert!(matches!(err, Error::ValidationFailed(ref m) if m.contains("first_name")));
  }

  #[test]
  fn wrong_type_on_missing_target_is_not_found() {
    let patch = UserPatch::from_json(br#"{"birth_date": "soon"}"#).unwrap();
    let err = patch.resolve(WriteTarget::Existing(9), None).unwrap_err();
    assert!(matches!(err, Error::NotFound(EntityKind::User, Some(9))));

    let patch = LocationPatch::from_json(br#"{"distance": 1.5}"#).unwrap();
    let err = patch.resolve(WriteTarget::Existing(9), None).unwrap_err();
    assert!(matches!(err, Error::NotFound(EntityKind::Location, Some(9))));

    let patch = VisitPatch::from_json(br#"{"mark": "5"}"#).unwrap();
    let err = patch.resolve(WriteTarget::Existing(9), None, |_, _| true).unwrap_err();
    assert!(matches!(err, Error::NotFound(EntityKind::Visit, Some(9))));
  }

  #[test]
  fn type_errors_follow_field_order() {
    // gender is checked before birth_date.
    let patch = UserPatch::from_json(br#"{"birth_date": "soon", "gender": "x"}"#).unwrap();
    let err = patch.resolve(WriteTarget::Existing(5), Some(&ann())).unwrap_err();
    assert!(matches!(err, Error::ValidationFailed(ref m) if m.contains("gender")));
  }

  #[test]
  fn birth_date_bounds() {
    for (value, ok) in [
      (BIRTH_DATE_MIN, true),
      (BIRTH_DATE_MAX, true),
      (BIRTH_DATE_MIN - 1, false),
      (BIRTH_DATE_MAX + 1, false),
    ] {
      let patch = UserPatch { birth_date: Field::Value(value.into()), ..Default::default() };
      assert_eq!(patch.resolve(WriteTarget::Existing(5), Some(&ann())).is_ok(), ok);
    }
  }

  #[test]
  fn location_rejects_negative_distance() {
    let body = br#"{"id":1,"place":"Pier","country":"Peru","city":"Lima","distance":-3}"#;
    let err = LocationPatch::from_json(body)
      .unwrap()
      .resolve(WriteTarget::New, None)
      .unwrap_err();
    assert!(matches!(err, Error::ValidationFailed(ref m) if m.contains("distance")));
  }

  #[test]
  fn visit_dangling_reference_is_validation_failure() {
    let body = br#"{"id":1,"user":2,"location":3,"visited_at":1000000000,"mark":4}"#;
    let err = VisitPatch::from_json(body)
      .unwrap()
      .resolve(WriteTarget::New, None, |kind, _| kind == EntityKind::Location)
      .unwrap_err();
    assert!(matches!(err, Error::ValidationFailed(ref m) if m.contains("user")));
  }

  #[test]
  fn visit_mark_out_of_range() {
    let body = br#"{"id":1,"user":2,"location":3,"visited_at":1000000000,"mark":6}"#;
    let err = VisitPatch::from_json(body)
      .unwrap()
      .resolve(WriteTarget::New, None, |_, _| true)
      .unwrap_err();
    assert!(matches!(err, Error::ValidationFailed(ref m) if m.contains("mark")));
  }

  #[test]
  fn visit_created_with_empty_profile() {
    let body = br#"{"id":1,"user":2,"location":3,"visited_at":1000000000,"mark":4}"#;
    let visit = VisitPatch::from_json(body)
      .unwrap()
      .resolve(WriteTarget::New, None, |_, _| true)
      .unwrap();
    assert_eq!(visit.user, 2);
    assert_eq!(visit.mark, 4);
    assert_eq!(visit.profile, VisitProfile::default());
  }

  fn pier() -> Location {
    Location {
      id:       1,
      place:    "Pier".into(),
      country:  "Peru".into(),
      city:     "Lima".into(),
      distance: 3,
    }
  }

  fn stay() -> Visit {
    Visit {
      id:         1,
      user:       2,
      location:   3,
      visited_at: 1_000_000_000,
      mark:       4,
      profile:    VisitProfile::default(),
    }
  }

  #[test]
  fn visited_at_bounds() {
    for (value, ok) in [
      (VISITED_AT_MIN, true),
      (VISITED_AT_MAX, true),
      (VISITED_AT_MIN - 1, false),
      (VISITED_AT_MAX + 1, false),
    ] {
      let patch = VisitPatch { visited_at: Field::Value(value.into()), ..Default::default() };
      let result = patch.resolve(WriteTarget::Existing(1), Some(&stay()), |_, _| true);
      assert_eq!(result.is_ok(), ok, "{value}");
    }
  }

  #[test]
  fn email_limit() {
    for (len, ok) in [(EMAIL_MAX_CHARS, true), (EMAIL_MAX_CHARS + 1, false)] {
      let email = "é".repeat(len);
      let patch = UserPatch { email: Field::Value(email.into()), ..Default::default() };
      assert_eq!(patch.resolve(WriteTarget::Existing(5), Some(&ann())).is_ok(), ok, "{len}");
    }
  }

  #[test]
  fn country_and_city_limits() {
    for (len, ok) in [(COUNTRY_MAX_CHARS, true), (COUNTRY_MAX_CHARS + 1, false)] {
      let patch = LocationPatch {
        country: Field::Value("ж".repeat(len).into()),
        ..Default::default()
      };
      assert_eq!(patch.resolve(WriteTarget::Existing(1), Some(&pier())).is_ok(), ok, "{len}");
    }
    for (len, ok) in [(CITY_MAX_CHARS, true), (CITY_MAX_CHARS + 1, false)] {
      let patch = LocationPatch {
        city: Field::Value("ж".repeat(len).into()),
        ..Default::default()
      };
      assert_eq!(patch.resolve(WriteTarget::Existing(1), Some(&pier())).is_ok(), ok, "{len}");
    }
  }

  #[test]
  fn location_reports_first_failing_field() {
    // country, city, place, distance
    let long = "x".repeat(CITY_MAX_CHARS + 1);
    let body = format!(r#"{{"distance":-1,"place":3,"city":"{long}"}}"#);
    let err = LocationPatch::from_json(body.as_bytes())
      .unwrap()
      .resolve(WriteTarget::Existing(1), Some(&pier()))
      .unwrap_err();
    assert!(matches!(err, Error::ValidationFailed(ref m) if m.contains("city")));

    let err = LocationPatch::from_json(br#"{"distance":-1,"place":3}"#)
      .unwrap()
      .resolve(WriteTarget::Existing(1), Some(&pier()))
      .unwrap_err();
    assert!(matches!(err, Error::ValidationFailed(ref m) if m.contains("place")));
  }

  #[test]
  fn visit_reports_first_failing_field() {
    // user, location, visited_at, mark
    let err = VisitPatch::from_json(br#"{"mark":9,"visited_at":1,"user":42}"#)
      .unwrap()
      .resolve(WriteTarget::Existing(1), Some(&stay()), |kind, id| {
        !(kind == EntityKind::User && id == 42)
      })
      .unwrap_err();
    assert!(matches!(err, Error::ValidationFailed(ref m) if m.contains("user")));

    let err = VisitPatch::from_json(br#"{"mark":9,"visited_at":1}"#)
      .unwrap()
      .resolve(WriteTarget::Existing(1), Some(&stay()), |_, _| true)
      .unwrap_err();
    assert!(matches!(err, Error::ValidationFailed(ref m) if m.contains("visited_at")));
  }
}
