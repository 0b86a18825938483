//! Optional predicates over visits, parsed from request query parameters.
//!
//! | key          | kept when                       |
//! |--------------|---------------------------------|
//! | `fromDate`   | `visited_at >= value`           |
//! | `toDate`     | `visited_at <= value`           |
//! | `fromAge`    | `profile.age >= value`          |
//! | `toAge`      | `profile.age < value`           |
//! | `toDistance` | `profile.distance < value`      |
//! | `gender`     | `profile.gender == value`       |
//! | `country`    | `profile.country == value`      |
//!
//! Predicates combine with logical AND. Unrecognised keys are ignored.

use std::collections::HashMap;

use percent_encoding::percent_decode_str;

use crate::{
  Error, Result,
  entity::{Gender, Visit},
};

/// A parsed set of visit predicates. `Default` keeps every visit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitFilter {
  pub from_date:   Option<i64>,
  pub to_date:     Option<i64>,
  pub from_age:    Option<i64>,
  pub to_age:      Option<i64>,
  pub to_distance: Option<i64>,
  pub gender:      Option<Gender>,
  pub country:     Option<String>,
}

impl VisitFilter {
  /// Parse recognised keys from `params`, whose values are still raw
  /// (undecoded) query-string text.
  ///
  /// Any recognised key that fails to parse rejects the whole filter.
  pub fn parse(params: &HashMap<String, String>) -> Result<Self> {
    let value = |key: &str| -> Result<Option<String>> {
      params
        .get(key)
        .map(|raw| {
          decode_query_component(raw).ok_or_else(|| {
            Error::InvalidFilter(format!("`{key}` is not valid UTF-8: {raw:?}"))
          })
        })
        .transpose()
    };
    let int = |key: &str| -> Result<Option<i64>> {
      value(key)?
        .map(|v| {
          v.parse::<i64>().map_err(|_| {
            Error::InvalidFilter(format!("`{key}` must be an integer, got {v:?}"))
          })
        })
        .transpose()
    };

    let gender = value("gender")?
      .map(|code| {
        Gender::from_code(&code).ok_or_else(|| {
          Error::InvalidFilter(format!("`gender` must be \"m\" or \"f\", got {code:?}"))
        })
      })
      .transpose()?;

    let country = value("country")?;

    Ok(Self {
      from_date: int("fromDate")?,
      to_date: int("toDate")?,
      from_age: int("fromAge")?,
      to_age: int("toAge")?,
      to_distance: int("toDistance")?,
      gender,
      country,
    })
  }

  /// Whether `visit` satisfies every present predicate. Age, gender,
  /// distance and country are read from the visit's profile, so the caller
  /// must enrich the visit first.
  pub fn matches(&self, visit: &Visit) -> bool {
    let profile = &visit.profile;
    self.from_date.is_none_or(|v| visit.visited_at >= v)
      && self.to_date.is_none_or(|v| visit.visited_at <= v)
      && self.from_age.is_none_or(|v| i64::from(profile.age) >= v)
      && self.to_age.is_none_or(|v| i64::from(profile.age) < v)
      && self.to_distance.is_none_or(|v| i64::from(profile.distance) < v)
      && self.gender.is_none_or(|g| profile.gender == Some(g))
      && self.country.as_deref().is_none_or(|c| profile.country == c)
  }

  /// Retain the visits that satisfy the filter. Order is preserved, but
  /// callers should not rely on the input order being meaningful.
  pub fn apply(&self, visits: impl IntoIterator<Item = Visit>) -> Vec<Visit> {
    visits.into_iter().filter(|v| self.matches(v)).collect()
  }
}

/// Decode one `application/x-www-form-urlencoded` component: `+` is a space
/// and `%XX` escapes are bytes of a UTF-8 string. `None` if the bytes are not
/// UTF-8.
pub fn decode_query_component(raw: &str) -> Option<String> {
  let spaced = raw.replace('+', " ");
  percent_decode_str(&spaced)
    .decode_utf8()
    .ok()
    .map(|s| s.into_owned())
}
