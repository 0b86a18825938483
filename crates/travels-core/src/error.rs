//! Error types for `travels-core`.

use thiserror::Error;

use crate::entity::{EntityKind, Id};

#[derive(Debug, Error)]
pub enum Error {
  /// The addressed record does not exist, or the id token in the request
  /// target is neither numeric nor `new` (in which case the id is `None`).
  #[error("{} not found: {}", .0, display_id(.1))]
  NotFound(EntityKind, Option<Id>),

  #[error("invalid filter: {0}")]
  InvalidFilter(String),

  #[error("validation failed: {0}")]
  ValidationFailed(String),

  #[error("body id {body} does not match target id {target}")]
  IdentityMismatch { target: Id, body: Id },
}

impl From<serde_json::Error> for Error {
  fn from(e: serde_json::Error) -> Self { Self::ValidationFailed(e.to_string()) }
}

fn display_id(id: &Option<Id>) -> String {
  match id {
    Some(id) => id.to_string(),
    None => "<malformed id>".to_owned(),
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
