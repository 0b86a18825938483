//! Bulk loading of the initial dataset and discovery of the reference instant.
//!
//! The dataset ships as a zip archive that is unpacked into the data
//! directory on startup. The directory then holds numbered batches per kind,
//! `users_1.json`, `users_2.json` and so on, each a JSON object wrapping one
//! array: `{"users": [...]}`. Numbering starts at 1 and stops at the first
//! gap.

use std::{
  collections::HashMap,
  fs,
  path::{Path, PathBuf},
  time::SystemTime,
};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use travels_core::entity::{Location, User, Visit};

/// Extract `archive` into `data_dir`, creating the directory if needed.
///
/// A missing archive is not an error: the directory may have been populated
/// by other means. Returns whether anything was extracted.
pub fn unpack_archive(archive: &Path, data_dir: &Path) -> anyhow::Result<bool> {
  if !archive.exists() {
    tracing::warn!("archive {} not found, using {} as is", archive.display(), data_dir.display());
    return Ok(false);
  }
  let file = fs::File::open(archive).with_context(|| format!("failed to open {archive:?}"))?;
  let mut zip = zip::ZipArchive::new(file)
    .with_context(|| format!("{archive:?} is not a zip archive"))?;
  fs::create_dir_all(data_dir).with_context(|| format!("failed to create {data_dir:?}"))?;
  zip
    .extract(data_dir)
    .with_context(|| format!("failed to extract {archive:?} into {data_dir:?}"))?;
  tracing::info!(entries = zip.len(), archive = %archive.display(), "archive unpacked");
  Ok(true)
}

/// Every record found in a data directory.
#[derive(Debug, Default)]
pub struct Dataset {
  pub users:     Vec<User>,
  pub locations: Vec<Location>,
  pub visits:    Vec<Visit>,
}

pub fn load_dir(data_dir: &Path) -> anyhow::Result<Dataset> {
  let dataset = Dataset {
    users:     load_kind(data_dir, "users")?,
    locations: load_kind(data_dir, "locations")?,
    visits:    load_kind(data_dir, "visits")?,
  };
  tracing::info!(
    users = dataset.users.len(),
    locations = dataset.locations.len(),
    visits = dataset.visits.len(),
    dir = %data_dir.display(),
    "dataset loaded"
  );
  Ok(dataset)
}

fn batch_path(data_dir: &Path, kind: &str, n: usize) -> PathBuf {
  data_dir.join(format!("{kind}_{n}.json"))
}

fn load_kind<T: DeserializeOwned>(data_dir: &Path, kind: &str) -> anyhow::Result<Vec<T>> {
  let mut records = Vec::new();
  for n in 1.. {
    let path = batch_path(data_dir, kind, n);
    if !path.exists() {
      break;
    }
    let bytes = fs::read(&path).with_context(|| format!("failed to read {path:?}"))?;
    let mut batch: HashMap<String, Vec<T>> = serde_json::from_slice(&bytes)
      .with_context(|| format!("failed to parse {path:?}"))?;
    let chunk = batch
      .remove(kind)
      .with_context(|| format!("{path:?} has no {kind:?} array"))?;
    tracing::debug!(file = %path.display(), count = chunk.len(), "batch read");
    records.extend(chunk);
  }
  Ok(records)
}

// ─── Reference instant ────────────────────────────────────────────────────────

/// Unix seconds that ages are computed against.
///
/// Taken from the first line of `options.txt` in the data directory, else the
/// archive's modification time, else the current time.
pub fn reference_instant(data_dir: &Path, archive_path: &Path) -> i64 {
  let options = data_dir.join("options.txt");
  match read_options(&options) {
    Ok(reference) => {
      tracing::info!(reference, "reference instant from {}", options.display());
      return reference;
    }
    Err(e) => tracing::warn!("no reference in options file: {e:#}"),
  }

  match modified_at(archive_path) {
    Ok(reference) => {
      tracing::info!(reference, "reference instant from {}", archive_path.display());
      reference
    }
    Err(e) => {
      tracing::warn!("no archive timestamp, using current time: {e:#}");
      Utc::now().timestamp()
    }
  }
}

fn read_options(path: &Path) -> anyhow::Result<i64> {
  let text = fs::read_to_string(path).with_context(|| format!("failed to read {path:?}"))?;
  let first = text.lines().next().unwrap_or_default().trim();
  first
    .parse()
    .with_context(|| format!("first line of {path:?} is not a timestamp: {first:?}"))
}

fn modified_at(path: &Path) -> anyhow::Result<i64> {
  let modified: SystemTime = fs::metadata(path)
    .and_then(|meta| meta.modified())
    .with_context(|| format!("failed to stat {path:?}"))?;
  Ok(DateTime::<Utc>::from(modified).timestamp())
}
