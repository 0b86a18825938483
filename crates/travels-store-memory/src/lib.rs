//! In-memory backend for the travels store.
//!
//! All three entity maps and the visit indices live behind a single
//! process-wide reader/writer lock. Reads share the lock; every write holds it
//! exclusively from validation through commit, so readers never observe a
//! visit half-moved between index buckets.

mod aggregate;
mod enrich;
mod index;
mod store;
mod tables;

pub use enrich::age_at;
pub use index::Bucket;
pub use store::{Counts, MemoryStore};
