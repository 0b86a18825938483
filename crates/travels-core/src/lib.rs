//! Core types and trait definitions for the travels data service.
//!
//! This crate is deliberately free of HTTP and locking concerns. It holds the
//! three entity records, the partial-update bodies accepted by writes, the
//! visit filter, and the [`store::TravelStore`] abstraction that storage
//! backends implement.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod entity;
pub mod error;
pub mod filter;
pub mod patch;
pub mod store;

pub use error::{Error, Result};
