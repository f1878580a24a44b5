//! Core types and trait definitions for the Voyage planner.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod import;
pub mod itinerary;
pub mod owner;
pub mod place;
pub mod plan;
pub mod recommend;
pub mod schedule;
pub mod store;

pub use error::{Classify, Error, ErrorKind, Result};
