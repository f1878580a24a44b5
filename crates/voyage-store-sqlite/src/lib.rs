//! SQLite backend for the Voyage planner.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each [`PlannerStore`] call runs its
//! domain logic synchronously inside a single SQLite transaction:
//!
//! - `resolver`: create-vs-update routing of agent imports.
//! - `reconcile`: POI → place creation and linked-place indexing.
//! - `linkage`: `itinerary_places` rows and their pinned flag.
//! - `plans`: versioned plans with a single active row.
//! - `curation`: user pin/unpin, manual add and remove.
//!
//! [`PlannerStore`]: voyage_core::store::PlannerStore

mod curation;
mod encode;
mod itineraries;
mod linkage;
mod plans;
mod reconcile;
mod resolver;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
