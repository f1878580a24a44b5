//! Recommendation generation hand-off.
//!
//! Generating recommendations is not part of the import transaction. A task
//! is dispatched only after a creation has committed, and an independent
//! worker reports back through
//! [`PlannerStore::complete_generation`](crate::store::PlannerStore::complete_generation).

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationTask {
  pub itinerary_id: Uuid,
  pub poi_count:    u32,
}

/// What the worker reports once a task finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
  Generated { places: usize },
  Failed { error: String },
}

/// A producer of place recommendations for a freshly created itinerary.
pub trait Recommender: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Generate up to `task.poi_count` places and return how many were added.
  fn recommend(
    &self,
    task: RecommendationTask,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
