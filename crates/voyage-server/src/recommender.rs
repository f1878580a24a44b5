//! The recommender the server runs with.

use std::convert::Infallible;

use tracing::debug;
use voyage_core::recommend::{RecommendationTask, Recommender};

/// Accepts every task and generates nothing, so each new itinerary is
/// marked complete with zero generated places.
#[derive(Debug, Clone, Copy, Default)]
pub struct Idle;

impl Recommender for Idle {
  type Error = Infallible;

  async fn recommend(&self, task: RecommendationTask) -> Result<usize, Infallible> {
    debug!(
      itinerary_id = %task.itinerary_id,
      requested = task.poi_count,
      "no recommender configured; skipping generation"
    );
    Ok(0)
  }
}
