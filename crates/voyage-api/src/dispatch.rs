//! Post-commit recommendation dispatch.
//!
//! Handlers enqueue a [`RecommendationTask`] only after the store call that
//! created the itinerary has returned, i.e. after commit. Enqueueing never
//! blocks the request: a full or closed queue drops the task with a warning.
//! [`run_worker`] drains the queue independently and reports each result back
//! through [`PlannerStore::complete_generation`].

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info, warn};
use voyage_core::{
  recommend::{GenerationOutcome, RecommendationTask, Recommender},
  store::PlannerStore,
};

/// Sending half of the bounded recommendation queue.
#[derive(Clone)]
pub struct RecommendationQueue {
  tx: mpsc::Sender<RecommendationTask>,
}

impl RecommendationQueue {
  /// A queue holding at most `capacity` pending tasks, and its receiving end.
  pub fn new(capacity: usize) -> (Self, mpsc::Receiver<RecommendationTask>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (Self { tx }, rx)
  }

  /// Returns whether the task was queued.
  pub fn dispatch(&self, task: RecommendationTask) -> bool {
    match self.tx.try_send(task) {
      Ok(()) => {
        debug!(
          itinerary_id = %task.itinerary_id,
          poi_count = task.poi_count,
          "recommendation queued"
        );
        true
      }
      Err(TrySendError::Full(_)) => {
        warn!(itinerary_id = %task.itinerary_id, "recommendation queue full; task dropped");
        false
      }
      Err(TrySendError::Closed(_)) => {
        warn!(itinerary_id = %task.itinerary_id, "recommendation worker gone; task dropped");
        false
      }
    }
  }
}

/// Drain `tasks` until every sender is dropped.
pub async fn run_worker<S, R>(
  store: Arc<S>,
  recommender: R,
  mut tasks: mpsc::Receiver<RecommendationTask>,
) where
  S: PlannerStore,
  R: Recommender,
{
  while let Some(task) = tasks.recv().await {
    let outcome = match recommender.recommend(task).await {
      Ok(places) => {
        info!(itinerary_id = %task.itinerary_id, places, "recommendations generated");
        GenerationOutcome::Generated { places }
      }
      Err(e) => {
        warn!(itinerary_id = %task.itinerary_id, error = %e, "recommendation failed");
        GenerationOutcome::Failed { error: e.to_string() }
      }
    };

    if let Err(e) = store.complete_generation(task.itinerary_id, outcome).await {
      error!(
        itinerary_id = %task.itinerary_id,
        error = %e,
        "failed to record recommendation outcome"
      );
    }
  }
  debug!("recommendation queue closed; worker exiting");
}

#[cfg(test)]
mod tests {
  use std::{convert::Infallible, future::Future};

  use uuid::Uuid;
  use voyage_core::itinerary::NewItinerary;
  use voyage_store_sqlite::SqliteStore;

  use super::*;

  /// Claims to generate exactly what was asked for.
  struct Echo;

  impl Recommender for Echo {
    type Error = Infallible;

    fn recommend(
      &self,
      task: RecommendationTask,
    ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_ {
      async move { Ok(task.poi_count as usize) }
    }
  }

  fn task() -> RecommendationTask {
    RecommendationTask { itinerary_id: Uuid::new_v4(), poi_count: 4 }
  }

  #[test]
  fn full_queue_drops_without_blocking() {
    let (queue, _rx) = RecommendationQueue::new(1);
    assert!(queue.dispatch(task()));
    assert!(!queue.dispatch(task()));
  }

  #[test]
  fn closed_queue_drops() {
    let (queue, rx) = RecommendationQueue::new(1);
    drop(rx);
    assert!(!queue.dispatch(task()));
  }

  #[tokio::test]
  async fn worker_records_outcome_on_the_itinerary() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let owner = store.add_owner("w@example.com".into()).await.unwrap().owner_id;
    let input = NewItinerary {
      destination:  "Kyoto".into(),
      start_date:   "2025-04-01T09:00:00+09:00".parse().unwrap(),
      end_date:     "2025-04-03T09:00:00+09:00".parse().unwrap(),
      budget_cents: 100_000,
      preferences:  Default::default(),
    };
    let itinerary = store.create_itinerary(owner, input).await.unwrap();

    let (queue, rx) = RecommendationQueue::new(4);
    assert!(queue.dispatch(RecommendationTask {
      itinerary_id: itinerary.itinerary_id,
      poi_count:    6,
    }));
    drop(queue);

    run_worker(store.clone(), Echo, rx).await;

    let itinerary = store.get_itinerary(owner, itinerary.itinerary_id).await.unwrap();
    assert_eq!(itinerary.metadata["generation_pending"], false);
    assert_eq!(itinerary.metadata["generated_places_count"], 6);
  }
}
