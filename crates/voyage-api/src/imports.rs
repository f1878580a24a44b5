//! Handler for the agent's plan import.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/import-plan` | Creates or updates by `sessionKey`; always writes a new plan version |

use axum::{Json, extract::State};
use tracing::info;
use voyage_core::{
  import::ImportOutcome,
  recommend::RecommendationTask,
  store::PlannerStore,
};
use voyage_snapshot::ImportPlanRequest;

use crate::{
  AppState,
  error::ApiError,
  extract::{ApiJson, Caller},
};

/// `POST /import-plan`
pub async fn import_plan<S>(
  State(state): State<AppState<S>>,
  Caller(owner_id): Caller,
  ApiJson(request): ApiJson<ImportPlanRequest>,
) -> Result<Json<ImportOutcome>, ApiError>
where
  S: PlannerStore + Clone + 'static,
{
  let snapshot = voyage_snapshot::parse(request).map_err(ApiError::domain)?;
  let session_key = snapshot.session_key.clone();

  let outcome = state
    .store
    .import_snapshot(owner_id, snapshot)
    .await
    .map_err(|e| {
      tracing::warn!(%owner_id, ?session_key, error = %e, "import failed");
      ApiError::domain(e)
    })?;

  info!(
    %owner_id,
    itinerary_id = %outcome.itinerary_id,
    ?session_key,
    status = ?outcome.status,
    version = outcome.plan_version,
    warnings = outcome.warnings.len(),
    "plan imported"
  );

  if outcome.status.is_created() {
    state.queue.dispatch(RecommendationTask {
      itinerary_id: outcome.itinerary_id,
      poi_count:    outcome.recommended_poi_count,
    });
  }

  Ok(Json(outcome))
}
