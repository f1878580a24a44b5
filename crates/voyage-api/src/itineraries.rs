//! Handlers for `/itineraries` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/itineraries` | The caller's itineraries, newest first |
//! | `POST` | `/itineraries` | Explicit creation; body: [`CreateItinerary`] |
//! | `GET`  | `/itineraries/{id}` | 403 if held by another owner |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;
use uuid::Uuid;
use voyage_core::{
  itinerary::{CreateItinerary, Itinerary},
  recommend::RecommendationTask,
  store::PlannerStore,
};

use crate::{
  AppState,
  error::ApiError,
  extract::{ApiJson, ApiPath, Caller},
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /itineraries`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Caller(owner_id): Caller,
) -> Result<Json<Vec<Itinerary>>, ApiError>
where
  S: PlannerStore + Clone + 'static,
{
  let itineraries = state
    .store
    .list_itineraries(owner_id)
    .await
    .map_err(ApiError::domain)?;
  Ok(Json(itineraries))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /itineraries`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Caller(owner_id): Caller,
  ApiJson(body): ApiJson<CreateItinerary>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlannerStore + Clone + 'static,
{
  let input = body.into_new().map_err(ApiError::domain)?;
  let poi_count = input.recommended_poi_count();

  let itinerary = state
    .store
    .create_itinerary(owner_id, input)
    .await
    .map_err(ApiError::domain)?;

  info!(%owner_id, itinerary_id = %itinerary.itinerary_id, "itinerary created");
  state.queue.dispatch(RecommendationTask { itinerary_id: itinerary.itinerary_id, poi_count });

  Ok((StatusCode::CREATED, Json(itinerary)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /itineraries/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Caller(owner_id): Caller,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Itinerary>, ApiError>
where
  S: PlannerStore + Clone + 'static,
{
  let itinerary = state
    .store
    .get_itinerary(owner_id, id)
    .await
    .map_err(ApiError::domain)?;
  Ok(Json(itinerary))
}
