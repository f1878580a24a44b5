//! Session lookups used by the planning agent between turns.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/sessions/{key}/itinerary` | 404 if no itinerary is linked yet |
//! | `GET`  | `/sessions/{key}/pinned-pois` | Empty when no itinerary is linked |

use axum::{Json, extract::State};
use voyage_core::{itinerary::Itinerary, place::LinkedPlace, store::PlannerStore};

use crate::{
  AppState,
  error::ApiError,
  extract::{ApiPath, Caller},
};

/// `GET /sessions/{key}/itinerary`
pub async fn itinerary<S>(
  State(state): State<AppState<S>>,
  Caller(owner_id): Caller,
  ApiPath(key): ApiPath<String>,
) -> Result<Json<Itinerary>, ApiError>
where
  S: PlannerStore + Clone + 'static,
{
  state
    .store
    .itinerary_for_session(owner_id, &key)
    .await
    .map_err(ApiError::domain)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("no itinerary is linked to session {key:?}")))
}

/// `GET /sessions/{key}/pinned-pois`
pub async fn pinned_pois<S>(
  State(state): State<AppState<S>>,
  Caller(owner_id): Caller,
  ApiPath(key): ApiPath<String>,
) -> Result<Json<Vec<LinkedPlace>>, ApiError>
where
  S: PlannerStore + Clone + 'static,
{
  let places = state
    .store
    .pinned_places_for_session(owner_id, &key)
    .await
    .map_err(ApiError::domain)?;
  Ok(Json(places))
}
