//! Handlers for the curation endpoints under `/itineraries/{id}`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/itineraries/{id}/places` | Optional `?pinned=true` |
//! | `POST`   | `/itineraries/{id}/places` | Manual add; body: [`AddPlace`]; 409 if already linked |
//! | `DELETE` | `/itineraries/{id}/places/{placeId}` | Removes the link, not the place |
//! | `POST`   | `/itineraries/{id}/interests` | Pin/unpin; body: `{"placeId":…,"pinned":…}` |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use voyage_core::{
  place::{AddPlace, LinkedPlace},
  store::PlannerStore,
};

use crate::{
  AppState,
  error::ApiError,
  extract::{ApiJson, ApiPath, ApiQuery, Caller},
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub pinned: bool,
}

/// `GET /itineraries/{id}/places[?pinned=true]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Caller(owner_id): Caller,
  ApiPath(id): ApiPath<Uuid>,
  ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<LinkedPlace>>, ApiError>
where
  S: PlannerStore + Clone + 'static,
{
  let places = state
    .store
    .list_places(owner_id, id, params.pinned)
    .await
    .map_err(ApiError::domain)?;
  Ok(Json(places))
}

// ─── Add ──────────────────────────────────────────────────────────────────────

/// `POST /itineraries/{id}/places`
pub async fn add<S>(
  State(state): State<AppState<S>>,
  Caller(owner_id): Caller,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(body): ApiJson<AddPlace>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlannerStore + Clone + 'static,
{
  let place = body.into_new().map_err(ApiError::domain)?;
  let linked = state
    .store
    .add_place(owner_id, id, place)
    .await
    .map_err(ApiError::domain)?;

  info!(%owner_id, itinerary_id = %id, place_id = %linked.place.place_id, "place added");
  Ok((StatusCode::CREATED, Json(linked)))
}

// ─── Remove ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RemoveResponse {
  pub success: bool,
  pub message: String,
}

/// `DELETE /itineraries/{id}/places/{placeId}`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  Caller(owner_id): Caller,
  ApiPath((id, place_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<RemoveResponse>, ApiError>
where
  S: PlannerStore + Clone + 'static,
{
  state
    .store
    .remove_place(owner_id, id, place_id)
    .await
    .map_err(ApiError::domain)?;

  info!(%owner_id, itinerary_id = %id, %place_id, "place removed");
  Ok(Json(RemoveResponse {
    success: true,
    message: format!("place {place_id} removed from itinerary {id}"),
  }))
}

// ─── Pin / unpin ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestBody {
  pub place_id: Uuid,
  pub pinned:   bool,
}

/// `POST /itineraries/{id}/interests`
pub async fn set_interest<S>(
  State(state): State<AppState<S>>,
  Caller(owner_id): Caller,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(body): ApiJson<InterestBody>,
) -> Result<Json<LinkedPlace>, ApiError>
where
  S: PlannerStore + Clone + 'static,
{
  let linked = state
    .store
    .set_pinned(owner_id, id, body.place_id, body.pinned)
    .await
    .map_err(ApiError::domain)?;

  info!(
    %owner_id,
    itinerary_id = %id,
    place_id = %body.place_id,
    pinned = linked.pinned,
    "interest updated"
  );
  Ok(Json(linked))
}
