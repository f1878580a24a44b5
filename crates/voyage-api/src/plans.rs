//! Handlers for plan reads and re-plans.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/itineraries/{id}/plan` | The active plan; `ETag` is its digest, honours `If-None-Match` |
//! | `GET`  | `/itineraries/{id}/plans` | Every version, oldest first |
//! | `PUT`  | `/itineraries/{id}/plan` | Body: `{"days":[…]}`; writes the next version |

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use voyage_core::{plan::Plan, store::PlannerStore};
use voyage_snapshot::ImportedDay;

use crate::{
  AppState,
  error::ApiError,
  extract::{ApiJson, ApiPath, Caller},
};

// ─── Current ──────────────────────────────────────────────────────────────────

/// `GET /itineraries/{id}/plan`
pub async fn current<S>(
  State(state): State<AppState<S>>,
  Caller(owner_id): Caller,
  ApiPath(id): ApiPath<Uuid>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: PlannerStore + Clone + 'static,
{
  let plan = state
    .store
    .current_plan(owner_id, id)
    .await
    .map_err(ApiError::domain)?
    .ok_or_else(|| ApiError::NotFound(format!("itinerary {id} has no plan yet")))?;

  let etag = plan.etag();
  if if_none_match(&headers, &etag) {
    return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
  }
  Ok(([(header::ETAG, etag)], Json(plan)).into_response())
}

/// Whether `If-None-Match` lists `etag` (or `*`).
fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
  headers
    .get(header::IF_NONE_MATCH)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| v.split(',').map(str::trim).any(|t| t == "*" || t == etag))
}

// ─── History ──────────────────────────────────────────────────────────────────

/// `GET /itineraries/{id}/plans`
pub async fn history<S>(
  State(state): State<AppState<S>>,
  Caller(owner_id): Caller,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<Plan>>, ApiError>
where
  S: PlannerStore + Clone + 'static,
{
  let plans = state
    .store
    .plan_history(owner_id, id)
    .await
    .map_err(ApiError::domain)?;
  Ok(Json(plans))
}

// ─── Re-plan ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReplanBody {
  #[serde(default)]
  pub days: Vec<ImportedDay>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplanResponse {
  pub plan_version: u32,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub warnings:     Vec<String>,
}

/// `PUT /itineraries/{id}/plan`
pub async fn replan<S>(
  State(state): State<AppState<S>>,
  Caller(owner_id): Caller,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(body): ApiJson<ReplanBody>,
) -> Result<Response, ApiError>
where
  S: PlannerStore + Clone + 'static,
{
  let (schedule, mut warnings) =
    voyage_snapshot::parse_schedule(body.days).map_err(ApiError::domain)?;
  let outcome = state
    .store
    .replan(owner_id, id, schedule)
    .await
    .map_err(ApiError::domain)?;

  info!(
    %owner_id,
    itinerary_id = %id,
    version = outcome.plan.version,
    warnings = warnings.len() + outcome.warnings.len(),
    "plan replaced"
  );

  let etag = outcome.plan.etag();
  warnings.extend(outcome.warnings);
  let body = ReplanResponse { plan_version: outcome.plan.version, warnings };
  Ok(([(header::ETAG, etag)], Json(body)).into_response())
}
