//! JSON REST API for Voyage.
//!
//! Exposes an axum [`Router`] backed by any [`voyage_core::store::PlannerStore`].
//! Authentication and TLS happen upstream; the authenticated owner id arrives
//! in a request header (see [`extract::Caller`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! let (queue, tasks) = RecommendationQueue::new(64);
//! .nest("/api", voyage_api::api_router(AppState { store, queue, identity_header }))
//! ```

pub mod dispatch;
pub mod error;
pub mod extract;
pub mod imports;
pub mod itineraries;
pub mod places;
pub mod plans;
pub mod sessions;

use std::sync::Arc;

use axum::{
  Router,
  http::HeaderName,
  routing::{delete, get, post},
};
use voyage_core::store::PlannerStore;

pub use dispatch::{RecommendationQueue, run_worker};
pub use error::ApiError;

/// Shared state for every API handler.
#[derive(Clone)]
pub struct AppState<S: PlannerStore> {
  pub store:           Arc<S>,
  pub queue:           RecommendationQueue,
  /// Header carrying the authenticated owner id.
  pub identity_header: HeaderName,
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: PlannerStore + Clone + 'static,
{
  Router::new()
    // Import
    .route("/import-plan", post(imports::import_plan::<S>))
    // Itineraries
    .route("/itineraries", get(itineraries::list::<S>).post(itineraries::create::<S>))
    .route("/itineraries/{id}", get(itineraries::get_one::<S>))
    // Curation
    .route("/itineraries/{id}/places", get(places::list::<S>).post(places::add::<S>))
    .route("/itineraries/{id}/places/{place_id}", delete(places::remove::<S>))
    .route("/itineraries/{id}/interests", post(places::set_interest::<S>))
    // Plans
    .route("/itineraries/{id}/plan", get(plans::current::<S>).put(plans::replan::<S>))
    .route("/itineraries/{id}/plans", get(plans::history::<S>))
    // Sessions
    .route("/sessions/{key}/itinerary", get(sessions::itinerary::<S>))
    .route("/sessions/{key}/pinned-pois", get(sessions::pinned_pois::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use serde_json::{Value, json};
  use tokio::sync::mpsc;
  use tower::ServiceExt as _;
  use uuid::Uuid;
  use voyage_core::recommend::RecommendationTask;
  use voyage_store_sqlite::SqliteStore;

  use super::*;

  struct Harness {
    state: AppState<SqliteStore>,
    tasks: mpsc::Receiver<RecommendationTask>,
    owner: Uuid,
  }

  async fn harness() -> Harness {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let owner = store.add_owner("traveller@example.com".into()).await.unwrap().owner_id;
    let (queue, tasks) = RecommendationQueue::new(8);
    Harness {
      state: AppState {
        store: Arc::new(store),
        queue,
        identity_header: HeaderName::from_static("x-owner-id"),
      },
      tasks,
      owner,
    }
  }

  async fn oneshot_raw(
    state:   &AppState<SqliteStore>,
    method:  &str,
    uri:     &str,
    headers: Vec<(&str, String)>,
    body:    &str,
  ) -> Response {
    let mut builder = Request::builder()
      .method(method)
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json");
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();
    api_router(state.clone()).oneshot(req).await.unwrap()
  }

  async fn call(
    state: &AppState<SqliteStore>,
    owner: Uuid,
    method: &str,
    uri: &str,
    body: Value,
  ) -> Response {
    let body = if body.is_null() { String::new() } else { body.to_string() };
    oneshot_raw(state, method, uri, vec![("x-owner-id", owner.to_string())], &body).await
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn snapshot(session: &str) -> Value {
    json!({
      "sessionKey": session,
      "userFeatures": { "destination": "Lisbon", "travelPace": "moderate" },
      "pois": [
        {
          "externalId": "torre", "name": "Torre de Belém", "latitude": 38.6916, "longitude": -9.2160,
          "address": "Av. Brasília, Lisboa"
        },
        {
          "externalId": "tram", "name": "Tram 28", "latitude": 38.7139, "longitude": -9.1334,
          "address": "Praça Martim Moniz, Lisboa"
        }
      ],
      "plan": {
        "startDate": "2025-05-10T09:00:00+01:00",
        "endDate": "2025-05-12T18:00:00+01:00",
        "days": [{
          "date": "2025-05-10",
          "stops": [
            { "poiExternalId": "torre", "arrivalTime": "09:30", "departureTime": "11:00" },
            { "poiExternalId": "tram", "arrivalTime": "13:00", "departureTime": "14:00" }
          ]
        }]
      }
    })
  }

  async fn import(h: &Harness, session: &str) -> Value {
    let resp = call(&h.state, h.owner, "POST", "/import-plan", snapshot(session)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    json_body(resp).await
  }

  // ── Import ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn import_creates_then_updates_by_session() {
    let mut h = harness().await;

    let first = import(&h, "s-1").await;
    assert_eq!(first["status"], "success");
    assert_eq!(first["importedPoisCount"], 2);
    assert_eq!(first["planVersion"], 1);

    let second = import(&h, "s-1").await;
    assert_eq!(second["status"], "updated");
    assert_eq!(second["itineraryId"], first["itineraryId"]);
    assert_eq!(second["planVersion"], 2);

    let task = h.tasks.try_recv().unwrap();
    assert_eq!(task.itinerary_id.to_string(), first["itineraryId"].as_str().unwrap());
    assert!(h.tasks.try_recv().is_err(), "updates do not dispatch");
  }

  #[tokio::test]
  async fn missing_identity_is_401() {
    let h = harness().await;
    let resp = oneshot_raw(&h.state, "GET", "/itineraries", vec![], "").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(resp).await["code"], "UNAUTHORIZED");
  }

  #[tokio::test]
  async fn malformed_json_uses_the_envelope() {
    let h = harness().await;
    let headers = vec![("x-owner-id", h.owner.to_string())];
    let resp = oneshot_raw(&h.state, "POST", "/import-plan", headers, "{not json").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["message"].is_string());
  }

  #[tokio::test]
  async fn snapshot_without_plan_is_400() {
    let h = harness().await;
    let body = json!({ "userFeatures": { "destination": "Lisbon" } });
    let resp = call(&h.state, h.owner, "POST", "/import-plan", body).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn session_of_another_owner_is_403() {
    let h = harness().await;
    import(&h, "shared").await;

    let intruder = h.state.store.add_owner("other@example.com".into()).await.unwrap().owner_id;
    let resp = call(&h.state, intruder, "POST", "/import-plan", snapshot("shared")).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(resp).await["code"], "FORBIDDEN");
  }

  // ── Itineraries ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn explicit_creation_is_201_and_dispatches() {
    let mut h = harness().await;
    let body = json!({
      "destination": "Porto",
      "startDate": "2025-06-01T09:00:00+01:00",
      "endDate": "2025-06-02T18:00:00+01:00"
    });
    let resp = call(&h.state, h.owner, "POST", "/itineraries", body).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = json_body(resp).await;
    assert_eq!(created["destination"], "Porto");
    assert!(h.tasks.try_recv().is_ok());

    let resp = call(&h.state, h.owner, "GET", "/itineraries", Value::Null).await;
    assert_eq!(json_body(resp).await.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn foreign_itinerary_is_403_and_unknown_is_404() {
    let h = harness().await;
    let id = import(&h, "s-1").await["itineraryId"].as_str().unwrap().to_owned();

    let other = h.state.store.add_owner("other@example.com".into()).await.unwrap().owner_id;
    let resp = call(&h.state, other, "GET", &format!("/itineraries/{id}"), Value::Null).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let uri = format!("/itineraries/{}", Uuid::new_v4());
    let resp = call(&h.state, h.owner, "GET", &uri, Value::Null).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Curation ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn curation_round() {
    let h = harness().await;
    let id = import(&h, "s-1").await["itineraryId"].as_str().unwrap().to_owned();

    let resp = call(&h.state, h.owner, "GET", &format!("/itineraries/{id}/places"), Value::Null).await;
    let places = json_body(resp).await;
    assert_eq!(places.as_array().unwrap().len(), 2);
    let place_id = places[0]["place"]["placeId"].as_str().unwrap().to_owned();

    let body = json!({ "placeId": place_id, "pinned": false });
    let resp = call(&h.state, h.owner, "POST", &format!("/itineraries/{id}/interests"), body).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["pinned"], false);

    let uri = format!("/itineraries/{id}/places?pinned=true");
    let resp = call(&h.state, h.owner, "GET", &uri, Value::Null).await;
    assert_eq!(json_body(resp).await.as_array().unwrap().len(), 1);

    let uri = format!("/itineraries/{id}/places/{place_id}");
    let resp = call(&h.state, h.owner, "DELETE", &uri, Value::Null).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["success"], true);

    let resp = call(&h.state, h.owner, "DELETE", &uri, Value::Null).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn adding_a_linked_place_twice_is_409() {
    let h = harness().await;
    let id = import(&h, "s-1").await["itineraryId"].as_str().unwrap().to_owned();
    let uri = format!("/itineraries/{id}/places");
    let body = json!({
      "externalRef": "lx-factory",
      "name": "LX Factory",
      "address": "Rua Rodrigues de Faria 103",
      "latitude": 38.7036,
      "longitude": -9.1783
    });

    let resp = call(&h.state, h.owner, "POST", &uri, body.clone()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(json_body(resp).await["pinned"], true);

    let resp = call(&h.state, h.owner, "POST", &uri, body).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(resp).await["code"], "CONFLICT");
  }

  #[tokio::test]
  async fn padded_external_ref_matches_the_stored_one() {
    let h = harness().await;
    let id = import(&h, "s-1").await["itineraryId"].as_str().unwrap().to_owned();
    let uri = format!("/itineraries/{id}/places");
    let body = |external_ref: &str| {
      json!({
        "externalRef": external_ref,
        "name": "Miradouro da Graça",
        "address": "Calçada da Graça",
        "latitude": 38.7162,
        "longitude": -9.1312
      })
    };

    let resp = call(&h.state, h.owner, "POST", &uri, body("graca")).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(json_body(resp).await["place"]["externalRef"], "graca");

    let resp = call(&h.state, h.owner, "POST", &uri, body("  graca ")).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
  }

  // ── Plans ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn current_plan_honours_if_none_match() {
    let h = harness().await;
    let id = import(&h, "s-1").await["itineraryId"].as_str().unwrap().to_owned();
    let uri = format!("/itineraries/{id}/plan");

    let resp = call(&h.state, h.owner, "GET", &uri, Value::Null).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let etag = resp.headers().get(header::ETAG).unwrap().to_str().unwrap().to_owned();
    assert_eq!(json_body(resp).await["version"], 1);

    let headers = vec![("x-owner-id", h.owner.to_string()), ("if-none-match", etag)];
    let resp = oneshot_raw(&h.state, "GET", &uri, headers, "").await;
    assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
  }

  #[tokio::test]
  async fn stale_etag_is_not_confirmed_after_a_reimport() {
    let h = harness().await;
    let id = import(&h, "s-1").await["itineraryId"].as_str().unwrap().to_owned();
    let uri = format!("/itineraries/{id}/plan");

    let resp = call(&h.state, h.owner, "GET", &uri, Value::Null).await;
    let v1_etag = resp.headers().get(header::ETAG).unwrap().to_str().unwrap().to_owned();

    // Same stops, so the plan body is unchanged.
    assert_eq!(import(&h, "s-1").await["planVersion"], 2);

    let headers = vec![("x-owner-id", h.owner.to_string()), ("if-none-match", v1_etag.clone())];
    let resp = oneshot_raw(&h.state, "GET", &uri, headers, "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_ne!(resp.headers().get(header::ETAG).unwrap().to_str().unwrap(), v1_etag);
    assert_eq!(json_body(resp).await["version"], 2);
  }

  #[tokio::test]
  async fn replan_writes_the_next_version() {
    let h = harness().await;
    let id = import(&h, "s-1").await["itineraryId"].as_str().unwrap().to_owned();

    let body = json!({
      "days": [{
        "date": "2025-05-11",
        "stops": [
          { "poiExternalId": "tram", "arrivalTime": "10:00", "departureTime": "11:00" },
          { "poiExternalId": "gone", "arrivalTime": "12:00", "departureTime": "13:00" }
        ]
      }]
    });
    let resp = call(&h.state, h.owner, "PUT", &format!("/itineraries/{id}/plan"), body).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let outcome = json_body(resp).await;
    assert_eq!(outcome["planVersion"], 2);
    assert_eq!(outcome["warnings"].as_array().unwrap().len(), 1);

    let resp = call(&h.state, h.owner, "GET", &format!("/itineraries/{id}/plans"), Value::Null).await;
    let history = json_body(resp).await;
    let active: Vec<bool> = history
      .as_array()
      .unwrap()
      .iter()
      .map(|p| p["active"].as_bool().unwrap())
      .collect();
    assert_eq!(active, [false, true]);
  }

  // ── Sessions ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn session_lookups() {
    let h = harness().await;
    let id = import(&h, "s-1").await["itineraryId"].clone();

    let resp = call(&h.state, h.owner, "GET", "/sessions/s-1/itinerary", Value::Null).await;
    assert_eq!(json_body(resp).await["itineraryId"], id);

    let resp = call(&h.state, h.owner, "GET", "/sessions/s-1/pinned-pois", Value::Null).await;
    assert_eq!(json_body(resp).await.as_array().unwrap().len(), 2);

    let resp = call(&h.state, h.owner, "GET", "/sessions/nope/itinerary", Value::Null).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = call(&h.state, h.owner, "GET", "/sessions/nope/pinned-pois", Value::Null).await;
    assert_eq!(json_body(resp).await, json!([]));
  }
}
