//! Request extractors: the caller's identity, and JSON/path/query wrappers
//! whose rejections use the API error envelope.

use axum::{
  extract::{FromRequest, FromRequestParts},
  http::request::Parts,
};
use uuid::Uuid;
use voyage_core::store::PlannerStore;

use crate::{AppState, error::ApiError};

/// The owner on whose behalf the request runs.
///
/// Authentication happens upstream; the authenticating proxy forwards the
/// owner id in the header named by [`AppState::identity_header`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub Uuid);

impl<S> FromRequestParts<AppState<S>> for Caller
where
  S: PlannerStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let header = &state.identity_header;
    let value = parts
      .headers
      .get(header)
      .ok_or_else(|| ApiError::Unauthorized(format!("missing {header} header")))?;

    value
      .to_str()
      .ok()
      .and_then(|v| Uuid::parse_str(v.trim()).ok())
      .map(Caller)
      .ok_or_else(|| ApiError::Unauthorized(format!("{header} is not a valid owner id")))
  }
}

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::http::{HeaderName, Request};
  use voyage_store_sqlite::SqliteStore;

  use super::*;
  use crate::dispatch::RecommendationQueue;

  async fn state() -> AppState<SqliteStore> {
    let (queue, _tasks) = RecommendationQueue::new(4);
    AppState {
      store: Arc::new(SqliteStore::open_in_memory().await.unwrap()),
      queue,
      identity_header: HeaderName::from_static("x-owner-id"),
    }
  }

  async fn extract(req: Request<axum::body::Body>) -> Result<Caller, ApiError> {
    let state = state().await;
    let (mut parts, _) = req.into_parts();
    Caller::from_request_parts(&mut parts, &state).await
  }

  #[tokio::test]
  async fn reads_owner_from_header() {
    let id = Uuid::new_v4();
    let req = Request::builder()
      .header("x-owner-id", id.to_string())
      .body(axum::body::Body::empty())
      .unwrap();
    assert_eq!(extract(req).await.unwrap(), Caller(id));
  }

  #[tokio::test]
  async fn missing_header_is_unauthorized() {
    let req = Request::builder().body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract(req).await, Err(ApiError::Unauthorized(_))));
  }

  #[tokio::test]
  async fn malformed_owner_is_unauthorized() {
    let req = Request::builder()
      .header("x-owner-id", "alice")
      .body(axum::body::Body::empty())
      .unwrap();
    assert!(matches!(extract(req).await, Err(ApiError::Unauthorized(_))));
  }
}
