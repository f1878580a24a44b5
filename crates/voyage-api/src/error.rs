//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure is rendered as `{"code": ..., "message": ...}`. Internal
//! failures get a generic message; their detail only goes to the log.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use voyage_core::{Classify, ErrorKind};

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("not found: {0}")]
  NotFound(String),

  /// A classified error from the store or the snapshot parser.
  #[error("{source}")]
  Domain {
    kind:   ErrorKind,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

impl ApiError {
  pub fn domain<E>(e: E) -> Self
  where
    E: std::error::Error + Classify + Send + Sync + 'static,
  {
    Self::Domain { kind: e.kind(), source: Box::new(e) }
  }

  fn status_and_code(&self) -> (StatusCode, &'static str) {
    let kind = match self {
      Self::Unauthorized(_) => return (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
      Self::BadRequest(_) => ErrorKind::BadRequest,
      Self::NotFound(_) => ErrorKind::NotFound,
      Self::Domain { kind, .. } => *kind,
    };
    let status = match kind {
      ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
      ErrorKind::NotFound => StatusCode::NOT_FOUND,
      ErrorKind::Forbidden => StatusCode::FORBIDDEN,
      ErrorKind::Conflict => StatusCode::CONFLICT,
      ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, kind.code())
  }
}

/// The uniform error envelope.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
  pub code:    &'static str,
  pub message: String,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, code) = self.status_and_code();
    let message = match &self {
      Self::Unauthorized(m) | Self::BadRequest(m) | Self::NotFound(m) => m.clone(),
      Self::Domain { kind: ErrorKind::Internal, source } => {
        tracing::error!(error = %source, "request failed");
        "internal server error".to_owned()
      }
      Self::Domain { source, .. } => source.to_string(),
    };
    (status, Json(ErrorBody { code, message })).into_response()
  }
}

// ─── Extractor rejections ────────────────────────────────────────────────────

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}
