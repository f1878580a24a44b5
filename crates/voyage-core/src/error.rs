//! Error types for `voyage-core`.

use thiserror::Error;
use uuid::Uuid;

/// The failure classes callers must be able to tell apart.
///
/// Every error in the workspace reduces to exactly one of these, which is what
/// the HTTP layer turns into a status code and an error-envelope `code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Structurally invalid input.
  BadRequest,
  /// Unknown owner, itinerary, or place.
  NotFound,
  /// The caller does not own the itinerary it is acting on.
  Forbidden,
  /// The write would duplicate an existing link or session.
  Conflict,
  /// Anything unexpected.
  Internal,
}

impl ErrorKind {
  /// The machine-readable code used in error envelopes.
  pub fn code(self) -> &'static str {
    match self {
      Self::BadRequest => "BAD_REQUEST",
      Self::NotFound => "NOT_FOUND",
      Self::Forbidden => "FORBIDDEN",
      Self::Conflict => "CONFLICT",
      Self::Internal => "INTERNAL_SERVER_ERROR",
    }
  }
}

/// Implemented by every error type that crosses a crate boundary.
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid request: {0}")]
  Invalid(String),

  #[error("owner not found: {0}")]
  OwnerNotFound(Uuid),

  #[error("itinerary not found: {0}")]
  ItineraryNotFound(Uuid),

  #[error("place {place_id} not found in itinerary {itinerary_id}")]
  PlaceNotLinked { itinerary_id: Uuid, place_id: Uuid },

  #[error("itinerary {0} is owned by another user")]
  NotOwner(Uuid),

  #[error("session {0:?} is linked to an itinerary owned by another user")]
  SessionOwnedElsewhere(String),

  #[error("place {place_id} is already in itinerary {itinerary_id}")]
  AlreadyLinked { itinerary_id: Uuid, place_id: Uuid },

  #[error("session {0:?} was linked concurrently by another import")]
  SessionConflict(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::Invalid(_) => ErrorKind::BadRequest,
      Self::OwnerNotFound(_)
      | Self::ItineraryNotFound(_)
      | Self::PlaceNotLinked { .. } => ErrorKind::NotFound,
      Self::NotOwner(_) | Self::SessionOwnedElsewhere(_) => ErrorKind::Forbidden,
      Self::AlreadyLinked { .. } | Self::SessionConflict(_) => ErrorKind::Conflict,
      Self::Serialization(_) => ErrorKind::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
