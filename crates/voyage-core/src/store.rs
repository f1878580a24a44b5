//! The `PlannerStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `voyage-store-sqlite`).
//! Higher layers (`voyage-api`, `voyage-server`) depend on this abstraction,
//! not on any concrete backend.
//!
//! Every method that takes an `owner_id` verifies that the owner holds the
//! itinerary it names, on every call. Ownership failures classify as
//! [`ErrorKind::Forbidden`](crate::ErrorKind::Forbidden); missing rows as
//! [`ErrorKind::NotFound`](crate::ErrorKind::NotFound).

use std::future::Future;

use uuid::Uuid;

use crate::{
  Classify,
  import::{ImportOutcome, ReplanOutcome, Snapshot},
  itinerary::{Itinerary, NewItinerary},
  owner::Owner,
  place::{LinkedPlace, NewPlace},
  plan::Plan,
  recommend::GenerationOutcome,
  schedule::ScheduleDraft,
};

/// Abstraction over the planner's system of record.
///
/// Each write method is atomic: it either commits completely or leaves the
/// store untouched.
pub trait PlannerStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Owners ────────────────────────────────────────────────────────────

  fn add_owner(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Owner, Self::Error>> + Send + '_;

  fn get_owner(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Option<Owner>, Self::Error>> + Send + '_;

  // ── Import ────────────────────────────────────────────────────────────

  /// Fold an agent snapshot into storage.
  ///
  /// Routes to the update path when the snapshot's session key already links
  /// to an itinerary of `owner_id`, and to the create path otherwise. A key
  /// linked to another owner's itinerary is rejected as forbidden.
  fn import_snapshot(
    &self,
    owner_id: Uuid,
    snapshot: Snapshot,
  ) -> impl Future<Output = Result<ImportOutcome, Self::Error>> + Send + '_;

  // ── Itineraries ───────────────────────────────────────────────────────

  fn create_itinerary(
    &self,
    owner_id: Uuid,
    input: NewItinerary,
  ) -> impl Future<Output = Result<Itinerary, Self::Error>> + Send + '_;

  fn get_itinerary(
    &self,
    owner_id: Uuid,
    itinerary_id: Uuid,
  ) -> impl Future<Output = Result<Itinerary, Self::Error>> + Send + '_;

  /// All itineraries of `owner_id`, most recently created first.
  fn list_itineraries(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Itinerary>, Self::Error>> + Send + '_;

  /// The itinerary linked to `session_key`, if any.
  fn itinerary_for_session<'a>(
    &'a self,
    owner_id: Uuid,
    session_key: &'a str,
  ) -> impl Future<Output = Result<Option<Itinerary>, Self::Error>> + Send + 'a;

  /// Completion callback of the recommendation worker.
  fn complete_generation(
    &self,
    itinerary_id: Uuid,
    outcome: GenerationOutcome,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Curation ──────────────────────────────────────────────────────────

  fn list_places(
    &self,
    owner_id: Uuid,
    itinerary_id: Uuid,
    pinned_only: bool,
  ) -> impl Future<Output = Result<Vec<LinkedPlace>, Self::Error>> + Send + '_;

  /// Pinned places of the itinerary linked to `session_key`; empty when no
  /// itinerary is linked.
  fn pinned_places_for_session<'a>(
    &'a self,
    owner_id: Uuid,
    session_key: &'a str,
  ) -> impl Future<Output = Result<Vec<LinkedPlace>, Self::Error>> + Send + 'a;

  /// Set the pinned flag of an existing link. Setting the current value again
  /// succeeds without change.
  fn set_pinned(
    &self,
    owner_id: Uuid,
    itinerary_id: Uuid,
    place_id: Uuid,
    pinned: bool,
  ) -> impl Future<Output = Result<LinkedPlace, Self::Error>> + Send + '_;

  /// Link a manually chosen place, reusing a catalog place with the same
  /// `external_ref`. The new link is pinned.
  fn add_place(
    &self,
    owner_id: Uuid,
    itinerary_id: Uuid,
    place: NewPlace,
  ) -> impl Future<Output = Result<LinkedPlace, Self::Error>> + Send + '_;

  /// Hard-delete a link. The catalog place is kept.
  fn remove_place(
    &self,
    owner_id: Uuid,
    itinerary_id: Uuid,
    place_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Plans ─────────────────────────────────────────────────────────────

  /// Write a new plan version from `schedule`, resolved against the
  /// itinerary's existing links.
  fn replan(
    &self,
    owner_id: Uuid,
    itinerary_id: Uuid,
    schedule: ScheduleDraft,
  ) -> impl Future<Output = Result<ReplanOutcome, Self::Error>> + Send + '_;

  fn current_plan(
    &self,
    owner_id: Uuid,
    itinerary_id: Uuid,
  ) -> impl Future<Output = Result<Option<Plan>, Self::Error>> + Send + '_;

  /// Every plan of the itinerary, ordered by version.
  fn plan_history(
    &self,
    owner_id: Uuid,
    itinerary_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Plan>, Self::Error>> + Send + '_;
}
