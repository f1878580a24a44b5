//! Curation service: the user's pin, unpin, add and remove actions.
//!
//! Every action checks, in order, that the itinerary exists, that the caller
//! owns it, and then that the link it names exists.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;
use voyage_core::{
  Error as CoreError,
  place::{LinkedPlace, NewPlace},
};

use crate::{Result, itineraries, linkage, reconcile};

/// Setting the current value again is a successful no-op.
pub fn set_pinned(
  conn: &Connection,
  owner_id: Uuid,
  itinerary_id: Uuid,
  place_id: Uuid,
  pinned: bool,
) -> Result<LinkedPlace> {
  itineraries::owned(conn, owner_id, itinerary_id)?;
  let mut linked = linkage::get(conn, itinerary_id, place_id)?
    .ok_or(CoreError::PlaceNotLinked { itinerary_id, place_id })?;

  if linked.pinned != pinned {
    linkage::set_pinned(conn, itinerary_id, place_id, pinned)?;
    linked.pinned = pinned;
  }
  Ok(linked)
}

/// Link a manually chosen place, pinned.
///
/// A place with the same `external_ref` is reused rather than duplicated;
/// linking one that is already in the itinerary is a conflict.
pub fn add_place(
  conn: &Connection,
  owner_id: Uuid,
  itinerary_id: Uuid,
  new: &NewPlace,
  now: DateTime<Utc>,
) -> Result<LinkedPlace> {
  itineraries::owned(conn, owner_id, itinerary_id)?;

  let existing = match new.external_ref.as_deref() {
    Some(external_ref) => reconcile::by_external_ref(conn, external_ref)?,
    None => None,
  };
  let place = match existing {
    Some(place) => {
      if linkage::get(conn, itinerary_id, place.place_id)?.is_some() {
        return Err(CoreError::AlreadyLinked { itinerary_id, place_id: place.place_id }.into());
      }
      place
    }
    None => reconcile::insert_place(conn, new, now)?,
  };

  linkage::link(conn, itinerary_id, &place, true, now)?;
  itineraries::touch(conn, itinerary_id, now)?;
  Ok(LinkedPlace { place, pinned: true })
}

/// Hard-delete the link. The catalog place stays.
pub fn remove_place(
  conn: &Connection,
  owner_id: Uuid,
  itinerary_id: Uuid,
  place_id: Uuid,
  now: DateTime<Utc>,
) -> Result<()> {
  itineraries::owned(conn, owner_id, itinerary_id)?;
  if !linkage::unlink(conn, itinerary_id, place_id)? {
    return Err(CoreError::PlaceNotLinked { itinerary_id, place_id }.into());
  }
  itineraries::touch(conn, itinerary_id, now)
}
