//! Place linkage: the `itinerary_places` rows that carry curation state.
//!
//! Links are created by a creating import and by manual adds, and destroyed
//! only by an explicit remove. Nothing in here runs on the update path.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;
use voyage_core::place::{ItineraryPlace, LinkedPlace, Place};

use crate::{
  Result,
  encode::{PLACE_COLUMNS, RawLinkedPlace, encode_dt, encode_uuid},
};

pub fn link(
  conn: &Connection,
  itinerary_id: Uuid,
  place: &Place,
  pinned: bool,
  now: DateTime<Utc>,
) -> Result<ItineraryPlace> {
  let link = ItineraryPlace {
    itinerary_id,
    place_id: place.place_id,
    pinned,
    name: place.name.clone(),
    description: place.description.clone(),
    added_at: now,
  };
  conn.execute(
    "INSERT INTO itinerary_places (itinerary_id, place_id, pinned, name, description, added_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![
      encode_uuid(itinerary_id),
      encode_uuid(link.place_id),
      link.pinned,
      link.name,
      link.description,
      encode_dt(now),
    ],
  )?;
  Ok(link)
}

/// Link every place, pinned.
pub fn link_all(
  conn: &Connection,
  itinerary_id: Uuid,
  places: &[Place],
  now: DateTime<Utc>,
) -> Result<()> {
  for place in places {
    link(conn, itinerary_id, place, true, now)?;
  }
  Ok(())
}

pub fn get(conn: &Connection, itinerary_id: Uuid, place_id: Uuid) -> Result<Option<LinkedPlace>> {
  let raw = conn
    .query_row(
      &format!(
        "SELECT {PLACE_COLUMNS}, ip.pinned
         FROM itinerary_places ip
         JOIN places p ON p.place_id = ip.place_id
         WHERE ip.itinerary_id = ?1 AND ip.place_id = ?2"
      ),
      params![encode_uuid(itinerary_id), encode_uuid(place_id)],
      RawLinkedPlace::from_row,
    )
    .optional()?;
  raw.map(RawLinkedPlace::into_linked).transpose()
}

/// Linked places in the order they were added.
pub fn list(conn: &Connection, itinerary_id: Uuid, pinned_only: bool) -> Result<Vec<LinkedPlace>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {PLACE_COLUMNS}, ip.pinned
     FROM itinerary_places ip
     JOIN places p ON p.place_id = ip.place_id
     WHERE ip.itinerary_id = ?1 AND (?2 = 0 OR ip.pinned = 1)
     ORDER BY ip.added_at, ip.rowid"
  ))?;
  let raws = stmt
    .query_map(params![encode_uuid(itinerary_id), pinned_only], RawLinkedPlace::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawLinkedPlace::into_linked).collect()
}

/// Returns whether a link row was found.
pub fn set_pinned(
  conn: &Connection,
  itinerary_id: Uuid,
  place_id: Uuid,
  pinned: bool,
) -> Result<bool> {
  let changed = conn.execute(
    "UPDATE itinerary_places SET pinned = ?3 WHERE itinerary_id = ?1 AND place_id = ?2",
    params![encode_uuid(itinerary_id), encode_uuid(place_id), pinned],
  )?;
  Ok(changed > 0)
}

/// Returns whether a link row was deleted.
pub fn unlink(conn: &Connection, itinerary_id: Uuid, place_id: Uuid) -> Result<bool> {
  let deleted = conn.execute(
    "DELETE FROM itinerary_places WHERE itinerary_id = ?1 AND place_id = ?2",
    params![encode_uuid(itinerary_id), encode_uuid(place_id)],
  )?;
  Ok(deleted > 0)
}
