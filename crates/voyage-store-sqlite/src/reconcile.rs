//! POI reconciliation: turning a snapshot's POIs into places a schedule can
//! reference.
//!
//! A creating import inserts one new place per POI, with no lookup against
//! existing rows. An updating import inserts nothing and resolves against the
//! places already linked to the itinerary.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;
use voyage_core::{
  import::ImportedPoi,
  place::{NewPlace, Place},
  plan::PlaceRef,
  schedule::PlaceIndex,
};

use crate::{
  Result,
  encode::{PLACE_COLUMNS, RawPlace, encode_dt, encode_json, encode_uuid},
};

/// Insert one place per POI, in snapshot order.
pub fn create_places(
  conn: &Connection,
  pois: &[ImportedPoi],
  now: DateTime<Utc>,
) -> Result<Vec<Place>> {
  pois.iter().map(|poi| insert_place(conn, &poi.place, now)).collect()
}

/// Index places by the POI id they were imported under.
///
/// Places without one (manual adds) can't be referenced by a schedule. When
/// two places share an id the first wins.
pub fn index<'a>(places: impl IntoIterator<Item = &'a Place>) -> PlaceIndex {
  let mut index = PlaceIndex::new();
  for place in places {
    if let Some(id) = &place.poi_external_id {
      index.entry(id.clone()).or_insert_with(|| PlaceRef::from(place));
    }
  }
  index
}

/// Rebuild the index strictly from the itinerary's existing links.
pub fn linked_index(conn: &Connection, itinerary_id: Uuid) -> Result<PlaceIndex> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {PLACE_COLUMNS}
     FROM places p
     JOIN itinerary_places ip ON ip.place_id = p.place_id
     WHERE ip.itinerary_id = ?1
     ORDER BY ip.added_at, ip.rowid"
  ))?;
  let places = stmt
    .query_map(params![encode_uuid(itinerary_id)], RawPlace::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?
    .into_iter()
    .map(RawPlace::into_place)
    .collect::<Result<Vec<_>>>()?;
  Ok(index(&places))
}

pub fn insert_place(conn: &Connection, new: &NewPlace, now: DateTime<Utc>) -> Result<Place> {
  let place = Place {
    place_id:        Uuid::new_v4(),
    poi_external_id: new.poi_external_id.clone(),
    external_ref:    new.external_ref.clone(),
    name:            new.name.clone(),
    address:         new.address.clone(),
    location:        new.location,
    description:     new.description.clone(),
    image_url:       new.image_url.clone(),
    opening_hours:   new.opening_hours.clone(),
    source:          new.source.clone(),
    metadata:        new.metadata.clone(),
    created_at:      now,
  };

  conn.execute(
    "INSERT INTO places (
       place_id, poi_external_id, external_ref, name, address, latitude, longitude,
       description, image_url, opening_hours, source, metadata, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
    params![
      encode_uuid(place.place_id),
      place.poi_external_id,
      place.external_ref,
      place.name,
      place.address,
      place.location.latitude,
      place.location.longitude,
      place.description,
      place.image_url,
      place.opening_hours.as_ref().map(encode_json).transpose()?,
      place.source,
      encode_json(&place.metadata)?,
      encode_dt(now),
    ],
  )?;
  Ok(place)
}

/// The catalog place carrying `external_ref`, if any.
pub fn by_external_ref(conn: &Connection, external_ref: &str) -> Result<Option<Place>> {
  let raw = conn
    .query_row(
      &format!("SELECT {PLACE_COLUMNS} FROM places p WHERE p.external_ref = ?1"),
      params![external_ref],
      RawPlace::from_row,
    )
    .optional()?;
  raw.map(RawPlace::into_place).transpose()
}
