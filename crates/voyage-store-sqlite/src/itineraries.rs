//! Owner and itinerary rows, and the ownership check every operation starts
//! with.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _, params};
use serde_json::{Map, Value};
use uuid::Uuid;
use voyage_core::{
  Error as CoreError,
  itinerary::{Itinerary, NewItinerary},
  owner::Owner,
  recommend::GenerationOutcome,
};

use crate::{
  Result,
  encode::{
    ITINERARY_COLUMNS, OWNER_COLUMNS, RawItinerary, RawOwner, encode_dt, encode_json,
    encode_offset_dt, encode_uuid,
  },
  error::is_constraint_violation,
};

pub type Metadata = Map<String, Value>;

// ─── Owners ──────────────────────────────────────────────────────────────────

pub fn insert_owner(conn: &Connection, email: &str, now: DateTime<Utc>) -> Result<Owner> {
  let owner = Owner { owner_id: Uuid::new_v4(), email: email.to_owned(), created_at: now };
  conn.execute(
    "INSERT INTO owners (owner_id, email, created_at) VALUES (?1, ?2, ?3)",
    params![encode_uuid(owner.owner_id), owner.email, encode_dt(now)],
  )?;
  Ok(owner)
}

pub fn owner(conn: &Connection, owner_id: Uuid) -> Result<Option<Owner>> {
  let raw = conn
    .query_row(
      &format!("SELECT {OWNER_COLUMNS} FROM owners WHERE owner_id = ?1"),
      params![encode_uuid(owner_id)],
      RawOwner::from_row,
    )
    .optional()?;
  raw.map(RawOwner::into_owner).transpose()
}

pub fn require_owner(conn: &Connection, owner_id: Uuid) -> Result<()> {
  match owner(conn, owner_id)? {
    Some(_) => Ok(()),
    None => Err(CoreError::OwnerNotFound(owner_id).into()),
  }
}

// ─── Reads ───────────────────────────────────────────────────────────────────

pub fn load(conn: &Connection, itinerary_id: Uuid) -> Result<Option<Itinerary>> {
  let raw = conn
    .query_row(
      &format!("SELECT {ITINERARY_COLUMNS} FROM itineraries WHERE itinerary_id = ?1"),
      params![encode_uuid(itinerary_id)],
      RawItinerary::from_row,
    )
    .optional()?;
  raw.map(RawItinerary::into_itinerary).transpose()
}

/// Load an itinerary on behalf of `owner_id`.
///
/// A missing itinerary is NotFound; one held by another owner is Forbidden.
pub fn owned(conn: &Connection, owner_id: Uuid, itinerary_id: Uuid) -> Result<Itinerary> {
  let itinerary = load(conn, itinerary_id)?.ok_or(CoreError::ItineraryNotFound(itinerary_id))?;
  if itinerary.owner_id != owner_id {
    return Err(CoreError::NotOwner(itinerary_id).into());
  }
  Ok(itinerary)
}

pub fn by_session(conn: &Connection, session_key: &str) -> Result<Option<Itinerary>> {
  let raw = conn
    .query_row(
      &format!("SELECT {ITINERARY_COLUMNS} FROM itineraries WHERE session_key = ?1"),
      params![session_key],
      RawItinerary::from_row,
    )
    .optional()?;
  raw.map(RawItinerary::into_itinerary).transpose()
}

/// The itinerary linked to `session_key`, provided `owner_id` holds it.
pub fn owned_by_session(
  conn: &Connection,
  owner_id: Uuid,
  session_key: &str,
) -> Result<Option<Itinerary>> {
  match by_session(conn, session_key)? {
    Some(it) if it.owner_id != owner_id => {
      Err(CoreError::SessionOwnedElsewhere(session_key.to_owned()).into())
    }
    found => Ok(found),
  }
}

pub fn list(conn: &Connection, owner_id: Uuid) -> Result<Vec<Itinerary>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {ITINERARY_COLUMNS} FROM itineraries
     WHERE owner_id = ?1
     ORDER BY created_at DESC, rowid DESC"
  ))?;
  let raws = stmt
    .query_map(params![encode_uuid(owner_id)], RawItinerary::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawItinerary::into_itinerary).collect()
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// Metadata shared by every creation: what the recommender will be asked for,
/// and that it hasn't answered yet.
pub fn creation_metadata(input: &NewItinerary) -> Metadata {
  let mut metadata = Metadata::new();
  metadata.insert("staying_days".into(), input.staying_days().into());
  metadata.insert("recommended_poi_count".into(), input.recommended_poi_count().into());
  metadata.insert("generation_pending".into(), true.into());
  metadata
}

pub fn insert(
  conn: &Connection,
  owner_id: Uuid,
  input: &NewItinerary,
  session_key: Option<&str>,
  metadata: Metadata,
  now: DateTime<Utc>,
) -> Result<Itinerary> {
  let itinerary = Itinerary {
    itinerary_id: Uuid::new_v4(),
    owner_id,
    destination: input.destination.clone(),
    start_date: input.start_date,
    end_date: input.end_date,
    budget_cents: input.budget_cents,
    budget_per_meal_cents: input.budget_per_meal_cents(),
    preferences: input.preferences.clone(),
    session_key: session_key.map(str::to_owned),
    metadata,
    created_at: now,
    updated_at: now,
  };

  let prefs = &itinerary.preferences;
  let inserted = conn.execute(
    "INSERT INTO itineraries (
       itinerary_id, owner_id, destination, start_date, end_date,
       budget_cents, budget_per_meal_cents, travel_pace, travel_mode, number_of_travelers,
       has_children, has_elderly, preferred_categories, session_key, metadata,
       created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16)",
    params![
      encode_uuid(itinerary.itinerary_id),
      encode_uuid(owner_id),
      itinerary.destination,
      encode_offset_dt(itinerary.start_date),
      encode_offset_dt(itinerary.end_date),
      itinerary.budget_cents,
      itinerary.budget_per_meal_cents,
      prefs.travel_pace.to_string(),
      prefs.travel_mode.map(|m| m.to_string()),
      prefs.number_of_travelers,
      prefs.has_children,
      prefs.has_elderly,
      encode_json(&prefs.preferred_categories)?,
      itinerary.session_key,
      encode_json(&itinerary.metadata)?,
      encode_dt(now),
    ],
  );

  match (inserted, session_key) {
    (Err(e), Some(key)) if is_constraint_violation(&e) => {
      Err(CoreError::SessionConflict(key.to_owned()).into())
    }
    (Err(e), _) => Err(e.into()),
    (Ok(_), _) => Ok(itinerary),
  }
}

/// Overwrite the snapshot-derived fields of an existing itinerary.
///
/// The session key, owner and creation time are left alone.
pub fn update_from_snapshot(
  conn: &Connection,
  itinerary: &mut Itinerary,
  input: &NewItinerary,
  now: DateTime<Utc>,
) -> Result<()> {
  itinerary.destination = input.destination.clone();
  itinerary.start_date = input.start_date;
  itinerary.end_date = input.end_date;
  itinerary.budget_cents = input.budget_cents;
  itinerary.budget_per_meal_cents = input.budget_per_meal_cents();
  itinerary.preferences = input.preferences.clone();
  itinerary.updated_at = now;

  let prefs = &itinerary.preferences;
  conn.execute(
    "UPDATE itineraries SET
       destination = ?2, start_date = ?3, end_date = ?4, budget_cents = ?5,
       budget_per_meal_cents = ?6, travel_pace = ?7, travel_mode = ?8,
       number_of_travelers = ?9, has_children = ?10, has_elderly = ?11,
       preferred_categories = ?12, metadata = ?13, updated_at = ?14
     WHERE itinerary_id = ?1",
    params![
      encode_uuid(itinerary.itinerary_id),
      itinerary.destination,
      encode_offset_dt(itinerary.start_date),
      encode_offset_dt(itinerary.end_date),
      itinerary.budget_cents,
      itinerary.budget_per_meal_cents,
      prefs.travel_pace.to_string(),
      prefs.travel_mode.map(|m| m.to_string()),
      prefs.number_of_travelers,
      prefs.has_children,
      prefs.has_elderly,
      encode_json(&prefs.preferred_categories)?,
      encode_json(&itinerary.metadata)?,
      encode_dt(now),
    ],
  )?;
  Ok(())
}

pub fn write_metadata(
  conn: &Connection,
  itinerary_id: Uuid,
  metadata: &Metadata,
  now: DateTime<Utc>,
) -> Result<()> {
  conn.execute(
    "UPDATE itineraries SET metadata = ?2, updated_at = ?3 WHERE itinerary_id = ?1",
    params![encode_uuid(itinerary_id), encode_json(metadata)?, encode_dt(now)],
  )?;
  Ok(())
}

pub fn touch(conn: &Connection, itinerary_id: Uuid, now: DateTime<Utc>) -> Result<()> {
  conn.execute(
    "UPDATE itineraries SET updated_at = ?2 WHERE itinerary_id = ?1",
    params![encode_uuid(itinerary_id), encode_dt(now)],
  )?;
  Ok(())
}

/// Record the recommendation worker's result in the itinerary's metadata.
pub fn complete_generation(
  conn: &Connection,
  itinerary_id: Uuid,
  outcome: GenerationOutcome,
  now: DateTime<Utc>,
) -> Result<()> {
  let mut itinerary =
    load(conn, itinerary_id)?.ok_or(CoreError::ItineraryNotFound(itinerary_id))?;
  let metadata = &mut itinerary.metadata;

  metadata.insert("generation_pending".into(), false.into());
  metadata.insert("generation_completed_at".into(), encode_dt(now).into());
  match outcome {
    GenerationOutcome::Generated { places } => {
      metadata.insert("generated_places_count".into(), places.into());
      metadata.remove("generation_error");
    }
    GenerationOutcome::Failed { error } => {
      metadata.insert("generation_error".into(), error.into());
    }
  }

  write_metadata(conn, itinerary_id, metadata, now)
}
