//! Session linkage and upsert resolution for agent imports.
//!
//! A snapshot whose session key already links to one of the caller's
//! itineraries updates it; anything else creates a new itinerary. The caller
//! runs this inside an immediate transaction, so the session lookup and the
//! branch taken on it are serialised across writers.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde_json::Value;
use uuid::Uuid;
use voyage_core::{
  Error as CoreError,
  import::{ImportOutcome, ImportStatus, Snapshot},
  itinerary::Itinerary,
  place::AGENT_SOURCE,
};

use crate::{Result, itineraries, linkage, plans, reconcile};

pub fn import(
  conn: &Connection,
  owner_id: Uuid,
  snapshot: Snapshot,
  now: DateTime<Utc>,
) -> Result<ImportOutcome> {
  itineraries::require_owner(conn, owner_id)?;

  let existing = match snapshot.session_key.as_deref() {
    Some(key) => itineraries::owned_by_session(conn, owner_id, key)?,
    None => None,
  };

  match existing {
    Some(itinerary) => update(conn, itinerary, snapshot, now),
    None => create(conn, owner_id, snapshot, now),
  }
}

fn create(
  conn: &Connection,
  owner_id: Uuid,
  snapshot: Snapshot,
  now: DateTime<Utc>,
) -> Result<ImportOutcome> {
  if snapshot.pois.is_empty() {
    let reason = "at least one POI is required to create an itinerary";
    return Err(CoreError::Invalid(reason.into()).into());
  }

  let mut metadata = itineraries::creation_metadata(&snapshot.itinerary);
  metadata.insert("source".into(), AGENT_SOURCE.into());
  metadata.insert("import_time".into(), now.to_rfc3339().into());
  metadata.insert("import_count".into(), 1.into());

  let itinerary = itineraries::insert(
    conn,
    owner_id,
    &snapshot.itinerary,
    snapshot.session_key.as_deref(),
    metadata,
    now,
  )?;

  let places = reconcile::create_places(conn, &snapshot.pois, now)?;
  linkage::link_all(conn, itinerary.itinerary_id, &places, now)?;
  let index = reconcile::index(&places);

  let mut warnings = snapshot.warnings;
  let plan = plans::write_version(
    conn,
    itinerary.itinerary_id,
    &snapshot.schedule,
    &index,
    &mut warnings,
    now,
  )?;

  Ok(ImportOutcome {
    itinerary_id: itinerary.itinerary_id,
    status: ImportStatus::new(true, !warnings.is_empty()),
    imported_pois_count: places.len(),
    plan_version: plan.version,
    warnings,
    recommended_poi_count: snapshot.itinerary.recommended_poi_count(),
  })
}

/// Refresh the itinerary and write a new plan. Places and links are left
/// exactly as they are, so pins made between turns survive.
fn update(
  conn: &Connection,
  mut itinerary: Itinerary,
  snapshot: Snapshot,
  now: DateTime<Utc>,
) -> Result<ImportOutcome> {
  let import_count = itinerary
    .metadata
    .get("import_count")
    .and_then(Value::as_u64)
    .unwrap_or(1);
  itinerary.metadata.insert("import_time".into(), now.to_rfc3339().into());
  itinerary.metadata.insert("import_count".into(), (import_count + 1).into());
  itineraries::update_from_snapshot(conn, &mut itinerary, &snapshot.itinerary, now)?;

  let index = reconcile::linked_index(conn, itinerary.itinerary_id)?;

  let mut warnings = snapshot.warnings;
  for poi in &snapshot.pois {
    if !index.contains_key(&poi.external_id) {
      warnings.push(format!(
        "POI {:?} is not linked to this itinerary; ignored on update",
        poi.external_id
      ));
    }
  }

  let plan = plans::write_version(
    conn,
    itinerary.itinerary_id,
    &snapshot.schedule,
    &index,
    &mut warnings,
    now,
  )?;

  Ok(ImportOutcome {
    itinerary_id: itinerary.itinerary_id,
    status: ImportStatus::new(false, !warnings.is_empty()),
    imported_pois_count: index.len(),
    plan_version: plan.version,
    warnings,
    recommended_poi_count: 0,
  })
}
