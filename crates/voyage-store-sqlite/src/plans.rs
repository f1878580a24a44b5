//! Plan versioning store.
//!
//! Each write deactivates every plan of the itinerary and appends the next
//! version as the only active row, inside the caller's transaction. The
//! `plans_active_idx` partial index backs the single-active rule at the
//! database level.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;
use voyage_core::{
  import::ReplanOutcome,
  plan::Plan,
  schedule::{PlaceIndex, ScheduleDraft},
};

use crate::{
  Result,
  encode::{PLAN_COLUMNS, RawPlan, encode_dt, encode_json, encode_uuid},
  itineraries, reconcile,
};

/// Resolve `schedule` against `places` and store it as the new active plan.
///
/// Stops that reference a POI outside `places` are kept without a place and
/// reported through `warnings`.
pub fn write_version(
  conn: &Connection,
  itinerary_id: Uuid,
  schedule: &ScheduleDraft,
  places: &PlaceIndex,
  warnings: &mut Vec<String>,
  now: DateTime<Utc>,
) -> Result<Plan> {
  let body = schedule.resolve(itinerary_id, places, warnings);
  let digest = body.digest()?;
  let id = encode_uuid(itinerary_id);

  conn.execute(
    "UPDATE plans SET active = 0 WHERE itinerary_id = ?1 AND active = 1",
    params![id],
  )?;
  let version: u32 = conn.query_row(
    "SELECT COALESCE(MAX(version), 0) + 1 FROM plans WHERE itinerary_id = ?1",
    params![id],
    |row| row.get(0),
  )?;

  let plan = Plan {
    plan_id: Uuid::new_v4(),
    itinerary_id,
    version,
    active: true,
    body,
    digest,
    created_at: now,
  };
  conn.execute(
    "INSERT INTO plans (plan_id, itinerary_id, version, active, body, digest, created_at)
     VALUES (?1, ?2, ?3, 1, ?4, ?5, ?6)",
    params![
      encode_uuid(plan.plan_id),
      id,
      plan.version,
      encode_json(&plan.body)?,
      plan.digest,
      encode_dt(now),
    ],
  )?;
  Ok(plan)
}

pub fn current(conn: &Connection, itinerary_id: Uuid) -> Result<Option<Plan>> {
  let raw = conn
    .query_row(
      &format!("SELECT {PLAN_COLUMNS} FROM plans WHERE itinerary_id = ?1 AND active = 1"),
      params![encode_uuid(itinerary_id)],
      RawPlan::from_row,
    )
    .optional()?;
  raw.map(RawPlan::into_plan).transpose()
}

pub fn history(conn: &Connection, itinerary_id: Uuid) -> Result<Vec<Plan>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {PLAN_COLUMNS} FROM plans WHERE itinerary_id = ?1 ORDER BY version"
  ))?;
  let raws = stmt
    .query_map(params![encode_uuid(itinerary_id)], RawPlan::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawPlan::into_plan).collect()
}

/// Write a plan requested outside of an import. Resolution follows the update
/// path: only places already linked to the itinerary are attached.
pub fn replan(
  conn: &Connection,
  owner_id: Uuid,
  itinerary_id: Uuid,
  schedule: &ScheduleDraft,
  now: DateTime<Utc>,
) -> Result<ReplanOutcome> {
  itineraries::owned(conn, owner_id, itinerary_id)?;
  let places = reconcile::linked_index(conn, itinerary_id)?;

  let mut warnings = Vec::new();
  let plan = write_version(conn, itinerary_id, schedule, &places, &mut warnings, now)?;
  itineraries::touch(conn, itinerary_id, now)?;

  Ok(ReplanOutcome { plan, warnings })
}
