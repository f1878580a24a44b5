//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; itinerary dates keep their
//! original offset. Structured fields (preferences lists, metadata, opening
//! hours, plan bodies) are stored as compact JSON. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;
use voyage_core::{
  itinerary::{Itinerary, TravelMode, TravelPace, TravelPreferences},
  owner::Owner,
  place::{GeoPoint, LinkedPlace, Place},
  plan::Plan,
};

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  decode_offset_dt(s).map(|dt| dt.with_timezone(&Utc))
}

pub fn encode_offset_dt(dt: DateTime<FixedOffset>) -> String { dt.to_rfc3339() }

pub fn decode_offset_dt(s: &str) -> Result<DateTime<FixedOffset>> {
  DateTime::parse_from_rfc3339(s).map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
  Ok(serde_json::to_string(value)?)
}

pub fn decode_json<T: DeserializeOwned>(s: &str) -> Result<T> { Ok(serde_json::from_str(s)?) }

// ─── Owners ──────────────────────────────────────────────────────────────────

pub const OWNER_COLUMNS: &str = "owner_id, email, created_at";

pub struct RawOwner {
  pub owner_id:   String,
  pub email:      String,
  pub created_at: String,
}

impl RawOwner {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { owner_id: row.get(0)?, email: row.get(1)?, created_at: row.get(2)? })
  }

  pub fn into_owner(self) -> Result<Owner> {
    Ok(Owner {
      owner_id:   decode_uuid(&self.owner_id)?,
      email:      self.email,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

// ─── Itineraries ─────────────────────────────────────────────────────────────

pub const ITINERARY_COLUMNS: &str = "itinerary_id, owner_id, destination, start_date, end_date,
  budget_cents, budget_per_meal_cents, travel_pace, travel_mode, number_of_travelers,
  has_children, has_elderly, preferred_categories, session_key, metadata, created_at, updated_at";

/// Raw values read directly from an `itineraries` row.
pub struct RawItinerary {
  pub itinerary_id:          String,
  pub owner_id:              String,
  pub destination:           String,
  pub start_date:            String,
  pub end_date:              String,
  pub budget_cents:          i64,
  pub budget_per_meal_cents: Option<i64>,
  pub travel_pace:           String,
  pub travel_mode:           Option<String>,
  pub number_of_travelers:   Option<u32>,
  pub has_children:          Option<bool>,
  pub has_elderly:           Option<bool>,
  pub preferred_categories:  String,
  pub session_key:           Option<String>,
  pub metadata:              String,
  pub created_at:            String,
  pub updated_at:            String,
}

impl RawItinerary {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      itinerary_id:          row.get(0)?,
      owner_id:              row.get(1)?,
      destination:           row.get(2)?,
      start_date:            row.get(3)?,
      end_date:              row.get(4)?,
      budget_cents:          row.get(5)?,
      budget_per_meal_cents: row.get(6)?,
      travel_pace:           row.get(7)?,
      travel_mode:           row.get(8)?,
      number_of_travelers:   row.get(9)?,
      has_children:          row.get(10)?,
      has_elderly:           row.get(11)?,
      preferred_categories:  row.get(12)?,
      session_key:           row.get(13)?,
      metadata:              row.get(14)?,
      created_at:            row.get(15)?,
      updated_at:            row.get(16)?,
    })
  }

  pub fn into_itinerary(self) -> Result<Itinerary> {
    let travel_pace = self.travel_pace.parse::<TravelPace>().map_err(|_| Error::Decode {
      column: "travel_pace",
      value:  self.travel_pace.clone(),
    })?;
    let travel_mode = self
      .travel_mode
      .map(|m| {
        m.parse::<TravelMode>()
          .map_err(|_| Error::Decode { column: "travel_mode", value: m })
      })
      .transpose()?;

    Ok(Itinerary {
      itinerary_id:          decode_uuid(&self.itinerary_id)?,
      owner_id:              decode_uuid(&self.owner_id)?,
      destination:           self.destination,
      start_date:            decode_offset_dt(&self.start_date)?,
      end_date:              decode_offset_dt(&self.end_date)?,
      budget_cents:          self.budget_cents,
      budget_per_meal_cents: self.budget_per_meal_cents,
      preferences:           TravelPreferences {
        travel_pace,
        travel_mode,
        number_of_travelers: self.number_of_travelers,
        has_children: self.has_children,
        has_elderly: self.has_elderly,
        preferred_categories: decode_json(&self.preferred_categories)?,
      },
      session_key:           self.session_key,
      metadata:              decode_json(&self.metadata)?,
      created_at:            decode_dt(&self.created_at)?,
      updated_at:            decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Places ──────────────────────────────────────────────────────────────────

pub const PLACE_COLUMNS: &str = "p.place_id, p.poi_external_id, p.external_ref, p.name,
  p.address, p.latitude, p.longitude, p.description, p.image_url, p.opening_hours, p.source,
  p.metadata, p.created_at";

/// Raw values read from a `places` row (aliased `p`).
pub struct RawPlace {
  pub place_id:        String,
  pub poi_external_id: Option<String>,
  pub external_ref:    Option<String>,
  pub name:            String,
  pub address:         String,
  pub latitude:        f64,
  pub longitude:       f64,
  pub description:     Option<String>,
  pub image_url:       Option<String>,
  pub opening_hours:   Option<String>,
  pub source:          String,
  pub metadata:        String,
  pub created_at:      String,
}

impl RawPlace {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      place_id:        row.get(0)?,
      poi_external_id: row.get(1)?,
      external_ref:    row.get(2)?,
      name:            row.get(3)?,
      address:         row.get(4)?,
      latitude:        row.get(5)?,
      longitude:       row.get(6)?,
      description:     row.get(7)?,
      image_url:       row.get(8)?,
      opening_hours:   row.get(9)?,
      source:          row.get(10)?,
      metadata:        row.get(11)?,
      created_at:      row.get(12)?,
    })
  }

  pub fn into_place(self) -> Result<Place> {
    Ok(Place {
      place_id:        decode_uuid(&self.place_id)?,
      poi_external_id: self.poi_external_id,
      external_ref:    self.external_ref,
      name:            self.name,
      address:         self.address,
      location:        GeoPoint { latitude: self.latitude, longitude: self.longitude },
      description:     self.description,
      image_url:       self.image_url,
      opening_hours:   self.opening_hours.as_deref().map(decode_json).transpose()?,
      source:          self.source,
      metadata:        decode_json(&self.metadata)?,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// A `places` row joined with its `itinerary_places.pinned` flag, which
/// follows the place columns.
pub struct RawLinkedPlace {
  pub place:  RawPlace,
  pub pinned: bool,
}

impl RawLinkedPlace {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { place: RawPlace::from_row(row)?, pinned: row.get(13)? })
  }

  pub fn into_linked(self) -> Result<LinkedPlace> {
    Ok(LinkedPlace { place: self.place.into_place()?, pinned: self.pinned })
  }
}

// ─── Plans ───────────────────────────────────────────────────────────────────

pub const PLAN_COLUMNS: &str =
  "plan_id, itinerary_id, version, active, body, digest, created_at";

pub struct RawPlan {
  pub plan_id:      String,
  pub itinerary_id: String,
  pub version:      u32,
  pub active:       bool,
  pub body:         String,
  pub digest:       String,
  pub created_at:   String,
}

impl RawPlan {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      plan_id:      row.get(0)?,
      itinerary_id: row.get(1)?,
      version:      row.get(2)?,
      active:       row.get(3)?,
      body:         row.get(4)?,
      digest:       row.get(5)?,
      created_at:   row.get(6)?,
    })
  }

  pub fn into_plan(self) -> Result<Plan> {
    Ok(Plan {
      plan_id:      decode_uuid(&self.plan_id)?,
      itinerary_id: decode_uuid(&self.itinerary_id)?,
      version:      self.version,
      active:       self.active,
      body:         decode_json(&self.body)?,
      digest:       self.digest,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}
