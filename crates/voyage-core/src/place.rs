//! Places: catalog records for points of interest, and their links to
//! itineraries.
//!
//! A place is created lazily on first reference. The link row
//! ([`ItineraryPlace`]) carries the user's curation flag and is never implied
//! by plan content: it exists only because an initial import or a manual add
//! created it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Provenance recorded on places created by a plan import.
pub const AGENT_SOURCE: &str = "agent";
/// Provenance recorded on manual adds that don't name one.
pub const MANUAL_SOURCE: &str = "manual";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
  pub latitude:  f64,
  pub longitude: f64,
}

// ─── Place ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
  pub place_id:        Uuid,
  /// The producer-supplied POI id this place was imported under, if any.
  /// Not unique: every import creates its own rows.
  pub poi_external_id: Option<String>,
  /// Catalog identifier used to de-duplicate manual adds.
  pub external_ref:    Option<String>,
  pub name:            String,
  pub address:         String,
  pub location:        GeoPoint,
  pub description:     Option<String>,
  pub image_url:       Option<String>,
  pub opening_hours:   Option<serde_json::Value>,
  pub source:          String,
  pub metadata:        serde_json::Map<String, serde_json::Value>,
  pub created_at:      DateTime<Utc>,
}

/// Input to place creation. `place_id` and `created_at` are assigned by the
/// store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlace {
  pub poi_external_id: Option<String>,
  pub external_ref:    Option<String>,
  pub name:            String,
  pub address:         String,
  pub location:        GeoPoint,
  pub description:     Option<String>,
  pub image_url:       Option<String>,
  pub opening_hours:   Option<serde_json::Value>,
  pub source:          String,
  pub metadata:        serde_json::Map<String, serde_json::Value>,
}

// ─── Links ───────────────────────────────────────────────────────────────────

/// The join row between an itinerary and a place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryPlace {
  pub itinerary_id: Uuid,
  pub place_id:     Uuid,
  pub pinned:       bool,
  /// Name snapshot taken when the link was created.
  pub name:         String,
  pub description:  Option<String>,
  pub added_at:     DateTime<Utc>,
}

/// A place as seen from one itinerary: catalog detail plus curation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedPlace {
  pub place:  Place,
  pub pinned: bool,
}

// ─── Manual add ──────────────────────────────────────────────────────────────

/// A place the user adds to an itinerary by hand (search result or manual
/// entry).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPlace {
  pub external_ref: Option<String>,
  pub name:         String,
  pub address:      String,
  pub latitude:     f64,
  pub longitude:    f64,
  pub image_url:    Option<String>,
  pub description:  Option<String>,
  pub source:       Option<String>,
}

impl AddPlace {
  pub fn into_new(self) -> Result<NewPlace> {
    let name = self.name.trim();
    if name.is_empty() {
      return Err(Error::Invalid("place name is required".into()));
    }
    let address = self.address.trim();
    if address.is_empty() {
      return Err(Error::Invalid("address is required".into()));
    }
    if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude) {
      return Err(Error::Invalid(format!(
        "coordinates out of range: ({}, {})",
        self.latitude, self.longitude
      )));
    }

    Ok(NewPlace {
      poi_external_id: None,
      external_ref:    self
        .external_ref
        .map(|r| r.trim().to_owned())
        .filter(|r| !r.is_empty()),
      name:            name.to_owned(),
      address:         address.to_owned(),
      location:        GeoPoint { latitude: self.latitude, longitude: self.longitude },
      description:     self.description,
      image_url:       self.image_url,
      opening_hours:   None,
      source:          self
        .source
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| MANUAL_SOURCE.to_owned()),
      metadata:        serde_json::Map::new(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn add(name: &str, external_ref: Option<&str>) -> AddPlace {
    AddPlace {
      external_ref: external_ref.map(str::to_owned),
      name:         name.into(),
      address:      "1-1 Ueno Park".into(),
      latitude:     35.71,
      longitude:    139.77,
      image_url:    None,
      description:  None,
      source:       None,
    }
  }

  #[test]
  fn manual_add_defaults_source_and_drops_blank_ref() {
    let new = add("Ueno Zoo", Some("  ")).into_new().unwrap();
    assert_eq!(new.source, MANUAL_SOURCE);
    assert_eq!(new.external_ref, None);
    assert_eq!(new.poi_external_id, None);
  }

  #[test]
  fn manual_add_trims_ref() {
    let new = add("Ueno Zoo", Some(" zoo-1 ")).into_new().unwrap();
    assert_eq!(new.external_ref.as_deref(), Some("zoo-1"));
  }

  #[test]
  fn manual_add_requires_name() {
    assert!(matches!(add(" ", None).into_new(), Err(Error::Invalid(_))));
  }

  #[test]
  fn manual_add_rejects_out_of_range_coordinates() {
    let mut input = add("Nowhere", None);
    input.latitude = 123.0;
    assert!(matches!(input.into_new(), Err(Error::Invalid(_))));
  }
}
