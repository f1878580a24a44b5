//! Immutable, versioned day/stop schedules.
//!
//! Every import, update, or re-plan appends a new plan row. Rows are never
//! updated except for the `active` flag, and exactly one row per itinerary is
//! active once any plan exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
  Result,
  place::{GeoPoint, Place},
};

// ─── Schedule content ────────────────────────────────────────────────────────

/// The slice of a [`Place`] embedded in a plan stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRef {
  pub place_id:    Uuid,
  pub name:        String,
  pub address:     String,
  pub description: Option<String>,
  pub image_url:   Option<String>,
  pub location:    GeoPoint,
}

impl From<&Place> for PlaceRef {
  fn from(p: &Place) -> Self {
    Self {
      place_id:    p.place_id,
      name:        p.name.clone(),
      address:     p.address.clone(),
      description: p.description.clone(),
      image_url:   p.image_url.clone(),
      location:    p.location,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedStop {
  /// 1-based position within the day.
  pub order:         u32,
  /// Local wall-clock time as supplied by the producer, e.g. `"09:00"`.
  pub arrival_local: String,
  pub depart_local:  String,
  pub stay_minutes:  u32,
  pub note:          Option<String>,
  /// The name the producer gave this stop's POI.
  pub poi_name:      Option<String>,
  /// `None` when the referenced POI could not be resolved to a place.
  pub place:         Option<PlaceRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedDay {
  pub date:  String,
  pub stops: Vec<PlannedStop>,
}

/// The serialised payload of a plan row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanBody {
  pub itinerary_id: Uuid,
  pub days:         Vec<PlannedDay>,
}

impl PlanBody {
  /// SHA-256 over the canonical JSON encoding, hex-encoded.
  pub fn digest(&self) -> Result<String> {
    let bytes = serde_json::to_vec(self)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
  }

  pub fn stop_count(&self) -> usize { self.days.iter().map(|d| d.stops.len()).sum() }
}

// ─── Plan ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
  pub plan_id:      Uuid,
  pub itinerary_id: Uuid,
  /// Strictly increasing per itinerary, starting at 1.
  pub version:      u32,
  pub active:       bool,
  pub body:         PlanBody,
  pub digest:       String,
  pub created_at:   DateTime<Utc>,
}

impl Plan {
  /// The quoted HTTP `ETag` of this plan row.
  ///
  /// Two versions with identical bodies share a digest, so the plan id is
  /// part of the tag.
  pub fn etag(&self) -> String { format!("\"{}-{}\"", self.plan_id, self.digest) }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn body(note: Option<&str>) -> PlanBody {
    PlanBody {
      itinerary_id: Uuid::nil(),
      days:         vec![PlannedDay {
        date:  "2025-03-01".into(),
        stops: vec![PlannedStop {
          order:         1,
          arrival_local: "10:00".into(),
          depart_local:  "12:00".into(),
          stay_minutes:  120,
          note:          note.map(str::to_owned),
          poi_name:      None,
          place:         None,
        }],
      }],
    }
  }

  #[test]
  fn digest_is_stable_for_equal_bodies() {
    assert_eq!(body(Some("temple")).digest().unwrap(), body(Some("temple")).digest().unwrap());
  }

  #[test]
  fn digest_changes_with_content() {
    assert_ne!(body(Some("temple")).digest().unwrap(), body(None).digest().unwrap());
    assert_eq!(body(None).digest().unwrap().len(), 64);
  }

  #[test]
  fn etag_differs_between_versions_with_equal_bodies() {
    let plan = |version| {
      let body = body(Some("temple"));
      Plan {
        plan_id: Uuid::new_v4(),
        itinerary_id: Uuid::nil(),
        version,
        active: true,
        digest: body.digest().unwrap(),
        body,
        created_at: Utc::now(),
      }
    };
    let (v1, v2) = (plan(1), plan(2));

    assert_eq!(v1.digest, v2.digest);
    assert_ne!(v1.etag(), v2.etag());
    assert!(v1.etag().starts_with('"') && v1.etag().ends_with('"'));
  }
}
