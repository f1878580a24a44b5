//! Normalised import snapshots and the outcome of folding one into storage.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  itinerary::NewItinerary,
  place::NewPlace,
  plan::Plan,
  schedule::ScheduleDraft,
};

/// One POI from a snapshot, keyed by the producer's id.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedPoi {
  pub external_id: String,
  pub place:       NewPlace,
}

/// A validated agent snapshot, ready to be written.
///
/// `pois` holds at most one entry per external id. `warnings` carries the
/// soft problems found while parsing; the store appends its own.
#[derive(Debug, Clone)]
pub struct Snapshot {
  pub session_key: Option<String>,
  pub itinerary:   NewItinerary,
  pub pois:        Vec<ImportedPoi>,
  pub schedule:    ScheduleDraft,
  pub warnings:    Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
  Success,
  SuccessWithWarnings,
  Updated,
  UpdatedWithWarnings,
}

impl ImportStatus {
  pub fn new(created: bool, has_warnings: bool) -> Self {
    match (created, has_warnings) {
      (true, false) => Self::Success,
      (true, true) => Self::SuccessWithWarnings,
      (false, false) => Self::Updated,
      (false, true) => Self::UpdatedWithWarnings,
    }
  }

  pub fn is_created(self) -> bool { matches!(self, Self::Success | Self::SuccessWithWarnings) }
}

/// Summary returned by [`crate::store::PlannerStore::import_snapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
  pub itinerary_id:          Uuid,
  pub status:                ImportStatus,
  pub imported_pois_count:   usize,
  pub plan_version:          u32,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub warnings:              Vec<String>,
  /// Places the recommender should aim for; only meaningful on creation.
  #[serde(skip)]
  pub recommended_poi_count: u32,
}

/// Result of writing a new plan version outside of an import.
#[derive(Debug, Clone)]
pub struct ReplanOutcome {
  pub plan:     Plan,
  pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_reflects_path_and_warnings() {
    assert_eq!(ImportStatus::new(true, false), ImportStatus::Success);
    assert_eq!(ImportStatus::new(false, true), ImportStatus::UpdatedWithWarnings);
    assert!(ImportStatus::SuccessWithWarnings.is_created());
    assert!(!ImportStatus::Updated.is_created());
  }

  #[test]
  fn outcome_serialises_wire_names() {
    let outcome = ImportOutcome {
      itinerary_id:          Uuid::nil(),
      status:                ImportStatus::SuccessWithWarnings,
      imported_pois_count:   2,
      plan_version:          1,
      warnings:              vec!["w".into()],
      recommended_poi_count: 8,
    };
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "success_with_warnings");
    assert_eq!(json["importedPoisCount"], 2);
    assert_eq!(json["planVersion"], 1);
    assert!(json.get("recommendedPoiCount").is_none());
  }
}
