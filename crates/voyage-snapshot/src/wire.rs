//! The agent's snapshot, exactly as it arrives on the wire.
//!
//! Field names follow the agent's camelCase JSON. Nothing here is validated;
//! see [`crate::parse`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPlanRequest {
  /// Idempotency key linking the agent's turns to one itinerary.
  #[serde(alias = "cragSessionId")]
  pub session_key:   Option<String>,
  #[serde(default)]
  pub user_features: UserFeatures,
  #[serde(default)]
  pub pois:          Vec<ImportedPoi>,
  pub plan:          Option<ImportedPlan>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFeatures {
  pub destination:         Option<String>,
  /// Fills in a missing end date, counting the start day.
  pub travel_days:         Option<u32>,
  pub start_date:          Option<String>,
  pub end_date:            Option<String>,
  pub budget_cents:        Option<i64>,
  #[serde(default)]
  pub interests:           Vec<String>,
  /// `RELAXED` | `MODERATE` | `PACKED`, any case.
  pub travel_pace:         Option<String>,
  /// `WALKING` | `DRIVING` | `TRANSIT` | `BICYCLING`, any case.
  pub travel_mode:         Option<String>,
  pub number_of_travelers: Option<u32>,
  pub has_children:        Option<bool>,
  pub has_elderly:         Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedPoi {
  pub external_id:      String,
  pub name:             String,
  pub latitude:         f64,
  pub longitude:        f64,
  #[serde(default)]
  pub address:          String,
  pub city:             Option<String>,
  pub description:      Option<String>,
  pub image_url:        Option<String>,
  pub rating:           Option<f64>,
  pub reviews_count:    Option<u64>,
  /// Numeric level or a provider label; kept verbatim.
  pub price_level:      Option<serde_json::Value>,
  pub primary_category: Option<String>,
  pub opening_hours:    Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedPlan {
  pub destination: Option<String>,
  pub start_date:  Option<String>,
  pub end_date:    Option<String>,
  #[serde(default)]
  pub days:        Vec<ImportedDay>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedDay {
  #[serde(default)]
  pub date:  String,
  #[serde(default)]
  pub stops: Vec<ImportedStop>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedStop {
  pub poi_external_id:  String,
  pub poi_name:         Option<String>,
  /// Producer ordering within the day; input position when absent.
  pub order:            Option<u32>,
  #[serde(default)]
  pub arrival_time:     String,
  #[serde(default)]
  pub departure_time:   String,
  pub duration_minutes: Option<u32>,
  pub activity:         Option<String>,
}
