//! The owner's trip aggregate.
//!
//! An itinerary is created either by the first import of an agent session or
//! by an explicit user action, and is updated in place by later imports that
//! carry the same session key.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Staying days are capped to keep recommendation batches small.
pub const MAX_STAYING_DAYS: i64 = 7;
/// Upper bound on the number of places requested from the recommender.
pub const MAX_RECOMMENDED_POIS: u32 = 16;
/// Budget applied to explicit creations that omit one ($2000).
pub const DEFAULT_BUDGET_CENTS: i64 = 200_000;

// ─── Preferences ─────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum TravelPace {
  Relaxed,
  #[default]
  Moderate,
  Packed,
}

impl TravelPace {
  /// How many places a day at this pace is expected to hold.
  pub fn pois_per_day(self) -> u32 {
    match self {
      Self::Relaxed => 2,
      Self::Moderate => 4,
      Self::Packed => 5,
    }
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum TravelMode {
  #[default]
  Walking,
  Driving,
  Transit,
  Bicycling,
}

/// Who is travelling and how they like to travel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelPreferences {
  pub travel_pace:          TravelPace,
  pub travel_mode:          Option<TravelMode>,
  pub number_of_travelers:  Option<u32>,
  pub has_children:         Option<bool>,
  pub has_elderly:          Option<bool>,
  /// Free-form interest categories, e.g. `"culture"`, `"food"`.
  #[serde(default)]
  pub preferred_categories: Vec<String>,
}

// ─── Itinerary ───────────────────────────────────────────────────────────────

/// A persisted itinerary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
  pub itinerary_id:          Uuid,
  pub owner_id:              Uuid,
  pub destination:           String,
  pub start_date:            DateTime<FixedOffset>,
  pub end_date:              DateTime<FixedOffset>,
  pub budget_cents:          i64,
  pub budget_per_meal_cents: Option<i64>,
  pub preferences:           TravelPreferences,
  /// The conversational agent's correlation id; unique across itineraries.
  pub session_key:           Option<String>,
  pub metadata:              serde_json::Map<String, serde_json::Value>,
  pub created_at:            DateTime<Utc>,
  pub updated_at:            DateTime<Utc>,
}

/// The writable fields of an itinerary, already normalised.
///
/// Produced by the snapshot parser for imports and by
/// [`CreateItinerary::into_new`] for explicit creations.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItinerary {
  pub destination:  String,
  pub start_date:   DateTime<FixedOffset>,
  pub end_date:     DateTime<FixedOffset>,
  pub budget_cents: i64,
  pub preferences:  TravelPreferences,
}

impl NewItinerary {
  /// Whole days between start and end, at least 1 and at most
  /// [`MAX_STAYING_DAYS`].
  pub fn staying_days(&self) -> u32 {
    let days = (self.end_date.date_naive() - self.start_date.date_naive()).num_days();
    days.clamp(1, MAX_STAYING_DAYS) as u32
  }

  pub fn recommended_poi_count(&self) -> u32 {
    (self.staying_days() * self.preferences.travel_pace.pois_per_day())
      .min(MAX_RECOMMENDED_POIS)
  }

  /// `budget / (travelers × days × 2 meals)`, or `None` when any factor is
  /// missing or non-positive.
  pub fn budget_per_meal_cents(&self) -> Option<i64> {
    if self.budget_cents <= 0 {
      return None;
    }
    let travelers = i64::from(self.preferences.number_of_travelers.filter(|n| *n > 0)?);
    let meals = travelers * i64::from(self.staying_days()) * 2;
    Some(self.budget_cents / meals)
  }
}

// ─── Explicit creation ───────────────────────────────────────────────────────

/// Input for an itinerary created by the user rather than by an import.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItinerary {
  pub destination:          String,
  pub start_date:           DateTime<FixedOffset>,
  pub end_date:             DateTime<FixedOffset>,
  pub budget_cents:         Option<i64>,
  pub travel_pace:          Option<TravelPace>,
  pub travel_mode:          Option<TravelMode>,
  pub number_of_travelers:  Option<u32>,
  pub has_children:         Option<bool>,
  pub has_elderly:          Option<bool>,
  #[serde(default)]
  pub preferred_categories: Vec<String>,
}

impl CreateItinerary {
  /// Validate required fields and fill in defaults for the optional ones.
  pub fn into_new(self) -> Result<NewItinerary> {
    let destination = self.destination.trim();
    if destination.is_empty() {
      return Err(Error::Invalid("destination is required".into()));
    }
    if self.start_date > self.end_date {
      return Err(Error::Invalid("start date must be before end date".into()));
    }

    let budget_cents = self
      .budget_cents
      .filter(|b| *b > 0)
      .unwrap_or(DEFAULT_BUDGET_CENTS);
    let number_of_travelers = self.number_of_travelers.filter(|n| *n > 0).unwrap_or(1);

    Ok(NewItinerary {
      destination: destination.to_owned(),
      start_date: self.start_date,
      end_date: self.end_date,
      budget_cents,
      preferences: TravelPreferences {
        travel_pace:          self.travel_pace.unwrap_or_default(),
        travel_mode:          self.travel_mode,
        number_of_travelers:  Some(number_of_travelers),
        has_children:         self.has_children,
        has_elderly:          self.has_elderly,
        preferred_categories: self.preferred_categories,
      },
    })
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr as _;

  use super::*;

  fn at(s: &str) -> DateTime<FixedOffset> { DateTime::parse_from_rfc3339(s).unwrap() }

  fn trip(start: &str, end: &str, pace: TravelPace) -> NewItinerary {
    NewItinerary {
      destination:  "Tokyo".into(),
      start_date:   at(start),
      end_date:     at(end),
      budget_cents: 150_000,
      preferences:  TravelPreferences {
        travel_pace: pace,
        number_of_travelers: Some(2),
        ..Default::default()
      },
    }
  }

  #[test]
  fn pace_parses_case_insensitively() {
    assert_eq!(TravelPace::from_str("packed").unwrap(), TravelPace::Packed);
    assert_eq!(TravelMode::from_str("Transit").unwrap(), TravelMode::Transit);
    assert!(TravelPace::from_str("leisurely").is_err());
    assert_eq!(TravelPace::Relaxed.to_string(), "RELAXED");
  }

  #[test]
  fn same_day_trip_counts_as_one_day() {
    let t = trip("2025-03-01T09:00:00+09:00", "2025-03-01T18:00:00+09:00", TravelPace::Moderate);
    assert_eq!(t.staying_days(), 1);
  }

  #[test]
  fn staying_days_and_poi_count_are_capped() {
    let t = trip("2025-03-01T09:00:00Z", "2025-03-20T09:00:00Z", TravelPace::Packed);
    assert_eq!(t.staying_days(), MAX_STAYING_DAYS as u32);
    assert_eq!(t.recommended_poi_count(), MAX_RECOMMENDED_POIS);

    let t = trip("2025-03-01T09:00:00Z", "2025-03-03T09:00:00Z", TravelPace::Relaxed);
    assert_eq!(t.recommended_poi_count(), 4);
  }

  #[test]
  fn budget_per_meal_divides_across_travelers_days_and_meals() {
    let t = trip("2025-03-01T09:00:00Z", "2025-03-04T09:00:00Z", TravelPace::Moderate);
    // 150000 / (2 travelers × 3 days × 2 meals)
    assert_eq!(t.budget_per_meal_cents(), Some(12_500));

    let mut no_travelers = t.clone();
    no_travelers.preferences.number_of_travelers = None;
    assert_eq!(no_travelers.budget_per_meal_cents(), None);
  }

  #[test]
  fn create_applies_defaults() {
    let input = CreateItinerary {
      destination:          "  Kyoto ".into(),
      start_date:           at("2025-04-01T09:00:00+09:00"),
      end_date:             at("2025-04-03T09:00:00+09:00"),
      budget_cents:         Some(0),
      travel_pace:          None,
      travel_mode:          None,
      number_of_travelers:  None,
      has_children:         None,
      has_elderly:          None,
      preferred_categories: vec![],
    };
    let new = input.into_new().unwrap();
    assert_eq!(new.destination, "Kyoto");
    assert_eq!(new.budget_cents, DEFAULT_BUDGET_CENTS);
    assert_eq!(new.preferences.number_of_travelers, Some(1));
    assert_eq!(new.preferences.travel_pace, TravelPace::Moderate);
  }

  #[test]
  fn create_rejects_inverted_dates_and_blank_destination() {
    let mut input = CreateItinerary {
      destination:          "Kyoto".into(),
      start_date:           at("2025-04-03T09:00:00Z"),
      end_date:             at("2025-04-01T09:00:00Z"),
      budget_cents:         None,
      travel_pace:          None,
      travel_mode:          None,
      number_of_travelers:  None,
      has_children:         None,
      has_elderly:          None,
      preferred_categories: vec![],
    };
    assert!(matches!(input.clone().into_new(), Err(Error::Invalid(_))));

    input.start_date = at("2025-04-01T09:00:00Z");
    input.destination = "   ".into();
    assert!(matches!(input.into_new(), Err(Error::Invalid(_))));
  }
}
