//! The day/stop structure of an inbound snapshot before its
//! POI references are resolved to places.

use std::collections::HashMap;

use uuid::Uuid;

use crate::plan::{PlaceRef, PlanBody, PlannedDay, PlannedStop};

/// Stay length applied to stops that don't state one.
pub const DEFAULT_STAY_MINUTES: u32 = 60;

/// Producer POI id → place, for the places a schedule may reference.
pub type PlaceIndex = HashMap<String, PlaceRef>;

#[derive(Debug, Clone, PartialEq)]
pub struct StopDraft {
  pub order:            u32,
  pub poi_external_id:  String,
  pub poi_name:         Option<String>,
  pub arrival_time:     String,
  pub departure_time:   String,
  pub duration_minutes: u32,
  pub activity:         Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayDraft {
  pub date:  String,
  pub stops: Vec<StopDraft>,
}

impl DayDraft {
  /// Build a day with its stops ordered by the producer's `order` field.
  ///
  /// The sort is stable, so stops sharing an order value keep their input
  /// order. Orders are then renumbered densely from 1.
  pub fn new(date: impl Into<String>, mut stops: Vec<StopDraft>) -> Self {
    stops.sort_by_key(|s| s.order);
    for (i, stop) in stops.iter_mut().enumerate() {
      stop.order = i as u32 + 1;
    }
    Self { date: date.into(), stops }
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleDraft {
  pub days: Vec<DayDraft>,
}

impl ScheduleDraft {
  /// Resolve every stop against `places`.
  ///
  /// A stop whose POI is not in the index keeps its slot with no place
  /// attached and adds one entry to `warnings`.
  pub fn resolve(
    &self,
    itinerary_id: Uuid,
    places: &PlaceIndex,
    warnings: &mut Vec<String>,
  ) -> PlanBody {
    let days = self
      .days
      .iter()
      .map(|day| PlannedDay {
        date:  day.date.clone(),
        stops: day
          .stops
          .iter()
          .map(|stop| {
            let place = places.get(&stop.poi_external_id).cloned();
            if place.is_none() {
              warnings.push(format!(
                "day {}: stop {} references POI {:?} which is not available; no place attached",
                day.date, stop.order, stop.poi_external_id
              ));
            }
            PlannedStop {
              order: stop.order,
              arrival_local: stop.arrival_time.clone(),
              depart_local: stop.departure_time.clone(),
              stay_minutes: stop.duration_minutes,
              note: stop.activity.clone(),
              poi_name: stop.poi_name.clone(),
              place,
            }
          })
          .collect(),
      })
      .collect();

    PlanBody { itinerary_id, days }
  }
}

#[cfg(test)]
mod tests {
  use crate::place::GeoPoint;

  use super::*;

  fn stop(order: u32, poi: &str) -> StopDraft {
    StopDraft {
      order,
      poi_external_id: poi.into(),
      poi_name: None,
      arrival_time: "10:00".into(),
      departure_time: "11:00".into(),
      duration_minutes: DEFAULT_STAY_MINUTES,
      activity: None,
    }
  }

  fn place_ref(name: &str) -> PlaceRef {
    PlaceRef {
      place_id:    Uuid::new_v4(),
      name:        name.into(),
      address:     "somewhere".into(),
      description: None,
      image_url:   None,
      location:    GeoPoint { latitude: 0.0, longitude: 0.0 },
    }
  }

  #[test]
  fn stops_sort_stably_and_renumber() {
    let day = DayDraft::new("2025-03-01", vec![stop(3, "c"), stop(1, "a"), stop(3, "d"), stop(2, "b")]);
    let ids: Vec<_> = day.stops.iter().map(|s| s.poi_external_id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c", "d"]);
    let orders: Vec<_> = day.stops.iter().map(|s| s.order).collect();
    assert_eq!(orders, [1, 2, 3, 4]);
  }

  #[test]
  fn unresolved_stop_keeps_slot_and_warns() {
    let draft = ScheduleDraft {
      days: vec![DayDraft::new("2025-03-01", vec![stop(1, "a"), stop(2, "ghost")])],
    };
    let mut index = PlaceIndex::new();
    index.insert("a".into(), place_ref("Senso-ji"));

    let mut warnings = Vec::new();
    let body = draft.resolve(Uuid::nil(), &index, &mut warnings);

    assert_eq!(body.stop_count(), 2);
    assert_eq!(body.days[0].stops[0].place.as_ref().unwrap().name, "Senso-ji");
    assert!(body.days[0].stops[1].place.is_none());
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("ghost"));
  }
}
