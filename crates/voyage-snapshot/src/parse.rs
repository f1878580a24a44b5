//! Request → [`Snapshot`] normalisation.

use std::collections::HashSet;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use serde_json::{Map, Value, json};
use voyage_core::{
  import::{ImportedPoi, Snapshot},
  itinerary::{NewItinerary, TravelMode, TravelPace, TravelPreferences},
  place::{AGENT_SOURCE, GeoPoint, NewPlace},
  schedule::{DEFAULT_STAY_MINUTES, DayDraft, ScheduleDraft, StopDraft},
};

use crate::{
  error::{Error, Result},
  wire,
};

/// Hour of day assumed for date-only timestamps, in UTC.
const DATE_ONLY_HOUR: u32 = 9;

pub(crate) fn snapshot(
  request: wire::ImportPlanRequest,
  now: DateTime<FixedOffset>,
) -> Result<Snapshot> {
  let wire::ImportPlanRequest { session_key, user_features, pois, plan } = request;
  let plan = plan.ok_or(Error::MissingPlan)?;
  let mut warnings = Vec::new();

  let destination = non_blank(user_features.destination.as_deref())
    .or_else(|| non_blank(plan.destination.as_deref()))
    .ok_or(Error::MissingDestination)?
    .to_owned();

  let start_date = timestamp(
    non_blank(plan.start_date.as_deref()).or_else(|| non_blank(user_features.start_date.as_deref())),
    "startDate",
    now,
    &mut warnings,
  );
  let end_raw =
    non_blank(plan.end_date.as_deref()).or_else(|| non_blank(user_features.end_date.as_deref()));
  let end_date = match (end_raw, user_features.travel_days.filter(|d| *d > 0)) {
    (None, Some(days)) => {
      warnings.push(format!("endDate is missing; derived from travelDays ({days})"));
      start_date + Duration::days(i64::from(days) - 1)
    }
    (raw, _) => timestamp(raw, "endDate", now, &mut warnings),
  };
  if end_date < start_date {
    warnings.push(format!("endDate {end_date} precedes startDate {start_date}"));
  }

  let preferences = TravelPreferences {
    travel_pace:          pace(user_features.travel_pace.as_deref(), &mut warnings),
    travel_mode:          mode(user_features.travel_mode.as_deref(), &mut warnings),
    number_of_travelers:  user_features.number_of_travelers,
    has_children:         user_features.has_children,
    has_elderly:          user_features.has_elderly,
    preferred_categories: user_features.interests,
  };

  let itinerary = NewItinerary {
    destination,
    start_date,
    end_date,
    budget_cents: user_features.budget_cents.unwrap_or(0),
    preferences,
  };

  Ok(Snapshot {
    session_key: non_blank(session_key.as_deref()).map(str::to_owned),
    itinerary,
    pois: self::pois(pois, &mut warnings)?,
    schedule: schedule(plan.days, &mut warnings)?,
    warnings,
  })
}

/// Stops missing a time keep their slot with an empty time and add one
/// warning each.
pub(crate) fn schedule(
  days: Vec<wire::ImportedDay>,
  warnings: &mut Vec<String>,
) -> Result<ScheduleDraft> {
  let days = days
    .into_iter()
    .enumerate()
    .map(|(day_index, day)| {
      let stops = day
        .stops
        .into_iter()
        .enumerate()
        .map(|(stop_index, stop)| {
          let poi_external_id = stop.poi_external_id.trim();
          if poi_external_id.is_empty() {
            return Err(Error::BlankStopPoi { day: day_index + 1, stop: stop_index + 1 });
          }
          let arrival_time = stop.arrival_time.trim().to_owned();
          let departure_time = stop.departure_time.trim().to_owned();
          let times = [("arrivalTime", &arrival_time), ("departureTime", &departure_time)];
          let missing: Vec<&str> = times
            .into_iter()
            .filter(|(_, t)| t.is_empty())
            .map(|(field, _)| field)
            .collect();
          if !missing.is_empty() {
            warnings.push(format!(
              "day {} stop {} (POI {poi_external_id:?}) has no {}",
              day_index + 1,
              stop_index + 1,
              missing.join(" or ")
            ));
          }
          Ok(StopDraft {
            order:            stop.order.unwrap_or(stop_index as u32 + 1),
            poi_external_id:  poi_external_id.to_owned(),
            poi_name:         stop.poi_name,
            arrival_time,
            departure_time,
            duration_minutes: stop.duration_minutes.unwrap_or(DEFAULT_STAY_MINUTES),
            activity:         stop.activity,
          })
        })
        .collect::<Result<Vec<_>>>()?;
      Ok(DayDraft::new(day.date, stops))
    })
    .collect::<Result<Vec<_>>>()?;

  Ok(ScheduleDraft { days })
}

// ─── POIs ────────────────────────────────────────────────────────────────────

fn pois(raw: Vec<wire::ImportedPoi>, warnings: &mut Vec<String>) -> Result<Vec<ImportedPoi>> {
  let mut seen = HashSet::new();
  let mut out = Vec::with_capacity(raw.len());

  for (index, poi) in raw.into_iter().enumerate() {
    let external_id = poi.external_id.trim().to_owned();
    if external_id.is_empty() {
      return Err(Error::BlankPoiId(index + 1));
    }
    let name = poi.name.trim().to_owned();
    if name.is_empty() {
      return Err(Error::BlankPoiName(external_id));
    }
    if !seen.insert(external_id.clone()) {
      warnings.push(format!("duplicate POI {external_id:?} ignored; the first occurrence is kept"));
      continue;
    }
    let address = poi.address.trim().to_owned();
    if address.is_empty() {
      warnings.push(format!("POI {external_id:?} has no address"));
    }

    let mut metadata = Map::new();
    insert_some(&mut metadata, "city", poi.city.map(Value::from));
    insert_some(&mut metadata, "rating", poi.rating.map(Value::from));
    insert_some(&mut metadata, "reviews_count", poi.reviews_count.map(Value::from));
    insert_some(&mut metadata, "price_level", poi.price_level);
    insert_some(&mut metadata, "primary_category", poi.primary_category.map(Value::from));

    out.push(ImportedPoi {
      external_id: external_id.clone(),
      place:       NewPlace {
        poi_external_id: Some(external_id),
        external_ref:    None,
        name,
        address,
        location:        GeoPoint { latitude: poi.latitude, longitude: poi.longitude },
        description:     poi.description,
        image_url:       poi.image_url,
        opening_hours:   poi.opening_hours.map(|raw| json!({ "raw": raw })),
        source:          AGENT_SOURCE.to_owned(),
        metadata,
      },
    });
  }

  Ok(out)
}

fn insert_some(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
  if let Some(value) = value {
    map.insert(key.to_owned(), value);
  }
}

// ─── Scalars ─────────────────────────────────────────────────────────────────

fn non_blank(s: Option<&str>) -> Option<&str> { s.map(str::trim).filter(|s| !s.is_empty()) }

/// Full offset timestamp, then a bare date at 09:00 UTC, then `now`.
///
/// Only the first form is silent.
fn timestamp(
  raw: Option<&str>,
  field: &str,
  now: DateTime<FixedOffset>,
  warnings: &mut Vec<String>,
) -> DateTime<FixedOffset> {
  let Some(raw) = raw else {
    warnings.push(format!("{field} is missing; using the current time"));
    return now;
  };

  if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
    return ts;
  }
  if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z") {
    return ts;
  }

  let date_only = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(DATE_ONLY_HOUR, 0, 0));
  if let Some(naive) = date_only {
    warnings.push(format!(
      "{field} {raw:?} has no time of day; assuming {DATE_ONLY_HOUR:02}:00 UTC"
    ));
    return naive.and_utc().fixed_offset();
  }

  warnings.push(format!("{field} {raw:?} is not a date; using the current time"));
  now
}

fn pace(raw: Option<&str>, warnings: &mut Vec<String>) -> TravelPace {
  let Some(raw) = non_blank(raw) else {
    return TravelPace::default();
  };
  raw.parse().unwrap_or_else(|_| {
    warnings.push(format!("unknown travelPace {raw:?}; using {}", TravelPace::default()));
    TravelPace::default()
  })
}

fn mode(raw: Option<&str>, warnings: &mut Vec<String>) -> Option<TravelMode> {
  let raw = non_blank(raw)?;
  Some(raw.parse().unwrap_or_else(|_| {
    warnings.push(format!("unknown travelMode {raw:?}; using {}", TravelMode::default()));
    TravelMode::default()
  }))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
