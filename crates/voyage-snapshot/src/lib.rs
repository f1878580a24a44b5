//! Snapshot parsing for Voyage.
//!
//! Turns the planning agent's `/import-plan` payload into a validated
//! [`voyage_core::import::Snapshot`]. Pure synchronous; no HTTP or database
//! dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use voyage_snapshot::{ImportPlanRequest, parse};
//!
//! let request: ImportPlanRequest = serde_json::from_str(r#"{
//!   "sessionKey": "s-1",
//!   "userFeatures": { "destination": "Tokyo" },
//!   "pois": [{ "externalId": "p1", "name": "Senso-ji", "latitude": 35.71, "longitude": 139.79 }],
//!   "plan": { "startDate": "2025-03-01", "endDate": "2025-03-03", "days": [] }
//! }"#).unwrap();
//! let snapshot = parse(request).unwrap();
//! println!("{} POIs, {} warnings", snapshot.pois.len(), snapshot.warnings.len());
//! ```

pub mod error;
mod parse;
pub mod wire;

use chrono::{DateTime, FixedOffset, Utc};
pub use error::{Error, Result};
use voyage_core::{import::Snapshot, schedule::ScheduleDraft};
pub use wire::{ImportPlanRequest, ImportedDay};

/// Validate and normalise an import request.
///
/// Structural problems fail the whole request. Soft problems become warnings
/// on the returned snapshot: unparseable dates, unknown enum values,
/// duplicate POIs, and missing addresses or stop times.
pub fn parse(request: ImportPlanRequest) -> Result<Snapshot> {
  parse_at(request, Utc::now().fixed_offset())
}

/// [`parse`] with an explicit "now", used as the last date fallback.
pub fn parse_at(request: ImportPlanRequest, now: DateTime<FixedOffset>) -> Result<Snapshot> {
  parse::snapshot(request, now)
}

/// Convert plan days alone, as submitted by a re-plan, along with any
/// warnings about the stops.
pub fn parse_schedule(days: Vec<ImportedDay>) -> Result<(ScheduleDraft, Vec<String>)> {
  let mut warnings = Vec::new();
  let schedule = parse::schedule(days, &mut warnings)?;
  Ok((schedule, warnings))
}
