//! Error types for snapshot parsing.
//!
//! Every variant is a structural problem with the inbound request; soft
//! problems are reported as warnings on the parsed snapshot instead.

use thiserror::Error;
use voyage_core::{Classify, ErrorKind};

#[derive(Debug, Error)]
pub enum Error {
  #[error("destination is required")]
  MissingDestination,

  #[error("plan is required")]
  MissingPlan,

  #[error("POI at position {0} has a blank externalId")]
  BlankPoiId(usize),

  #[error("POI {0:?} has a blank name")]
  BlankPoiName(String),

  #[error("stop {stop} of day {day} has a blank poiExternalId")]
  BlankStopPoi { day: usize, stop: usize },
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind { ErrorKind::BadRequest }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
