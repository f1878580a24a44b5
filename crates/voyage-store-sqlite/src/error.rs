//! Error type for `voyage-store-sqlite`.

use thiserror::Error;
use voyage_core::{Classify, ErrorKind};

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] voyage_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored value that doesn't decode into its domain type.
  #[error("corrupt column {column}: {value:?}")]
  Decode { column: &'static str, value: String },
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::Core(e) => e.kind(),
      Self::Sqlite(e) if is_constraint_violation(e) => ErrorKind::Conflict,
      Self::Database(tokio_rusqlite::Error::Rusqlite(e)) if is_constraint_violation(e) => {
        ErrorKind::Conflict
      }
      _ => ErrorKind::Internal,
    }
  }
}

/// Whether `e` is a UNIQUE or PRIMARY KEY violation.
pub(crate) fn is_constraint_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        || f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
  )
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
