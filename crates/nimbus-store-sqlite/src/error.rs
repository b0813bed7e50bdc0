//! Error type for `nimbus-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] nimbus_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Attempted to point a location at a reading, but the location row is
  /// gone.
  #[error("location not found: {0}")]
  LocationNotFound(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
