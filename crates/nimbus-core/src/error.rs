//! Error types for `nimbus-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("payload has no observation timestamp (`dt`)")]
  MissingObservationTime,

  #[error("payload has no coordinates (`coord`)")]
  MissingCoordinates,

  #[error("forecast entry has no day temperature (`temp.day`)")]
  MissingDayTemperature,

  #[error("epoch timestamp {0} is out of range")]
  TimestampOutOfRange(i64),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
