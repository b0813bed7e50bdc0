//! Operation-level error taxonomy.
//!
//! Every error is terminal to the operation that raised it: the engine never
//! retries, and nothing is mutated after an error surfaces. Retry policy, if
//! any, belongs to the provider client.

use nimbus_core::{payload::PayloadFailure, ReadingId};
use thiserror::Error;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum EngineError {
  /// Malformed input: out-of-range coordinate or timestamp.
  #[error("invalid parameter: {0}")]
  Validation(String),

  #[error("unknown country code: {0:?}")]
  InvalidCountryCode(String),

  #[error("{city}, {country}({code}) already exists")]
  DuplicateLocation {
    city:    String,
    country: String,
    code:    String,
  },

  #[error("reading not found: {0}")]
  ReadingNotFound(ReadingId),

  /// The upstream payload carried an explicit non-success status.
  #[error("provider failure ({code}): {message}")]
  ProviderFailure { code: String, message: String },

  /// Transport or decoding failure in the provider client.
  #[error("provider error: {0}")]
  Provider(#[source] BoxedError),

  /// A payload the provider accepted but the engine cannot use (missing
  /// `dt`, missing coordinates, out-of-range timestamp).
  #[error("malformed provider payload: {0}")]
  Payload(#[from] nimbus_core::Error),

  #[error("store error: {0}")]
  Store(#[source] BoxedError),
}

impl EngineError {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub(crate) fn provider<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Provider(Box::new(e))
  }

  pub(crate) fn from_failure(failure: PayloadFailure) -> Self {
    Self::ProviderFailure {
      code:    failure.code,
      message: failure.message,
    }
  }
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
