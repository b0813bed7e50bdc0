//! Reading resolution — the dedup decisions at the heart of the engine.
//!
//! Two flavours of identity exist side by side:
//! - **identity dedup** (sweep / by-place path): timestamp + the payload's
//!   own `(sys.country, name)` pair;
//! - **proximity dedup** (by-coordinate path): timestamp + planar distance
//!   from the reported coordinates.
//!
//! Either way the result is a stored reading — reused when a match exists,
//! created otherwise — plus, for location-bound resolutions, whether the
//! location's pointer has to move.

use chrono::{DateTime, Utc};
use nimbus_core::{
  payload::{epoch_to_utc, Coordinates, ProviderPayload},
  provider::WeatherProvider,
  store::{LocationStore, ReadingStore},
  Error as CoreError, Location, Reading,
};

use crate::{Engine, EngineError, Result};

/// Spatial dedup radius, in coordinate degrees of the stored spatial
/// reference system.
pub const DEDUP_RADIUS_DEGREES: f64 = 20.0;

/// The outcome of resolving one location against a reference timestamp.
pub(crate) struct Resolution {
  pub reading: Reading,
  /// Whether the location's `last_reading` pointer must move to `reading`.
  pub changed: bool,
}

pub(crate) fn validate_coordinates(lat: f64, lon: f64) -> Result<()> {
  if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
    return Err(EngineError::Validation(format!("latitude {lat} out of range")));
  }
  if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
    return Err(EngineError::Validation(format!("longitude {lon} out of range")));
  }
  Ok(())
}

pub(crate) fn caller_timestamp(secs: i64) -> Result<DateTime<Utc>> {
  if secs < 0 {
    return Err(EngineError::Validation(format!(
      "timestamp {secs} must be non-negative epoch seconds"
    )));
  }
  epoch_to_utc(secs).map_err(|e| EngineError::Validation(e.to_string()))
}

/// Reject a payload whose top-level status signals failure, before anything
/// is derived or written.
pub(crate) fn ensure_success(payload: &ProviderPayload) -> Result<()> {
  if let Some(failure) = payload.failure() {
    tracing::warn!(code = %failure.code, message = %failure.message, "provider payload failure");
    return Err(EngineError::from_failure(failure));
  }
  Ok(())
}

impl<S, P> Engine<S, P>
where
  S: ReadingStore + LocationStore,
  P: WeatherProvider,
{
  /// Serve a current-weather query for an arbitrary coordinate, not tied to
  /// any tracked location.
  ///
  /// Spatial dedup runs twice: once with the caller-supplied timestamp
  /// before any network call, and once with the payload's own `dt` after
  /// fetching, before falling back to creating a new reading.
  pub async fn resolve_current_weather(
    &self,
    lat: f64,
    lon: f64,
    timestamp: i64,
  ) -> Result<Reading> {
    validate_coordinates(lat, lon)?;
    let ts = caller_timestamp(timestamp)?;
    let point = Coordinates { lat, lon };

    if let Some(reading) = self
      .store
      .find_by_timestamp_and_proximity(ts, point, DEDUP_RADIUS_DEGREES)
      .await
      .map_err(EngineError::store)?
    {
      tracing::debug!(reading_id = reading.id, "proximity dedup hit before fetch");
      return Ok(reading);
    }

    let payload = self
      .provider
      .fetch_by_coordinate(lat, lon)
      .await
      .map_err(EngineError::provider)?;

    self.resolve_fetched_by_proximity(payload).await
  }

  /// Post-fetch half of the by-coordinate path: spatial dedup against the
  /// payload's own `dt` and reported coordinates, then create.
  async fn resolve_fetched_by_proximity(
    &self,
    payload: ProviderPayload,
  ) -> Result<Reading> {
    ensure_success(&payload)?;
    let ts = payload.observed_at()?;
    let point = payload.coordinates().ok_or(CoreError::MissingCoordinates)?;

    if let Some(reading) = self
      .store
      .find_by_timestamp_and_proximity(ts, point, DEDUP_RADIUS_DEGREES)
      .await
      .map_err(EngineError::store)?
    {
      tracing::debug!(reading_id = reading.id, "proximity dedup hit after fetch");
      return Ok(reading);
    }

    self
      .store
      .create_reading(payload, ts, point)
      .await
      .map_err(EngineError::store)
  }

  /// Resolve one tracked location against a caller-supplied reference
  /// timestamp (the sweep path).
  ///
  /// The pre-fetch lookup uses the *caller's* timestamp and the location's
  /// own city/country; on a hit the provider is never called. The post-fetch
  /// lookup uses the *payload's* identity and `dt`, which may differ from
  /// both.
  pub(crate) async fn resolve_for_location(
    &self,
    location: &Location,
    sweep_ts: DateTime<Utc>,
  ) -> Result<Resolution> {
    let pre_fetch = self
      .store
      .find_by_timestamp_and_identity(sweep_ts, &location.country.code, &location.city)
      .await
      .map_err(EngineError::store)?;

    let reading = match pre_fetch {
      Some(reading) => {
        tracing::debug!(
          reading_id = reading.id,
          city = %location.city,
          "identity dedup hit, skipping fetch"
        );
        reading
      }
      None => {
        let payload = self
          .provider
          .fetch_by_place(&location.city, &location.country.code)
          .await
          .map_err(EngineError::provider)?;
        self.resolve_fetched_by_identity(payload).await?
      }
    };

    let changed = location
      .last_reading
      .as_ref()
      .is_none_or(|last| last.id != reading.id);

    Ok(Resolution { reading, changed })
  }

  /// Post-fetch half of the by-place path: identity dedup on the payload's
  /// canonical `(sys.country, name)` — not the caller's spelling — then
  /// create.
  pub(crate) async fn resolve_fetched_by_identity(
    &self,
    payload: ProviderPayload,
  ) -> Result<Reading> {
    ensure_success(&payload)?;
    let ts = payload.observed_at()?;

    if let (Some(country_code), Some(city)) =
      (payload.country_code(), payload.city_name())
    {
      if let Some(reading) = self
        .store
        .find_by_timestamp_and_identity(ts, country_code, city)
        .await
        .map_err(EngineError::store)?
      {
        tracing::debug!(reading_id = reading.id, "identity dedup hit after fetch");
        return Ok(reading);
      }
    }

    let point = payload.coordinates().ok_or(CoreError::MissingCoordinates)?;
    self
      .store
      .create_reading(payload, ts, point)
      .await
      .map_err(EngineError::store)
  }
}
