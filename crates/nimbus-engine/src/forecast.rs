//! Forecast resolution: fetch a multi-day forecast and project it into daily
//! summaries. No dedup, no storage.

use nimbus_core::{
  forecast::daily_summaries, provider::WeatherProvider, DailySummary,
};

use crate::{
  resolve::{ensure_success, validate_coordinates},
  Engine, EngineError, Result,
};

impl<S, P> Engine<S, P>
where
  P: WeatherProvider,
{
  /// Derived daily summaries for forecast days 1 through 5 of the provider's
  /// response (day 0 — today — is skipped).
  pub async fn resolve_forecast(&self, lat: f64, lon: f64) -> Result<Vec<DailySummary>> {
    validate_coordinates(lat, lon)?;

    let payload = self
      .provider
      .fetch_forecast_by_coordinate(lat, lon)
      .await
      .map_err(EngineError::provider)?;
    ensure_success(&payload)?;

    let summaries = daily_summaries(&payload)
      .collect::<nimbus_core::Result<Vec<_>>>()?;
    Ok(summaries)
  }
}
