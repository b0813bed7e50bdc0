//! The weather-provider collaborator contract.
//!
//! Implementations wrap an upstream HTTP API (see `nimbus-provider`).
//! Transport and decoding failures are the implementation's own error type;
//! an upstream *application* failure travels inside the payload itself and
//! is surfaced by [`ProviderPayload::failure`](crate::ProviderPayload::failure).
//! Retry and timeout policy also belongs here, never in the engine.

use std::future::Future;

use crate::payload::ProviderPayload;

pub trait WeatherProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Current weather for a place-name query.
  fn fetch_by_place<'a>(
    &'a self,
    city: &'a str,
    country_code: &'a str,
  ) -> impl Future<Output = Result<ProviderPayload, Self::Error>> + Send + 'a;

  /// Current weather for a coordinate query.
  fn fetch_by_coordinate(
    &self,
    lat: f64,
    lon: f64,
  ) -> impl Future<Output = Result<ProviderPayload, Self::Error>> + Send + '_;

  /// Multi-day forecast for a coordinate query.
  fn fetch_forecast_by_coordinate(
    &self,
    lat: f64,
    lon: f64,
  ) -> impl Future<Output = Result<ProviderPayload, Self::Error>> + Send + '_;
}
