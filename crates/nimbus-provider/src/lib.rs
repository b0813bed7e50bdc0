//! OpenWeatherMap client implementing the [`WeatherProvider`] contract.
//!
//! The client is deliberately dumb: it renders an endpoint template, issues
//! one GET, and decodes the JSON body into a [`ProviderPayload`]. Upstream
//! *application* failures travel inside the payload (`cod`/`message`) and
//! are the engine's to interpret; only transport and decoding problems are
//! errors here.

use nimbus_core::{payload::ProviderPayload, provider::WeatherProvider};
use thiserror::Error;

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum Error {
  #[error("request to weather provider failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("failed to decode provider response: {0}")]
  Decode(#[from] nimbus_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Explicit client configuration: the API key and the three endpoint
/// templates. Placeholders `{city}`, `{country}`, `{lat}`, `{lon}` and
/// `{key}` are substituted at request time.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
  pub api_key:           String,
  pub place_endpoint:    String,
  pub coord_endpoint:    String,
  pub forecast_endpoint: String,
}

impl ProviderConfig {
  /// Standard OpenWeatherMap endpoints with only the key left to fill in.
  pub fn with_api_key(api_key: impl Into<String>) -> Self {
    Self {
      api_key:           api_key.into(),
      place_endpoint:
        "https://api.openweathermap.org/data/2.5/weather?q={city},{country}&appid={key}"
          .to_owned(),
      coord_endpoint:
        "https://api.openweathermap.org/data/2.5/weather?lat={lat}&lon={lon}&appid={key}"
          .to_owned(),
      forecast_endpoint:
        "https://api.openweathermap.org/data/2.5/onecall?lat={lat}&lon={lon}&exclude=hourly,minutely&appid={key}"
          .to_owned(),
    }
  }
}

fn render(template: &str, vars: &[(&str, &str)]) -> String {
  let mut url = template.to_owned();
  for (name, value) in vars {
    url = url.replace(&format!("{{{name}}}"), value);
  }
  url
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// An OpenWeatherMap API client over a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
  config: ProviderConfig,
  http:   reqwest::Client,
}

impl OpenWeatherClient {
  pub fn new(config: ProviderConfig) -> Self {
    Self {
      config,
      http: reqwest::Client::new(),
    }
  }

  async fn get_payload(&self, url: String) -> Result<ProviderPayload> {
    tracing::debug!(%url, "fetching provider payload");
    let body: serde_json::Value = self.http.get(&url).send().await?.json().await?;
    Ok(ProviderPayload::from_value(body)?)
  }
}

impl WeatherProvider for OpenWeatherClient {
  type Error = Error;

  async fn fetch_by_place(
    &self,
    city: &str,
    country_code: &str,
  ) -> Result<ProviderPayload> {
    let url = render(&self.config.place_endpoint, &[
      ("city", city),
      ("country", country_code),
      ("key", &self.config.api_key),
    ]);
    self.get_payload(url).await
  }

  async fn fetch_by_coordinate(&self, lat: f64, lon: f64) -> Result<ProviderPayload> {
    let url = render(&self.config.coord_endpoint, &[
      ("lat", &lat.to_string()),
      ("lon", &lon.to_string()),
      ("key", &self.config.api_key),
    ]);
    self.get_payload(url).await
  }

  async fn fetch_forecast_by_coordinate(
    &self,
    lat: f64,
    lon: f64,
  ) -> Result<ProviderPayload> {
    let url = render(&self.config.forecast_endpoint, &[
      ("lat", &lat.to_string()),
      ("lon", &lon.to_string()),
      ("key", &self.config.api_key),
    ]);
    self.get_payload(url).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn render_substitutes_every_placeholder() {
    let url = render("https://x/weather?q={city},{country}&appid={key}", &[
      ("city", "Austin"),
      ("country", "US"),
      ("key", "SECRET"),
    ]);
    assert_eq!(url, "https://x/weather?q=Austin,US&appid=SECRET");
  }

  #[test]
  fn default_endpoints_keep_expected_placeholders() {
    let cfg = ProviderConfig::with_api_key("k");
    assert!(cfg.place_endpoint.contains("{city}"));
    assert!(cfg.place_endpoint.contains("{country}"));
    assert!(cfg.coord_endpoint.contains("{lat}"));
    assert!(cfg.coord_endpoint.contains("{lon}"));
    assert!(cfg.forecast_endpoint.contains("{key}"));
  }
}
