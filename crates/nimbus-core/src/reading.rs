//! Reading — one stored weather observation.
//!
//! A reading is immutable once stored; the only thing that ever changes
//! around it is which locations point at it. The "interesting" fields
//! (temperature, condition, identity) are derived views over the raw payload
//! rather than separately normalised columns.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::payload::{condition_label, kelvin_to_celsius, Coordinates, ProviderPayload};

pub type ReadingId = i64;

/// A weather observation tied to a timestamp and coordinates.
#[derive(Debug, Clone, Serialize)]
pub struct Reading {
  pub id:          ReadingId,
  /// The provider's "observed at" instant, UTC.
  pub recorded_at: DateTime<Utc>,
  pub coordinates: Coordinates,
  pub payload:     ProviderPayload,
}

impl Reading {
  /// Reported temperature in Celsius (payload Kelvin value minus 273.15).
  pub fn temperature(&self) -> Option<f64> {
    self.payload.temp_kelvin().map(kelvin_to_celsius)
  }

  /// First weather-condition entry as `"{main} ({description})"`, or `None`
  /// when the payload has no condition entries.
  pub fn condition(&self) -> Option<String> {
    condition_label(self.payload.conditions())
  }

  pub fn country_code(&self) -> Option<&str> { self.payload.country_code() }

  pub fn city_name(&self) -> Option<&str> { self.payload.city_name() }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::payload::epoch_to_utc;

  fn reading(raw: serde_json::Value) -> Reading {
    let payload = ProviderPayload::from_value(raw).unwrap();
    Reading {
      id: 1,
      recorded_at: epoch_to_utc(1_700_000_000).unwrap(),
      coordinates: Coordinates { lat: 30.27, lon: -97.74 },
      payload,
    }
  }

  #[test]
  fn derived_views_follow_payload() {
    let r = reading(json!({
      "main": { "temp": 300.15 },
      "weather": [{ "main": "Clear", "description": "clear sky" }],
      "sys": { "country": "US" },
      "name": "Austin"
    }));

    assert!((r.temperature().unwrap() - 27.0).abs() < 1e-9);
    assert_eq!(r.condition().as_deref(), Some("Clear (clear sky)"));
    assert_eq!(r.country_code(), Some("US"));
    assert_eq!(r.city_name(), Some("Austin"));
  }

  #[test]
  fn empty_condition_list_yields_none() {
    let r = reading(json!({ "weather": [] }));
    assert_eq!(r.condition(), None);
  }
}
