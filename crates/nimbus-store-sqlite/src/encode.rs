//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; equality lookups rely on every
//! write going through [`encode_dt`] so the textual form is consistent.
//! Payloads are stored as compact JSON.

use chrono::{DateTime, Utc};
use nimbus_core::{
  location::{Country, Location},
  payload::{Coordinates, ProviderPayload},
  reading::Reading,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `readings` row.
pub struct RawReading {
  pub reading_id:  i64,
  pub raw_json:    String,
  pub recorded_at: String,
  pub lat:         f64,
  pub lon:         f64,
}

impl RawReading {
  pub fn into_reading(self) -> Result<Reading> {
    let raw: serde_json::Value = serde_json::from_str(&self.raw_json)?;
    let payload = ProviderPayload::from_value(raw).map_err(Error::Core)?;

    Ok(Reading {
      id: self.reading_id,
      recorded_at: decode_dt(&self.recorded_at)?,
      coordinates: Coordinates { lat: self.lat, lon: self.lon },
      payload,
    })
  }
}

/// Raw strings read from a `countries` row.
pub struct RawCountry {
  pub country_id: i64,
  pub code:       String,
  pub name:       String,
}

impl RawCountry {
  pub fn into_country(self) -> Country {
    Country {
      id:   self.country_id,
      code: self.code,
      name: self.name,
    }
  }
}

/// Raw strings read from a `locations` row joined with `countries` and the
/// optional `last_reading` row.
pub struct RawLocation {
  pub location_id: i64,
  pub city:        String,
  pub country:     RawCountry,
  // LEFT JOIN columns; either all present or all NULL.
  pub reading_id:  Option<i64>,
  pub raw_json:    Option<String>,
  pub recorded_at: Option<String>,
  pub lat:         Option<f64>,
  pub lon:         Option<f64>,
}

impl RawLocation {
  pub fn into_location(self) -> Result<Location> {
    let last_reading = match (
      self.reading_id,
      self.raw_json,
      self.recorded_at,
      self.lat,
      self.lon,
    ) {
      (Some(reading_id), Some(raw_json), Some(recorded_at), Some(lat), Some(lon)) => {
        Some(
          RawReading {
            reading_id,
            raw_json,
            recorded_at,
            lat,
            lon,
          }
          .into_reading()?,
        )
      }
      _ => None,
    };

    Ok(Location {
      id: self.location_id,
      city: self.city,
      country: self.country.into_country(),
      last_reading,
    })
  }
}
