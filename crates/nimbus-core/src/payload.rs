//! The provider payload value object and the shared derivation rules.
//!
//! Upstream weather payloads are dynamic JSON. The engine only ever consumes
//! a handful of fields, so the payload is modelled as the raw
//! [`serde_json::Value`] (stored opaquely) plus a typed view with named
//! optional fields. Absence is an explicit `None`, never a missing-key error.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::{Error, Result};

// ─── Derivation rules ────────────────────────────────────────────────────────
//
// Shared by the stored-reading views and the forecast projection; both paths
// must agree on these exactly.

pub const KELVIN_OFFSET: f64 = 273.15;

/// Provider temperatures arrive in Kelvin.
pub fn kelvin_to_celsius(kelvin: f64) -> f64 { kelvin - KELVIN_OFFSET }

/// `"{main} ({description})"` of the first condition entry, or `None` when
/// the list is empty.
pub fn condition_label(entries: &[ConditionEntry]) -> Option<String> {
  entries
    .first()
    .map(|c| format!("{} ({})", c.main, c.description))
}

/// Interpret provider epoch seconds as a UTC instant. No local-timezone
/// conversion is ever applied at storage time.
pub fn epoch_to_utc(secs: i64) -> Result<DateTime<Utc>> {
  Utc
    .timestamp_opt(secs, 0)
    .single()
    .ok_or(Error::TimestampOutOfRange(secs))
}

// ─── Leaf value types ────────────────────────────────────────────────────────

/// A latitude/longitude pair as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub lat: f64,
  pub lon: f64,
}

/// One entry of the payload's `weather` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionEntry {
  pub main:        String,
  pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainMetrics {
  pub temp: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SysInfo {
  pub country: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyTemp {
  pub day: Option<f64>,
}

/// One entry of a forecast payload's `daily` array.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyEntry {
  pub dt:   Option<i64>,
  pub temp: Option<DailyTemp>,
  #[serde(default)]
  pub weather: Vec<ConditionEntry>,
}

// ─── Typed view ──────────────────────────────────────────────────────────────

/// The fields the engine consumes, deserialised leniently: anything the
/// provider omits is `None`/empty.
#[derive(Debug, Clone, Default, Deserialize)]
struct PayloadFields {
  cod:     Option<Value>,
  message: Option<Value>,
  dt:      Option<i64>,
  coord:   Option<Coordinates>,
  main:    Option<MainMetrics>,
  #[serde(default)]
  weather: Vec<ConditionEntry>,
  sys:     Option<SysInfo>,
  name:    Option<String>,
  #[serde(default)]
  daily:   Vec<DailyEntry>,
}

/// An explicit non-success status reported inside a payload.
#[derive(Debug, Clone)]
pub struct PayloadFailure {
  pub code:    String,
  pub message: String,
}

/// A provider payload: the raw JSON (kept opaque for storage) plus the typed
/// view the engine decides on.
#[derive(Debug, Clone)]
pub struct ProviderPayload {
  raw:    Value,
  fields: PayloadFields,
}

impl ProviderPayload {
  pub fn from_value(raw: Value) -> Result<Self> {
    let fields: PayloadFields = serde_json::from_value(raw.clone())?;
    Ok(Self { raw, fields })
  }

  /// The untouched provider JSON.
  pub fn raw(&self) -> &Value { &self.raw }

  /// An explicit failure status, if the payload carries one.
  ///
  /// `cod` may be a JSON number or string; absence of an explicit failure
  /// code counts as success.
  pub fn failure(&self) -> Option<PayloadFailure> {
    let cod = self.fields.cod.as_ref()?;
    let success = match cod {
      Value::Number(n) => n.as_i64() == Some(200),
      Value::String(s) => s == "200",
      _ => false,
    };
    if success {
      return None;
    }

    let code = match cod {
      Value::String(s) => s.clone(),
      other => other.to_string(),
    };
    let message = match &self.fields.message {
      Some(Value::String(s)) => s.clone(),
      Some(other) => other.to_string(),
      None => "provider reported a failure".to_owned(),
    };
    Some(PayloadFailure { code, message })
  }

  /// The provider's "observed at" instant, from the top-level `dt`.
  pub fn observed_at(&self) -> Result<DateTime<Utc>> {
    let secs = self.fields.dt.ok_or(Error::MissingObservationTime)?;
    epoch_to_utc(secs)
  }

  pub fn coordinates(&self) -> Option<Coordinates> { self.fields.coord }

  /// Reported temperature in Kelvin (`main.temp`).
  pub fn temp_kelvin(&self) -> Option<f64> {
    self.fields.main.as_ref().and_then(|m| m.temp)
  }

  pub fn conditions(&self) -> &[ConditionEntry] { &self.fields.weather }

  /// 2-letter country code (`sys.country`).
  pub fn country_code(&self) -> Option<&str> {
    self.fields.sys.as_ref().and_then(|s| s.country.as_deref())
  }

  /// Provider's canonical place name (`name`). May differ in casing or
  /// spelling from what a caller asked for.
  pub fn city_name(&self) -> Option<&str> { self.fields.name.as_deref() }

  /// Daily forecast entries (`daily`); empty for current-weather payloads.
  pub fn daily(&self) -> &[DailyEntry] { &self.fields.daily }
}

// Serialise as the raw JSON so stored payloads round-trip unchanged.
impl Serialize for ProviderPayload {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    self.raw.serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for ProviderPayload {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    Self::from_value(raw).map_err(serde::de::Error::custom)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
