//! Forecast projection — derived daily summaries over a forecast payload.
//!
//! Pure: nothing here is deduplicated or persisted. The temperature and
//! condition rules are the same functions the stored-reading views use, so
//! the two paths cannot drift apart.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
  payload::{condition_label, epoch_to_utc, kelvin_to_celsius, DailyEntry, ProviderPayload},
  Error, Result,
};

/// Forecast days taken from the provider's `daily` array: entries 1 through
/// 5, skipping day 0 (today).
pub const FORECAST_SKIP: usize = 1;
pub const FORECAST_TAKE: usize = 5;

/// One derived daily summary.
#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
  pub timestamp:   DateTime<Utc>,
  /// Day temperature in Celsius.
  pub temperature: f64,
  pub condition:   Option<String>,
}

impl DailySummary {
  fn from_entry(entry: &DailyEntry) -> Result<Self> {
    let secs = entry.dt.ok_or(Error::MissingObservationTime)?;
    let kelvin = entry
      .temp
      .as_ref()
      .and_then(|t| t.day)
      .ok_or(Error::MissingDayTemperature)?;

    Ok(Self {
      timestamp:   epoch_to_utc(secs)?,
      temperature: kelvin_to_celsius(kelvin),
      condition:   condition_label(&entry.weather),
    })
  }
}

/// Lazily project a forecast payload's daily window into summaries.
pub fn daily_summaries(
  payload: &ProviderPayload,
) -> impl Iterator<Item = Result<DailySummary>> + '_ {
  payload
    .daily()
    .iter()
    .skip(FORECAST_SKIP)
    .take(FORECAST_TAKE)
    .map(DailySummary::from_entry)
}
