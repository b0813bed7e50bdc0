//! Location and Country — the tracked places and their reference data.

use serde::Serialize;

use crate::reading::Reading;

pub type CountryId = i64;
pub type LocationId = i64;

/// Reference data: a 2-letter country code and its display name.
/// Never mutated by the engine.
#[derive(Debug, Clone, Serialize)]
pub struct Country {
  pub id:   CountryId,
  pub code: String,
  pub name: String,
}

/// A tracked place, optionally pointing at its most recent reading.
///
/// `last_reading` is `None` until weather has been fetched for the place at
/// least once. At most one reading is referenced at any time; the sweep path
/// keeps it consistent with the location's own city/country identity.
#[derive(Debug, Clone, Serialize)]
pub struct Location {
  pub id:           LocationId,
  pub city:         String,
  pub country:      Country,
  pub last_reading: Option<Reading>,
}
