//! Store trait contracts consumed by the reconciliation engine.
//!
//! The traits are implemented by storage backends (e.g.
//! `nimbus-store-sqlite`). The engine depends on these abstractions, not on
//! any concrete backend.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  location::{Country, Location, LocationId},
  payload::{Coordinates, ProviderPayload},
  reading::{Reading, ReadingId},
};

// ─── Reading store ───────────────────────────────────────────────────────────

/// Durable collection of weather readings, queryable by timestamp plus
/// either identity or spatial proximity.
///
/// Readings are append-only: once stored they are never updated or deleted.
/// Where several rows could satisfy a lookup, the one with the lowest id
/// wins.
pub trait ReadingStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Find a reading observed exactly at `ts` whose payload identity matches
  /// `(country_code, city)`. The match is exact (case-sensitive).
  fn find_by_timestamp_and_identity<'a>(
    &'a self,
    ts: DateTime<Utc>,
    country_code: &'a str,
    city: &'a str,
  ) -> impl Future<Output = Result<Option<Reading>, Self::Error>> + Send + 'a;

  /// Find a reading observed exactly at `ts` within `radius` of `point`.
  /// Distance is planar, in coordinate degrees.
  fn find_by_timestamp_and_proximity(
    &self,
    ts: DateTime<Utc>,
    point: Coordinates,
    radius: f64,
  ) -> impl Future<Output = Result<Option<Reading>, Self::Error>> + Send + '_;

  /// Persist a reading. This is an upsert on the reading identity key
  /// `(ts, payload country code, payload city name)`: on conflict the
  /// pre-existing row is returned instead of an error, which closes the
  /// concurrent query-then-create race.
  fn create_reading(
    &self,
    payload: ProviderPayload,
    ts: DateTime<Utc>,
    point: Coordinates,
  ) -> impl Future<Output = Result<Reading, Self::Error>> + Send + '_;

  /// Retrieve a reading by id. Returns `None` if not found.
  fn get_reading(
    &self,
    id: ReadingId,
  ) -> impl Future<Output = Result<Option<Reading>, Self::Error>> + Send + '_;

  /// List all readings, newest observation first.
  fn list_readings(
    &self,
  ) -> impl Future<Output = Result<Vec<Reading>, Self::Error>> + Send + '_;
}

// ─── Location store ──────────────────────────────────────────────────────────

/// Durable collection of tracked locations.
pub trait LocationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All tracked locations in a stable order (ascending id). This is the
  /// order the sweep iterates in.
  fn all_locations(
    &self,
  ) -> impl Future<Output = Result<Vec<Location>, Self::Error>> + Send + '_;

  /// Find a location by city and country code. The city comparison is
  /// case-insensitive; the country code is exact.
  fn find_location_by_city_country<'a>(
    &'a self,
    city: &'a str,
    country_code: &'a str,
  ) -> impl Future<Output = Result<Option<Location>, Self::Error>> + Send + 'a;

  /// Create a tracked location, optionally with an initial reading.
  fn create_location<'a>(
    &'a self,
    city: &'a str,
    country: &'a Country,
    reading: Option<&'a Reading>,
  ) -> impl Future<Output = Result<Location, Self::Error>> + Send + 'a;

  /// Reassign a location's `last_reading` pointer. The only mutation ever
  /// applied to a stored location.
  fn update_last_reading(
    &self,
    location: LocationId,
    reading: ReadingId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── Country directory ───────────────────────────────────────────────────────

/// Lookup of country reference data, used to validate location creation.
pub trait CountryDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Retrieve a country by its 2-letter code. Returns `None` if unknown.
  fn find_country_by_code<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<Country>, Self::Error>> + Send + 'a;

  fn add_country<'a>(
    &'a self,
    code: &'a str,
    name: &'a str,
  ) -> impl Future<Output = Result<Country, Self::Error>> + Send + 'a;

  fn list_countries(
    &self,
  ) -> impl Future<Output = Result<Vec<Country>, Self::Error>> + Send + '_;
}
