//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{DateTime, Utc};
use nimbus_core::{
  payload::{epoch_to_utc, Coordinates, ProviderPayload},
  store::{CountryDirectory, LocationStore, ReadingStore},
};
use serde_json::json;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn ts(secs: i64) -> DateTime<Utc> { epoch_to_utc(secs).unwrap() }

fn payload(city: &str, country: &str, dt: i64, lat: f64, lon: f64) -> ProviderPayload {
  ProviderPayload::from_value(json!({
    "dt": dt,
    "coord": { "lat": lat, "lon": lon },
    "main": { "temp": 290.15 },
    "weather": [{ "main": "Clouds", "description": "few clouds" }],
    "sys": { "country": country },
    "name": city,
  }))
  .unwrap()
}

async fn seed_reading(
  s: &SqliteStore,
  city: &str,
  country: &str,
  dt: i64,
  lat: f64,
  lon: f64,
) -> nimbus_core::Reading {
  let p = payload(city, country, dt, lat, lon);
  s.create_reading(p, ts(dt), Coordinates { lat, lon })
    .await
    .unwrap()
}

// ─── Readings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_reading() {
  let s = store().await;
  let r = seed_reading(&s, "Austin", "US", 1_700_000_000, 30.27, -97.74).await;

  let fetched = s.get_reading(r.id).await.unwrap().expect("reading");
  assert_eq!(fetched.id, r.id);
  assert_eq!(fetched.recorded_at, ts(1_700_000_000));
  assert_eq!(fetched.city_name(), Some("Austin"));
  assert!((fetched.temperature().unwrap() - 17.0).abs() < 1e-9);
}

#[tokio::test]
async fn get_reading_missing_returns_none() {
  let s = store().await;
  assert!(s.get_reading(42).await.unwrap().is_none());
}

#[tokio::test]
async fn identity_conflict_returns_preexisting_row() {
  let s = store().await;
  let first = seed_reading(&s, "Austin", "US", 1_700_000_000, 30.27, -97.74).await;
  // Same identity key, different payload body: the upsert must hand back the
  // row that got there first instead of erroring or duplicating.
  let second = seed_reading(&s, "Austin", "US", 1_700_000_000, 30.3, -97.7).await;

  assert_eq!(first.id, second.id);
  assert_eq!(s.list_readings().await.unwrap().len(), 1);
}

#[tokio::test]
async fn identity_lookup_is_exact_and_case_sensitive() {
  let s = store().await;
  let r = seed_reading(&s, "Austin", "US", 1_700_000_000, 30.27, -97.74).await;

  let hit = s
    .find_by_timestamp_and_identity(ts(1_700_000_000), "US", "Austin")
    .await
    .unwrap();
  assert_eq!(hit.map(|r| r.id), Some(r.id));

  let wrong_case = s
    .find_by_timestamp_and_identity(ts(1_700_000_000), "US", "austin")
    .await
    .unwrap();
  assert!(wrong_case.is_none());

  let wrong_ts = s
    .find_by_timestamp_and_identity(ts(1_700_000_001), "US", "Austin")
    .await
    .unwrap();
  assert!(wrong_ts.is_none());
}

#[tokio::test]
async fn proximity_lookup_respects_radius() {
  let s = store().await;
  let r = seed_reading(&s, "Austin", "US", 1_700_000_000, 0.0, 0.0).await;

  // Distance 5 degrees: inside a radius of 20.
  let near = s
    .find_by_timestamp_and_proximity(
      ts(1_700_000_000),
      Coordinates { lat: 3.0, lon: 4.0 },
      20.0,
    )
    .await
    .unwrap();
  assert_eq!(near.map(|r| r.id), Some(r.id));

  // Distance ~21.2 degrees: outside.
  let far = s
    .find_by_timestamp_and_proximity(
      ts(1_700_000_000),
      Coordinates { lat: 15.0, lon: 15.0 },
      20.0,
    )
    .await
    .unwrap();
  assert!(far.is_none());
}

#[tokio::test]
async fn proximity_tie_break_is_lowest_id() {
  let s = store().await;
  let first = seed_reading(&s, "Austin", "US", 1_700_000_000, 0.0, 0.0).await;
  let second = seed_reading(&s, "Round Rock", "US", 1_700_000_000, 0.5, 0.5).await;
  assert_ne!(first.id, second.id);

  let hit = s
    .find_by_timestamp_and_proximity(
      ts(1_700_000_000),
      Coordinates { lat: 0.25, lon: 0.25 },
      20.0,
    )
    .await
    .unwrap()
    .expect("a match");
  assert_eq!(hit.id, first.id.min(second.id));
}

#[tokio::test]
async fn list_readings_newest_first() {
  let s = store().await;
  seed_reading(&s, "Austin", "US", 100, 0.0, 0.0).await;
  seed_reading(&s, "Austin", "US", 300, 0.0, 0.0).await;
  seed_reading(&s, "Austin", "US", 200, 0.0, 0.0).await;

  let all = s.list_readings().await.unwrap();
  let stamps: Vec<_> = all.iter().map(|r| r.recorded_at.timestamp()).collect();
  assert_eq!(stamps, vec![300, 200, 100]);
}

// ─── Locations & countries ───────────────────────────────────────────────────

#[tokio::test]
async fn add_and_find_country() {
  let s = store().await;
  let us = s.add_country("US", "United States").await.unwrap();

  let found = s.find_country_by_code("US").await.unwrap().expect("country");
  assert_eq!(found.id, us.id);
  assert_eq!(found.name, "United States");

  assert!(s.find_country_by_code("ZZ").await.unwrap().is_none());
}

#[tokio::test]
async fn list_countries_sorted_by_name() {
  let s = store().await;
  s.add_country("US", "United States").await.unwrap();
  s.add_country("AR", "Argentina").await.unwrap();
  s.add_country("JP", "Japan").await.unwrap();

  let names: Vec<_> = s
    .list_countries()
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.name)
    .collect();
  assert_eq!(names, vec!["Argentina", "Japan", "United States"]);
}

#[tokio::test]
async fn create_location_with_and_without_reading() {
  let s = store().await;
  let us = s.add_country("US", "United States").await.unwrap();
  let reading = seed_reading(&s, "Austin", "US", 1_700_000_000, 30.27, -97.74).await;

  let bare = s.create_location("Dallas", &us, None).await.unwrap();
  assert!(bare.last_reading.is_none());

  let seeded = s
    .create_location("Austin", &us, Some(&reading))
    .await
    .unwrap();
  assert_eq!(seeded.last_reading.as_ref().map(|r| r.id), Some(reading.id));

  let all = s.all_locations().await.unwrap();
  assert_eq!(all.len(), 2);
  // Stable id order.
  assert_eq!(all[0].id, bare.id);
  assert_eq!(all[1].id, seeded.id);
}

#[tokio::test]
async fn find_location_city_match_is_case_insensitive() {
  let s = store().await;
  let us = s.add_country("US", "United States").await.unwrap();
  let created = s.create_location("Austin", &us, None).await.unwrap();

  let found = s
    .find_location_by_city_country("austin", "US")
    .await
    .unwrap();
  assert_eq!(found.map(|l| l.id), Some(created.id));

  // Country code stays exact.
  assert!(
    s.find_location_by_city_country("Austin", "us")
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn update_last_reading_moves_the_pointer() {
  let s = store().await;
  let us = s.add_country("US", "United States").await.unwrap();
  let location = s.create_location("Austin", &us, None).await.unwrap();
  let reading = seed_reading(&s, "Austin", "US", 1_700_000_000, 30.27, -97.74).await;

  s.update_last_reading(location.id, reading.id).await.unwrap();

  let all = s.all_locations().await.unwrap();
  assert_eq!(
    all[0].last_reading.as_ref().map(|r| r.id),
    Some(reading.id)
  );
}

#[tokio::test]
async fn update_last_reading_missing_location_errors() {
  let s = store().await;
  let reading = seed_reading(&s, "Austin", "US", 1_700_000_000, 30.27, -97.74).await;

  let err = s.update_last_reading(999, reading.id).await.unwrap_err();
  assert!(matches!(err, crate::Error::LocationNotFound(999)));
}
