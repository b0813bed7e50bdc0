//! [`SqliteStore`] — the SQLite implementation of the store traits.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use nimbus_core::{
  location::{Country, Location, LocationId},
  payload::{Coordinates, ProviderPayload},
  reading::{Reading, ReadingId},
  store::{CountryDirectory, LocationStore, ReadingStore},
};

use crate::{
  encode::{encode_dt, RawCountry, RawLocation, RawReading},
  schema::SCHEMA,
  Error, Result,
};

const READING_BY_ID: &str =
  "SELECT reading_id, raw_json, recorded_at, lat, lon
   FROM readings WHERE reading_id = ?1";

const LOCATION_SELECT: &str =
  "SELECT l.location_id, l.city,
          c.country_id, c.code, c.name,
          r.reading_id, r.raw_json, r.recorded_at, r.lat, r.lon
   FROM locations l
   JOIN countries c ON c.country_id = l.country_id
   LEFT JOIN readings r ON r.reading_id = l.last_reading_id";

fn reading_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawReading> {
  Ok(RawReading {
    reading_id:  row.get(0)?,
    raw_json:    row.get(1)?,
    recorded_at: row.get(2)?,
    lat:         row.get(3)?,
    lon:         row.get(4)?,
  })
}

fn location_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawLocation> {
  Ok(RawLocation {
    location_id: row.get(0)?,
    city:        row.get(1)?,
    country:     RawCountry {
      country_id: row.get(2)?,
      code:       row.get(3)?,
      name:       row.get(4)?,
    },
    reading_id:  row.get(5)?,
    raw_json:    row.get(6)?,
    recorded_at: row.get(7)?,
    lat:         row.get(8)?,
    lon:         row.get(9)?,
  })
}

fn country_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCountry> {
  Ok(RawCountry {
    country_id: row.get(0)?,
    code:       row.get(1)?,
    name:       row.get(2)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Nimbus weather store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ReadingStore impl ───────────────────────────────────────────────────────

impl ReadingStore for SqliteStore {
  type Error = Error;

  async fn find_by_timestamp_and_identity(
    &self,
    ts: DateTime<Utc>,
    country_code: &str,
    city: &str,
  ) -> Result<Option<Reading>> {
    let at_str = encode_dt(ts);
    let country_code = country_code.to_owned();
    let city = city.to_owned();

    let raw: Option<RawReading> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT reading_id, raw_json, recorded_at, lat, lon
               FROM readings
               WHERE recorded_at = ?1 AND country_code = ?2 AND city_name = ?3
               ORDER BY reading_id ASC LIMIT 1",
              rusqlite::params![at_str, country_code, city],
              reading_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawReading::into_reading).transpose()
  }

  async fn find_by_timestamp_and_proximity(
    &self,
    ts: DateTime<Utc>,
    point: Coordinates,
    radius: f64,
  ) -> Result<Option<Reading>> {
    let at_str = encode_dt(ts);

    let raw: Option<RawReading> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              // Planar degree distance, as the source system's dwithin on a
              // geographic SRID compares.
              "SELECT reading_id, raw_json, recorded_at, lat, lon
               FROM readings
               WHERE recorded_at = ?1
                 AND (lat - ?2) * (lat - ?2) + (lon - ?3) * (lon - ?3)
                     <= ?4 * ?4
               ORDER BY reading_id ASC LIMIT 1",
              rusqlite::params![at_str, point.lat, point.lon, radius],
              reading_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawReading::into_reading).transpose()
  }

  async fn create_reading(
    &self,
    payload: ProviderPayload,
    ts: DateTime<Utc>,
    point: Coordinates,
  ) -> Result<Reading> {
    let raw_json = payload.raw().to_string();
    let at_str = encode_dt(ts);
    let country_code = payload.country_code().map(str::to_owned);
    let city_name = payload.city_name().map(str::to_owned);

    let raw: RawReading = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO readings
             (raw_json, recorded_at, lat, lon, country_code, city_name)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT (recorded_at, country_code, city_name) DO NOTHING",
          rusqlite::params![
            raw_json,
            at_str,
            point.lat,
            point.lon,
            country_code,
            city_name,
          ],
        )?;

        let id: i64 = if inserted == 0 {
          // Lost the race (or replayed the same observation): hand back the
          // row that got there first.
          conn.query_row(
            "SELECT reading_id FROM readings
             WHERE recorded_at = ?1 AND country_code IS ?2 AND city_name IS ?3
             ORDER BY reading_id ASC LIMIT 1",
            rusqlite::params![at_str, country_code, city_name],
            |r| r.get(0),
          )?
        } else {
          conn.last_insert_rowid()
        };

        Ok(conn.query_row(READING_BY_ID, rusqlite::params![id], reading_row)?)
      })
      .await?;

    tracing::debug!(reading_id = raw.reading_id, "stored reading resolved");
    raw.into_reading()
  }

  async fn get_reading(&self, id: ReadingId) -> Result<Option<Reading>> {
    let raw: Option<RawReading> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(READING_BY_ID, rusqlite::params![id], reading_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawReading::into_reading).transpose()
  }

  async fn list_readings(&self) -> Result<Vec<Reading>> {
    let raws: Vec<RawReading> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT reading_id, raw_json, recorded_at, lat, lon
           FROM readings
           ORDER BY recorded_at DESC, reading_id DESC",
        )?;
        let rows = stmt
          .query_map([], reading_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReading::into_reading).collect()
  }
}

// ─── LocationStore impl ──────────────────────────────────────────────────────

impl LocationStore for SqliteStore {
  type Error = Error;

  async fn all_locations(&self) -> Result<Vec<Location>> {
    let raws: Vec<RawLocation> = self
      .conn
      .call(|conn| {
        let sql = format!("{LOCATION_SELECT} ORDER BY l.location_id ASC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], location_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLocation::into_location).collect()
  }

  async fn find_location_by_city_country(
    &self,
    city: &str,
    country_code: &str,
  ) -> Result<Option<Location>> {
    let city = city.to_owned();
    let country_code = country_code.to_owned();

    let raw: Option<RawLocation> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "{LOCATION_SELECT}
           WHERE l.city = ?1 COLLATE NOCASE AND c.code = ?2
           ORDER BY l.location_id ASC LIMIT 1"
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![city, country_code], location_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLocation::into_location).transpose()
  }

  async fn create_location(
    &self,
    city: &str,
    country: &Country,
    reading: Option<&Reading>,
  ) -> Result<Location> {
    let city_owned = city.to_owned();
    let country_id = country.id;
    let reading_id = reading.map(|r| r.id);

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO locations (city, country_id, last_reading_id)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![city_owned, country_id, reading_id],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Location {
      id,
      city: city.to_owned(),
      country: country.clone(),
      last_reading: reading.cloned(),
    })
  }

  async fn update_last_reading(
    &self,
    location: LocationId,
    reading: ReadingId,
  ) -> Result<()> {
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE locations SET last_reading_id = ?2 WHERE location_id = ?1",
          rusqlite::params![location, reading],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::LocationNotFound(location));
    }
    tracing::debug!(location_id = location, reading_id = reading, "pointer moved");
    Ok(())
  }
}

// ─── CountryDirectory impl ───────────────────────────────────────────────────

impl CountryDirectory for SqliteStore {
  type Error = Error;

  async fn find_country_by_code(&self, code: &str) -> Result<Option<Country>> {
    let code = code.to_owned();

    let raw: Option<RawCountry> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT country_id, code, name FROM countries WHERE code = ?1",
              rusqlite::params![code],
              country_row,
            )
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(RawCountry::into_country))
  }

  async fn add_country(&self, code: &str, name: &str) -> Result<Country> {
    let code_owned = code.to_owned();
    let name_owned = name.to_owned();

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO countries (code, name) VALUES (?1, ?2)",
          rusqlite::params![code_owned, name_owned],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Country {
      id,
      code: code.to_owned(),
      name: name.to_owned(),
    })
  }

  async fn list_countries(&self) -> Result<Vec<Country>> {
    let raws: Vec<RawCountry> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT country_id, code, name FROM countries ORDER BY name ASC")?;
        let rows = stmt
          .query_map([], country_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawCountry::into_country).collect())
  }
}
