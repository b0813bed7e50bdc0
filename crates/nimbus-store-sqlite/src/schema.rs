//! SQL schema for the Nimbus SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS countries (
    country_id  INTEGER PRIMARY KEY,
    code        TEXT NOT NULL UNIQUE,  -- ISO 3166-1 alpha-2
    name        TEXT NOT NULL
);

-- Readings are append-only.
-- No UPDATE or DELETE is ever issued against this table.
-- country_code/city_name are denormalised from the payload so the identity
-- uniqueness constraint can close the concurrent query-then-create race;
-- NULL identity columns (payload without sys.country/name) never conflict.
CREATE TABLE IF NOT EXISTS readings (
    reading_id   INTEGER PRIMARY KEY,
    raw_json     TEXT NOT NULL,   -- provider payload, stored opaquely
    recorded_at  TEXT NOT NULL,   -- RFC 3339 UTC; the provider's 'dt'
    lat          REAL NOT NULL,
    lon          REAL NOT NULL,
    country_code TEXT,
    city_name    TEXT,
    UNIQUE (recorded_at, country_code, city_name)
);

CREATE TABLE IF NOT EXISTS locations (
    location_id     INTEGER PRIMARY KEY,
    city            TEXT NOT NULL,
    country_id      INTEGER NOT NULL REFERENCES countries(country_id),
    last_reading_id INTEGER REFERENCES readings(reading_id)
);

CREATE INDEX IF NOT EXISTS readings_recorded_idx ON readings(recorded_at);
CREATE INDEX IF NOT EXISTS locations_city_idx    ON locations(city);

PRAGMA user_version = 1;
";
