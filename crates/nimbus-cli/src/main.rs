//! nimbus command-line interface.
//!
//! Reads `nimbus.toml` (or the path given with `--config`), opens the SQLite
//! store, and drives the reconciliation engine: tracking locations, running
//! the update sweep, and serving one-off current/forecast queries.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use nimbus_core::{
  store::{CountryDirectory as _, LocationStore as _, ReadingStore as _},
  Location, Reading,
};
use nimbus_engine::Engine;
use nimbus_provider::{OpenWeatherClient, ProviderConfig};
use nimbus_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Nimbus weather reading store")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "nimbus.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Manage country reference data.
  Country {
    #[command(subcommand)]
    command: CountryCommand,
  },
  /// Manage tracked locations.
  Location {
    #[command(subcommand)]
    command: LocationCommand,
  },
  /// List stored readings, newest first.
  Readings,
  /// Refresh every tracked location's last reading.
  Sweep {
    /// Reference timestamp, epoch seconds.
    #[arg(long)]
    dt: i64,
  },
  /// Resolve current weather for a coordinate.
  Current {
    #[arg(long)]
    lat: f64,
    #[arg(long)]
    lon: f64,
    /// Reference timestamp, epoch seconds.
    #[arg(long)]
    dt: i64,
  },
  /// Five-day forecast for a coordinate.
  Forecast {
    #[arg(long)]
    lat: f64,
    #[arg(long)]
    lon: f64,
  },
}

#[derive(Subcommand)]
enum CountryCommand {
  /// Add a country to the directory.
  Add { code: String, name: String },
  /// List all known countries.
  List,
}

#[derive(Subcommand)]
enum LocationCommand {
  /// Track a new location. Fetches current weather unless told otherwise.
  Add {
    city:         String,
    country_code: String,
    /// Bind an existing reading instead of fetching.
    #[arg(long, conflicts_with = "skip_fetch")]
    reading_id: Option<i64>,
    /// Create the location with no initial reading.
    #[arg(long)]
    skip_fetch: bool,
  },
  /// List tracked locations with their last known reading.
  List,
}

/// Settings read from the config file and `NIMBUS_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
struct Settings {
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
  api_key:           Option<String>,
  place_endpoint:    Option<String>,
  coord_endpoint:    Option<String>,
  forecast_endpoint: Option<String>,
}

fn default_store_path() -> PathBuf { PathBuf::from("nimbus.db") }

impl Settings {
  fn provider_config(&self) -> anyhow::Result<ProviderConfig> {
    let api_key = self.api_key.clone().context(
      "no API key configured; set `api_key` in nimbus.toml or NIMBUS_API_KEY",
    )?;
    let mut cfg = ProviderConfig::with_api_key(api_key);
    if let Some(t) = &self.place_endpoint {
      cfg.place_endpoint = t.clone();
    }
    if let Some(t) = &self.coord_endpoint {
      cfg.coord_endpoint = t.clone();
    }
    if let Some(t) = &self.forecast_endpoint {
      cfg.forecast_endpoint = t.clone();
    }
    Ok(cfg)
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings: Settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("NIMBUS"))
    .build()
    .context("failed to read configuration")?
    .try_deserialize()
    .context("failed to deserialise settings")?;

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;

  let engine = || -> anyhow::Result<Engine<SqliteStore, OpenWeatherClient>> {
    Ok(Engine::new(
      store.clone(),
      OpenWeatherClient::new(settings.provider_config()?),
    ))
  };

  match cli.command {
    Command::Country { command } => match command {
      CountryCommand::Add { code, name } => {
        let country = store.add_country(&code, &name).await?;
        println!("added {} ({})", country.name, country.code);
      }
      CountryCommand::List => {
        for country in store.list_countries().await? {
          println!("{}  {}", country.code, country.name);
        }
      }
    },

    Command::Location { command } => match command {
      LocationCommand::Add {
        city,
        country_code,
        reading_id,
        skip_fetch,
      } => {
        let engine = engine()?;
        let location = if skip_fetch || reading_id.is_some() {
          engine.create_location(&city, &country_code, reading_id).await?
        } else {
          engine
            .create_location_with_current_weather(&city, &country_code)
            .await?
        };
        print_location(&location);
      }
      LocationCommand::List => {
        for location in store.all_locations().await? {
          print_location(&location);
        }
      }
    },

    Command::Readings => {
      for reading in store.list_readings().await? {
        print_reading(&reading);
      }
    }

    Command::Sweep { dt } => {
      let locations = engine()?.sweep_update_weather(dt).await?;
      for location in &locations {
        print_location(location);
      }
    }

    Command::Current { lat, lon, dt } => {
      let reading = engine()?.resolve_current_weather(lat, lon, dt).await?;
      print_reading(&reading);
    }

    Command::Forecast { lat, lon } => {
      for day in engine()?.resolve_forecast(lat, lon).await? {
        println!(
          "{}  {:>6.1}°C  {}",
          day.timestamp.format("%Y-%m-%d"),
          day.temperature,
          day.condition.as_deref().unwrap_or("-"),
        );
      }
    }
  }

  Ok(())
}

fn print_reading(reading: &Reading) {
  let temperature = reading
    .temperature()
    .map(|t| format!("{t:.1}°C"))
    .unwrap_or_else(|| "-".to_owned());
  println!(
    "#{}  {}  ({:.2}, {:.2})  {}  {}",
    reading.id,
    reading.recorded_at.format("%Y-%m-%d %H:%M UTC"),
    reading.coordinates.lat,
    reading.coordinates.lon,
    temperature,
    reading.condition().as_deref().unwrap_or("-"),
  );
}

fn print_location(location: &Location) {
  match &location.last_reading {
    Some(reading) => {
      let temperature = reading
        .temperature()
        .map(|t| format!("{t:.1}°C"))
        .unwrap_or_else(|| "-".to_owned());
      println!(
        "{}, {} ({})  {}  {}",
        location.city,
        location.country.name,
        location.country.code,
        temperature,
        reading.condition().as_deref().unwrap_or("-"),
      );
    }
    None => println!(
      "{}, {} ({})  no reading yet",
      location.city, location.country.name, location.country.code,
    ),
  }
}
