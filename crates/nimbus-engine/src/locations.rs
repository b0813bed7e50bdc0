//! Location creation: validation against the country directory and the
//! tracked-location uniqueness discipline.

use nimbus_core::{
  provider::WeatherProvider,
  store::{CountryDirectory, LocationStore, ReadingStore},
  Country, Location, ReadingId,
};

use crate::{Engine, EngineError, Result};

impl<S, P> Engine<S, P>
where
  S: ReadingStore + LocationStore + CountryDirectory,
  P: WeatherProvider,
{
  /// Track a new location, optionally bound to an existing reading.
  ///
  /// Fails with `InvalidCountryCode` if the directory does not know the
  /// code, `DuplicateLocation` if a location with the same city (compared
  /// case-insensitively) and country already exists, and `ReadingNotFound`
  /// for a dangling reading id. Nothing is written on any error path.
  pub async fn create_location(
    &self,
    city: &str,
    country_code: &str,
    reading_id: Option<ReadingId>,
  ) -> Result<Location> {
    let country = self.validated_country(city, country_code).await?;

    let reading = match reading_id {
      Some(id) => Some(
        self
          .store
          .get_reading(id)
          .await
          .map_err(EngineError::store)?
          .ok_or(EngineError::ReadingNotFound(id))?,
      ),
      None => None,
    };

    self
      .store
      .create_location(city, &country, reading.as_ref())
      .await
      .map_err(EngineError::store)
  }

  /// Track a new location and immediately fetch its current weather by
  /// place, binding the resolved reading as the initial `last_reading`.
  ///
  /// A failure payload from the provider surfaces its message and creates
  /// nothing.
  pub async fn create_location_with_current_weather(
    &self,
    city: &str,
    country_code: &str,
  ) -> Result<Location> {
    let country = self.validated_country(city, country_code).await?;

    let payload = self
      .provider
      .fetch_by_place(city, country_code)
      .await
      .map_err(EngineError::provider)?;
    let reading = self.resolve_fetched_by_identity(payload).await?;

    self
      .store
      .create_location(city, &country, Some(&reading))
      .await
      .map_err(EngineError::store)
  }

  /// Country-code and duplicate checks shared by both creation paths.
  async fn validated_country(&self, city: &str, country_code: &str) -> Result<Country> {
    let country = self
      .store
      .find_country_by_code(country_code)
      .await
      .map_err(EngineError::store)?
      .ok_or_else(|| EngineError::InvalidCountryCode(country_code.to_owned()))?;

    if let Some(existing) = self
      .store
      .find_location_by_city_country(city, country_code)
      .await
      .map_err(EngineError::store)?
    {
      return Err(EngineError::DuplicateLocation {
        city:    existing.city,
        country: existing.country.name,
        code:    existing.country.code,
      });
    }

    Ok(country)
  }
}
