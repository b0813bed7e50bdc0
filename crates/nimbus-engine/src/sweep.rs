//! The location update sweep: refresh every tracked location's last-known
//! reading against one caller-supplied reference timestamp.

use nimbus_core::{
  provider::WeatherProvider,
  store::{LocationStore, ReadingStore},
  Location,
};

use crate::{resolve::caller_timestamp, Engine, Result};

impl<S, P> Engine<S, P>
where
  S: ReadingStore + LocationStore,
  P: WeatherProvider,
{
  /// Refresh `last_reading` for every tracked location.
  ///
  /// Locations are processed sequentially in stable (id) order. Each changed
  /// pointer is written immediately, not batched, which makes the sweep
  /// resumable: a re-run only re-touches locations not yet on the latest
  /// reading, and resolving the same reading twice is a no-op.
  ///
  /// A provider or store error terminates the remainder of the sweep.
  /// Already-updated locations keep their new pointer; partial completion is
  /// the accepted failure mode.
  ///
  /// Returns all locations post-sweep, sorted by city name ascending.
  pub async fn sweep_update_weather(&self, timestamp: i64) -> Result<Vec<Location>> {
    let sweep_ts = caller_timestamp(timestamp)?;

    let locations = self
      .store
      .all_locations()
      .await
      .map_err(crate::EngineError::store)?;
    tracing::info!(count = locations.len(), %sweep_ts, "starting weather sweep");

    for location in &locations {
      let resolution = self.resolve_for_location(location, sweep_ts).await?;

      if resolution.changed {
        self
          .store
          .update_last_reading(location.id, resolution.reading.id)
          .await
          .map_err(crate::EngineError::store)?;
        tracing::info!(
          city = %location.city,
          reading_id = resolution.reading.id,
          "last reading updated"
        );
      }
    }

    let mut refreshed = self
      .store
      .all_locations()
      .await
      .map_err(crate::EngineError::store)?;
    refreshed.sort_by(|a, b| a.city.cmp(&b.city));
    Ok(refreshed)
  }
}
