//! The reading reconciliation engine.
//!
//! Given a freshly fetched provider payload, the engine decides whether it
//! duplicates a stored reading — by timestamp + city/country identity, or by
//! timestamp + spatial proximity — and whether a tracked location's
//! last-known-reading pointer has to move. Everything is generic over the
//! store and provider trait contracts in `nimbus-core`; no HTTP or database
//! code lives here.

pub mod error;
mod forecast;
mod locations;
mod resolve;
mod sweep;

pub use error::{EngineError, Result};
pub use resolve::DEDUP_RADIUS_DEGREES;

/// The engine: one store (readings + locations + countries) and one upstream
/// weather provider.
///
/// Each operation is request-scoped and independent; the store closes the
/// concurrent create race at its own boundary, so no in-process locking is
/// needed here.
pub struct Engine<S, P> {
  store:    S,
  provider: P,
}

impl<S, P> Engine<S, P> {
  pub fn new(store: S, provider: P) -> Self { Self { store, provider } }
}
