//! Core types and trait definitions for the Nimbus weather store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod forecast;
pub mod location;
pub mod payload;
pub mod provider;
pub mod reading;
pub mod store;

pub use error::{Error, Result};
pub use forecast::DailySummary;
pub use location::{Country, CountryId, Location, LocationId};
pub use payload::{Coordinates, ProviderPayload};
pub use reading::{Reading, ReadingId};
