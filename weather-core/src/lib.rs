//! Core library for the weather dashboard.
//!
//! This crate defines the forecast acquisition pipeline:
//! - Geocoding a place name (or naming a geolocated position)
//! - Retrieving a forecast under a deadline
//! - Validating the payload against the required-field contract
//! - Synthesizing a placeholder forecast when any step fails
//! - Orchestrating lookups into a single observable session
//!
//! It is used by `weather-cli`, but any front end can drive an [`Orchestrator`]
//! and render its [`Session`].

pub mod config;
pub mod deadline;
pub mod error;
pub mod location;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod session;
pub mod synth;
pub mod validate;

pub use config::{Config, DefaultLocation, ProviderConfig};
pub use error::{LocationError, LookupError, ValidationError};
pub use location::{FixedLocator, Locator};
pub use model::{
    Coordinates, DailySeries, ForecastPayload, HourlySeries, LookupSource, Position,
    WeatherCategory,
};
pub use orchestrator::{LookupOutcome, Orchestrator, OrchestratorOptions};
pub use provider::{ForecastSource, Geocoder, ProviderId};
pub use session::{MapMarker, Session, Status};
pub use validate::{RawForecast, validate};
