//! Core library for the `skyview` weather lookup.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather provider (city search, 5-day forecast)
//! - Day-bucketing of 3-hourly forecasts and condition-code presentation
//! - The lookup session state machine and its async controller
//!
//! It is used by `skyview-cli`, but can also be reused by other front ends.

pub mod aggregate;
pub mod config;
pub mod controller;
pub mod country;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod presenter;
pub mod provider;
pub mod session;
pub mod summary;

pub use aggregate::{AggregateError, DailyForecast, DayBoundary, DayBucket};
pub use config::Config;
pub use controller::{Controller, ControllerOptions};
pub use error::{LookupError, LookupOrigin};
pub use geolocation::{ConfiguredLocator, GeolocationError, Geolocator};
pub use model::{CityCandidate, Coordinates, Forecast, ForecastSample, LocationLabel};
pub use presenter::{EffectVariant, PresentationDescriptor};
pub use provider::{WeatherProvider, provider_from_config, search_cities};
pub use session::{Session, Transition};
pub use summary::WeatherSummary;
