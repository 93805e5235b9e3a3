//! Client library for the OpenWeather current weather API.
//!
//! This crate defines:
//! - A caller-owned [`WeatherClient`] that validates input and dispatches requests
//! - Listener and future based delivery of results
//! - Temperature unit helpers and coordinate validation
//! - The [`WeatherDataSource`] seam over the HTTP provider
//!
//! It is used by `weather-cli`, but is meant to be embedded by any application.

pub mod api_key;
pub mod client;
pub mod coordinate;
pub mod data_source;
pub mod error;
pub mod listener;
pub mod model;
pub mod units;

pub use api_key::ApiKey;
pub use client::{ClientBuilder, WeatherClient};
pub use coordinate::{Coordinate, validate_lat_lng};
pub use data_source::{OpenWeatherDataSource, WeatherDataSource};
pub use error::WeatherError;
pub use listener::{FnListener, WeatherDataListener, listener_fn};
pub use model::{Weather, WeatherResponse};
pub use units::{ProviderUnits, TemperatureUnit, celsius_to_fahrenheit, fahrenheit_to_celsius};
