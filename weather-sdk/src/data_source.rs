use crate::{ApiKey, Coordinate, ProviderUnits, WeatherResponse, error::Result};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::OpenWeatherDataSource;

/// One round trip to the weather provider.
///
/// Implementations perform a single request with no retries and surface every
/// transport or decoding failure as a [`crate::WeatherError`].
#[async_trait]
pub trait WeatherDataSource: Send + Sync + Debug {
    async fn fetch_current_weather(
        &self,
        coordinate: Coordinate,
        units: ProviderUnits,
        api_key: &ApiKey,
    ) -> Result<WeatherResponse>;
}
