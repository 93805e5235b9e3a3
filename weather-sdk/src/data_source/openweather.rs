use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, trace};

use crate::{
    ApiKey, Coordinate, ProviderUnits, WeatherResponse,
    error::{Result, WeatherError},
};

use super::WeatherDataSource;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// OpenWeather "current weather" endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherDataSource {
    http: Client,
    base_url: String,
}

impl OpenWeatherDataSource {
    pub fn new(http: Client) -> Self {
        Self::with_base_url(http, DEFAULT_BASE_URL)
    }

    /// Point at a different endpoint, e.g. a local mock server.
    pub fn with_base_url(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl WeatherDataSource for OpenWeatherDataSource {
    async fn fetch_current_weather(
        &self,
        coordinate: Coordinate,
        units: ProviderUnits,
        api_key: &ApiKey,
    ) -> Result<WeatherResponse> {
        let lat = coordinate.latitude().to_string();
        let lon = coordinate.longitude().to_string();

        debug!(%lat, %lon, %units, url = %self.base_url, "requesting current weather");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("units", units.as_str()),
                ("appid", api_key.expose()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        trace!(bytes = body.len(), "decoding current weather");
        let parsed: WeatherResponse = serde_json::from_str(&body)?;

        Ok(parsed)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
