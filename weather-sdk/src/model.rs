use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Current weather as returned by the provider.
///
/// Only `weather` is required; the rest of the provider's schema is optional
/// and anything not modelled here is kept in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub weather: Vec<Weather>,
    #[serde(default)]
    pub coord: Option<Coord>,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub main: Option<MainReadings>,
    #[serde(default)]
    pub visibility: Option<u32>,
    #[serde(default)]
    pub wind: Option<Wind>,
    #[serde(default)]
    pub clouds: Option<Clouds>,
    /// Observation time, unix seconds.
    #[serde(default)]
    pub dt: Option<i64>,
    #[serde(default)]
    pub sys: Option<Sys>,
    /// Shift from UTC in seconds.
    #[serde(default)]
    pub timezone: Option<i32>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cod: Option<i32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WeatherResponse {
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.dt.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
    }

    /// Description of the primary condition, e.g. "light rain".
    pub fn summary(&self) -> Option<&str> {
        self.weather.first().map(|w| w.description.as_str())
    }

    pub fn temperature(&self) -> Option<f64> {
        self.main.as_ref().map(|m| m.temp)
    }
}

/// One weather condition entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub description: String,
    pub icon: String,
    pub id: i32,
    pub main: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

/// Temperatures are in whatever unit the request asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub temp_min: Option<f64>,
    #[serde(default)]
    pub temp_max: Option<f64>,
    #[serde(default)]
    pub pressure: Option<u32>,
    #[serde(default)]
    pub humidity: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    #[serde(default)]
    pub deg: Option<u16>,
    #[serde(default)]
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clouds {
    pub all: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sys {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sunrise: Option<i64>,
    #[serde(default)]
    pub sunset: Option<i64>,
}
