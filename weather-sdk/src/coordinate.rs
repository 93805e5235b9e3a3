use crate::error::{Result, WeatherError};

/// A latitude/longitude pair in degrees that passed [`validate_lat_lng`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !validate_lat_lng(latitude, longitude) {
            return Err(WeatherError::InvalidCoordinate { latitude, longitude });
        }

        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Returns `false` if either component is exactly zero.
///
/// Zero is treated as "not set" even though `(0, 0)` is a real place.
/// Ranges are not checked, so `(123.0, -500.0)` passes.
pub fn validate_lat_lng(latitude: f64, longitude: f64) -> bool {
    !(latitude == 0.0 || longitude == 0.0)
}
