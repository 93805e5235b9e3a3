use thiserror::Error;

/// Every way a weather request can fail.
///
/// All failures that happen after a request is dispatched are delivered through
/// the listener's error branch (or the `Err` side of the future); nothing is
/// raised across the task boundary.
#[derive(Error, Debug)]
pub enum WeatherError {
    /// Latitude or longitude was exactly zero, which is treated as "unset".
    #[error("Invalid coordinate ({latitude}, {longitude}): latitude and longitude must be non-zero")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// The request could not be sent or the body could not be read.
    #[error("Failed to reach the weather provider: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Weather provider request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The provider's body was not a valid weather payload.
    #[error("Failed to parse weather provider JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The client was built outside a tokio runtime and no handle was supplied.
    #[error("No tokio runtime available; build the client inside a runtime or pass a handle")]
    NoRuntime,

    /// The runtime backing the process-wide client could not be started.
    #[error("Failed to start the weather runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// The request task was dropped before it finished, e.g. it was aborted
    /// or its runtime shut down.
    #[error("Weather request was cancelled before completing")]
    Cancelled,
}

impl WeatherError {
    /// True when the caller's input was rejected before any network activity.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, WeatherError::InvalidCoordinate { .. })
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
