use tokio::sync::oneshot;

use crate::{WeatherError, WeatherResponse};

/// Receives the outcome of one [`crate::WeatherClient::get_current_weather`] call.
///
/// Both methods take `self`, so a listener is consumed by the first (and only)
/// delivery.
pub trait WeatherDataListener: Send + 'static {
    fn on_weather_response(self, response: WeatherResponse);

    fn on_error_fetching_data(self, error: WeatherError);
}

/// Listener built from two closures, see [`listener_fn`].
pub struct FnListener<S, E> {
    on_success: S,
    on_error: E,
}

/// Adapt a pair of closures into a [`WeatherDataListener`].
pub fn listener_fn<S, E>(on_success: S, on_error: E) -> FnListener<S, E>
where
    S: FnOnce(WeatherResponse) + Send + 'static,
    E: FnOnce(WeatherError) + Send + 'static,
{
    FnListener { on_success, on_error }
}

impl<S, E> WeatherDataListener for FnListener<S, E>
where
    S: FnOnce(WeatherResponse) + Send + 'static,
    E: FnOnce(WeatherError) + Send + 'static,
{
    fn on_weather_response(self, response: WeatherResponse) {
        (self.on_success)(response)
    }

    fn on_error_fetching_data(self, error: WeatherError) {
        (self.on_error)(error)
    }
}

/// Forwards the outcome to whoever holds the receiver, so the result can be
/// consumed on a task or thread of the caller's choosing.
impl WeatherDataListener for oneshot::Sender<Result<WeatherResponse, WeatherError>> {
    fn on_weather_response(self, response: WeatherResponse) {
        // Receiver gone means nobody is waiting any more.
        let _ = self.send(Ok(response));
    }

    fn on_error_fetching_data(self, error: WeatherError) {
        let _ = self.send(Err(error));
    }
}
