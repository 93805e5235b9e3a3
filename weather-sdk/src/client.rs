use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use reqwest::Client;
use tokio::{
    runtime::{Handle, Runtime},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::{
    ApiKey, Coordinate, ProviderUnits, WeatherDataListener, WeatherResponse, coordinate,
    data_source::{OpenWeatherDataSource, WeatherDataSource, openweather::DEFAULT_BASE_URL},
    error::{Result, WeatherError},
    units,
};

static GLOBAL: OnceLock<WeatherClient> = OnceLock::new();
static GLOBAL_RUNTIME: OnceLock<Runtime> = OnceLock::new();
static GLOBAL_INIT: Mutex<()> = Mutex::new(());

const USER_AGENT: &str = concat!("weather-sdk/", env!("CARGO_PKG_VERSION"));

/// Entry point of the SDK.
///
/// A client is owned by the caller and is cheap to clone. It keeps no
/// per-request state: every call carries its own listener, so concurrent
/// requests cannot receive each other's results.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    api_key: ApiKey,
    source: Arc<dyn WeatherDataSource>,
    runtime: Handle,
}

impl WeatherClient {
    /// Client for the public OpenWeather endpoint on the current tokio runtime.
    pub fn new(api_key: impl Into<ApiKey>) -> Result<Self> {
        Self::builder(api_key).build()
    }

    pub fn builder(api_key: impl Into<ApiKey>) -> ClientBuilder {
        ClientBuilder::new(api_key.into())
    }

    /// Process-wide client, created by the first call.
    ///
    /// Known limitation: the key passed on the first call wins for the rest of
    /// the process; later keys are ignored. Prefer owning a client built with
    /// [`WeatherClient::new`]. See [`ClientBuilder::build_global`].
    pub fn global(api_key: impl Into<ApiKey>) -> Result<&'static WeatherClient> {
        Self::builder(api_key).build_global()
    }

    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Fetch current weather and report the outcome to `listener`.
    ///
    /// Returns as soon as the request is dispatched. Exactly one listener
    /// method is invoked, normally on the client's runtime. A zero latitude or
    /// longitude is reported as [`WeatherError::InvalidCoordinate`] without
    /// touching the network. If the task is dropped first (aborted, or the
    /// runtime is gone) the listener gets [`WeatherError::Cancelled`] from
    /// whichever thread drops it.
    pub fn get_current_weather<L>(
        &self,
        latitude: f64,
        longitude: f64,
        unit: impl Into<ProviderUnits>,
        listener: L,
    ) -> JoinHandle<()>
    where
        L: WeatherDataListener,
    {
        let units = unit.into();
        debug!(latitude, longitude, api_key = %self.api_key, %units, "dispatching current weather request");

        let client = self.clone();
        let delivery = Delivery::new(listener);
        self.runtime.spawn(async move {
            let result = client.current_weather(latitude, longitude, units).await;
            if let Err(err) = &result {
                warn!(latitude, longitude, error = %err, "current weather request failed");
            }
            delivery.finish(result);
        })
    }

    /// Same as [`WeatherClient::get_current_weather`], as a future.
    pub async fn current_weather(
        &self,
        latitude: f64,
        longitude: f64,
        unit: impl Into<ProviderUnits>,
    ) -> Result<WeatherResponse> {
        let units = unit.into();
        let coordinate = Coordinate::new(latitude, longitude)?;

        self.source
            .fetch_current_weather(coordinate, units, &self.api_key)
            .await
    }

    pub fn validate_lat_lng(&self, latitude: f64, longitude: f64) -> bool {
        coordinate::validate_lat_lng(latitude, longitude)
    }

    /// See [`units::celsius_to_fahrenheit`] for the naming caveat.
    pub fn celsius_to_fahrenheit(&self, value: f64) -> f64 {
        units::celsius_to_fahrenheit(value)
    }

    /// See [`units::fahrenheit_to_celsius`] for the naming caveat.
    pub fn fahrenheit_to_celsius(&self, value: f64) -> f64 {
        units::fahrenheit_to_celsius(value)
    }
}

/// Configures a [`WeatherClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    api_key: ApiKey,
    base_url: String,
    user_agent: String,
    runtime: Option<Handle>,
    source: Option<Arc<dyn WeatherDataSource>>,
}

impl ClientBuilder {
    fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            runtime: None,
            source: None,
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Runtime that runs requests and listener callbacks. Defaults to the
    /// runtime `build` is called from.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Replace the HTTP data source. `base_url` and `user_agent` are then unused.
    pub fn data_source(mut self, source: Arc<dyn WeatherDataSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn build(mut self) -> Result<WeatherClient> {
        let runtime = match self.runtime.take() {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| WeatherError::NoRuntime)?,
        };
        let source = self.data_source_or_default()?;

        Ok(WeatherClient {
            api_key: self.api_key,
            source,
            runtime,
        })
    }

    /// Install this configuration as the process-wide client, unless one
    /// already exists, in which case the existing client is returned as is.
    ///
    /// The global client runs on a runtime owned by the SDK for the rest of
    /// the process, so it keeps working after the caller's runtime shuts
    /// down. A handle given to [`ClientBuilder::runtime`] is ignored.
    pub fn build_global(mut self) -> Result<&'static WeatherClient> {
        if let Some(existing) = GLOBAL.get() {
            self.note_ignored(existing);
            return Ok(existing);
        }

        let _init = GLOBAL_INIT.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = GLOBAL.get() {
            self.note_ignored(existing);
            return Ok(existing);
        }

        // Nothing may fail once the runtime exists: it is never dropped.
        let source = self.data_source_or_default()?;
        let runtime = match GLOBAL_RUNTIME.get() {
            Some(runtime) => runtime,
            None => {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .thread_name("weather-sdk-global")
                    .build()
                    .map_err(WeatherError::Runtime)?;
                GLOBAL_RUNTIME.get_or_init(|| runtime)
            }
        };

        let client = WeatherClient {
            api_key: self.api_key,
            source,
            runtime: runtime.handle().clone(),
        };
        Ok(GLOBAL.get_or_init(|| client))
    }

    fn data_source_or_default(&mut self) -> Result<Arc<dyn WeatherDataSource>> {
        if let Some(source) = self.source.take() {
            return Ok(source);
        }

        let http = Client::builder().user_agent(self.user_agent.as_str()).build()?;
        Ok(Arc::new(OpenWeatherDataSource::with_base_url(http, self.base_url.as_str())))
    }

    fn note_ignored(&self, existing: &WeatherClient) {
        if existing.api_key != self.api_key {
            debug!(kept = %existing.api_key, ignored = %self.api_key, "global client already initialised");
        }
    }
}

/// Hands one outcome to a listener. Dropped undelivered, it reports
/// [`WeatherError::Cancelled`].
struct Delivery<L: WeatherDataListener> {
    listener: Option<L>,
}

impl<L: WeatherDataListener> Delivery<L> {
    fn new(listener: L) -> Self {
        Self { listener: Some(listener) }
    }

    fn finish(mut self, result: Result<WeatherResponse>) {
        if let Some(listener) = self.listener.take() {
            match result {
                Ok(response) => listener.on_weather_response(response),
                Err(err) => listener.on_error_fetching_data(err),
            }
        }
    }
}

impl<L: WeatherDataListener> Drop for Delivery<L> {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            warn!("current weather request dropped before completing");
            listener.on_error_fetching_data(WeatherError::Cancelled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener_fn;
    use async_trait::async_trait;
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            mpsc,
        },
        time::Duration,
    };
    use tokio::sync::oneshot;

    #[derive(Debug, Default)]
    struct StubSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WeatherDataSource for StubSource {
        async fn fetch_current_weather(
            &self,
            coordinate: Coordinate,
            units: ProviderUnits,
            api_key: &ApiKey,
        ) -> Result<WeatherResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let body = format!(
                r#"{{"weather": [{{"id": 800, "main": "Clear", "description": "{units} {}", "icon": "01d"}}],
                    "coord": {{"lat": {}, "lon": {}}}}}"#,
                api_key.expose(),
                coordinate.latitude(),
                coordinate.longitude(),
            );
            Ok(serde_json::from_str(&body)?)
        }
    }

    /// Never answers.
    #[derive(Debug)]
    struct HangingSource;

    #[async_trait]
    impl WeatherDataSource for HangingSource {
        async fn fetch_current_weather(
            &self,
            _coordinate: Coordinate,
            _units: ProviderUnits,
            _api_key: &ApiKey,
        ) -> Result<WeatherResponse> {
            std::future::pending().await
        }
    }

    fn stub_client(source: Arc<StubSource>) -> WeatherClient {
        WeatherClient::builder("KEY")
            .data_source(source)
            .build()
            .expect("client should build inside a runtime")
    }

    #[test]
    fn build_outside_runtime_fails() {
        let err = WeatherClient::new("KEY").unwrap_err();
        assert!(matches!(err, WeatherError::NoRuntime));
    }

    #[test]
    fn build_with_explicit_runtime_handle() {
        let rt = tokio::runtime::Runtime::new().expect("runtime");
        let client = WeatherClient::builder("KEY").runtime(rt.handle().clone()).build();
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn current_weather_passes_units_and_key_to_source() {
        let source = Arc::new(StubSource::default());
        let client = stub_client(source.clone());

        let resp = client
            .current_weather(27.34345, 77.343543, units::TemperatureUnit::Celsius)
            .await
            .expect("stub should succeed");

        assert_eq!(resp.summary(), Some("metric KEY"));
        assert_eq!(resp.coord.map(|c| c.lat), Some(27.34345));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalid_coordinate_never_reaches_source() {
        let source = Arc::new(StubSource::default());
        let client = stub_client(source.clone());

        let err = client
            .current_weather(0.0, 77.3, units::TemperatureUnit::Fahrenheit)
            .await
            .unwrap_err();

        assert!(err.is_invalid_input());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn listener_gets_success_exactly_once() {
        let source = Arc::new(StubSource::default());
        let client = stub_client(source);
        let successes = Arc::new(AtomicUsize::new(0));
        let errors = Arc::new(AtomicUsize::new(0));

        let (s, e) = (successes.clone(), errors.clone());
        client
            .get_current_weather(
                22.11,
                44.12,
                units::TemperatureUnit::Fahrenheit,
                listener_fn(
                    move |_| {
                        s.fetch_add(1, Ordering::SeqCst);
                    },
                    move |_| {
                        e.fetch_add(1, Ordering::SeqCst);
                    },
                ),
            )
            .await
            .expect("task should not panic");

        assert_eq!(successes.load(Ordering::SeqCst), 1);
        assert_eq!(errors.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn concurrent_calls_keep_their_own_listeners() {
        let client = stub_client(Arc::new(StubSource::default()));

        let (tx_c, rx_c) = oneshot::channel::<Result<WeatherResponse>>();
        let (tx_f, rx_f) = oneshot::channel::<Result<WeatherResponse>>();
        client.get_current_weather(10.0, 20.0, units::TemperatureUnit::Celsius, tx_c);
        client.get_current_weather(30.0, 40.0, units::TemperatureUnit::Fahrenheit, tx_f);

        let celsius = rx_c.await.expect("delivered").expect("success");
        let fahrenheit = rx_f.await.expect("delivered").expect("success");

        assert_eq!(celsius.summary(), Some("metric KEY"));
        assert_eq!(fahrenheit.summary(), Some("imperial KEY"));
        assert_eq!(fahrenheit.coord.map(|c| c.lat), Some(30.0));
    }

    #[test]
    fn listener_hears_about_requests_on_a_stopped_runtime() {
        let rt = tokio::runtime::Runtime::new().expect("runtime");
        let client = WeatherClient::builder("KEY")
            .runtime(rt.handle().clone())
            .data_source(Arc::new(StubSource::default()))
            .build()
            .expect("client");
        drop(rt);

        let (tx, rx) = mpsc::channel();
        let err_tx = tx.clone();
        client.get_current_weather(
            0.0,
            1.0,
            units::TemperatureUnit::Celsius,
            listener_fn(
                move |_| {
                    let _ = tx.send("success");
                },
                move |err| {
                    let kind = if matches!(err, WeatherError::Cancelled) { "cancelled" } else { "other" };
                    let _ = err_tx.send(kind);
                },
            ),
        );

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok("cancelled"));
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[tokio::test]
    async fn aborted_request_reports_cancellation() {
        let client = WeatherClient::builder("KEY")
            .data_source(Arc::new(HangingSource))
            .build()
            .expect("client");

        let (tx, rx) = oneshot::channel::<Result<WeatherResponse>>();
        let handle = client.get_current_weather(22.11, 44.12, units::TemperatureUnit::Celsius, tx);
        handle.abort();

        let delivered = rx.await.expect("listener should fire");
        assert!(matches!(delivered, Err(WeatherError::Cancelled)));
        assert!(handle.await.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn client_exposes_pure_helpers() {
        let client = stub_client(Arc::new(StubSource::default()));

        assert!(client.validate_lat_lng(22.11, 44.12));
        assert!(!client.validate_lat_lng(0.0, 44.12));
        assert!((client.celsius_to_fahrenheit(10.1) - (-12.16666)).abs() < 0.001);
        assert!((client.fahrenheit_to_celsius(11.2) - 52.16).abs() < 0.001);
    }
}
