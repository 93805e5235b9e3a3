//! In-process stand-in for the weather provider.

#![allow(dead_code)]

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::mpsc,
    task::JoinHandle,
};
use weather_sdk::{WeatherDataListener, WeatherError, WeatherResponse};

pub const CURRENT_WEATHER_JSON: &str = r#"{
    "coord": {"lon": 77.3435, "lat": 27.3435},
    "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
    "base": "stations",
    "main": {"temp": 31.4, "feels_like": 30.2, "pressure": 1009, "humidity": 28},
    "wind": {"speed": 3.1, "deg": 290},
    "dt": 1700000000,
    "name": "Hathras",
    "cod": 200
}"#;

/// Serve a single HTTP response, then stop. The handle yields the request line
/// the client sent.
pub async fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock provider");
    let addr = listener.local_addr().expect("mock provider address");
    let response = format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.expect("read request");
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        socket.write_all(response.as_bytes()).await.expect("write response");
        let _ = socket.shutdown().await;

        String::from_utf8_lossy(&request)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    });

    (format!("http://{addr}/data/2.5/weather"), handle)
}

/// An address nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("address");
    drop(listener);
    format!("http://{addr}/data/2.5/weather")
}

#[derive(Debug)]
pub enum Outcome {
    Success(WeatherResponse),
    Failure(WeatherError),
}

/// Listener that records every delivery.
pub struct Recorder(mpsc::UnboundedSender<Outcome>);

impl Recorder {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Outcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(tx), rx)
    }
}

impl WeatherDataListener for Recorder {
    fn on_weather_response(self, response: WeatherResponse) {
        let _ = self.0.send(Outcome::Success(response));
    }

    fn on_error_fetching_data(self, error: WeatherError) {
        let _ = self.0.send(Outcome::Failure(error));
    }
}

/// Drain every outcome; the channel closes once the listener is consumed.
pub async fn collect(mut rx: mpsc::UnboundedReceiver<Outcome>) -> Vec<Outcome> {
    let mut outcomes = Vec::new();
    while let Some(outcome) = rx.recv().await {
        outcomes.push(outcome);
    }
    outcomes
}
