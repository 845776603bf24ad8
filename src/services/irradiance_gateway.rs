use reqwest::{Client, StatusCode};
use tracing::{error, info, warn};

use crate::config::{ApiKey, ProviderConfig};
use crate::errors::GatewayError;
use crate::models::solar::{Coordinate, IrradianceSeries};

const ESTIMATED_ACTUALS_PATH: &str = "/radiation/estimated_actuals";
/// Retrospective window: one week of hourly estimated actuals.
const WINDOW_HOURS: u32 = 168;

/// Irradiance retrieval gateway (Solcast estimated actuals).
///
/// One provider round trip per call: no retries, no caching. Every failure
/// leaves as a [`GatewayError`].
#[derive(Debug, Clone)]
pub struct IrradianceGateway {
    client: Client,
    endpoint: String,
    format: String,
    api_key: ApiKey,
}

impl IrradianceGateway {

    /// Returns a new gateway
    ///
    /// # Arguments
    ///
    /// * 'provider' - provider location and response format
    /// * 'api_key' - credential read at startup, possibly absent
    pub fn new(provider: &ProviderConfig, api_key: ApiKey) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        let endpoint = format!("{}{}", provider.base_url.trim_end_matches('/'), ESTIMATED_ACTUALS_PATH);

        Ok(Self {
            client,
            endpoint,
            format: provider.format.clone(),
            api_key,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_configured()
    }

    /// Validates raw query values, then fetches the series.
    pub async fn fetch_from_query(&self, lat: Option<&str>, lon: Option<&str>) -> Result<IrradianceSeries, GatewayError> {
        let coordinate = Coordinate::parse(lat, lon)?;
        self.fetch_irradiance(coordinate).await
    }

    /// Fetches the estimated-actuals window for `coordinate`.
    ///
    /// The sample array is passed through unchanged; per-sample ranges are
    /// the provider's responsibility.
    pub async fn fetch_irradiance(&self, coordinate: Coordinate) -> Result<IrradianceSeries, GatewayError> {
        let Some(api_key) = self.api_key.expose() else {
            error!("Solcast API key is not set");
            return Err(GatewayError::Misconfigured);
        };

        let latitude = coordinate.latitude.to_string();
        let longitude = coordinate.longitude.to_string();
        let hours = WINDOW_HOURS.to_string();

        let request = self.client.get(&self.endpoint).query(&[
            ("latitude", latitude.as_str()),
            ("longitude", longitude.as_str()),
            ("api_key", api_key),
            ("format", self.format.as_str()),
            ("hours", hours.as_str()),
        ]);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Err(unreachable(e, coordinate)),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if status == StatusCode::TOO_MANY_REQUESTS => error_chain(e.without_url()),
            Err(e) => return Err(unreachable(e, coordinate)),
        };

        #[cfg(feature = "verbose_log")]
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "Irradiance provider answered");

        map_response(status, body, coordinate)
    }
}

fn map_response(status: StatusCode, body: String, coordinate: Coordinate) -> Result<IrradianceSeries, GatewayError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        warn!(body = %body, "Irradiance provider rate limit exceeded");
        return Err(GatewayError::RateLimited);
    }

    if !status.is_success() {
        error!(status = status.as_u16(), body = %body, "Irradiance provider returned an error");
        return Err(GatewayError::ProviderError { status: Some(status.as_u16()), body });
    }

    match serde_json::from_str::<IrradianceSeries>(&body) {
        Ok(series) => {
            info!(
                lat = coordinate.latitude,
                lon = coordinate.longitude,
                samples = series.samples.len(),
                "Irradiance series retrieved"
            );
            Ok(series)
        }
        Err(e) => {
            error!(error = %e, "Irradiance provider payload could not be decoded");
            Err(GatewayError::ProviderError { status: None, body: format!("invalid provider payload: {}", e) })
        }
    }
}

/// Transport failure while sending or reading, logged with its causes.
fn unreachable(e: reqwest::Error, coordinate: Coordinate) -> GatewayError {
    // The URL carries the key as a query parameter.
    let message = error_chain(e.without_url());
    error!(error = %message, lat = coordinate.latitude, lon = coordinate.longitude, "Irradiance provider unreachable");
    GatewayError::ProviderUnreachable(message)
}

/// `error: cause: root cause`, so connect/DNS/TLS details are not lost.
fn error_chain(e: reqwest::Error) -> String {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(&e);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::{extract::Query, extract::State, routing::get, Router};

    const SERIES_JSON: &str = r#"{"estimated_actuals":[
        {"ghi":100.0,"poa_global":110.0,"period_end":"2025-06-21T10:00:00Z","period":"PT60M"},
        {"ghi":300.0,"poa_global":320.0,"period_end":"2025-06-21T11:00:00Z","period":"PT60M"}
    ]}"#;

    #[derive(Clone)]
    struct FakeProvider {
        status: StatusCode,
        body: &'static str,
        calls: Arc<AtomicUsize>,
        last_query: Arc<Mutex<Option<HashMap<String, String>>>>,
    }

    async fn answer(
        State(fake): State<FakeProvider>,
        Query(query): Query<HashMap<String, String>>,
    ) -> (StatusCode, &'static str) {
        fake.calls.fetch_add(1, Ordering::SeqCst);
        *fake.last_query.lock().unwrap() = Some(query);
        (fake.status, fake.body)
    }

    /// Serves `body` with `status` on a random local port.
    async fn spawn_provider(status: StatusCode, body: &'static str) -> (ProviderConfig, FakeProvider) {
        let fake = FakeProvider {
            status,
            body,
            calls: Arc::new(AtomicUsize::new(0)),
            last_query: Arc::new(Mutex::new(None)),
        };
        let app = Router::new()
            .route(ESTIMATED_ACTUALS_PATH, get(answer))
            .with_state(fake.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let provider = ProviderConfig { base_url: format!("http://{}/", addr), ..Default::default() };
        (provider, fake)
    }

    fn key() -> ApiKey {
        ApiKey::new(Some("test-key".to_string()))
    }

    fn turin() -> Coordinate {
        Coordinate { latitude: 45.07, longitude: 7.33 }
    }

    #[tokio::test]
    async fn test_success_passes_series_through() {
        let (provider, fake) = spawn_provider(StatusCode::OK, SERIES_JSON).await;
        let gateway = IrradianceGateway::new(&provider, key()).unwrap();

        let series = gateway.fetch_irradiance(turin()).await.unwrap();
        assert_eq!(series.samples.len(), 2);
        assert_eq!(series.samples[1].global_horizontal_irradiance, 300.0);
        assert_eq!(series.samples[0].period.as_deref(), Some("PT60M"));

        let query = fake.last_query.lock().unwrap().clone().unwrap();
        assert_eq!(query["latitude"], "45.07");
        assert_eq!(query["longitude"], "7.33");
        assert_eq!(query["api_key"], "test-key");
        assert_eq!(query["format"], "json");
        assert_eq!(query["hours"], "168");
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_coordinate_makes_no_call() {
        let (provider, fake) = spawn_provider(StatusCode::OK, SERIES_JSON).await;
        let gateway = IrradianceGateway::new(&provider, key()).unwrap();

        for (lat, lon) in [(None, Some("7.33")), (Some("45.07"), None), (None, None)] {
            let err = gateway.fetch_from_query(lat, lon).await.unwrap_err();
            assert!(matches!(err, GatewayError::InvalidRequest(_)));
        }
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_request_checked_before_credential() {
        let gateway = IrradianceGateway::new(&ProviderConfig::default(), ApiKey::default()).unwrap();
        let err = gateway.fetch_from_query(None, Some("7.33")).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_missing_key_is_misconfigured_without_call() {
        let (provider, fake) = spawn_provider(StatusCode::OK, SERIES_JSON).await;
        let gateway = IrradianceGateway::new(&provider, ApiKey::default()).unwrap();

        assert!(!gateway.is_configured());
        let err = gateway.fetch_from_query(Some("45.07"), Some("7.33")).await.unwrap_err();
        assert_eq!(err, GatewayError::Misconfigured);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_429_is_rate_limited() {
        let (provider, _fake) = spawn_provider(StatusCode::TOO_MANY_REQUESTS, r#"{"response_status":{"error_code":"TooManyRequests"}}"#).await;
        let gateway = IrradianceGateway::new(&provider, key()).unwrap();

        let err = gateway.fetch_irradiance(turin()).await.unwrap_err();
        assert_eq!(err, GatewayError::RateLimited);
    }

    #[tokio::test]
    async fn test_other_status_is_provider_error_with_body() {
        let body = r#"{"response_status":{"message":"Invalid API key"}}"#;
        let (provider, _fake) = spawn_provider(StatusCode::UNAUTHORIZED, body).await;
        let gateway = IrradianceGateway::new(&provider, key()).unwrap();

        let err = gateway.fetch_irradiance(turin()).await.unwrap_err();
        assert_eq!(err, GatewayError::ProviderError { status: Some(401), body: body.to_string() });
    }

    #[tokio::test]
    async fn test_undecodable_success_is_provider_error() {
        let (provider, _fake) = spawn_provider(StatusCode::OK, "<html>maintenance</html>").await;
        let gateway = IrradianceGateway::new(&provider, key()).unwrap();

        match gateway.fetch_irradiance(turin()).await.unwrap_err() {
            GatewayError::ProviderError { status, body } => {
                assert_eq!(status, None);
                assert!(body.starts_with("invalid provider payload"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_closed_port_is_unreachable_and_hides_key() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = ProviderConfig { base_url: format!("http://{}", addr), ..Default::default() };
        let gateway = IrradianceGateway::new(&provider, key()).unwrap();

        match gateway.fetch_irradiance(turin()).await.unwrap_err() {
            GatewayError::ProviderUnreachable(message) => {
                assert!(!message.contains("test-key"));
                assert!(message.starts_with("error sending request"), "got {}", message);
                // The connect failure below the request error must survive.
                assert!(message.to_lowercase().contains("connect"), "got {}", message);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    /// Accepts one connection and sends a truncated 200 answer.
    async fn spawn_truncating_provider() -> ProviderConfig {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            let head = "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 500\r\n\r\n{\"estimated_actuals\":[";
            socket.write_all(head.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        ProviderConfig { base_url: format!("http://{}", addr), ..Default::default() }
    }

    #[tokio::test]
    async fn test_body_cut_short_is_unreachable() {
        let provider = spawn_truncating_provider().await;
        let gateway = IrradianceGateway::new(&provider, key()).unwrap();

        match gateway.fetch_irradiance(turin()).await.unwrap_err() {
            GatewayError::ProviderUnreachable(message) => {
                assert!(!message.contains("test-key"));
                assert!(!message.contains("invalid provider payload"), "got {}", message);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_debug_hides_key() {
        let gateway = IrradianceGateway::new(&ProviderConfig::default(), key()).unwrap();
        assert!(!format!("{:?}", gateway).contains("test-key"));
    }
}
