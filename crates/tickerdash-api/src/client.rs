//! HTTP client with timeout and error normalization.

use std::time::{Duration, Instant};

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tickerdash_telemetry::Metrics;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for the tracking backend's REST API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    timeout: Duration,
}

impl ApiClient {
    /// Create a client for the given base URL (e.g. `http://localhost:5000`).
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        // Url::join replaces the last segment unless the base ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .user_agent(concat!("tickerdash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> ApiResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    /// GET a JSON document.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let request = self.http.get(self.url(path)?);
        let body = self.execute(path, request).await?;
        decode(&body)
    }

    /// GET a JSON document with query parameters.
    pub async fn get_json_with_query<T, Q>(&self, path: &str, query: &Q) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.http.get(self.url(path)?).query(query);
        let body = self.execute(path, request).await?;
        decode(&body)
    }

    /// Send a JSON body and decode the JSON response.
    pub async fn send_json<T, B>(&self, method: Method, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.http.request(method, self.url(path)?).json(body);
        let body = self.execute(path, request).await?;
        decode(&body)
    }

    /// Send a request whose response body is irrelevant (e.g. DELETE).
    pub async fn send_empty(&self, method: Method, path: &str) -> ApiResult<()> {
        let request = self.http.request(method, self.url(path)?);
        self.execute(path, request).await.map(|_| ())
    }

    /// The fetch wrapper: timeout, status check, metrics.
    ///
    /// On timeout the in-flight request future is dropped together with its
    /// timer, so nothing keeps running after the error is returned.
    async fn execute(&self, path: &str, request: RequestBuilder) -> ApiResult<Vec<u8>> {
        let endpoint = endpoint_label(path);
        let started = Instant::now();

        let result = match tokio::time::timeout(self.timeout, round_trip(request)).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        };

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        match &result {
            Ok(body) => {
                debug!(endpoint, elapsed_ms, bytes = body.len(), "API request ok");
                Metrics::api_request(endpoint, "ok", elapsed_ms);
            }
            Err(e) => {
                warn!(endpoint, elapsed_ms, error = %e, "API request failed");
                Metrics::api_request(endpoint, e.outcome(), elapsed_ms);
            }
        }

        result
    }
}

async fn round_trip(request: RequestBuilder) -> ApiResult<Vec<u8>> {
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    if !status.is_success() {
        let message = error_message(&bytes).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });
        return Err(ApiError::Http {
            status: status.as_u16(),
            message,
        });
    }

    Ok(bytes.to_vec())
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Extract a message from `{"error": ...}`, `{"message": ...}` or `{"detail": ...}`.
fn error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["error", "message", "detail"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Metric label: first path segment after `api/`, without ids or query.
fn endpoint_label(path: &str) -> &str {
    let path = path.trim_start_matches('/');
    let path = path.strip_prefix("api/").unwrap_or(path);
    path.split(&['/', '?'][..]).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = ApiClient::new("http://localhost:5000/backend").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:5000/backend/");
        assert_eq!(
            client.url("/api/alerts").unwrap().as_str(),
            "http://localhost:5000/backend/api/alerts"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ApiClient::new("not a url").unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn test_default_timeout() {
        let client = ApiClient::new("http://localhost:5000").unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(15));
        let client = client.with_timeout(Duration::from_millis(250));
        assert_eq!(client.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(br#"{"error": "symbol required"}"#).as_deref(),
            Some("symbol required")
        );
        assert_eq!(
            error_message(br#"{"message": "nope"}"#).as_deref(),
            Some("nope")
        );
        assert_eq!(error_message(b"<html>500</html>"), None);
        assert_eq!(error_message(br#"{"error": ""}"#), None);
    }

    #[test]
    fn test_endpoint_label() {
        assert_eq!(endpoint_label("/api/portfolio/12"), "portfolio");
        assert_eq!(endpoint_label("/api/drainer/events"), "drainer");
        assert_eq!(endpoint_label("api/logs?lines=50"), "logs");
        assert_eq!(endpoint_label("/health"), "health");
    }
}
