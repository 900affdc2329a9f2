//! Fetch-with-timeout.
//!
//! [`Transport`] is the seam between request orchestration and the network.
//! [`ReqwestTransport`] is the production implementation; tests substitute
//! their own or point it at a wiremock server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, RETRY_AFTER};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{OpenLensError, Result};

/// Default per-request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A fully-read HTTP response.
///
/// Status codes are not interpreted here: a 404 or 429 is a normal response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Parsed `Retry-After` header (delta-seconds form only).
    pub retry_after: Option<Duration>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Issues a single GET with a hard deadline.
///
/// Implementations must request JSON, must fail with
/// [`OpenLensError::Timeout`] when the deadline fires (aborting the call),
/// and must surface transport failures as [`OpenLensError::Http`]. Non-2xx
/// statuses are returned as ordinary responses.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name for logging/debugging.
    fn name(&self) -> &str;

    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Create a transport with its own connection pool.
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("openlens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OpenLensError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    /// Wrap an existing client.
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    fn name(&self) -> &str {
        "reqwest"
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse> {
        let request = async {
            let response = self
                .http
                .get(url)
                .header(ACCEPT, "application/json")
                .send()
                .await
                .map_err(|e| OpenLensError::Http(e.to_string()))?;

            let status = response.status().as_u16();
            let retry_after = parse_retry_after(
                response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok()),
            );
            let body = response
                .text()
                .await
                .map_err(|e| OpenLensError::Http(e.to_string()))?;

            Ok(HttpResponse {
                status,
                retry_after,
                body,
            })
        };

        // Dropping the request future on expiry aborts the in-flight call.
        match tokio::time::timeout(timeout, request).await {
            Ok(result) => result,
            Err(_) => {
                debug!(url, timeout_ms = timeout.as_millis() as u64, "request timed out");
                Err(OpenLensError::Timeout(timeout))
            }
        }
    }
}

/// Parse a `Retry-After` value given in seconds.
pub(crate) fn parse_retry_after(value: Option<&str>) -> Option<Duration> {
    value?.trim().parse::<u64>().ok().map(Duration::from_secs)
}
