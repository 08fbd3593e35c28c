use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ports::transport::{TransportError, WpsTransport};

/// Sends WPS execute requests over HTTP POST.
///
/// The request document is posted as `text/xml`; the raw response body is
/// returned for the probe to classify. Transport-level failures map onto the
/// port's taxonomy: connection problems and elapsed waits are `Unreachable`
/// or `Timeout`, a non-success HTTP status is `ServiceFault` — the server is
/// alive, the service answered badly.
pub struct HttpWpsTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpWpsTransport {
    /// Creates a transport whose requests are bounded by `timeout`, covering
    /// DNS resolution, connection, and response.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Unreachable` if the HTTP client cannot be
    /// initialized (e.g. TLS backend failure).
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Unreachable(format!("cannot build HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl WpsTransport for HttpWpsTransport {
    async fn send(&self, endpoint: &str, request: &str) -> Result<String, TransportError> {
        let response = self
            .client
            .post(endpoint)
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(request.to_string())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(self.timeout)
                } else {
                    TransportError::Unreachable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::ServiceFault(format!("HTTP {status}")));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.timeout)
            } else {
                TransportError::Unreachable(e.to_string())
            }
        })
    }
}
