use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("service fault: {0}")]
    ServiceFault(String),
}

/// Wire boundary the probe talks through: send a request document to an
/// endpoint, get the response document back or a failure. The wait is
/// bounded by the transport's own configuration; wire-level formatting is
/// entirely the adapter's concern.
#[async_trait]
pub trait WpsTransport: Send + Sync {
    /// Send `request` to `endpoint` and return the raw response document.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Unreachable`/`Timeout` when the endpoint
    /// cannot be reached within the bounded wait, `ServiceFault` when it
    /// answers with a protocol-level error.
    async fn send(&self, endpoint: &str, request: &str) -> Result<String, TransportError>;
}
