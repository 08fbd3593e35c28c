use serde::{Deserialize, Serialize};

/// One WPS process under monitoring: an endpoint URL, the identifier of the
/// process at that endpoint, and the raw Execute request document to send.
///
/// Immutable once created. The `name` is the unique identity used by the
/// scheduler and referenced by every measurement for this process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredProcess {
    pub name: String,
    pub endpoint: String,
    pub identifier: String,
    pub request: String,
}

impl MonitoredProcess {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        identifier: impl Into<String>,
        request: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            identifier: identifier.into(),
            request: request.into(),
        }
    }
}
