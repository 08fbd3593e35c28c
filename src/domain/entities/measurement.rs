use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a probe failed. A down endpoint and a fault document returned by a
/// live endpoint are different facts; both end up as failed measurements but
/// the kind is preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The endpoint could not be reached, or the bounded wait elapsed.
    Unreachable,
    /// The endpoint answered with a recognized service-level fault.
    ServiceFault,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreachable => write!(f, "unreachable"),
            Self::ServiceFault => write!(f, "service fault"),
        }
    }
}

/// One probe outcome for one monitored process. Immutable after creation;
/// deleted only by retention cleanup, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    /// Name of the `MonitoredProcess` this measurement belongs to.
    pub process: String,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    /// Observed response time; `None` when the probe failed.
    pub response_time_ms: Option<u64>,
    #[serde(default)]
    pub failure: Option<FailureKind>,
}

impl Measurement {
    /// A successful probe with its observed response time.
    #[must_use]
    pub fn success(process: impl Into<String>, response_time_ms: u64) -> Self {
        Self {
            process: process.into(),
            timestamp: Utc::now(),
            success: true,
            response_time_ms: Some(response_time_ms),
            failure: None,
        }
    }

    /// A failed probe with its failure classification.
    #[must_use]
    pub fn failure(process: impl Into<String>, kind: FailureKind) -> Self {
        Self {
            process: process.into(),
            timestamp: Utc::now(),
            success: false,
            response_time_ms: None,
            failure: Some(kind),
        }
    }
}
