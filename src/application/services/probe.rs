use std::sync::Arc;
use std::time::Instant;

use crate::domain::entities::measurement::{FailureKind, Measurement};
use crate::domain::entities::process::MonitoredProcess;
use crate::domain::ports::store::MeasurementStore;
use crate::domain::ports::transport::{TransportError, WpsTransport};

/// Executes one probe against one monitored process and records the outcome.
///
/// Every execution appends exactly one measurement, success or failure —
/// "endpoint down" is expected steady state, observable data rather than an
/// error. Cheap to clone; each scheduled fire owns its own handle for the
/// duration of the fire.
#[derive(Clone)]
pub struct ProbeRunner {
    transport: Arc<dyn WpsTransport>,
    store: Arc<dyn MeasurementStore>,
}

impl ProbeRunner {
    #[must_use]
    pub fn new(transport: Arc<dyn WpsTransport>, store: Arc<dyn MeasurementStore>) -> Self {
        Self { transport, store }
    }

    /// Send the process's request document and record the outcome.
    ///
    /// A well-formed, non-fault response within the transport's bounded wait
    /// yields a success measurement with the observed response time. An
    /// unreachable endpoint or timeout is classified `Unreachable`; an HTTP
    /// error or a recognized fault document is classified `ServiceFault`.
    pub async fn execute(&self, process: &MonitoredProcess) -> Measurement {
        let started = Instant::now();
        let outcome = self
            .transport
            .send(&process.endpoint, &process.request)
            .await;

        let measurement = match outcome {
            Ok(body) if is_service_fault(&body) => {
                tracing::debug!(process = %process.name, "endpoint returned a fault document");
                Measurement::failure(&process.name, FailureKind::ServiceFault)
            }
            Ok(_) => {
                let elapsed =
                    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                Measurement::success(&process.name, elapsed)
            }
            Err(TransportError::ServiceFault(reason)) => {
                tracing::debug!(process = %process.name, "service fault: {reason}");
                Measurement::failure(&process.name, FailureKind::ServiceFault)
            }
            Err(e @ (TransportError::Unreachable(_) | TransportError::Timeout(_))) => {
                tracing::debug!(process = %process.name, "endpoint unreachable: {e}");
                Measurement::failure(&process.name, FailureKind::Unreachable)
            }
        };

        // An append failure loses this cycle's record; it is not retried.
        if let Err(e) = self.store.append(&measurement) {
            tracing::warn!(process = %process.name, "failed to record measurement: {e}");
        }

        measurement
    }
}

/// Recognize a service-level fault document in an otherwise well-formed
/// response. WPS faults arrive as OWS exception reports; older servers use
/// the OGC service exception vocabulary.
fn is_service_fault(body: &str) -> bool {
    body.contains("ExceptionReport") || body.contains("ServiceException")
}
