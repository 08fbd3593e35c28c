use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::entities::measurement::Measurement;

/// Channel names the scheduler publishes lifecycle signals on.
pub mod channels {
    pub const PROBE_COMPLETED: &str = "probe-completed";
    pub const JOB_SCHEDULED: &str = "job-scheduled";
    pub const JOB_CANCELLED: &str = "job-cancelled";
    pub const CLEANUP_COMPLETED: &str = "cleanup-completed";
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EventBusError {
    #[error("channel not found: {0}")]
    ChannelNotFound(String),
}

#[derive(Error, Debug)]
pub enum ListenerError {
    #[error("listener failed: {0}")]
    Failed(String),
}

/// What a published event carries.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    ProbeCompleted(Measurement),
    JobScheduled { process: String },
    JobCancelled { process: String },
    CleanupCompleted { deleted: u64 },
}

/// One event on one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct BusEvent {
    pub channel: String,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

impl BusEvent {
    #[must_use]
    pub fn now(channel: &str, payload: EventPayload) -> Self {
        Self {
            channel: channel.to_string(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// A handler for events on one or more channels.
pub trait EventListener: Send + Sync {
    /// Identity used in logs when the listener fails.
    fn name(&self) -> &str;

    /// Handle one event.
    ///
    /// # Errors
    ///
    /// Returns `ListenerError` on failure; the bus logs it and keeps going.
    fn on_event(&self, event: &BusEvent) -> Result<(), ListenerError>;
}

/// Named-channel publish/subscribe registry.
///
/// Listeners on a channel are invoked synchronously, in subscription order.
/// The listener list is snapshotted before invocation, so a handler may
/// re-enter the bus (subscribe, publish) without deadlocking.
pub struct EventBus {
    registry: RwLock<HashMap<String, Vec<Arc<dyn EventListener>>>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(HashMap::new()),
        }
    }

    /// Create an empty listener list for `name`. Idempotent: an existing
    /// channel is left untouched and the duplicate registration is logged.
    pub fn register_channel(&self, name: &str) {
        let mut registry = match self.registry.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if registry.contains_key(name) {
            tracing::debug!(channel = name, "channel already registered");
            return;
        }
        registry.insert(name.to_string(), Vec::new());
    }

    /// Append `listener` to the channel's list.
    ///
    /// # Errors
    ///
    /// Returns `EventBusError::ChannelNotFound` if the channel was never
    /// registered.
    pub fn subscribe(
        &self,
        channel: &str,
        listener: Arc<dyn EventListener>,
    ) -> Result<(), EventBusError> {
        let mut registry = match self.registry.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let listeners = registry
            .get_mut(channel)
            .ok_or_else(|| EventBusError::ChannelNotFound(channel.to_string()))?;
        listeners.push(listener);
        Ok(())
    }

    /// Remove `listener` from the channel's list. A listener that was never
    /// subscribed is a silent no-op.
    ///
    /// # Errors
    ///
    /// Returns `EventBusError::ChannelNotFound` if the channel was never
    /// registered.
    pub fn unsubscribe(
        &self,
        channel: &str,
        listener: &Arc<dyn EventListener>,
    ) -> Result<(), EventBusError> {
        let mut registry = match self.registry.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let listeners = registry
            .get_mut(channel)
            .ok_or_else(|| EventBusError::ChannelNotFound(channel.to_string()))?;
        listeners.retain(|existing| !same_listener(existing, listener));
        Ok(())
    }

    /// Deliver `event` to every listener of its channel, in order.
    ///
    /// Publishing on an unknown channel is an observed no-op, never an
    /// error — lifecycle signals nobody listens for must not crash the
    /// publisher. A failing listener is logged with its channel and name and
    /// does not stop the listeners after it.
    pub fn publish(&self, event: &BusEvent) {
        let listeners = {
            let registry = match self.registry.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            match registry.get(&event.channel) {
                Some(listeners) => listeners.clone(),
                None => {
                    tracing::debug!(channel = %event.channel, "publish on unknown channel ignored");
                    return;
                }
            }
        };

        for listener in listeners {
            if let Err(e) = listener.on_event(event) {
                tracing::warn!(
                    channel = %event.channel,
                    listener = listener.name(),
                    "listener failed: {e}"
                );
            }
        }
    }

    /// Channel-wise union with `other`, consuming it. A channel present in
    /// both keeps `other`'s listener list — destructive and non-symmetric,
    /// intended as a deliberate administrative operation.
    pub fn merge(&self, other: Self) {
        let incoming = match other.registry.into_inner() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut registry = match self.registry.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for (channel, listeners) in incoming {
            if registry.insert(channel.clone(), listeners).is_some() {
                tracing::debug!(channel = %channel, "merge replaced listener list");
            }
        }
    }

    /// Whether `name` has been registered.
    #[must_use]
    pub fn has_channel(&self, name: &str) -> bool {
        let registry = match self.registry.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        registry.contains_key(name)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Listener identity is the data pointer of the `Arc` (not the vtable, which
/// may differ across codegen units for the same object).
fn same_listener(a: &Arc<dyn EventListener>, b: &Arc<dyn EventListener>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a).cast::<()>(),
        Arc::as_ptr(b).cast::<()>(),
    )
}
