use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::application::config::AppConfig;
use crate::application::event_bus::{
    channels, BusEvent, EventBus, EventListener, EventPayload, ListenerError,
};
use crate::application::services::scheduler::Scheduler;

/// Logs every lifecycle signal the scheduler publishes.
struct LogListener;

impl EventListener for LogListener {
    fn name(&self) -> &str {
        "daemon-log"
    }

    fn on_event(&self, event: &BusEvent) -> Result<(), ListenerError> {
        match &event.payload {
            EventPayload::ProbeCompleted(m) if m.success => {
                tracing::info!(
                    process = %m.process,
                    response_time_ms = m.response_time_ms,
                    "probe succeeded"
                );
            }
            EventPayload::ProbeCompleted(m) => {
                let kind = m.failure.map_or_else(String::new, |k| k.to_string());
                tracing::warn!(process = %m.process, "probe failed: {kind}");
            }
            EventPayload::JobScheduled { process } => {
                tracing::info!(process = %process, "job scheduled");
            }
            EventPayload::JobCancelled { process } => {
                tracing::info!(process = %process, "job cancelled");
            }
            EventPayload::CleanupCompleted { deleted } => {
                tracing::info!(deleted, "cleanup completed");
            }
        }
        Ok(())
    }
}

/// Run the monitoring daemon: schedule every configured process plus the
/// retention-cleanup job, then wait for SIGINT (Ctrl+C) via
/// [`tokio::signal::ctrl_c()`]. On shutdown every job is cancelled; an
/// in-flight probe finishes and is still recorded.
///
/// # Errors
///
/// Returns an error if a configured process cannot be scheduled (duplicate
/// names) or the shutdown signal cannot be installed.
pub async fn run_daemon(
    scheduler: &Scheduler,
    bus: &Arc<EventBus>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let listener: Arc<dyn EventListener> = Arc::new(LogListener);
    for channel in [
        channels::PROBE_COMPLETED,
        channels::JOB_SCHEDULED,
        channels::JOB_CANCELLED,
        channels::CLEANUP_COMPLETED,
    ] {
        bus.subscribe(channel, listener.clone())
            .map_err(|e| anyhow::anyhow!("failed to subscribe log listener: {e}"))?;
    }

    for entry in &config.processes {
        let (process, trigger) = entry.resolve();
        scheduler
            .schedule(process, trigger)
            .map_err(|e| anyhow::anyhow!("failed to schedule '{}': {e}", entry.name))?;
    }

    let policy = Arc::new(RwLock::new(config.retention_policy()));
    scheduler.schedule_cleanup(
        policy,
        Duration::from_secs(config.retention.cleanup_cadence_secs),
    );

    tracing::info!(
        processes = config.processes.len(),
        "daemon started, press Ctrl+C to stop"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received, stopping jobs...");
    scheduler.shutdown();
    Ok(())
}
