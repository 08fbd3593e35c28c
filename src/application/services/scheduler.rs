use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::application::event_bus::{channels, BusEvent, EventBus, EventPayload};
use crate::application::services::probe::ProbeRunner;
use crate::domain::entities::process::MonitoredProcess;
use crate::domain::entities::retention::RetentionPolicy;
use crate::domain::entities::trigger::TriggerConfig;
use crate::domain::ports::store::MeasurementStore;
use crate::domain::ports::transport::WpsTransport;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("process '{0}' already has an active schedule")]
    DuplicateSchedule(String),
    #[error("process '{0}' is not scheduled")]
    NotScheduled(String),
}

/// One active probe job: its ticker task plus the in-flight flag that
/// serializes fires for this process.
struct JobHandle {
    process: Arc<MonitoredProcess>,
    trigger: TriggerConfig,
    in_flight: Arc<AtomicBool>,
    ticker: JoinHandle<()>,
}

/// Owns every recurring probe job plus the retention-cleanup job, and
/// publishes lifecycle signals (`job-scheduled`, `job-cancelled`,
/// `probe-completed`, `cleanup-completed`) on the event bus.
///
/// Each job runs one tokio ticker task; every fire runs in its own spawned
/// task so a probe blocked on network I/O never stalls the ticker or other
/// processes' jobs. Fires for the same process are serialized: a tick that
/// arrives while a fire is still in flight is skipped and logged, never
/// queued. Cancellation is cooperative — the ticker is aborted between
/// ticks, an in-flight fire runs to completion and still publishes.
pub struct Scheduler {
    prober: ProbeRunner,
    store: Arc<dyn MeasurementStore>,
    bus: Arc<EventBus>,
    jobs: Mutex<HashMap<String, JobHandle>>,
    cleanup: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    /// Create a scheduler and register its lifecycle channels on the bus.
    #[must_use]
    pub fn new(
        transport: Arc<dyn WpsTransport>,
        store: Arc<dyn MeasurementStore>,
        bus: Arc<EventBus>,
    ) -> Self {
        bus.register_channel(channels::PROBE_COMPLETED);
        bus.register_channel(channels::JOB_SCHEDULED);
        bus.register_channel(channels::JOB_CANCELLED);
        bus.register_channel(channels::CLEANUP_COMPLETED);

        Self {
            prober: ProbeRunner::new(transport, store.clone()),
            store,
            bus,
            jobs: Mutex::new(HashMap::new()),
            cleanup: Mutex::new(None),
        }
    }

    /// Install a recurring probe job for `process`. The first fire happens
    /// immediately (or at the trigger's start bound, when set).
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::DuplicateSchedule` if the process already has
    /// an active job.
    pub fn schedule(
        &self,
        process: MonitoredProcess,
        trigger: TriggerConfig,
    ) -> Result<(), ScheduleError> {
        let name = process.name.clone();
        {
            let mut jobs = lock_jobs(&self.jobs);
            if jobs.contains_key(&name) {
                return Err(ScheduleError::DuplicateSchedule(name));
            }

            let process = Arc::new(process);
            let in_flight = Arc::new(AtomicBool::new(false));
            let ticker = self.spawn_ticker(process.clone(), trigger.clone(), in_flight.clone());
            jobs.insert(
                name.clone(),
                JobHandle {
                    process,
                    trigger,
                    in_flight,
                    ticker,
                },
            );
        }

        tracing::info!(process = %name, "probe job scheduled");
        self.bus.publish(&BusEvent::now(
            channels::JOB_SCHEDULED,
            EventPayload::JobScheduled { process: name },
        ));
        Ok(())
    }

    /// Swap the trigger of an existing job without losing or duplicating a
    /// fire: the old ticker is cancelled and a new one installed under the
    /// jobs lock, and the in-flight flag carries over so a fire started
    /// under the old trigger still blocks the first new tick.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::NotScheduled` if the process has no active job.
    pub fn reschedule(&self, name: &str, trigger: TriggerConfig) -> Result<(), ScheduleError> {
        {
            let mut jobs = lock_jobs(&self.jobs);
            let old = jobs
                .remove(name)
                .ok_or_else(|| ScheduleError::NotScheduled(name.to_string()))?;
            old.ticker.abort();

            let ticker =
                self.spawn_ticker(old.process.clone(), trigger.clone(), old.in_flight.clone());
            jobs.insert(
                name.to_string(),
                JobHandle {
                    process: old.process,
                    trigger,
                    in_flight: old.in_flight,
                    ticker,
                },
            );
        }

        tracing::info!(process = %name, "probe job rescheduled");
        self.bus.publish(&BusEvent::now(
            channels::JOB_SCHEDULED,
            EventPayload::JobScheduled {
                process: name.to_string(),
            },
        ));
        Ok(())
    }

    /// Stop future ticks for `process`. An in-flight fire finishes and its
    /// completion event is still published.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::NotScheduled` if the process has no active job.
    pub fn cancel(&self, name: &str) -> Result<(), ScheduleError> {
        {
            let mut jobs = lock_jobs(&self.jobs);
            let handle = jobs
                .remove(name)
                .ok_or_else(|| ScheduleError::NotScheduled(name.to_string()))?;
            handle.ticker.abort();
        }

        tracing::info!(process = %name, "probe job cancelled");
        self.bus.publish(&BusEvent::now(
            channels::JOB_CANCELLED,
            EventPayload::JobCancelled {
                process: name.to_string(),
            },
        ));
        Ok(())
    }

    /// Install the recurring retention-cleanup job, replacing any previous
    /// one. Each fire recomputes the cutoff as now minus the policy's age —
    /// the policy may be updated between fires. A failed deletion is logged
    /// and left for the next cadence; retention is eventually consistent.
    pub fn schedule_cleanup(&self, policy: Arc<RwLock<RetentionPolicy>>, cadence: Duration) {
        let store = self.store.clone();
        let bus = self.bus.clone();

        let task = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(cadence.max(Duration::from_millis(1)));
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                let cutoff = {
                    let policy = match policy.read() {
                        Ok(guard) => *guard,
                        Err(poisoned) => *poisoned.into_inner(),
                    };
                    policy.cutoff_from(Utc::now())
                };
                match store.delete_older_than(cutoff) {
                    Ok(deleted) => {
                        tracing::info!(deleted, "retention cleanup completed");
                        bus.publish(&BusEvent::now(
                            channels::CLEANUP_COMPLETED,
                            EventPayload::CleanupCompleted { deleted },
                        ));
                    }
                    Err(e) => {
                        tracing::warn!("retention cleanup failed, deferred to next cadence: {e}");
                    }
                }
            }
        });

        let mut slot = match self.cleanup.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = slot.replace(task) {
            tracing::info!("replacing previous cleanup job");
            previous.abort();
        }
    }

    /// Cancel every probe job and the cleanup job. Used on daemon shutdown;
    /// in-flight fires run to completion.
    pub fn shutdown(&self) {
        let names: Vec<String> = {
            let mut jobs = lock_jobs(&self.jobs);
            jobs.drain()
                .map(|(name, handle)| {
                    handle.ticker.abort();
                    name
                })
                .collect()
        };
        for name in names {
            self.bus.publish(&BusEvent::now(
                channels::JOB_CANCELLED,
                EventPayload::JobCancelled { process: name },
            ));
        }

        let mut slot = match self.cleanup.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(task) = slot.take() {
            task.abort();
        }
        tracing::info!("scheduler shut down");
    }

    /// Whether `name` currently has an active job.
    #[must_use]
    pub fn is_scheduled(&self, name: &str) -> bool {
        lock_jobs(&self.jobs).contains_key(name)
    }

    /// Names of all scheduled processes, sorted.
    #[must_use]
    pub fn scheduled(&self) -> Vec<String> {
        let mut names: Vec<String> = lock_jobs(&self.jobs).keys().cloned().collect();
        names.sort();
        names
    }

    /// The trigger currently driving `name`, if scheduled.
    #[must_use]
    pub fn trigger_of(&self, name: &str) -> Option<TriggerConfig> {
        lock_jobs(&self.jobs)
            .get(name)
            .map(|handle| handle.trigger.clone())
    }

    fn spawn_ticker(
        &self,
        process: Arc<MonitoredProcess>,
        trigger: TriggerConfig,
        in_flight: Arc<AtomicBool>,
    ) -> JoinHandle<()> {
        let prober = self.prober.clone();
        let bus = self.bus.clone();

        tokio::spawn(async move {
            if let Some(start) = trigger.start {
                let wait = (start - Utc::now()).to_std().unwrap_or_default();
                if !wait.is_zero() {
                    tokio::time::sleep(wait).await;
                }
            }

            let mut ticks = tokio::time::interval(trigger.interval());
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticks.tick().await;

                if trigger.expired_at(Utc::now()) {
                    tracing::info!(process = %process.name, "trigger end bound reached");
                    break;
                }

                // Overlapping fires for one process are rejected, not queued
                if in_flight.swap(true, Ordering::AcqRel) {
                    tracing::warn!(
                        process = %process.name,
                        "previous probe still in flight, skipping tick"
                    );
                    continue;
                }

                let prober = prober.clone();
                let bus = bus.clone();
                let process = process.clone();
                let in_flight = in_flight.clone();
                tokio::spawn(async move {
                    let measurement = prober.execute(&process).await;
                    bus.publish(&BusEvent::now(
                        channels::PROBE_COMPLETED,
                        EventPayload::ProbeCompleted(measurement),
                    ));
                    in_flight.store(false, Ordering::Release);
                });
            }
        })
    }
}

fn lock_jobs(jobs: &Mutex<HashMap<String, JobHandle>>) -> std::sync::MutexGuard<'_, HashMap<String, JobHandle>> {
    match jobs.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
