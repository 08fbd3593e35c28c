#![allow(clippy::expect_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use wpswatch::application::event_bus::{
    channels, BusEvent, EventBus, EventListener, EventPayload, ListenerError,
};
use wpswatch::application::services::scheduler::Scheduler;
use wpswatch::domain::entities::measurement::Measurement;
use wpswatch::domain::entities::process::MonitoredProcess;
use wpswatch::domain::entities::retention::RetentionPolicy;
use wpswatch::domain::entities::trigger::{IntervalUnit, TriggerConfig};
use wpswatch::domain::metrics::{default_metrics, MetricEngine};
use wpswatch::domain::ports::store::{MeasurementQuery, MeasurementStore};
use wpswatch::domain::ports::transport::{TransportError, WpsTransport};
use wpswatch::infrastructure::persistence::in_memory_store::InMemoryStore;

// ---------------------------------------------------------------------------
// Mock transports
// ---------------------------------------------------------------------------

/// Answers with a fixed simulated response time, alternating success and
/// fault documents when `fail_every` is set.
struct ScriptedTransport {
    calls: AtomicUsize,
    fail_every: Option<usize>,
}

impl ScriptedTransport {
    const fn reliable() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_every: None,
        }
    }

    const fn flaky(every: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_every: Some(every),
        }
    }
}

#[async_trait]
impl WpsTransport for ScriptedTransport {
    async fn send(&self, _endpoint: &str, _request: &str) -> Result<String, TransportError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_every.is_some_and(|every| call % every == 0) {
            return Ok("<ows:ExceptionReport/>".to_string());
        }
        Ok("<wps:ExecuteResponse/>".to_string())
    }
}

// ---------------------------------------------------------------------------
// Recording listener
// ---------------------------------------------------------------------------

struct Recorder {
    events: Mutex<Vec<BusEvent>>,
}

impl Recorder {
    const fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    fn completed_measurements(&self) -> Vec<Measurement> {
        self.events
            .lock()
            .expect("recorder lock")
            .iter()
            .filter_map(|e| match &e.payload {
                EventPayload::ProbeCompleted(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    fn channels_seen(&self) -> Vec<String> {
        self.events
            .lock()
            .expect("recorder lock")
            .iter()
            .map(|e| e.channel.clone())
            .collect()
    }
}

impl EventListener for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn on_event(&self, event: &BusEvent) -> Result<(), ListenerError> {
        self.events.lock().expect("recorder lock").push(event.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn process(name: &str) -> MonitoredProcess {
    MonitoredProcess::new(
        name,
        "http://localhost:8080/wps",
        "org.example.Buffer",
        "<Execute/>",
    )
}

fn millis(every: u64) -> TriggerConfig {
    TriggerConfig::new(every, IntervalUnit::Millisecond)
}

// ---------------------------------------------------------------------------
// End-to-end flows
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scheduled_probes_flow_into_store_and_bus() {
    let store = Arc::new(InMemoryStore::new());
    let bus = Arc::new(EventBus::new());
    let scheduler = Scheduler::new(
        Arc::new(ScriptedTransport::reliable()),
        store.clone(),
        bus.clone(),
    );

    let recorder = Arc::new(Recorder::new());
    bus.subscribe(channels::PROBE_COMPLETED, recorder.clone())
        .expect("subscribe");

    scheduler
        .schedule(process("buffer"), millis(15))
        .expect("schedule");
    tokio::time::sleep(Duration::from_millis(80)).await;
    scheduler.shutdown();
    tokio::time::sleep(Duration::from_millis(30)).await;

    let stored = store
        .query("buffer", &MeasurementQuery::All)
        .expect("query");
    assert!(!stored.is_empty());
    assert!(stored.iter().all(|m| m.success));

    // Every stored measurement was announced on the bus
    let announced = recorder.completed_measurements();
    assert_eq!(announced.len(), stored.len());
}

#[tokio::test]
async fn faulty_responses_are_recorded_as_failures_not_dropped() {
    let store = Arc::new(InMemoryStore::new());
    let bus = Arc::new(EventBus::new());
    let scheduler = Scheduler::new(
        Arc::new(ScriptedTransport::flaky(2)),
        store.clone(),
        bus,
    );

    scheduler
        .schedule(process("buffer"), millis(15))
        .expect("schedule");
    tokio::time::sleep(Duration::from_millis(100)).await;
    scheduler.shutdown();
    tokio::time::sleep(Duration::from_millis(30)).await;

    let stored = store
        .query("buffer", &MeasurementQuery::All)
        .expect("query");
    assert!(stored.len() >= 2);
    assert!(stored.iter().any(|m| m.success));
    assert!(stored.iter().any(|m| !m.success));
}

#[tokio::test]
async fn metrics_over_recorded_history_skip_failures() {
    let store = Arc::new(InMemoryStore::new());
    let bus = Arc::new(EventBus::new());
    let scheduler = Scheduler::new(
        Arc::new(ScriptedTransport::flaky(3)),
        store.clone(),
        bus,
    );

    scheduler
        .schedule(process("buffer"), millis(10))
        .expect("schedule");
    tokio::time::sleep(Duration::from_millis(100)).await;
    scheduler.shutdown();
    tokio::time::sleep(Duration::from_millis(30)).await;

    let stored = store
        .query("buffer", &MeasurementQuery::All)
        .expect("query");
    let engine = MetricEngine::new(default_metrics());
    let results = engine.compute_all(&stored);
    let response_time = &results["response_time"];

    let successes = stored.iter().filter(|m| m.success).count();
    if successes == 0 {
        assert_eq!(response_time.get("median"), None);
    } else {
        let best = response_time.get("best").expect("best");
        let worst = response_time.get("worst").expect("worst");
        let median = response_time.get("median").expect("median");
        assert!(best <= median && median <= worst);
    }
}

#[tokio::test]
async fn full_job_lifecycle_is_published_in_order() {
    let store = Arc::new(InMemoryStore::new());
    let bus = Arc::new(EventBus::new());
    let scheduler = Scheduler::new(
        Arc::new(ScriptedTransport::reliable()),
        store,
        bus.clone(),
    );

    let recorder = Arc::new(Recorder::new());
    for channel in [channels::JOB_SCHEDULED, channels::JOB_CANCELLED] {
        bus.subscribe(channel, recorder.clone()).expect("subscribe");
    }

    scheduler
        .schedule(process("buffer"), millis(10_000))
        .expect("schedule");
    scheduler.cancel("buffer").expect("cancel");

    assert_eq!(
        recorder.channels_seen(),
        vec![
            channels::JOB_SCHEDULED.to_string(),
            channels::JOB_CANCELLED.to_string()
        ]
    );
    assert!(!scheduler.is_scheduled("buffer"));
}

#[tokio::test]
async fn retention_cleanup_trims_history_while_probing_continues() {
    let store = Arc::new(InMemoryStore::new());
    let bus = Arc::new(EventBus::new());
    let scheduler = Scheduler::new(
        Arc::new(ScriptedTransport::reliable()),
        store.clone(),
        bus,
    );

    // Seed a stale record that the first cleanup fire must retire
    let mut stale = Measurement::success("buffer", 999);
    stale.timestamp = chrono::Utc::now() - chrono::TimeDelta::hours(48);
    store.append(&stale).expect("append");

    scheduler
        .schedule(process("buffer"), millis(15))
        .expect("schedule");
    let policy = Arc::new(RwLock::new(RetentionPolicy::from_hours(24)));
    scheduler.schedule_cleanup(policy, Duration::from_millis(10));

    tokio::time::sleep(Duration::from_millis(80)).await;
    scheduler.shutdown();
    tokio::time::sleep(Duration::from_millis(30)).await;

    let stored = store
        .query("buffer", &MeasurementQuery::All)
        .expect("query");
    assert!(!stored.is_empty(), "fresh probes keep landing");
    assert!(
        stored.iter().all(|m| m.response_time_ms != Some(999)),
        "stale record must be gone"
    );
}
