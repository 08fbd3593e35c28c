pub mod response_time;

use std::collections::BTreeMap;

use crate::domain::entities::measurement::Measurement;

/// Result of one metric computation: a mapping from statistic name to value,
/// or the "no data" sentinel when nothing was measurable. Values are `f64`
/// because order statistics over an even count are fractional even for
/// integral response times.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricResult {
    NoData,
    Values(BTreeMap<String, f64>),
}

impl MetricResult {
    /// Convenience accessor for a single statistic.
    #[must_use]
    pub fn get(&self, statistic: &str) -> Option<f64> {
        match self {
            Self::NoData => None,
            Self::Values(values) => values.get(statistic).copied(),
        }
    }
}

/// An aggregate over the measurement history of one process.
/// Metrics are pure functions: measurements in, statistics out. No I/O.
pub trait Metric: Send + Sync {
    /// Returns the unique name of this metric
    fn name(&self) -> &'static str;

    /// Computes the aggregate over the given measurements
    fn compute(&self, measurements: &[Measurement]) -> MetricResult;
}

/// Returns the built-in metrics
#[must_use]
pub fn default_metrics() -> Vec<Box<dyn Metric>> {
    vec![Box::new(response_time::ResponseTimeMetric)]
}

/// Engine that runs a collection of metrics over a measurement history.
/// Which statistics exist is entirely up to the registered metrics.
pub struct MetricEngine {
    metrics: Vec<Box<dyn Metric>>,
}

impl MetricEngine {
    #[must_use]
    pub fn new(metrics: Vec<Box<dyn Metric>>) -> Self {
        Self { metrics }
    }

    /// Runs every registered metric, keyed by metric name.
    #[must_use]
    pub fn compute_all(&self, measurements: &[Measurement]) -> BTreeMap<&'static str, MetricResult> {
        self.metrics
            .iter()
            .map(|metric| (metric.name(), metric.compute(measurements)))
            .collect()
    }
}
