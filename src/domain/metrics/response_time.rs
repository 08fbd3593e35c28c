use std::collections::BTreeMap;

use crate::domain::entities::measurement::Measurement;

use super::{Metric, MetricResult};

/// Response-time statistics over one process's measurement history:
/// `best` (minimum), `worst` (maximum), and `median`.
///
/// Failed measurements carry no response time and are filtered out; a
/// history with nothing measurable yields [`MetricResult::NoData`] rather
/// than an error — all-failures and no-measurements are both valid states.
pub struct ResponseTimeMetric;

impl Metric for ResponseTimeMetric {
    fn name(&self) -> &'static str {
        "response_time"
    }

    #[allow(clippy::cast_precision_loss)]
    fn compute(&self, measurements: &[Measurement]) -> MetricResult {
        let mut times: Vec<f64> = measurements
            .iter()
            .filter_map(|m| m.response_time_ms)
            .map(|ms| ms as f64)
            .collect();

        if times.is_empty() {
            return MetricResult::NoData;
        }

        times.sort_by(f64::total_cmp);

        let mut values = BTreeMap::new();
        values.insert("best".to_string(), times[0]);
        values.insert("worst".to_string(), times[times.len() - 1]);
        values.insert("median".to_string(), median_of_sorted(&times));
        MetricResult::Values(values)
    }
}

/// Standard order-statistic median: the middle element for an odd count, the
/// arithmetic mean of the two central elements for an even count.
fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::entities::measurement::FailureKind;

    fn successes(times: &[u64]) -> Vec<Measurement> {
        times
            .iter()
            .map(|&ms| Measurement::success("buffer", ms))
            .collect()
    }

    #[test]
    fn even_count_median_is_mean_of_central_pair() {
        // sorted: [1, 7, 9, 100] → (7 + 9) / 2
        let result = ResponseTimeMetric.compute(&successes(&[7, 100, 9, 1]));
        assert_eq!(result.get("median"), Some(8.0));
    }

    #[test]
    fn odd_count_median_is_middle_element() {
        let result = ResponseTimeMetric.compute(&successes(&[3, 7, 1, 9, 100]));
        assert_eq!(result.get("median"), Some(7.0));
    }

    #[test]
    fn best_and_worst_are_min_and_max() {
        let result = ResponseTimeMetric.compute(&successes(&[42, 5, 900, 13]));
        assert_eq!(result.get("best"), Some(5.0));
        assert_eq!(result.get("worst"), Some(900.0));
    }

    #[test]
    fn single_measurement_is_its_own_median() {
        let result = ResponseTimeMetric.compute(&successes(&[250]));
        assert_eq!(result.get("best"), Some(250.0));
        assert_eq!(result.get("worst"), Some(250.0));
        assert_eq!(result.get("median"), Some(250.0));
    }

    #[test]
    fn empty_history_yields_no_data() {
        assert_eq!(ResponseTimeMetric.compute(&[]), MetricResult::NoData);
    }

    #[test]
    fn all_failures_yield_no_data() {
        let measurements = vec![
            Measurement::failure("buffer", FailureKind::Unreachable),
            Measurement::failure("buffer", FailureKind::ServiceFault),
        ];
        assert_eq!(
            ResponseTimeMetric.compute(&measurements),
            MetricResult::NoData
        );
    }

    #[test]
    fn failures_are_excluded_from_statistics() {
        let mut measurements = successes(&[10, 20]);
        measurements.push(Measurement::failure("buffer", FailureKind::Unreachable));
        let result = ResponseTimeMetric.compute(&measurements);
        assert_eq!(result.get("median"), Some(15.0));
        assert_eq!(result.get("worst"), Some(20.0));
    }
}
