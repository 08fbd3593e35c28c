use std::collections::BTreeMap;

use chrono::Utc;
use colored::Colorize;
use serde_json::{json, Value};

use crate::domain::metrics::{default_metrics, MetricEngine, MetricResult};
use crate::domain::ports::store::{MeasurementQuery, MeasurementStore};
use crate::presentation::cli::formatters::report_fmt::{
    colorize_millis, colorize_rate, print_section_header,
};

/// Report quality-of-service statistics for one process.
///
/// The window is either the most recent `last` measurements, the last
/// `hours` hours, or the full history when neither is given.
///
/// # Errors
///
/// Returns an error if the window is empty-by-construction (`--hours 0`,
/// `--last 0`), the store query fails, or JSON serialization fails.
pub fn run_report(
    store: &dyn MeasurementStore,
    process: &str,
    last: Option<usize>,
    hours: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let query = match (last, hours) {
        (Some(0), _) | (_, Some(0)) => anyhow::bail!("window must be greater than 0"),
        (Some(n), _) => MeasurementQuery::MostRecent(n),
        (_, Some(h)) => {
            let i_hours = i64::try_from(h).map_err(|e| anyhow::anyhow!("invalid hours: {e}"))?;
            let delta = chrono::TimeDelta::try_hours(i_hours)
                .ok_or_else(|| anyhow::anyhow!("invalid time window"))?;
            let until = Utc::now();
            MeasurementQuery::Range {
                since: until - delta,
                until,
            }
        }
        (None, None) => MeasurementQuery::All,
    };

    let measurements = store
        .query(process, &query)
        .map_err(|e| anyhow::anyhow!("failed to read measurements: {e}"))?;

    let succeeded = measurements.iter().filter(|m| m.success).count();
    let failed = measurements.len() - succeeded;
    let engine = MetricEngine::new(default_metrics());
    let metrics = engine.compute_all(&measurements);

    if json {
        print_report_json(process, measurements.len(), succeeded, failed, &metrics)?;
    } else {
        print_report_human(process, measurements.len(), succeeded, failed, &metrics);
    }

    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn success_rate(succeeded: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| succeeded as f64 / total as f64 * 100.0)
}

/// `NoData` becomes JSON `null`; every statistic map serializes as an object.
fn metric_value(result: &MetricResult) -> Value {
    match result {
        MetricResult::NoData => Value::Null,
        MetricResult::Values(values) => json!(values),
    }
}

fn print_report_json(
    process: &str,
    total: usize,
    succeeded: usize,
    failed: usize,
    metrics: &BTreeMap<&'static str, MetricResult>,
) -> anyhow::Result<()> {
    let metrics_json: BTreeMap<&str, Value> = metrics
        .iter()
        .map(|(name, result)| (*name, metric_value(result)))
        .collect();

    let output = json!({
        "process": process,
        "total": total,
        "succeeded": succeeded,
        "failed": failed,
        "success_rate_percent": success_rate(succeeded, total),
        "metrics": metrics_json,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_report_human(
    process: &str,
    total: usize,
    succeeded: usize,
    failed: usize,
    metrics: &BTreeMap<&'static str, MetricResult>,
) {
    print_section_header(&format!("Report for {process}"));

    if total == 0 {
        println!("{}", "No measurements in this window".dimmed());
        println!();
        return;
    }

    println!("  Probes:  {} total", total.to_string().bold());
    println!("  Success: {succeeded}, failed: {failed}");
    if let Some(rate) = success_rate(succeeded, total) {
        println!("  Rate:    {}", colorize_rate(rate));
    }
    println!();

    for (name, result) in metrics {
        println!("{}", name.bold().underline());
        match result {
            MetricResult::NoData => println!("  {}", "no data".dimmed()),
            MetricResult::Values(values) => {
                for (statistic, value) in values {
                    println!("  {statistic:<8} {}", colorize_millis(*value));
                }
            }
        }
        println!();
    }
}
