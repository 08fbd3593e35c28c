use colored::Colorize;

use crate::application::config::AppConfig;
use crate::application::services::probe::ProbeRunner;

/// Probe one configured process once and print the outcome. The measurement
/// is recorded like any scheduled fire.
///
/// # Errors
///
/// Returns an error if `name` does not match a configured process.
pub async fn run_probe(runner: &ProbeRunner, config: &AppConfig, name: &str) -> anyhow::Result<()> {
    let entry = config
        .processes
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| anyhow::anyhow!("no configured process named '{name}'"))?;

    let (process, _) = entry.resolve();
    let measurement = runner.execute(&process).await;

    if measurement.success {
        let time = measurement
            .response_time_ms
            .map_or_else(String::new, |ms| format!(" in {ms} ms"));
        println!("{} {}{time}", "OK".green().bold(), process.name.bold());
    } else {
        let kind = measurement
            .failure
            .map_or_else(String::new, |k| k.to_string());
        println!("{} {} ({kind})", "FAILED".red().bold(), process.name.bold());
    }

    Ok(())
}
