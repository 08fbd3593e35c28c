use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use wpswatch::application::config::AppConfig;
use wpswatch::application::event_bus::EventBus;
use wpswatch::application::services::probe::ProbeRunner;
use wpswatch::application::services::scheduler::Scheduler;
use wpswatch::domain::ports::store::MeasurementStore;
use wpswatch::domain::ports::transport::WpsTransport;
use wpswatch::infrastructure::persistence::sqlite_store::SqliteStore;
use wpswatch::infrastructure::wps::HttpWpsTransport;
use wpswatch::presentation::cli::app::{Cli, Commands};
use wpswatch::presentation::cli::commands::daemon::run_daemon;
use wpswatch::presentation::cli::commands::probe::run_probe;
use wpswatch::presentation::cli::commands::report::run_report;

fn print_banner() {
    println!("{}", "━".repeat(40).cyan());
    println!("{}", "  WPSWATCH — WPS QoS Monitor".bold().cyan());
    println!("{}", "━".repeat(40).cyan());
}

fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    // Load configuration
    let config = if let Some(ref path) = cli.config {
        AppConfig::load_from(path)?
    } else {
        AppConfig::load()?
    };

    // Manual DI — main.rs is the only place that knows concrete types
    let store: Arc<dyn MeasurementStore> = Arc::new(SqliteStore::new(&config.database.path)?);
    let transport: Arc<dyn WpsTransport> = Arc::new(HttpWpsTransport::new(Duration::from_secs(
        config.probe.timeout_secs,
    ))?);

    match cli.command {
        Some(Commands::Daemon) | None => {
            let bus = Arc::new(EventBus::new());
            let scheduler = Scheduler::new(transport, store, bus.clone());
            print_banner();
            run_daemon(&scheduler, &bus, &config).await?;
        }
        Some(Commands::Probe { process }) => {
            let runner = ProbeRunner::new(transport, store);
            run_probe(&runner, &config, &process).await?;
        }
        Some(Commands::Report {
            process,
            last,
            hours,
            json,
        }) => {
            run_report(&*store, &process, last, hours, json)?;
        }
    }

    Ok(())
}
