use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// wpswatch — WPS quality-of-service monitor
///
/// Probes configured WPS processes on their schedules, records every
/// outcome, and reports response-time statistics.
#[derive(Parser, Debug)]
#[command(name = "wpswatch")]
#[command(version, about, long_about)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to custom config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the monitoring daemon
    #[command(alias = "d")]
    Daemon,

    /// Probe one configured process once and print the outcome
    #[command(alias = "p")]
    Probe {
        /// Name of the configured process
        process: String,
    },

    /// Report quality-of-service statistics for one process
    #[command(alias = "r")]
    Report {
        /// Name of the configured process
        process: String,

        /// Restrict to the most recent N measurements
        #[arg(long, conflicts_with = "hours")]
        last: Option<usize>,

        /// Restrict to the last N hours
        #[arg(long)]
        hours: Option<u64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
