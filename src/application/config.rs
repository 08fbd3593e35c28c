use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::entities::process::MonitoredProcess;
use crate::domain::entities::retention::RetentionPolicy;
use crate::domain::entities::trigger::{IntervalUnit, TriggerConfig};

/// Top-level application configuration loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub processes: Vec<ProcessConfig>,
}

/// Probe transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Bounded wait per probe, covering connection and response.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// How long measurements are kept, and how often cleanup runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u64,
    #[serde(default = "default_cleanup_cadence")]
    pub cleanup_cadence_secs: u64,
}

/// Database storage path (tilde-expanded at point of use).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
}

/// One monitored process: where it lives, what to send, how often to probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessConfig {
    pub name: String,
    pub endpoint: String,
    pub identifier: String,
    /// The execute request document to post on every probe.
    pub request: String,
    #[serde(default = "default_every")]
    pub every: u64,
    #[serde(default = "default_unit")]
    pub unit: IntervalUnit,
    #[serde(default)]
    pub start: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub end: Option<chrono::DateTime<chrono::Utc>>,
}

// --- Defaults ---

const fn default_timeout() -> u64 {
    30
}

const fn default_max_age_hours() -> u64 {
    24 * 30
}

const fn default_cleanup_cadence() -> u64 {
    3600
}

// NOTE: Stored as raw string with tilde — expand with shellexpand at point of use.
fn default_database_path() -> String {
    "~/.local/share/wpswatch/wpswatch.db".into()
}

const fn default_every() -> u64 {
    5
}

const fn default_unit() -> IntervalUnit {
    IntervalUnit::Minute
}

// --- Default impls ---

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_age_hours: default_max_age_hours(),
            cleanup_cadence_secs: default_cleanup_cadence(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

// --- AppConfig methods ---

impl AppConfig {
    /// Load config from default path or create default config file
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined,
    /// the file cannot be read, or the TOML content is invalid.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_or_create(&path)
    }

    /// Load from a specific path, or create a default config file if missing
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is invalid,
    /// or the default config file cannot be written.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Load from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML content is invalid.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save config to a specific path, creating parent directories if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created,
    /// serialization fails, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// The retention policy described by this configuration.
    #[must_use]
    pub const fn retention_policy(&self) -> RetentionPolicy {
        RetentionPolicy::from_hours(self.retention.max_age_hours)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("wpswatch").join("config.toml"))
    }
}

impl ProcessConfig {
    /// Split the config entry into its domain halves: the process to probe
    /// and the trigger that drives it.
    #[must_use]
    pub fn resolve(&self) -> (MonitoredProcess, TriggerConfig) {
        let process = MonitoredProcess::new(
            &self.name,
            &self.endpoint,
            &self.identifier,
            &self.request,
        );
        let trigger = TriggerConfig {
            every: self.every,
            unit: self.unit,
            start: self.start,
            end: self.end,
        };
        (process, trigger)
    }
}
