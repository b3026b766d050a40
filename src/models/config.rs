//! Configuration data model and validation
//!
//! Mirrors the YAML layout: an `mtr` section describing what to probe and a
//! `prometheus` section describing where the exposition file goes. Unknown
//! keys are rejected so typos surface at startup instead of silently running
//! with defaults.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Probe targets and run shape
    pub mtr: MtrSection,

    /// Textfile collector publication paths
    pub prometheus: PrometheusSection,
}

/// The `mtr` section of the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MtrSection {
    /// Target IPv4 addresses; one concurrent probe worker per entry
    pub ips: Vec<Ipv4Addr>,

    /// Report runs per target within one collection cycle
    #[serde(default = "default_runs")]
    pub runs: u32,

    /// Probe cycles per run, passed as --report-cycles
    #[serde(default = "default_cycles")]
    pub cycles: u32,

    /// Wall-clock budget per run; expiry counts as an ordinary run failure
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,
}

/// The `prometheus` section of the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrometheusSection {
    /// Directory scraped by the node-exporter textfile collector
    pub filepath: PathBuf,

    /// Name of the published exposition file
    pub filename: String,

    /// Directory for the staging copy; keep it on the same filesystem as
    /// `filepath` so the final rename stays atomic
    pub temp_filepath: PathBuf,

    /// Name of the staging file; defaults to `filename`
    #[serde(default)]
    pub temp_filename: Option<String>,
}

impl MtrSection {
    /// Get the per-run timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl PrometheusSection {
    /// Effective name of the staging file
    pub fn temp_filename(&self) -> &str {
        self.temp_filename.as_deref().unwrap_or(&self.filename)
    }

    /// Full path of the published exposition file
    pub fn destination(&self) -> PathBuf {
        self.filepath.join(&self.filename)
    }

    /// Full path of the staging file
    pub fn staging(&self) -> PathBuf {
        self.temp_filepath.join(self.temp_filename())
    }
}

impl Config {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.mtr.ips.is_empty() {
            return Err(AppError::validation("Target list (mtr.ips) cannot be empty"));
        }

        if self.mtr.runs == 0 {
            return Err(AppError::validation("Run count must be greater than 0"));
        }

        if self.mtr.runs > 100 {
            return Err(AppError::validation("Run count cannot exceed 100"));
        }

        if self.mtr.cycles == 0 {
            return Err(AppError::validation("Report cycle count must be greater than 0"));
        }

        if self.mtr.cycles > 100 {
            return Err(AppError::validation("Report cycle count cannot exceed 100"));
        }

        if self.mtr.timeout_seconds == 0 {
            return Err(AppError::validation("Timeout must be greater than 0"));
        }

        if self.mtr.timeout_seconds > 600 {
            return Err(AppError::validation("Timeout cannot exceed 600 seconds"));
        }

        if self.prometheus.filepath.as_os_str().is_empty() {
            return Err(AppError::validation("Publication directory (prometheus.filepath) cannot be empty"));
        }

        if self.prometheus.temp_filepath.as_os_str().is_empty() {
            return Err(AppError::validation("Staging directory (prometheus.temp_filepath) cannot be empty"));
        }

        validate_filename("prometheus.filename", &self.prometheus.filename)?;
        if let Some(name) = &self.prometheus.temp_filename {
            validate_filename("prometheus.temp_filename", name)?;
        }

        Ok(())
    }
}

fn validate_filename(key: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(AppError::validation(format!("{} cannot be empty", key)));
    }
    if name.contains(std::path::MAIN_SEPARATOR) || name.contains('/') {
        return Err(AppError::validation(format!(
            "{} must be a bare file name, got a path: {}",
            key, name
        )));
    }
    Ok(())
}

// Default value functions for serde
fn default_runs() -> u32 {
    crate::defaults::DEFAULT_RUNS_PER_TARGET
}

fn default_cycles() -> u32 {
    crate::defaults::DEFAULT_REPORT_CYCLES
}

fn default_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_RUN_TIMEOUT.as_secs()
}
