//! ping-stats
//!
//! Wraps the mtr network probe to gather per-target latency and loss
//! statistics, averages them across repeated report runs, and publishes
//! the result in Prometheus exposition format for the node-exporter
//! textfile collector.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod locate;
pub mod logging;
pub mod models;
pub mod promfile;
pub mod report;
pub mod stats;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use executor::{MtrRunner, ProbeRunner, TraceCollector};
pub use models::{Config, HopRecord, RunFailure, RunOutcome, RunResult, Stat};
pub use promfile::PromFile;
pub use report::ReportParser;
pub use stats::{TraceAccumulator, TraceAggregate};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
    pub const DEFAULT_RUNS_PER_TARGET: u32 = 1;
    pub const DEFAULT_REPORT_CYCLES: u32 = 4;
    pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(60);

    /// Name of the probe binary searched for in PATH
    pub const MTR_BINARY: &str = "mtr";
}
