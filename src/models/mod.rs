//! Data models and structures for the ping-stats collector

pub mod config;
pub mod trace;

// Re-export main model types
pub use config::{Config, MtrSection, PrometheusSection};
pub use trace::{FailureReason, HopRecord, RunFailure, RunOutcome, RunResult, Stat};
