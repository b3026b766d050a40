//! Configuration lint checks beyond structural validation

use crate::{error::Result, models::Config};
use std::collections::BTreeSet;

/// Configuration validator with advisory lint rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration and collect non-fatal warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        let mut warnings = Vec::new();

        // Structural validation first; lint checks assume a well-formed config
        config.validate()?;

        warnings.extend(Self::check_targets(config));
        warnings.extend(Self::check_probe_volume(config));
        warnings.extend(Self::check_output_paths(config));

        Ok(warnings)
    }

    fn check_targets(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        let mut seen = BTreeSet::new();
        for ip in &config.mtr.ips {
            if !seen.insert(ip) {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!(
                        "target {} is listed more than once; its runs are averaged together",
                        ip
                    ),
                ));
            }
        }

        for ip in &config.mtr.ips {
            if ip.is_loopback() {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("target {} is a loopback address", ip),
                ));
            }
        }

        warnings
    }

    fn check_probe_volume(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        let targets = config.mtr.ips.len() as u64;
        let total = targets * u64::from(config.mtr.runs) * u64::from(config.mtr.cycles);
        if total > 1_000 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "{} probe cycles per invocation ({} targets x {} runs x {} cycles); \
                     each cycle takes roughly one second",
                    total,
                    targets,
                    config.mtr.runs,
                    config.mtr.cycles
                ),
            ));
        }

        // mtr paces one probe per second, so a run needs at least `cycles` seconds
        if config.mtr.timeout_seconds <= u64::from(config.mtr.cycles) {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "run timeout of {}s leaves no headroom for {} report cycles",
                    config.mtr.timeout_seconds, config.mtr.cycles
                ),
            ));
        }

        warnings
    }

    fn check_output_paths(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.prometheus.staging() == config.prometheus.destination() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "staging file and output file are the same path ({}); \
                     readers may observe partial writes",
                    config.prometheus.destination().display()
                ),
            ));
        } else if config.prometheus.temp_filepath != config.prometheus.filepath {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "staging directory {} differs from output directory {}; \
                     the final rename fails if they are on different filesystems",
                    config.prometheus.temp_filepath.display(),
                    config.prometheus.filepath.display()
                ),
            ));
        }

        warnings
    }
}

/// Severity of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

/// A non-fatal finding about the configuration
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self) -> String {
        format!("[{}] {}", self.level.as_str(), self.message)
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
