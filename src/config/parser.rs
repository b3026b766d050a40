//! Configuration loading from the YAML config file

use crate::{
    cli::Cli,
    error::{AppError, Result},
    models::Config,
};
use std::fs;
use std::path::Path;

/// Configuration parser that reads the file named on the command line
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Read, deserialize, and validate the configuration
    pub fn parse(&self) -> Result<Config> {
        load_file(&self.cli.config_file)
    }
}

/// Load a configuration file from an explicit path
pub fn load_file(path: &Path) -> Result<Config> {
    let raw = fs::read_to_string(path).map_err(|e| {
        AppError::config(format!("cannot read config file '{}': {}", path.display(), e))
    })?;

    let config: Config = serde_yaml::from_str(&raw).map_err(|e| {
        AppError::config(format!("invalid config file '{}': {}", path.display(), e))
    })?;

    config.validate()?;
    Ok(config)
}

/// Convenience function for the common parse path
pub fn load_config(cli: &Cli) -> Result<Config> {
    ConfigParser::new(cli.clone()).parse()
}

/// Build a human-readable configuration summary for logging
pub fn display_config_summary(config: &Config) -> String {
    let targets: Vec<String> = config.mtr.ips.iter().map(|ip| ip.to_string()).collect();

    let mut summary = Vec::new();
    summary.push(format!("Targets: {}", targets.join(", ")));
    summary.push(format!("Runs per target: {}", config.mtr.runs));
    summary.push(format!("Report cycles: {}", config.mtr.cycles));
    summary.push(format!("Run timeout: {}s", config.mtr.timeout_seconds));
    summary.push(format!(
        "Output file: {}",
        config.prometheus.destination().display()
    ));
    summary.push(format!(
        "Staging file: {}",
        config.prometheus.staging().display()
    ));

    summary.join("\n")
}
