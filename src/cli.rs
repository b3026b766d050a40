//! Command-line interface

use crate::error::{AppError, Result};
use clap::Parser;
use std::path::PathBuf;

/// Version string shown by `--version`, including build metadata
const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("GIT_COMMIT"),
    ", built ",
    env!("BUILD_TIME"),
    ")"
);

/// Gather per-target latency and loss statistics over mtr report runs and
/// publish them for the node-exporter textfile collector
#[derive(Parser, Debug, Clone)]
#[command(name = "ping-stats")]
#[command(version, long_version = LONG_VERSION, about, long_about = None)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short = 'c', long, value_name = "FILE", default_value = crate::defaults::DEFAULT_CONFIG_FILE)]
    pub config_file: PathBuf,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output (implies --verbose)
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<()> {
        if self.color && self.no_color {
            return Err(AppError::validation(
                "Cannot specify both --color and --no-color",
            ));
        }

        let path = &self.config_file;
        if !path.is_file() {
            return Err(AppError::validation(format!(
                "Configuration file {} does not exist or is not a file",
                path.display()
            )));
        }

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => {}
            _ => {
                return Err(AppError::validation(format!(
                    "Configuration file {} must have a .yaml or .yml extension",
                    path.display()
                )));
            }
        }

        std::fs::File::open(path).map_err(|error| {
            AppError::validation(format!(
                "Configuration file {} is not readable: {}",
                path.display(),
                error
            ))
        })?;

        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    cfg!(unix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(dir: &std::path::Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "mtr:\n  ips:\n    - 1.1.1.1").unwrap();
        path
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["ping-stats"]);
        assert_eq!(cli.config_file, PathBuf::from("config.yaml"));
        assert!(!cli.verbose);
        assert!(!cli.debug);
        assert!(!cli.color);
        assert!(!cli.no_color);
    }

    #[test]
    fn test_cli_all_options() {
        let cli = Cli::parse_from([
            "ping-stats",
            "--config-file",
            "/etc/ping-stats/config.yaml",
            "--verbose",
            "--debug",
            "--no-color",
        ]);

        assert_eq!(cli.config_file, PathBuf::from("/etc/ping-stats/config.yaml"));
        assert!(cli.verbose);
        assert!(cli.debug);
        assert!(cli.no_color);
    }

    #[test]
    fn test_short_config_flag() {
        let cli = Cli::parse_from(["ping-stats", "-c", "local.yml"]);
        assert_eq!(cli.config_file, PathBuf::from("local.yml"));
    }

    #[test]
    fn test_conflicting_color_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "config.yaml");

        let mut cli = Cli::parse_from(["ping-stats", "--color", "--no-color"]);
        cli.config_file = path;
        let error = cli.validate().unwrap_err();
        assert!(error.to_string().contains("--no-color"));
    }

    #[test]
    fn test_validate_missing_file() {
        let cli = Cli::parse_from(["ping-stats", "-c", "/definitely/not/here.yaml"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_validate_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "config.txt");

        let mut cli = Cli::parse_from(["ping-stats"]);
        cli.config_file = path;
        let error = cli.validate().unwrap_err();
        assert!(error.to_string().contains(".yaml or .yml"));
    }

    #[test]
    fn test_validate_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();

        let mut cli = Cli::parse_from(["ping-stats"]);
        cli.config_file = dir.path().to_path_buf();
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_yaml_and_yml() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["config.yaml", "config.yml"] {
            let path = write_config(dir.path(), name);
            let mut cli = Cli::parse_from(["ping-stats"]);
            cli.config_file = path;
            assert!(cli.validate().is_ok(), "{} should validate", name);
        }
    }

    #[test]
    fn test_use_colors_flags() {
        let cli = Cli::parse_from(["ping-stats", "--no-color"]);
        assert!(!cli.use_colors());

        let cli = Cli::parse_from(["ping-stats", "--color"]);
        assert!(cli.use_colors());
    }

    #[test]
    fn test_long_version_carries_build_info() {
        assert!(LONG_VERSION.contains(env!("CARGO_PKG_VERSION")));
        assert!(LONG_VERSION.contains("commit"));
    }
}
