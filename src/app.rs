//! Main application orchestration and execution

use crate::{
    cli::Cli,
    config::{display_config_summary, load_config, validate_config, ValidationLevel},
    error::{AppError, Result},
    executor::{MtrRunner, TraceCollector},
    locate,
    logging::Logger,
    models::Config,
    promfile::{self, PromFile},
    stats::TraceAccumulator,
};
use std::sync::Arc;

/// Main application struct that coordinates all components
#[derive(Debug)]
pub struct App {
    cli: Cli,
    logger: Arc<Logger>,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Result<Self> {
        cli.validate()?;

        let logger = Arc::new(Logger::with_flags(
            "ping-stats",
            cli.verbose,
            cli.debug,
            cli.use_colors(),
        ));

        Ok(Self { cli, logger })
    }

    /// Run one measure-and-publish cycle
    pub async fn run(self) -> Result<()> {
        let config = load_config(&self.cli)?;
        self.log_startup(&config)?;

        let binary = locate::find_binary(crate::defaults::MTR_BINARY).ok_or_else(|| {
            AppError::binary_not_found(format!(
                "'{}' not found in PATH; install mtr and try again",
                crate::defaults::MTR_BINARY
            ))
        })?;
        self.logger
            .debug(&format!("probe binary: {}", binary.display()));

        let promfile = PromFile::new(&config.prometheus);
        promfile.prepare()?;

        let runner = Arc::new(MtrRunner::new(
            binary,
            config.mtr.cycles,
            config.mtr.timeout(),
        )?);
        let collector = TraceCollector::new(runner, Arc::clone(&self.logger), config.mtr.runs);

        let outcomes = collector.collect(&config.mtr.ips).await?;
        let completed = outcomes
            .iter()
            .filter(|outcome| outcome.completed().is_some())
            .count();
        self.logger
            .info(&format!("{}/{} runs completed", completed, outcomes.len()));

        let mut accumulator = TraceAccumulator::new();
        accumulator.add_all(&outcomes);
        let aggregate = accumulator.finish();

        if aggregate.is_empty() {
            self.logger
                .warn("no run produced stats this cycle; publishing an empty file");
        }

        promfile.publish(&promfile::render(&aggregate)).await?;
        self.logger.info(&format!(
            "published stats for {} addresses to {}",
            aggregate.len(),
            promfile.destination().display()
        ));

        Ok(())
    }

    /// Log version, config summary, and lint findings before probing starts
    fn log_startup(&self, config: &Config) -> Result<()> {
        self.logger
            .info(&format!("ping-stats v{}", crate::VERSION));

        if self.cli.debug {
            for line in display_config_summary(config).lines() {
                self.logger.debug(line);
            }
        }

        let warnings = validate_config(config)?;
        for warning in &warnings {
            match warning.level {
                ValidationLevel::Warning => self.logger.warn(&warning.message),
                ValidationLevel::Info => self.logger.info(&warning.message),
            }
        }

        Ok(())
    }
}
