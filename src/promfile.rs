//! Prometheus textfile exposition and atomic publication
//!
//! Rendering is deterministic: addresses ascend numerically, metrics follow
//! report column order, every value carries exactly one decimal. Publication
//! is two-phase (staging write, then rename) so the node-exporter textfile
//! collector can never observe a half-written file; keep the staging
//! directory on the destination filesystem or the rename stops being atomic.

use crate::error::{AppError, Result};
use crate::models::PrometheusSection;
use crate::stats::TraceAggregate;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Metric family name of every exposition line
pub const METRIC_NAME: &str = "ping_stats";

/// Render an aggregate as exposition text, one line per (address, metric)
pub fn render(aggregate: &TraceAggregate) -> String {
    let mut lines = Vec::new();
    for (addr, stats) in aggregate.iter() {
        for (stat, value) in stats {
            lines.push(format!(
                "{}{{ip_addr=\"{}\", stat=\"{}\"}} {:.1}",
                METRIC_NAME,
                addr,
                stat.as_str(),
                value
            ));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Publication paths for the exposition file
pub struct PromFile {
    dest_dir: PathBuf,
    temp_dir: PathBuf,
    destination: PathBuf,
    staging: PathBuf,
}

impl PromFile {
    /// Build from the `prometheus` configuration section
    pub fn new(section: &PrometheusSection) -> Self {
        Self {
            dest_dir: section.filepath.clone(),
            temp_dir: section.temp_filepath.clone(),
            destination: section.destination(),
            staging: section.staging(),
        }
    }

    /// Final path readers scrape
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Path of the staging copy
    pub fn staging(&self) -> &Path {
        &self.staging
    }

    /// Create the publication and staging directories
    ///
    /// Existing directories are fine; a missing parent or a permission
    /// problem is fatal, so a typo'd path fails loudly at startup instead of
    /// materializing a surprise directory tree.
    pub fn prepare(&self) -> Result<()> {
        create_publish_dir(&self.dest_dir)?;
        create_publish_dir(&self.temp_dir)?;
        Ok(())
    }

    /// Two-phase atomic publication
    ///
    /// If the staging write fails the previous published file stays
    /// untouched and authoritative.
    pub async fn publish(&self, content: &str) -> Result<()> {
        tokio::fs::write(&self.staging, content).await.map_err(|error| {
            AppError::io(format!(
                "failed to write staging file {}: {}",
                self.staging.display(),
                error
            ))
        })?;

        tokio::fs::rename(&self.staging, &self.destination)
            .await
            .map_err(|error| {
                AppError::io(format!(
                    "failed to move {} to {}: {}",
                    self.staging.display(),
                    self.destination.display(),
                    error
                ))
            })?;

        Ok(())
    }
}

fn create_publish_dir(dir: &Path) -> Result<()> {
    match build_dir(dir) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == ErrorKind::AlreadyExists => {
            if dir.is_dir() {
                Ok(())
            } else {
                Err(AppError::io(format!(
                    "{} exists but is not a directory",
                    dir.display()
                )))
            }
        }
        Err(error) if error.kind() == ErrorKind::NotFound => Err(AppError::io(format!(
            "parent directory for {} does not exist",
            dir.display()
        ))),
        Err(error) => Err(AppError::io(format!(
            "could not create {}: {}",
            dir.display(),
            error
        ))),
    }
}

#[cfg(unix)]
fn build_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new().mode(0o755).create(dir)
}

#[cfg(not(unix))]
fn build_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::DirBuilder::new().create(dir)
}
