//! Data model for probe runs and parsed report rows

use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;

/// Metric columns of a report row, in canonical exposition order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    Loss,
    Sent,
    Last,
    Average,
    Best,
    Worst,
    Stdev,
}

impl Stat {
    /// All metrics in canonical order
    pub const ALL: [Stat; 7] = [
        Stat::Loss,
        Stat::Sent,
        Stat::Last,
        Stat::Average,
        Stat::Best,
        Stat::Worst,
        Stat::Stdev,
    ];

    /// Label used in the exposition output
    pub fn as_str(&self) -> &'static str {
        match self {
            Stat::Loss => "loss",
            Stat::Sent => "sent",
            Stat::Last => "last",
            Stat::Average => "average",
            Stat::Best => "best",
            Stat::Worst => "worst",
            Stat::Stdev => "stdev",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One matched row of an mtr report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HopRecord {
    /// Responding hop address
    pub ip_addr: Ipv4Addr,
    /// Packet loss percentage (the `%` sign is stripped during parsing)
    pub loss: f64,
    /// Probes sent to this hop
    pub sent: u64,
    /// Round-trip time of the last probe, milliseconds
    pub last: f64,
    /// Mean round-trip time, milliseconds
    pub average: f64,
    /// Best round-trip time, milliseconds
    pub best: f64,
    /// Worst round-trip time, milliseconds
    pub worst: f64,
    /// Round-trip standard deviation, milliseconds
    pub stdev: f64,
}

impl HopRecord {
    /// Metric values in canonical order, `sent` widened to f64
    pub fn stats(&self) -> [(Stat, f64); 7] {
        [
            (Stat::Loss, self.loss),
            (Stat::Sent, self.sent as f64),
            (Stat::Last, self.last),
            (Stat::Average, self.average),
            (Stat::Best, self.best),
            (Stat::Worst, self.worst),
            (Stat::Stdev, self.stdev),
        ]
    }
}

/// Why a probe run produced no report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The child ran but exited non-zero
    NonZeroExit,
    /// The child could not be spawned at all
    Spawn,
    /// The wall-clock budget expired and the child was killed
    Timeout,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::NonZeroExit => "non-zero exit",
            FailureReason::Spawn => "spawn failed",
            FailureReason::Timeout => "timed out",
        }
    }
}

/// Structured record of a failed probe run
///
/// Failures are data, not errors: one target being unreachable must never
/// take down the collection cycle for the others.
#[derive(Debug, Clone, Serialize)]
pub struct RunFailure {
    /// Target the run was probing
    pub target: Ipv4Addr,
    /// Exact command line that was executed
    pub command: String,
    /// Failure classification
    pub reason: FailureReason,
    /// Child exit code; None when killed by a signal or timed out
    pub exit_code: Option<i32>,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
}

impl RunFailure {
    /// One-line description for warn-level logging
    pub fn describe(&self) -> String {
        match self.exit_code {
            Some(code) => format!(
                "run for {} {} (exit code {}): {}",
                self.target,
                self.reason.as_str(),
                code,
                self.command
            ),
            None => format!(
                "run for {} {}: {}",
                self.target,
                self.reason.as_str(),
                self.command
            ),
        }
    }
}

/// Parsed output of one successful probe run
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// Target the run was probing
    pub target: Ipv4Addr,
    /// All matched report rows, in report order
    pub hops: Vec<HopRecord>,
}

impl RunResult {
    /// The final matched hop, i.e. the row describing the deepest point the
    /// trace reached (the target itself when the trace completed)
    pub fn target_hop(&self) -> Option<&HopRecord> {
        self.hops.last()
    }
}

/// Outcome of one probe run
#[derive(Debug, Clone, Serialize)]
pub enum RunOutcome {
    /// The child exited zero and its report was parsed
    Completed(RunResult),
    /// The child failed; the record keeps everything needed for diagnosis
    Failed(RunFailure),
}

impl RunOutcome {
    /// Borrow the completed result, if any
    pub fn completed(&self) -> Option<&RunResult> {
        match self {
            RunOutcome::Completed(result) => Some(result),
            RunOutcome::Failed(_) => None,
        }
    }

    /// Borrow the failure record, if any
    pub fn failure(&self) -> Option<&RunFailure> {
        match self {
            RunOutcome::Completed(_) => None,
            RunOutcome::Failed(failure) => Some(failure),
        }
    }
}
