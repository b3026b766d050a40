//! Probe execution engine
//!
//! One worker task per target; the runs inside a worker are strictly
//! sequential so a target never probes itself concurrently. Workers are
//! joined once, before aggregation, which is the only synchronization
//! point in the pipeline.
//!
//! A failed run is captured as a [`RunFailure`] record and logged at warn
//! level; it never aborts the cycle or the other workers.

use crate::error::Result;
use crate::logging::Logger;
use crate::models::{FailureReason, RunFailure, RunOutcome, RunResult};
use crate::report::ReportParser;
use async_trait::async_trait;
use futures::future::join_all;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Seam between the collection pipeline and the actual probe process
#[async_trait]
pub trait ProbeRunner {
    /// Execute one probe run against `target`
    async fn run(&self, target: Ipv4Addr) -> RunOutcome;
}

/// Production runner that spawns the mtr binary
pub struct MtrRunner {
    binary: PathBuf,
    cycles: u32,
    timeout: Duration,
    parser: ReportParser,
}

impl MtrRunner {
    /// Create a runner for a located binary
    pub fn new(binary: PathBuf, cycles: u32, timeout: Duration) -> Result<Self> {
        Ok(Self {
            binary,
            cycles,
            timeout,
            parser: ReportParser::new()?,
        })
    }

    /// The exact command line a run will execute, for failure records and logs
    fn command_line(&self, target: Ipv4Addr) -> String {
        format!(
            "{} -4 --no-dns --report --report-cycles {} {}",
            self.binary.display(),
            self.cycles,
            target
        )
    }

    fn failure(
        &self,
        target: Ipv4Addr,
        reason: FailureReason,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    ) -> RunOutcome {
        RunOutcome::Failed(RunFailure {
            target,
            command: self.command_line(target),
            reason,
            exit_code,
            stdout,
            stderr,
        })
    }
}

#[async_trait]
impl ProbeRunner for MtrRunner {
    async fn run(&self, target: Ipv4Addr) -> RunOutcome {
        let mut command = Command::new(&self.binary);
        command
            .arg("-4")
            .arg("--no-dns")
            .arg("--report")
            .arg("--report-cycles")
            .arg(self.cycles.to_string())
            .arg(target.to_string())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(error)) => {
                return self.failure(
                    target,
                    FailureReason::Spawn,
                    None,
                    String::new(),
                    error.to_string(),
                );
            }
            // Dropping the future kills the child via kill_on_drop
            Err(_) => {
                return self.failure(
                    target,
                    FailureReason::Timeout,
                    None,
                    String::new(),
                    format!("no result within {} seconds", self.timeout.as_secs()),
                );
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return self.failure(
                target,
                FailureReason::NonZeroExit,
                output.status.code(),
                stdout,
                stderr,
            );
        }

        RunOutcome::Completed(RunResult {
            target,
            hops: self.parser.parse(&stdout),
        })
    }
}

/// Fans probe runs out across targets and gathers every outcome
pub struct TraceCollector {
    runner: Arc<dyn ProbeRunner + Send + Sync>,
    logger: Arc<Logger>,
    runs_per_target: u32,
}

impl TraceCollector {
    /// Create a collector over a shared runner
    pub fn new(
        runner: Arc<dyn ProbeRunner + Send + Sync>,
        logger: Arc<Logger>,
        runs_per_target: u32,
    ) -> Self {
        Self {
            runner,
            logger,
            runs_per_target,
        }
    }

    /// Run every configured probe and return all outcomes, grouped by target
    /// in configured order, runs in execution order within a target
    pub async fn collect(&self, targets: &[Ipv4Addr]) -> Result<Vec<RunOutcome>> {
        let mut workers = Vec::with_capacity(targets.len());

        for &target in targets {
            let runner = Arc::clone(&self.runner);
            let logger = Arc::clone(&self.logger);
            let runs = self.runs_per_target;

            workers.push(tokio::spawn(async move {
                let mut outcomes = Vec::with_capacity(runs as usize);
                for run in 1..=runs {
                    logger.debug(&format!("run {}/{} for {}", run, runs, target));
                    let outcome = runner.run(target).await;
                    if let RunOutcome::Failed(failure) = &outcome {
                        logger.warn(&failure.describe());
                        logger.debug(&format!(
                            "failure detail: {}",
                            serde_json::to_string(failure).unwrap_or_default()
                        ));
                    }
                    outcomes.push(outcome);
                }
                outcomes
            }));
        }

        let mut all = Vec::new();
        for joined in join_all(workers).await {
            all.extend(joined?);
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn addr(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    fn runner_for(binary: PathBuf, timeout: Duration) -> MtrRunner {
        MtrRunner::new(binary, 4, timeout).unwrap()
    }

    #[cfg(unix)]
    fn stub_script(dir: &std::path::Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("mtr");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[test]
    fn test_command_line() {
        let runner = runner_for(PathBuf::from("/usr/bin/mtr"), Duration::from_secs(60));
        assert_eq!(
            runner.command_line(addr("10.10.28.1")),
            "/usr/bin/mtr -4 --no-dns --report --report-cycles 4 10.10.28.1"
        );
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_successful_run_parses_report() {
        let dir = tempfile::tempdir().unwrap();
        let script = stub_script(
            dir.path(),
            "printf 'HOST: x  Loss%%   Snt   Last   Avg  Best  Wrst StDev\\n  1.|-- 10.10.28.1  0.0%%  4  5.8  11.9  5.8  16.8  5.6\\n'",
        );

        let runner = runner_for(script, Duration::from_secs(5));
        let outcome = runner.run(addr("10.10.28.1")).await;

        let result = outcome.completed().expect("run should complete");
        assert_eq!(result.target, addr("10.10.28.1"));
        assert_eq!(result.hops.len(), 1);
        assert_eq!(result.hops[0].average, 11.9);
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_zero_exit_with_unparsable_output() {
        let dir = tempfile::tempdir().unwrap();
        let script = stub_script(dir.path(), "echo 'mtr: something strange'");

        let runner = runner_for(script, Duration::from_secs(5));
        let outcome = runner.run(addr("1.1.1.1")).await;

        let result = outcome.completed().expect("zero exit is still a completion");
        assert!(result.hops.is_empty());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_non_zero_exit_captured() {
        let dir = tempfile::tempdir().unwrap();
        let script = stub_script(
            dir.path(),
            "echo 'partial output'; echo 'mtr: udp socket connect failed' >&2; exit 1",
        );

        let runner = runner_for(script, Duration::from_secs(5));
        let outcome = runner.run(addr("1.1.1.1")).await;

        let failure = outcome.failure().expect("non-zero exit must fail");
        assert_eq!(failure.reason, FailureReason::NonZeroExit);
        assert_eq!(failure.exit_code, Some(1));
        assert!(failure.stdout.contains("partial output"));
        assert!(failure.stderr.contains("udp socket connect failed"));
        assert!(failure.command.contains("--report-cycles 4 1.1.1.1"));
    }

    #[tokio::test]
    async fn test_spawn_failure_captured() {
        let runner = runner_for(PathBuf::from("/nonexistent/mtr"), Duration::from_secs(5));
        let outcome = runner.run(addr("1.1.1.1")).await;

        let failure = outcome.failure().expect("missing binary must fail");
        assert_eq!(failure.reason, FailureReason::Spawn);
        assert_eq!(failure.exit_code, None);
        assert!(!failure.stderr.is_empty());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_timeout_kills_run() {
        let dir = tempfile::tempdir().unwrap();
        let script = stub_script(dir.path(), "sleep 10");

        let runner = runner_for(script, Duration::from_millis(200));
        let outcome = runner.run(addr("1.1.1.1")).await;

        let failure = outcome.failure().expect("expiry must fail the run");
        assert_eq!(failure.reason, FailureReason::Timeout);
        assert_eq!(failure.exit_code, None);
    }

    /// Scripted runner that pops pre-baked outcomes per target
    struct ScriptedRunner {
        outcomes: Mutex<HashMap<Ipv4Addr, Vec<RunOutcome>>>,
    }

    impl ScriptedRunner {
        fn new(outcomes: HashMap<Ipv4Addr, Vec<RunOutcome>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes),
            }
        }
    }

    #[async_trait]
    impl ProbeRunner for ScriptedRunner {
        async fn run(&self, target: Ipv4Addr) -> RunOutcome {
            let mut outcomes = self.outcomes.lock().unwrap();
            outcomes
                .get_mut(&target)
                .and_then(|queue| {
                    if queue.is_empty() {
                        None
                    } else {
                        Some(queue.remove(0))
                    }
                })
                .unwrap_or_else(|| panic!("unexpected run for {}", target))
        }
    }

    fn completed(target: &str, average: f64) -> RunOutcome {
        RunOutcome::Completed(RunResult {
            target: addr(target),
            hops: vec![crate::models::HopRecord {
                ip_addr: addr(target),
                loss: 0.0,
                sent: 4,
                last: average,
                average,
                best: average,
                worst: average,
                stdev: 0.0,
            }],
        })
    }

    fn failed(target: &str) -> RunOutcome {
        RunOutcome::Failed(RunFailure {
            target: addr(target),
            command: format!("mtr -4 --no-dns --report --report-cycles 4 {}", target),
            reason: FailureReason::NonZeroExit,
            exit_code: Some(1),
            stdout: String::new(),
            stderr: String::new(),
        })
    }

    #[tokio::test]
    async fn test_collect_groups_by_target_in_order() {
        let mut script = HashMap::new();
        script.insert(
            addr("10.0.0.1"),
            vec![completed("10.0.0.1", 1.0), completed("10.0.0.1", 2.0)],
        );
        script.insert(
            addr("10.0.0.2"),
            vec![completed("10.0.0.2", 3.0), completed("10.0.0.2", 4.0)],
        );

        let collector = TraceCollector::new(
            Arc::new(ScriptedRunner::new(script)),
            Arc::new(Logger::with_flags("test", false, false, false)),
            2,
        );
        let outcomes = collector
            .collect(&[addr("10.0.0.1"), addr("10.0.0.2")])
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 4);
        let targets: Vec<Ipv4Addr> = outcomes
            .iter()
            .map(|o| o.completed().unwrap().target)
            .collect();
        assert_eq!(
            targets,
            vec![
                addr("10.0.0.1"),
                addr("10.0.0.1"),
                addr("10.0.0.2"),
                addr("10.0.0.2")
            ]
        );

        // Runs within one target surface in execution order
        let averages: Vec<f64> = outcomes
            .iter()
            .map(|o| o.completed().unwrap().hops[0].average)
            .collect();
        assert_eq!(averages, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[tokio::test]
    async fn test_collect_keeps_failures_as_data() {
        let mut script = HashMap::new();
        script.insert(
            addr("10.0.0.1"),
            vec![failed("10.0.0.1"), completed("10.0.0.1", 7.0)],
        );

        let collector = TraceCollector::new(
            Arc::new(ScriptedRunner::new(script)),
            Arc::new(Logger::with_flags("test", false, false, false)),
            2,
        );
        let outcomes = collector.collect(&[addr("10.0.0.1")]).await.unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].failure().is_some());
        assert!(outcomes[1].completed().is_some());
    }

    #[tokio::test]
    async fn test_collect_with_no_targets() {
        let collector = TraceCollector::new(
            Arc::new(ScriptedRunner::new(HashMap::new())),
            Arc::new(Logger::with_flags("test", false, false, false)),
            1,
        );
        let outcomes = collector.collect(&[]).await.unwrap();
        assert!(outcomes.is_empty());
    }
}
