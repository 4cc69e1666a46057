/*
 *  Copyright 2025-2026 Colliery Software
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! Pool supervisor.
//!
//! Spawns, stops and tracks N worker processes as independent detached OS
//! processes. Each worker runs in its own process group so a stop signal
//! reaches the whole group, with stdout/stderr redirected to per-worker log
//! files. PIDs are persisted in a [`WorkerRegistry`] so the supervisor
//! recovers across its own restarts; liveness queries prune PIDs whose
//! processes are gone.

pub mod probe;
pub mod registry;

pub use probe::{ProcessProbe, SysinfoProbe};
pub use registry::WorkerRegistry;

use std::fs::File;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::error::SupervisorError;

/// How long the stop protocol waits for graceful exits before escalating.
const STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// Liveness poll interval during the stop wait.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// The command a spawned worker process runs.
///
/// This is the only contract between the supervisor and its workers: a
/// program plus arguments that, when invoked, runs the worker loop until
/// shutdown.
#[derive(Debug, Clone)]
pub struct WorkerCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

/// Supervisor for a pool of worker processes.
pub struct WorkerPool {
    registry: WorkerRegistry,
    log_dir: PathBuf,
    probe: Arc<dyn ProcessProbe>,
}

impl WorkerPool {
    /// Creates a supervisor over the given registry and log directory.
    pub fn new(
        registry: WorkerRegistry,
        log_dir: impl Into<PathBuf>,
        probe: Arc<dyn ProcessProbe>,
    ) -> Self {
        Self {
            registry,
            log_dir: log_dir.into(),
            probe,
        }
    }

    /// Launches `count` detached worker processes and registers their PIDs
    /// alongside any already-running ones.
    ///
    /// Each worker gets its own process group and its own pair of log files
    /// (`jobq-worker-<i>.stdout.log` / `.stderr.log`) in the log directory.
    pub fn start(&self, count: usize, command: &WorkerCommand) -> Result<Vec<u32>, SupervisorError> {
        let mut pids = self.registry.load()?;
        let mut started = Vec::with_capacity(count);

        for i in 0..count {
            let stdout_log = File::create(self.log_dir.join(format!("jobq-worker-{i}.stdout.log")))?;
            let stderr_log = File::create(self.log_dir.join(format!("jobq-worker-{i}.stderr.log")))?;

            let mut cmd = Command::new(&command.program);
            cmd.args(&command.args)
                .stdin(Stdio::null())
                .stdout(stdout_log)
                .stderr(stderr_log);

            // Give the worker its own process group so the stop signal can
            // be delivered to everything it spawns, not just the worker.
            #[cfg(unix)]
            {
                use std::os::unix::process::CommandExt;
                cmd.process_group(0);
            }

            let child = cmd.spawn()?;
            let pid = child.id();
            info!(pid, worker = i, "Started worker process");
            pids.push(pid);
            started.push(pid);
        }

        self.registry.save(&pids)?;
        Ok(started)
    }

    /// Stops all registered workers.
    ///
    /// Sends SIGTERM to every registered process group, polls liveness every
    /// 0.5 s for up to 10 s, force-kills stragglers, and persists an empty
    /// registry regardless of outcome; a process that ignores even SIGKILL
    /// is not retried further.
    pub fn stop(&self) -> Result<StopReport, SupervisorError> {
        let pids = self.registry.load()?;
        if pids.is_empty() {
            return Ok(StopReport::default());
        }

        let mut report = StopReport {
            signalled: pids.len(),
            ..Default::default()
        };

        for &pid in &pids {
            match signal_group(pid, "TERM") {
                Ok(()) => info!(pid, "Sent graceful stop signal"),
                Err(e) => warn!(pid, error = %e, "Failed to signal worker"),
            }
        }

        let deadline = Instant::now() + STOP_TIMEOUT;
        while Instant::now() < deadline {
            if self.alive(&pids).is_empty() {
                break;
            }
            std::thread::sleep(STOP_POLL_INTERVAL);
        }

        let stragglers = self.alive(&pids);
        if !stragglers.is_empty() {
            warn!(
                count = stragglers.len(),
                "Workers did not shut down gracefully; forcing stop"
            );
            for &pid in &stragglers {
                if let Err(e) = signal_group(pid, "KILL") {
                    warn!(pid, error = %e, "Failed to force-kill worker");
                }
            }
            report.forced = stragglers.len();
        }

        // Best-effort cleanup: whatever survived, the registry is done
        // tracking it.
        self.registry.save(&[])?;
        Ok(report)
    }

    /// Counts live workers, pruning dead PIDs from the registry.
    pub fn live_worker_count(&self) -> Result<usize, SupervisorError> {
        let pids = self.registry.load()?;
        let alive = self.alive(&pids);
        if alive.len() != pids.len() {
            self.registry.save(&alive)?;
        }
        Ok(alive.len())
    }

    fn alive(&self, pids: &[u32]) -> Vec<u32> {
        pids.iter()
            .copied()
            .filter(|&pid| self.probe.is_running(pid))
            .collect()
    }
}

/// What a stop run did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StopReport {
    /// Workers that received the graceful signal
    pub signalled: usize,
    /// Workers that had to be force-killed after the wait window
    pub forced: usize,
}

/// Delivers a signal to a worker's process group via `kill(1)`.
///
/// The negative PID addresses the whole group the worker was started in.
fn signal_group(pid: u32, signal: &str) -> Result<(), SupervisorError> {
    let output = Command::new("kill")
        .arg(format!("-{signal}"))
        .arg("--")
        .arg(format!("-{pid}"))
        .output()
        .map_err(SupervisorError::Spawn)?;

    if !output.status.success() {
        return Err(SupervisorError::Signal {
            pid,
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProbe {
        alive: Vec<u32>,
    }

    impl ProcessProbe for FixedProbe {
        fn is_running(&self, pid: u32) -> bool {
            self.alive.contains(&pid)
        }
    }

    fn pool_with(dir: &tempfile::TempDir, alive: Vec<u32>) -> WorkerPool {
        WorkerPool::new(
            WorkerRegistry::new(dir.path().join("workers.json")),
            dir.path(),
            Arc::new(FixedProbe { alive }),
        )
    }

    #[test]
    fn test_status_prunes_dead_pids() {
        let dir = tempfile::tempdir().unwrap();
        let pool = pool_with(&dir, vec![200]);
        pool.registry.save(&[100, 200, 300]).unwrap();

        assert_eq!(pool.live_worker_count().unwrap(), 1);
        assert_eq!(pool.registry.load().unwrap(), vec![200]);
    }

    #[test]
    fn test_stop_with_empty_registry_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let pool = pool_with(&dir, vec![]);
        assert_eq!(pool.stop().unwrap(), StopReport::default());
    }

    #[test]
    fn test_start_registers_spawned_pids() {
        let dir = tempfile::tempdir().unwrap();
        let pool = pool_with(&dir, vec![]);
        let command = WorkerCommand {
            program: "sh".into(),
            args: vec!["-c".into(), "exit 0".into()],
        };

        let started = pool.start(2, &command).unwrap();
        assert_eq!(started.len(), 2);
        assert_eq!(pool.registry.load().unwrap(), started);
        assert!(dir.path().join("jobq-worker-0.stdout.log").exists());
        assert!(dir.path().join("jobq-worker-1.stderr.log").exists());
    }
}
