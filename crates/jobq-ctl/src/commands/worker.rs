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

//! Worker pool commands.
//!
//! `start` and `stop` drive the pool supervisor; the hidden `run` variant is
//! the worker side of the contract: the supervisor re-invokes this binary
//! with `worker run` for each spawned process.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;

use jobq::{
    ConfigStore, ShellRunner, SysinfoProbe, Worker, WorkerCommand, WorkerPool, WorkerRegistry, DAL,
};

/// Durable registry of worker PIDs, next to the database and config files.
const REGISTRY_FILE: &str = ".jobq-workers.json";

fn pool() -> WorkerPool {
    WorkerPool::new(WorkerRegistry::new(REGISTRY_FILE), ".", Arc::new(SysinfoProbe))
}

pub fn start(database: &str, config: &Path, count: usize) -> Result<()> {
    let program = std::env::current_exe().context("Failed to locate the jobq-ctl binary")?;
    let command = WorkerCommand {
        program,
        args: vec![
            "worker".into(),
            "run".into(),
            "--database".into(),
            database.to_string(),
            "--config".into(),
            config.display().to_string(),
        ],
    };

    println!("{} Starting {} new worker(s)...", "→".cyan().bold(), count);
    let pids = pool()
        .start(count, &command)
        .context("Failed to start workers")?;
    for pid in pids {
        println!("  -> Started worker with PID: {pid}");
    }
    println!("     (Check the jobq-worker-*.stderr.log files for errors)");
    Ok(())
}

pub fn stop() -> Result<()> {
    let pool = pool();
    println!(
        "{} Sending graceful shutdown signal to all workers...",
        "→".cyan().bold()
    );
    let report = pool.stop().context("Failed to stop workers")?;

    if report.signalled == 0 {
        println!("No active workers found.");
        return Ok(());
    }
    if report.forced > 0 {
        println!(
            "{} {} worker(s) did not shut down gracefully and were force-stopped.",
            "⚠".yellow().bold(),
            report.forced
        );
    }
    println!("{} All workers stopped.", "✓".green().bold());
    Ok(())
}

/// Entry point of a spawned worker process: runs the worker loop until a
/// shutdown signal arrives.
pub async fn run_worker(dal: DAL, config: ConfigStore) {
    let shutdown = jobq::shutdown::install_signal_handler();
    let worker = Worker::new(dal, config, Arc::new(ShellRunner));
    worker.run(shutdown).await;
}

/// Counts live workers for `status`, pruning stale registry entries.
pub fn live_worker_count() -> Result<usize> {
    pool()
        .live_worker_count()
        .context("Failed to probe worker liveness")
}
