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

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use jobq::{ConfigKey, JobState};

#[derive(Parser)]
#[command(
    name = "jobq-ctl",
    version,
    about = "Command-line interface for the jobq job queue",
    long_about = "A tool for enqueuing jobs, supervising worker processes and inspecting the dead-letter queue"
)]
pub struct Cli {
    /// Path to the SQLite queue database
    #[arg(long, global = true, env = "JOBQ_DATABASE", default_value = "jobq.db")]
    pub database: String,

    /// Path to the queue configuration file
    #[arg(long, global = true, env = "JOBQ_CONFIG", default_value = "jobq-config.json")]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Enqueue a shell command as a job
    Enqueue {
        /// The shell command to execute
        #[arg(short, long)]
        command: String,

        /// A specific id for the job (generated when omitted)
        #[arg(long)]
        id: Option<String>,

        /// Job priority; higher claims first
        #[arg(short, long, default_value_t = 0)]
        priority: i32,
    },

    /// Worker pool management
    #[command(subcommand)]
    Worker(WorkerCommands),

    /// Show per-state job counts and the live worker count
    Status,

    /// List jobs in a given state
    List {
        /// Filter jobs by state
        #[arg(long)]
        state: JobState,

        /// Show the captured output of each job
        #[arg(long)]
        output: bool,
    },

    /// Dead-letter queue operations
    #[command(subcommand)]
    Dlq(DlqCommands),

    /// Queue configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Aggregate execution statistics
    Stats,
}

#[derive(Subcommand)]
pub enum WorkerCommands {
    /// Start new worker processes
    Start {
        /// Number of workers to start
        #[arg(long, default_value_t = 1)]
        count: usize,
    },

    /// Gracefully stop all registered workers
    Stop,

    /// Run the worker loop in this process (spawned by `worker start`)
    #[command(hide = true)]
    Run,
}

#[derive(Subcommand)]
pub enum DlqCommands {
    /// List jobs parked in the dead-letter queue
    List {
        /// Show the captured output of each job
        #[arg(long)]
        output: bool,
    },

    /// Move a dead job back to pending with a fresh retry budget
    Retry {
        /// Id of the dead job to replay
        job_id: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Set a configuration key (max_retries or backoff_base)
    Set {
        /// The key to update
        key: ConfigKey,
        /// The new value (a non-negative integer)
        value: u32,
    },

    /// Print the current configuration as JSON
    Show,
}
