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

//! # jobq
//!
//! A persistent, multi-worker job queue: shell commands are enqueued with a
//! priority, claimed exclusively by one of several concurrent worker
//! processes, executed with a timeout, and on failure retried with
//! exponential backoff until a retry ceiling is exceeded, at which point the
//! job is parked in a dead-letter queue for manual inspection or replay.
//!
//! Key guarantees:
//!
//! - **Exactly-once claim**: the claim runs in an exclusive SQLite
//!   transaction, so concurrent workers never double-execute a job.
//! - **Deterministic ordering**: highest priority first, ties broken by
//!   earliest creation time.
//! - **Deterministic backoff**: `backoff_base ^ attempt` seconds, with the
//!   base read from configuration at failure time.
//! - **Durable supervision**: the pool supervisor persists worker PIDs and
//!   escalates from SIGTERM to SIGKILL on stop.
//!
//! # Example
//!
//! ```rust,ignore
//! use jobq::{ConfigStore, Database, NewJob, DAL};
//!
//! let database = Database::new("jobq.db")?;
//! database.run_migrations().await?;
//!
//! let config = ConfigStore::new("jobq-config.json");
//! config.init()?;
//!
//! let dal = DAL::new(database);
//! let job = dal
//!     .jobs()
//!     .enqueue(NewJob {
//!         id: None,
//!         command: "echo hello".into(),
//!         priority: 10,
//!         max_retries: config.load()?.max_retries as i32,
//!     })
//!     .await?;
//! ```

pub mod config;
pub mod dal;
pub mod database;
pub mod error;
pub mod executor;
pub mod models;
pub mod pool;
pub mod retry;
pub mod shutdown;
pub mod worker;

pub use config::{ConfigKey, ConfigStore, QueueConfig};
pub use dal::job::StatusSummary;
pub use dal::metric::ExecutionStats;
pub use dal::DAL;
pub use database::Database;
pub use error::{ConfigError, StoreError, SupervisorError, WorkerError};
pub use executor::{CommandRunner, ExecutionOutcome, ShellRunner, EXECUTION_TIMEOUT};
pub use models::{FinalState, Job, JobState, NewJob};
pub use pool::{ProcessProbe, StopReport, SysinfoProbe, WorkerCommand, WorkerPool, WorkerRegistry};
pub use retry::RetryDecision;
pub use worker::Worker;
