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

//! Error types for the job queue engine.
//!
//! Job-level failures (non-zero exits, timeouts) are not errors; they are
//! encoded as state transitions by the worker loop. The types here cover the
//! infrastructure: the store, the configuration file, and the worker pool.

use thiserror::Error;

/// Errors raised by the persistent store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The connection pool could not provide a connection, or the blocking
    /// interact call was aborted.
    #[error("Connection pool error: {0}")]
    ConnectionPool(String),

    /// A query or statement failed inside the database.
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    /// Schema migrations could not be applied.
    #[error("Migration error: {0}")]
    Migration(String),

    /// A row holds a state string the engine does not recognize.
    #[error("Corrupt row: unknown job state '{0}'")]
    CorruptState(String),
}

/// Errors raised by the configuration store.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("Configuration I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file holds malformed JSON.
    #[error("Configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The operator named a key the store does not recognize.
    #[error("Unknown configuration key: '{0}' (expected 'max_retries' or 'backoff_base')")]
    UnknownKey(String),
}

/// Errors surfaced inside the worker loop.
///
/// These never terminate the worker: the loop force-fails any job in hand,
/// pauses briefly and resumes polling.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised by the pool supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// Spawning a worker process or touching its log files failed.
    #[error("Worker spawn error: {0}")]
    Spawn(#[from] std::io::Error),

    /// The PID registry file could not be parsed.
    #[error("Worker registry error: {0}")]
    Registry(#[from] serde_json::Error),

    /// Delivering a signal to a worker process group failed.
    #[error("Failed to signal worker {pid}: {message}")]
    Signal { pid: u32, message: String },
}
