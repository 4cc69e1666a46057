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

//! Job executor.
//!
//! The executor runs one job's command as an isolated child process and
//! reports the outcome. It never retries; retry policy belongs to the
//! worker loop. The runner is a trait so the loop can be exercised with a
//! fake in tests and the process-spawning primitive can differ per platform.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

/// Fixed wall-clock cap on a single execution attempt.
pub const EXECUTION_TIMEOUT: Duration = Duration::from_secs(300);

/// Output recorded for an attempt that exceeded [`EXECUTION_TIMEOUT`].
pub const TIMEOUT_MESSAGE: &str = "Error: Job exceeded 5-minute timeout.";

/// Result of one execution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Whether the command exited with code 0
    pub success: bool,
    /// Captured stdout on success; stderr or an error description otherwise
    pub output: String,
}

impl ExecutionOutcome {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

/// Capability for running a job's command.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `command` to completion or until `timeout` elapses.
    ///
    /// Never returns an error: launch failures and timeouts are encoded in
    /// the outcome like any other failed attempt.
    async fn run(&self, command: &str, timeout: Duration) -> ExecutionOutcome;
}

/// Production runner: `sh -c <command>` with separately captured streams.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str, timeout: Duration) -> ExecutionOutcome {
        let child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the wait future on timeout must take the child with it.
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => return ExecutionOutcome::failure(e.to_string()),
        };

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                if output.status.success() {
                    ExecutionOutcome::success(String::from_utf8_lossy(&output.stdout))
                } else {
                    tracing::debug!(code = ?output.status.code(), "Command exited non-zero");
                    ExecutionOutcome::failure(String::from_utf8_lossy(&output.stderr))
                }
            }
            Ok(Err(e)) => ExecutionOutcome::failure(e.to_string()),
            Err(_) => {
                tracing::warn!(timeout_secs = timeout.as_secs(), "Command timed out");
                ExecutionOutcome::failure(TIMEOUT_MESSAGE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_exit_captures_stdout() {
        let outcome = ShellRunner.run("echo hello", EXECUTION_TIMEOUT).await;
        assert!(outcome.success);
        assert_eq!(outcome.output.trim(), "hello");
    }

    #[tokio::test]
    async fn test_nonzero_exit_captures_stderr() {
        let outcome = ShellRunner
            .run("echo oops >&2; exit 3", EXECUTION_TIMEOUT)
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.output.trim(), "oops");
    }

    #[tokio::test]
    async fn test_missing_command_is_a_failure() {
        let outcome = ShellRunner
            .run("definitely-not-a-real-command-2931", EXECUTION_TIMEOUT)
            .await;
        assert!(!outcome.success);
        assert!(!outcome.output.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_returns_the_fixed_message() {
        let outcome = ShellRunner
            .run("sleep 30", Duration::from_millis(100))
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.output, TIMEOUT_MESSAGE);
    }
}
