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

//! Worker control loop.
//!
//! Each worker is one OS process running this loop: claim a job, execute it,
//! report the outcome through the retry policy, repeat. Shutdown is
//! cooperative: the loop checks its `CancellationToken` at each poll
//! boundary, so a job in hand is always finished before exit and no new job
//! is claimed after cancellation.
//!
//! Errors inside the loop itself (polling or reporting defects, not job
//! failures) never terminate the worker: any job in hand is routed through
//! the failure path with the error text as output, and the loop pauses
//! briefly before resuming so a persistent defect cannot crash-spin.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{NaiveDateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::ConfigStore;
use crate::dal::DAL;
use crate::error::WorkerError;
use crate::executor::{CommandRunner, ExecutionOutcome, EXECUTION_TIMEOUT};
use crate::models::{FinalState, Job};
use crate::retry::{self, RetryDecision};

/// Sleep between polls when the queue is empty.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Pause after a loop defect before polling again.
const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// A single-process worker.
pub struct Worker {
    dal: DAL,
    config: ConfigStore,
    runner: Arc<dyn CommandRunner>,
}

impl Worker {
    /// Creates a worker over the given store, configuration and runner.
    pub fn new(dal: DAL, config: ConfigStore, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            dal,
            config,
            runner,
        }
    }

    /// Runs the control loop until `shutdown` is cancelled.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(pid = std::process::id(), "Worker started; polling for jobs");

        while !shutdown.is_cancelled() {
            match self.poll_once().await {
                Ok(true) => {
                    // Processed a job; go straight back for the next one.
                }
                Ok(false) => self.pause(POLL_INTERVAL, &shutdown).await,
                Err(e) => {
                    error!(error = %e, "Error in worker loop");
                    self.pause(ERROR_BACKOFF, &shutdown).await;
                }
            }
        }

        info!(pid = std::process::id(), "Worker shutting down gracefully");
    }

    /// Claims and processes at most one job.
    ///
    /// Returns whether a job was processed, so the caller knows whether to
    /// idle before the next poll. Exposed so tests can drive the loop one
    /// step at a time with a fake runner.
    pub async fn poll_once(&self) -> Result<bool, WorkerError> {
        let Some(job) = self.dal.jobs().claim_next().await? else {
            return Ok(false);
        };

        info!(job_id = %job.id, command = %job.command, "Running job");
        let started = Instant::now();
        let outcome = self.runner.run(&job.command, EXECUTION_TIMEOUT).await;
        let duration_ms = started.elapsed().as_millis() as i64;

        if let Err(e) = self.report(&job, &outcome, duration_ms).await {
            // The job is in hand; force it down the failure path so it is
            // not stranded in `processing`, then let run() pause.
            error!(job_id = %job.id, error = %e, "Failed to report outcome; force-failing job");
            self.handle_failure(&job, &e.to_string(), 0).await?;
            return Err(e);
        }

        Ok(true)
    }

    async fn report(
        &self,
        job: &Job,
        outcome: &ExecutionOutcome,
        duration_ms: i64,
    ) -> Result<(), WorkerError> {
        if outcome.success {
            self.handle_success(job, &outcome.output, duration_ms).await
        } else {
            self.handle_failure(job, &outcome.output, duration_ms).await
        }
    }

    async fn handle_success(
        &self,
        job: &Job,
        output: &str,
        duration_ms: i64,
    ) -> Result<(), WorkerError> {
        self.dal.jobs().mark_completed(&job.id, output).await?;
        self.dal
            .metrics()
            .record(&job.id, FinalState::Completed, duration_ms)
            .await?;
        info!(job_id = %job.id, duration_ms, "Job completed successfully");
        Ok(())
    }

    async fn handle_failure(
        &self,
        job: &Job,
        output: &str,
        duration_ms: i64,
    ) -> Result<(), WorkerError> {
        // backoff_base is read at failure time so operator changes apply to
        // the next decision; max_retries stays frozen on the job row.
        let config = self.config.load()?;

        match retry::evaluate(job.attempts, job.max_retries, config.backoff_base) {
            RetryDecision::Retry { attempts, delay } => {
                let next_run_at = delayed(Utc::now().naive_utc(), delay);
                self.dal
                    .jobs()
                    .mark_failed(&job.id, attempts, next_run_at, output)
                    .await?;
                info!(
                    job_id = %job.id,
                    attempt = attempts,
                    max_retries = job.max_retries,
                    delay_secs = delay.as_secs(),
                    "Job failed; retry scheduled"
                );
            }
            RetryDecision::Dead { attempts } => {
                self.dal.jobs().mark_dead(&job.id, output).await?;
                self.dal
                    .metrics()
                    .record(&job.id, FinalState::Dead, duration_ms)
                    .await?;
                info!(
                    job_id = %job.id,
                    attempt = attempts,
                    "Job exhausted retries; moved to dead-letter queue"
                );
            }
        }
        Ok(())
    }

    async fn pause(&self, duration: Duration, shutdown: &CancellationToken) {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!("Pause interrupted by shutdown");
            }
            _ = tokio::time::sleep(duration) => {}
        }
    }
}

/// Adds a backoff delay to a timestamp, clamping instead of overflowing for
/// the astronomically large delays late retries can produce.
fn delayed(from: NaiveDateTime, delay: Duration) -> NaiveDateTime {
    let secs = delay.as_secs().min(i64::MAX as u64) as i64;
    chrono::Duration::try_seconds(secs)
        .and_then(|d| from.checked_add_signed(d))
        .unwrap_or(NaiveDateTime::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delayed_adds_whole_seconds() {
        let from = Utc::now().naive_utc();
        let later = delayed(from, Duration::from_secs(8));
        assert_eq!(later - from, chrono::Duration::seconds(8));
    }

    #[test]
    fn test_delayed_clamps_instead_of_overflowing() {
        let from = Utc::now().naive_utc();
        assert_eq!(delayed(from, Duration::from_secs(u64::MAX)), NaiveDateTime::MAX);
    }
}
