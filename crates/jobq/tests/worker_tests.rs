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

//! Worker loop tests driven by a fake command runner, covering outcome
//! handling, the dead-letter boundary and metric exactness.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use jobq::{
    CommandRunner, ConfigKey, ConfigStore, Database, ExecutionOutcome, FinalState, JobState,
    NewJob, Worker, DAL,
};

/// Runner returning the same outcome for every attempt.
struct FixedRunner {
    outcome: ExecutionOutcome,
}

#[async_trait]
impl CommandRunner for FixedRunner {
    async fn run(&self, _command: &str, _timeout: Duration) -> ExecutionOutcome {
        self.outcome.clone()
    }
}

struct Harness {
    dal: DAL,
    config: ConfigStore,
    _dir: TempDir,
}

async fn harness() -> Harness {
    let dir = TempDir::new().unwrap();
    let database = Database::new(dir.path().join("queue.db").to_str().unwrap()).unwrap();
    database.run_migrations().await.unwrap();
    let config = ConfigStore::new(dir.path().join("config.json"));
    config.init().unwrap();
    Harness {
        dal: DAL::new(database),
        config,
        _dir: dir,
    }
}

impl Harness {
    fn worker(&self, outcome: ExecutionOutcome) -> Worker {
        Worker::new(
            self.dal.clone(),
            self.config.clone(),
            Arc::new(FixedRunner { outcome }),
        )
    }

    async fn enqueue(&self, max_retries: i32) -> String {
        self.dal
            .jobs()
            .enqueue(NewJob {
                id: None,
                command: "fake".into(),
                priority: 0,
                max_retries,
            })
            .await
            .unwrap()
            .id
    }
}

#[tokio::test]
async fn test_successful_job_completes_with_exactly_one_metric() {
    let h = harness().await;
    let job_id = h.enqueue(3).await;
    let worker = h.worker(ExecutionOutcome::success("all good\n"));

    assert!(worker.poll_once().await.unwrap());

    let job = h.dal.jobs().get(&job_id).await.unwrap().unwrap();
    assert_eq!(job.state, JobState::Completed);
    assert_eq!(job.output.as_deref(), Some("all good\n"));

    let metrics = h.dal.metrics();
    assert_eq!(
        metrics.count_for_job(&job_id, FinalState::Completed).await.unwrap(),
        1
    );
    assert_eq!(metrics.count_for_job(&job_id, FinalState::Dead).await.unwrap(), 0);
}

#[tokio::test]
async fn test_zero_retry_ceiling_goes_straight_to_dead() {
    let h = harness().await;
    let job_id = h.enqueue(0).await;
    let worker = h.worker(ExecutionOutcome::failure("exploded"));

    assert!(worker.poll_once().await.unwrap());

    let job = h.dal.jobs().get(&job_id).await.unwrap().unwrap();
    assert_eq!(job.state, JobState::Dead);
    assert_eq!(job.attempts, 1);
    assert_eq!(job.output.as_deref(), Some("exploded"));

    let metrics = h.dal.metrics();
    assert_eq!(metrics.count_for_job(&job_id, FinalState::Dead).await.unwrap(), 1);
    assert_eq!(
        metrics.count_for_job(&job_id, FinalState::Completed).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_dead_letter_boundary_is_the_attempt_after_the_ceiling() {
    let h = harness().await;
    // base 1 keeps every backoff at one second so the test can ride it out.
    h.config.set(ConfigKey::BackoffBase, 1).unwrap();
    let job_id = h.enqueue(2).await;
    let worker = h.worker(ExecutionOutcome::failure("still broken"));

    // Failures 1 and 2 schedule retries; no metric rows yet.
    for expected_attempts in 1..=2 {
        assert!(worker.poll_once().await.unwrap());
        let job = h.dal.jobs().get(&job_id).await.unwrap().unwrap();
        assert_eq!(job.state, JobState::Failed);
        assert_eq!(job.attempts, expected_attempts);
        assert_eq!(
            h.dal
                .metrics()
                .count_for_job(&job_id, FinalState::Dead)
                .await
                .unwrap(),
            0
        );
        tokio::time::sleep(Duration::from_millis(1100)).await;
    }

    // Failure 3 crosses the ceiling.
    assert!(worker.poll_once().await.unwrap());
    let job = h.dal.jobs().get(&job_id).await.unwrap().unwrap();
    assert_eq!(job.state, JobState::Dead);
    assert_eq!(job.attempts, 3);
    assert_eq!(
        h.dal
            .metrics()
            .count_for_job(&job_id, FinalState::Dead)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_failed_job_is_not_claimable_until_backoff_elapses() {
    let h = harness().await;
    let job_id = h.enqueue(5).await;
    let worker = h.worker(ExecutionOutcome::failure("nope"));

    assert!(worker.poll_once().await.unwrap());
    let job = h.dal.jobs().get(&job_id).await.unwrap().unwrap();
    assert_eq!(job.state, JobState::Failed);

    // Backoff is 2^1 = 2s; an immediate re-poll finds nothing.
    assert!(!worker.poll_once().await.unwrap());
}

#[tokio::test]
async fn test_replayed_dead_job_can_complete() {
    let h = harness().await;
    let job_id = h.enqueue(0).await;

    let failing = h.worker(ExecutionOutcome::failure("exploded"));
    assert!(failing.poll_once().await.unwrap());
    assert!(h.dal.jobs().retry_dead(&job_id).await.unwrap());

    let succeeding = h.worker(ExecutionOutcome::success("fixed\n"));
    assert!(succeeding.poll_once().await.unwrap());

    let job = h.dal.jobs().get(&job_id).await.unwrap().unwrap();
    assert_eq!(job.state, JobState::Completed);
    // One terminal metric per outcome: the dead parking and the completion.
    assert_eq!(
        h.dal
            .metrics()
            .count_for_job(&job_id, FinalState::Dead)
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        h.dal
            .metrics()
            .count_for_job(&job_id, FinalState::Completed)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_cancelled_worker_exits_promptly_without_claiming() {
    let h = harness().await;
    let job_id = h.enqueue(3).await;
    let worker = h.worker(ExecutionOutcome::success("never runs"));

    let token = CancellationToken::new();
    token.cancel();
    tokio::time::timeout(Duration::from_secs(1), worker.run(token))
        .await
        .expect("worker should exit promptly once cancelled");

    // Nothing was claimed after cancellation.
    let job = h.dal.jobs().get(&job_id).await.unwrap().unwrap();
    assert_eq!(job.state, JobState::Pending);
}

#[tokio::test]
async fn test_idle_worker_stops_at_the_next_poll_boundary() {
    let h = harness().await;
    let worker = h.worker(ExecutionOutcome::success("unused"));

    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
    });

    tokio::time::timeout(Duration::from_secs(3), worker.run(token))
        .await
        .expect("idle worker should notice cancellation during its poll sleep");
}
