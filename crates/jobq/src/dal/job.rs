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

//! Job claiming and state transition operations.
//!
//! The claim runs inside an exclusive transaction so that two workers
//! polling concurrently can never observe and claim the same row. Every
//! other operation is a single atomic statement.

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::DAL;
use crate::database::schema::jobs;
use crate::error::StoreError;
use crate::models::job::{Job, JobRow, NewJob, NewJobRow};
use crate::models::JobState;

/// Per-state counts returned by [`JobDAL::status_summary`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatusSummary {
    pub pending: i64,
    pub processing: i64,
    pub completed: i64,
    pub failed: i64,
    pub dead: i64,
}

/// Data access layer for job operations.
#[derive(Clone)]
pub struct JobDAL<'a> {
    pub(super) dal: &'a DAL,
}

/// SQLite reports lock contention as a generic database error whose message
/// mentions the lock ("database is locked", "database table is locked").
fn is_lock_contention(err: &diesel::result::Error) -> bool {
    matches!(
        err,
        diesel::result::Error::DatabaseError(_, info) if info.message().contains("locked")
    )
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

impl<'a> JobDAL<'a> {
    /// Inserts a new pending job, generating a UUID when no id is supplied.
    ///
    /// `max_retries` is the caller's snapshot of the current configuration;
    /// it is frozen on the row and later config changes do not affect it.
    pub async fn enqueue(&self, new_job: NewJob) -> Result<Job, StoreError> {
        let conn = self.dal.database.get_connection().await?;

        let ts = now();
        let row = NewJobRow {
            id: new_job
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            command: new_job.command,
            state: JobState::Pending.as_str().to_string(),
            attempts: 0,
            max_retries: new_job.max_retries,
            run_at: ts,
            created_at: ts,
            updated_at: ts,
            priority: new_job.priority,
            output: None,
        };

        let inserted: JobRow = conn
            .interact(move |conn| {
                diesel::insert_into(jobs::table)
                    .values(&row)
                    .get_result(conn)
            })
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        let job = Job::try_from(inserted)?;
        tracing::debug!(job_id = %job.id, priority = job.priority, "Job enqueued");
        Ok(job)
    }

    /// Atomically claims the next eligible job, if any.
    ///
    /// Selection rule: among jobs with `state ∈ {pending, failed}` and
    /// `run_at <= now`, the highest priority wins, ties broken by earliest
    /// creation time. The winning row is flipped to `processing` inside the
    /// same exclusive transaction and returned with its pre-claim contents,
    /// so the caller still sees the attempts/max_retries it needs.
    ///
    /// Lock contention with another claimer is not an error: it means some
    /// other worker got there first, and is reported as `Ok(None)` so the
    /// caller just polls again next cycle.
    pub async fn claim_next(&self) -> Result<Option<Job>, StoreError> {
        let conn = self.dal.database.get_connection().await?;

        let result: Result<Option<JobRow>, diesel::result::Error> = conn
            .interact(|conn| {
                // The exclusive transaction takes the write lock up front,
                // closing the observe-then-update race between workers.
                conn.exclusive_transaction::<_, diesel::result::Error, _>(|conn| {
                    let ts = now();
                    let candidate: Option<JobRow> = jobs::table
                        .filter(
                            jobs::state
                                .eq(JobState::Pending.as_str())
                                .or(jobs::state.eq(JobState::Failed.as_str())),
                        )
                        .filter(jobs::run_at.le(ts))
                        .order((jobs::priority.desc(), jobs::created_at.asc()))
                        .first(conn)
                        .optional()?;

                    let Some(row) = candidate else {
                        return Ok(None);
                    };

                    diesel::update(jobs::table.find(&row.id))
                        .set((
                            jobs::state.eq(JobState::Processing.as_str()),
                            jobs::updated_at.eq(ts),
                        ))
                        .execute(conn)?;

                    Ok(Some(row))
                })
            })
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))?;

        match result {
            Ok(Some(row)) => {
                let job = Job::try_from(row)?;
                tracing::debug!(job_id = %job.id, attempts = job.attempts, "Job claimed");
                Ok(Some(job))
            }
            Ok(None) => Ok(None),
            Err(e) if is_lock_contention(&e) => {
                tracing::debug!("Claim transaction lost the lock; treating as no job this cycle");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Marks a job as completed, stamping its captured output.
    pub async fn mark_completed(
        &self,
        job_id: &str,
        output: &str,
    ) -> Result<(), StoreError> {
        let conn = self.dal.database.get_connection().await?;
        let job_id = job_id.to_string();
        let output = output.to_string();

        conn.interact(move |conn| {
            diesel::update(jobs::table.find(&job_id))
                .set((
                    jobs::state.eq(JobState::Completed.as_str()),
                    jobs::updated_at.eq(now()),
                    jobs::output.eq(Some(output)),
                ))
                .execute(conn)
        })
        .await
        .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        Ok(())
    }

    /// Marks a job as failed with its new attempt count and the
    /// backoff-adjusted time at which it becomes claimable again.
    pub async fn mark_failed(
        &self,
        job_id: &str,
        attempts: i32,
        next_run_at: NaiveDateTime,
        output: &str,
    ) -> Result<(), StoreError> {
        let conn = self.dal.database.get_connection().await?;
        let job_id = job_id.to_string();
        let output = output.to_string();

        conn.interact(move |conn| {
            diesel::update(jobs::table.find(&job_id))
                .set((
                    jobs::state.eq(JobState::Failed.as_str()),
                    jobs::attempts.eq(attempts),
                    jobs::run_at.eq(next_run_at),
                    jobs::updated_at.eq(now()),
                    jobs::output.eq(Some(output)),
                ))
                .execute(conn)
        })
        .await
        .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        Ok(())
    }

    /// Moves a job to the dead-letter queue.
    pub async fn mark_dead(&self, job_id: &str, output: &str) -> Result<(), StoreError> {
        let conn = self.dal.database.get_connection().await?;
        let job_id = job_id.to_string();
        let output = output.to_string();

        conn.interact(move |conn| {
            diesel::update(jobs::table.find(&job_id))
                .set((
                    jobs::state.eq(JobState::Dead.as_str()),
                    jobs::updated_at.eq(now()),
                    jobs::output.eq(Some(output)),
                ))
                .execute(conn)
        })
        .await
        .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        Ok(())
    }

    /// Moves a dead job back to pending, resetting its attempt count and
    /// clearing its output.
    ///
    /// Returns whether a row was affected; retrying a job that is not in
    /// the dead-letter queue is an idempotent no-op reported as `false`.
    pub async fn retry_dead(&self, job_id: &str) -> Result<bool, StoreError> {
        let conn = self.dal.database.get_connection().await?;
        let job_id = job_id.to_string();

        let affected = conn
            .interact(move |conn| {
                let ts = now();
                diesel::update(
                    jobs::table
                        .find(&job_id)
                        .filter(jobs::state.eq(JobState::Dead.as_str())),
                )
                .set((
                    jobs::state.eq(JobState::Pending.as_str()),
                    jobs::attempts.eq(0),
                    jobs::run_at.eq(ts),
                    jobs::updated_at.eq(ts),
                    jobs::output.eq(None::<String>),
                ))
                .execute(conn)
            })
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        Ok(affected > 0)
    }

    /// Lists all jobs in the given state, oldest first.
    pub async fn list_by_state(&self, state: JobState) -> Result<Vec<Job>, StoreError> {
        let conn = self.dal.database.get_connection().await?;

        let rows: Vec<JobRow> = conn
            .interact(move |conn| {
                jobs::table
                    .filter(jobs::state.eq(state.as_str()))
                    .order(jobs::created_at.asc())
                    .load(conn)
            })
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        rows.into_iter().map(Job::try_from).collect()
    }

    /// Fetches a single job by id.
    pub async fn get(&self, job_id: &str) -> Result<Option<Job>, StoreError> {
        let conn = self.dal.database.get_connection().await?;
        let job_id = job_id.to_string();

        let row: Option<JobRow> = conn
            .interact(move |conn| jobs::table.find(&job_id).first(conn).optional())
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        row.map(Job::try_from).transpose()
    }

    /// Counts jobs per state.
    pub async fn status_summary(&self) -> Result<StatusSummary, StoreError> {
        let conn = self.dal.database.get_connection().await?;

        let counts: Vec<(String, i64)> = conn
            .interact(|conn| {
                jobs::table
                    .group_by(jobs::state)
                    .select((jobs::state, diesel::dsl::count_star()))
                    .load(conn)
            })
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        let mut summary = StatusSummary::default();
        for (state, count) in counts {
            match JobState::parse(&state) {
                Some(JobState::Pending) => summary.pending = count,
                Some(JobState::Processing) => summary.processing = count,
                Some(JobState::Completed) => summary.completed = count,
                Some(JobState::Failed) => summary.failed = count,
                Some(JobState::Dead) => summary.dead = count,
                None => return Err(StoreError::CorruptState(state)),
            }
        }
        Ok(summary)
    }
}
