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

//! Job Model
//!
//! A job is the unit of work: an opaque shell command with a priority, a
//! retry budget snapshotted at enqueue time, and a persistent state machine
//! (`pending → processing → {completed | failed | dead}`).

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::database::schema::jobs;
use crate::error::StoreError;

/// Lifecycle states of a job.
///
/// `failed` jobs become claimable again once their `run_at` backoff elapses;
/// `dead` jobs only leave the dead-letter queue through a manual retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    /// Enqueued, waiting to be claimed
    Pending,
    /// Claimed by exactly one worker
    Processing,
    /// Finished with exit code 0 (terminal)
    Completed,
    /// Failed, scheduled for a backoff retry
    Failed,
    /// Retry budget exhausted; parked in the dead-letter queue
    Dead,
}

impl JobState {
    /// Returns the string representation stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Dead => "dead",
        }
    }

    /// Parses a state from its string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(JobState::Pending),
            "processing" => Some(JobState::Processing),
            "completed" => Some(JobState::Completed),
            "failed" => Some(JobState::Failed),
            "dead" => Some(JobState::Dead),
            _ => None,
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobState::parse(&s.to_lowercase()).ok_or_else(|| format!("unknown job state '{}'", s))
    }
}

/// A job record (domain type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Opaque unique identifier, caller-supplied or generated
    pub id: String,
    /// Shell command handed to the executor
    pub command: String,
    /// Current lifecycle state
    pub state: JobState,
    /// Execution attempts that ended in failure
    pub attempts: i32,
    /// Retry ceiling snapshotted from configuration at enqueue time
    pub max_retries: i32,
    /// Earliest time the job is eligible for claiming (UTC)
    pub run_at: NaiveDateTime,
    /// When the job was enqueued (UTC); claim tie-breaker
    pub created_at: NaiveDateTime,
    /// Last state transition time (UTC)
    pub updated_at: NaiveDateTime,
    /// Higher values claim first
    pub priority: i32,
    /// Last captured stdout (success) or stderr/error text (failure)
    pub output: Option<String>,
}

/// Database row for the `jobs` table.
///
/// The state column stays a plain string here; conversion to [`JobState`]
/// happens at the DAL boundary.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = jobs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct JobRow {
    pub id: String,
    pub command: String,
    pub state: String,
    pub attempts: i32,
    pub max_retries: i32,
    pub run_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub priority: i32,
    pub output: Option<String>,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let state =
            JobState::parse(&row.state).ok_or_else(|| StoreError::CorruptState(row.state.clone()))?;
        Ok(Job {
            id: row.id,
            command: row.command,
            state,
            attempts: row.attempts,
            max_retries: row.max_retries,
            run_at: row.run_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            priority: row.priority,
            output: row.output,
        })
    }
}

/// Insertable row for new jobs.
#[derive(Debug, Insertable)]
#[diesel(table_name = jobs)]
pub struct NewJobRow {
    pub id: String,
    pub command: String,
    pub state: String,
    pub attempts: i32,
    pub max_retries: i32,
    pub run_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub priority: i32,
    pub output: Option<String>,
}

/// Parameters for enqueuing a job.
#[derive(Debug, Clone)]
pub struct NewJob {
    /// Caller-supplied id; a UUID v4 is generated when absent
    pub id: Option<String>,
    /// Shell command to execute
    pub command: String,
    /// Claim priority (higher first)
    pub priority: i32,
    /// Retry ceiling snapshot from the current configuration
    pub max_retries: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_round_trips() {
        for state in [
            JobState::Pending,
            JobState::Processing,
            JobState::Completed,
            JobState::Failed,
            JobState::Dead,
        ] {
            assert_eq!(JobState::parse(state.as_str()), Some(state));
        }
        assert_eq!(JobState::parse("zombie"), None);
    }

    #[test]
    fn test_state_from_str_is_case_insensitive() {
        assert_eq!("PENDING".parse::<JobState>().unwrap(), JobState::Pending);
        assert_eq!("Dead".parse::<JobState>().unwrap(), JobState::Dead);
        assert!("zombie".parse::<JobState>().is_err());
    }

    #[test]
    fn test_row_with_unknown_state_is_rejected() {
        let now = chrono::Utc::now().naive_utc();
        let row = JobRow {
            id: "j1".into(),
            command: "true".into(),
            state: "zombie".into(),
            attempts: 0,
            max_retries: 3,
            run_at: now,
            created_at: now,
            updated_at: now,
            priority: 0,
            output: None,
        };
        assert!(matches!(
            Job::try_from(row),
            Err(StoreError::CorruptState(s)) if s == "zombie"
        ));
    }
}
