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

//! Metric Model
//!
//! Metrics are append-only facts written exactly once per terminal outcome
//! (completed or dead) and never updated. Intermediate failed attempts are
//! not logged; the rows feed only aggregate statistics.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::database::schema::job_metrics;

/// The two terminal outcomes a metric row can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinalState {
    /// The job finished successfully
    Completed,
    /// The job exhausted its retries
    Dead,
}

impl FinalState {
    /// Returns the string representation stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalState::Completed => "completed",
            FinalState::Dead => "dead",
        }
    }
}

impl std::fmt::Display for FinalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A metric record (domain type).
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = job_metrics)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct JobMetric {
    /// Auto-increment row id
    pub id: i32,
    /// The job this outcome belongs to
    pub job_id: String,
    /// Terminal state string ("completed" or "dead")
    pub final_state: String,
    /// Wall-clock duration of the final execution attempt
    pub duration_ms: i64,
    /// When the outcome was recorded (UTC)
    pub logged_at: NaiveDateTime,
}

/// Insertable row for new metric records.
#[derive(Debug, Insertable)]
#[diesel(table_name = job_metrics)]
pub struct NewJobMetric {
    pub job_id: String,
    pub final_state: String,
    pub duration_ms: i64,
    pub logged_at: NaiveDateTime,
}
