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

//! Metric append and aggregate operations.

use chrono::Utc;
use diesel::prelude::*;

use super::DAL;
use crate::database::schema::job_metrics;
use crate::error::StoreError;
use crate::models::metric::NewJobMetric;
use crate::models::FinalState;

/// Aggregate execution statistics derived from the metric stream.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExecutionStats {
    /// Jobs that reached `completed`
    pub total_completed: i64,
    /// Jobs that reached `dead`
    pub total_dead: i64,
    /// Mean wall-clock duration of completed jobs, 0 when none completed
    pub avg_completion_time_ms: f64,
}

/// Data access layer for metric operations.
#[derive(Clone)]
pub struct MetricDAL<'a> {
    pub(super) dal: &'a DAL,
}

impl<'a> MetricDAL<'a> {
    /// Appends one terminal-outcome record for a job.
    pub async fn record(
        &self,
        job_id: &str,
        final_state: FinalState,
        duration_ms: i64,
    ) -> Result<(), StoreError> {
        let conn = self.dal.database.get_connection().await?;

        let metric = NewJobMetric {
            job_id: job_id.to_string(),
            final_state: final_state.as_str().to_string(),
            duration_ms,
            logged_at: Utc::now().naive_utc(),
        };

        conn.interact(move |conn| {
            diesel::insert_into(job_metrics::table)
                .values(&metric)
                .execute(conn)
        })
        .await
        .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        Ok(())
    }

    /// Computes the aggregate statistics the `stats` query exposes.
    pub async fn stats(&self) -> Result<ExecutionStats, StoreError> {
        let conn = self.dal.database.get_connection().await?;

        let stats = conn
            .interact(|conn| -> Result<ExecutionStats, diesel::result::Error> {
                let total_completed: i64 = job_metrics::table
                    .filter(job_metrics::final_state.eq(FinalState::Completed.as_str()))
                    .count()
                    .get_result(conn)?;

                let total_dead: i64 = job_metrics::table
                    .filter(job_metrics::final_state.eq(FinalState::Dead.as_str()))
                    .count()
                    .get_result(conn)?;

                // SQLite's AVG yields a float; select it unchecked rather
                // than pulling a decimal type in for one aggregate.
                let avg: Option<f64> = job_metrics::table
                    .filter(job_metrics::final_state.eq(FinalState::Completed.as_str()))
                    .select(diesel::dsl::sql::<
                        diesel::sql_types::Nullable<diesel::sql_types::Double>,
                    >("AVG(duration_ms)"))
                    .get_result(conn)?;

                Ok(ExecutionStats {
                    total_completed,
                    total_dead,
                    avg_completion_time_ms: avg.unwrap_or(0.0),
                })
            })
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        Ok(stats)
    }

    /// Counts metric rows for one job and final state. Used by tests to
    /// assert terminal outcomes are logged exactly once.
    pub async fn count_for_job(
        &self,
        job_id: &str,
        final_state: FinalState,
    ) -> Result<i64, StoreError> {
        let conn = self.dal.database.get_connection().await?;
        let job_id = job_id.to_string();

        let count: i64 = conn
            .interact(move |conn| {
                job_metrics::table
                    .filter(job_metrics::job_id.eq(&job_id))
                    .filter(job_metrics::final_state.eq(final_state.as_str()))
                    .count()
                    .get_result(conn)
            })
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        Ok(count)
    }
}
