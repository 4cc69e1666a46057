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

//! Data Access Layer
//!
//! This module provides the data access layer for the job queue:
//!
//! - Job state management (pending, processing, completed, failed, dead)
//! - Atomic job claiming for multi-process execution
//! - Dead-letter queue replay
//! - Append-only outcome metrics and aggregate queries
//!
//! Every mutation is a single atomic write except the claim, which runs in
//! an exclusive transaction (see [`job::JobDAL::claim_next`]).

use crate::database::Database;

pub mod job;
pub mod metric;

pub use job::JobDAL;
pub use metric::MetricDAL;

/// The main Data Access Layer struct.
///
/// `DAL` is `Clone`; each clone references the same underlying connection
/// pool.
#[derive(Clone, Debug)]
pub struct DAL {
    /// The database instance with connection pool
    pub database: Database,
}

impl DAL {
    /// Creates a new DAL instance.
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Returns a JobDAL instance for job-related database operations.
    pub fn jobs(&self) -> JobDAL {
        JobDAL { dal: self }
    }

    /// Returns a MetricDAL instance for metric-related database operations.
    pub fn metrics(&self) -> MetricDAL {
        MetricDAL { dal: self }
    }
}
