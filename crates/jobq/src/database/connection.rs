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

//! SQLite connection management.
//!
//! This module provides an async connection pool implementation using
//! `deadpool-diesel`. Every worker process owns its own pool against the same
//! database file; cross-process coordination happens entirely through SQLite
//! locking, so the pool itself stays small.
//!
//! Accepted connection strings: a file path, `sqlite://<path>`, or
//! `:memory:`.

use diesel_migrations::MigrationHarness;
use tracing::info;

use deadpool_diesel::sqlite::{Manager, Pool, Runtime};

use crate::error::StoreError;

/// A pool of SQLite database connections.
///
/// `Database` is `Clone`; each clone references the same underlying pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Database(...)")
    }
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// Opening the pool does not touch the file yet; callers must run
    /// [`Database::run_migrations`] before issuing queries and treat a
    /// failure there as fatal.
    pub fn new(connection_string: &str) -> Result<Self, StoreError> {
        let url = Self::build_sqlite_url(connection_string);
        let manager = Manager::new(url, Runtime::Tokio1);
        // SQLite has limited concurrent write support even with WAL mode.
        // Using a single connection per process avoids "database is locked"
        // errors between this process's own tasks; contention with other
        // worker processes is handled by busy_timeout.
        let pool = Pool::builder(manager)
            .max_size(1)
            .build()
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))?;

        info!("SQLite connection pool initialized (size: 1)");
        Ok(Self { pool })
    }

    /// Gets a connection from the pool.
    pub async fn get_connection(
        &self,
    ) -> Result<deadpool::managed::Object<Manager>, StoreError> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))
    }

    /// Runs pending schema migrations, setting concurrency pragmas first.
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        let conn = self.get_connection().await?;
        conn.interact(|conn| {
            use diesel::prelude::*;

            // WAL mode allows concurrent reads during writes.
            diesel::sql_query("PRAGMA journal_mode=WAL;")
                .execute(conn)
                .map_err(|e| StoreError::Migration(e.to_string()))?;
            // busy_timeout makes SQLite wait 30s instead of immediately
            // failing when another worker holds the write lock.
            diesel::sql_query("PRAGMA busy_timeout=30000;")
                .execute(conn)
                .map_err(|e| StoreError::Migration(e.to_string()))?;

            conn.run_pending_migrations(super::MIGRATIONS)
                .map(|_| ())
                .map_err(|e| StoreError::Migration(e.to_string()))
        })
        .await
        .map_err(|e| StoreError::ConnectionPool(e.to_string()))?
    }

    /// Builds a SQLite connection URL.
    fn build_sqlite_url(connection_string: &str) -> String {
        // Strip sqlite:// prefix if present
        if let Some(path) = connection_string.strip_prefix("sqlite://") {
            path.to_string()
        } else {
            connection_string.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_connection_strings() {
        // Test file path
        let url = Database::build_sqlite_url("/path/to/queue.db");
        assert_eq!(url, "/path/to/queue.db");

        // Test in-memory database
        let url = Database::build_sqlite_url(":memory:");
        assert_eq!(url, ":memory:");

        // Test relative path
        let url = Database::build_sqlite_url("./queue.db");
        assert_eq!(url, "./queue.db");

        // Test sqlite:// prefix stripping
        let url = Database::build_sqlite_url("sqlite:///path/to/queue.db");
        assert_eq!(url, "/path/to/queue.db");
    }

    #[tokio::test]
    async fn test_migrations_run_on_fresh_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queue.db");
        let db = Database::new(path.to_str().unwrap()).unwrap();
        db.run_migrations().await.unwrap();
        // Re-running is a no-op.
        db.run_migrations().await.unwrap();
    }
}
