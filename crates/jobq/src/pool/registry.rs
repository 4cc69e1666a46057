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

//! Durable worker PID registry.
//!
//! A small JSON file owned by the pool supervisor, persisted outside the
//! job store so the supervisor recovers its view of running workers across
//! its own restarts. The file is rewritten wholesale on every mutation; all
//! supervisor operations run from one control point at a time, so no
//! per-entry concurrency control is needed.

use std::path::{Path, PathBuf};

use crate::error::SupervisorError;

/// Handle to the registry file.
#[derive(Debug, Clone)]
pub struct WorkerRegistry {
    path: PathBuf,
}

impl WorkerRegistry {
    /// Creates a registry handle for the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the registered PIDs; a missing file is an empty registry.
    pub fn load(&self) -> Result<Vec<u32>, SupervisorError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Replaces the registry contents.
    pub fn save(&self, pids: &[u32]) -> Result<(), SupervisorError> {
        let contents = serde_json::to_string(pids)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}
