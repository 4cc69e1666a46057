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

//! Queue configuration store.
//!
//! A small JSON file with exactly two recognized keys: `max_retries` and
//! `backoff_base`. Defaults materialize on first initialization; the file is
//! read on every enqueue and every failure-handling decision and written
//! only by explicit operator action.
//!
//! `max_retries = 0` is legal: it sends a job to the dead-letter queue on
//! its first failure.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default retry ceiling applied to newly initialized stores.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default exponential backoff base applied to newly initialized stores.
pub const DEFAULT_BACKOFF_BASE: u32 = 2;

/// The queue's tunable knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Failures allowed before a job moves to the dead-letter queue
    pub max_retries: u32,
    /// Base of the exponential retry delay (`base ^ attempt` seconds)
    pub backoff_base: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }
}

/// The two keys the store recognizes; anything else is an operator error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    MaxRetries,
    BackoffBase,
}

impl ConfigKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::MaxRetries => "max_retries",
            ConfigKey::BackoffBase => "backoff_base",
        }
    }
}

impl std::str::FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "max_retries" => Ok(ConfigKey::MaxRetries),
            "backoff_base" => Ok(ConfigKey::BackoffBase),
            other => Err(ConfigError::UnknownKey(other.to_string())),
        }
    }
}

/// File-backed configuration store.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Creates a store handle for the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the defaults if no configuration file exists yet.
    pub fn init(&self) -> Result<(), ConfigError> {
        if self.path.exists() {
            return Ok(());
        }
        self.write(&QueueConfig::default())
    }

    /// Loads the current configuration.
    pub fn load(&self) -> Result<QueueConfig, ConfigError> {
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Sets one recognized key and returns the updated configuration.
    pub fn set(&self, key: ConfigKey, value: u32) -> Result<QueueConfig, ConfigError> {
        let mut config = self.load()?;
        match key {
            ConfigKey::MaxRetries => config.max_retries = value,
            ConfigKey::BackoffBase => config.backoff_base = value,
        }
        self.write(&config)?;
        Ok(config)
    }

    fn write(&self, config: &QueueConfig) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}
