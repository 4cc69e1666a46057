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

use anyhow::{Context, Result};
use colored::Colorize;

use jobq::{ConfigStore, NewJob, DAL};

pub async fn run(
    dal: &DAL,
    config: &ConfigStore,
    command: String,
    id: Option<String>,
    priority: i32,
) -> Result<()> {
    // The retry ceiling is snapshotted here; later config changes leave
    // already-enqueued jobs untouched.
    let current = config.load().context("Failed to read configuration")?;

    let job = dal
        .jobs()
        .enqueue(NewJob {
            id,
            command,
            priority,
            max_retries: current.max_retries as i32,
        })
        .await
        .context("Failed to enqueue job")?;

    println!(
        "{} Job '{}' enqueued successfully.",
        "✓".green().bold(),
        job.id
    );
    Ok(())
}
