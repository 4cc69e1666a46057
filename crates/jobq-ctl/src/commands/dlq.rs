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

use anyhow::{bail, Context, Result};
use colored::Colorize;

use jobq::{JobState, DAL};

pub async fn list(dal: &DAL, show_output: bool) -> Result<()> {
    let jobs = dal
        .jobs()
        .list_by_state(JobState::Dead)
        .await
        .context("Failed to list the dead-letter queue")?;

    if jobs.is_empty() {
        println!("DLQ is empty.");
        return Ok(());
    }

    println!("--- Dead Letter Queue (DLQ) ---");
    super::print_jobs(&jobs, show_output);
    Ok(())
}

pub async fn retry(dal: &DAL, job_id: &str) -> Result<()> {
    let replayed = dal
        .jobs()
        .retry_dead(job_id)
        .await
        .context("Failed to retry job")?;

    if !replayed {
        bail!("Job '{job_id}' not found in DLQ.");
    }
    println!(
        "{} Job '{}' moved from DLQ back to 'pending'.",
        "✓".green().bold(),
        job_id
    );
    Ok(())
}
