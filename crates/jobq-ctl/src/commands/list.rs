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

use jobq::{JobState, DAL};

pub async fn run(dal: &DAL, state: JobState, show_output: bool) -> Result<()> {
    let jobs = dal
        .jobs()
        .list_by_state(state)
        .await
        .context("Failed to list jobs")?;

    if jobs.is_empty() {
        println!("No jobs found with state '{state}'.");
        return Ok(());
    }

    println!("--- Jobs ({}) ---", state.as_str().to_uppercase());
    super::print_jobs(&jobs, show_output);
    Ok(())
}
