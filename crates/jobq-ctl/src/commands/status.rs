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

use jobq::DAL;

pub async fn run(dal: &DAL) -> Result<()> {
    let summary = dal
        .jobs()
        .status_summary()
        .await
        .context("Failed to read queue status")?;
    let active_workers = super::worker::live_worker_count()?;

    println!("--- Job Queue Status ---");
    println!("  Pending:    {}", summary.pending);
    println!("  Processing: {}", summary.processing);
    println!("  Completed:  {}", summary.completed);
    println!("  Failed:     {}", summary.failed);
    println!("  Dead (DLQ): {}", summary.dead);
    println!("------------------------");
    println!("  Active Workers: {active_workers}");
    Ok(())
}
