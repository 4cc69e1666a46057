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
    let stats = dal
        .metrics()
        .stats()
        .await
        .context("Failed to read execution stats")?;

    println!("--- Execution Stats ---");
    println!("  Total Jobs Completed: {}", stats.total_completed);
    println!("  Total Jobs Failed (DLQ): {}", stats.total_dead);
    println!(
        "  Avg. Completion Time: {:.2} ms",
        stats.avg_completion_time_ms
    );
    Ok(())
}
