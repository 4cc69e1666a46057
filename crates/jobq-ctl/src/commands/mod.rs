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

//! One module per operator verb; each maps 1:1 onto a core operation.

pub mod config;
pub mod dlq;
pub mod enqueue;
pub mod list;
pub mod stats;
pub mod status;
pub mod worker;

use jobq::Job;

/// Renders a job listing the way `list` and `dlq list` share it.
pub(crate) fn print_jobs(jobs: &[Job], show_output: bool) {
    for job in jobs {
        println!(
            "  ID: {} | Attempts: {} | Priority: {} | Command: {}",
            job.id, job.attempts, job.priority, job.command
        );
        if show_output {
            if let Some(output) = job.output.as_deref().filter(|o| !o.trim().is_empty()) {
                println!("    --- Output ---");
                for line in output.trim().lines() {
                    println!("    {line}");
                }
                println!("    --------------");
            }
        }
    }
}
