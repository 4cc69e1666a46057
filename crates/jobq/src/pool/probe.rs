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

//! Process liveness probing.
//!
//! The probe is a trait so the platform-specific "is this PID still
//! running" capability can be swapped per target and faked in tests.

/// Capability for checking whether a worker process is still alive.
pub trait ProcessProbe: Send + Sync {
    /// Returns whether `pid` resolves to a live process.
    fn is_running(&self, pid: u32) -> bool;
}

/// Production probe backed by the system process table.
#[derive(Debug, Clone, Default)]
pub struct SysinfoProbe;

impl ProcessProbe for SysinfoProbe {
    fn is_running(&self, pid: u32) -> bool {
        use sysinfo::{Pid, ProcessStatus, System};

        let system = System::new_all();
        match system.process(Pid::from(pid as usize)) {
            // An exited child the parent has not reaped yet still has a
            // process-table entry; it is not a live worker.
            Some(process) => process.status() != ProcessStatus::Zombie,
            None => false,
        }
    }
}
