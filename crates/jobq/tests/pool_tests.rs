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

//! Pool supervisor tests against real OS processes.

use std::sync::Arc;
use std::time::Duration;

use serial_test::serial;
use tempfile::TempDir;

use jobq::{SysinfoProbe, WorkerCommand, WorkerPool, WorkerRegistry};

fn pool(dir: &TempDir) -> WorkerPool {
    WorkerPool::new(
        WorkerRegistry::new(dir.path().join("workers.json")),
        dir.path(),
        Arc::new(SysinfoProbe),
    )
}

fn sleeper() -> WorkerCommand {
    WorkerCommand {
        program: "sh".into(),
        args: vec!["-c".into(), "sleep 30".into()],
    }
}

#[test]
#[serial]
fn test_start_then_stop_terminates_the_pool() {
    let dir = TempDir::new().unwrap();
    let pool = pool(&dir);

    let started = pool.start(2, &sleeper()).unwrap();
    assert_eq!(started.len(), 2);
    assert_eq!(pool.live_worker_count().unwrap(), 2);

    let report = pool.stop().unwrap();
    assert_eq!(report.signalled, 2);

    // The registry is always emptied by stop, and the processes are gone.
    let registry = WorkerRegistry::new(dir.path().join("workers.json"));
    assert!(registry.load().unwrap().is_empty());
    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(pool.live_worker_count().unwrap(), 0);
}

#[test]
#[serial]
fn test_status_prunes_exited_workers() {
    let dir = TempDir::new().unwrap();
    let pool = pool(&dir);

    let short_lived = WorkerCommand {
        program: "sh".into(),
        args: vec!["-c".into(), "exit 0".into()],
    };
    pool.start(1, &short_lived).unwrap();

    // Give the child a moment to exit, then watch the probe prune it.
    std::thread::sleep(Duration::from_millis(500));
    assert_eq!(pool.live_worker_count().unwrap(), 0);
    let registry = WorkerRegistry::new(dir.path().join("workers.json"));
    assert!(registry.load().unwrap().is_empty());
}

#[test]
#[serial]
fn test_start_appends_to_an_existing_pool() {
    let dir = TempDir::new().unwrap();
    let pool = pool(&dir);

    pool.start(1, &sleeper()).unwrap();
    pool.start(1, &sleeper()).unwrap();
    assert_eq!(pool.live_worker_count().unwrap(), 2);

    pool.stop().unwrap();
}
