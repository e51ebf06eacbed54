// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server startup: lock file, directories, store, restart recovery.

use std::fs::File;
use std::io::Write;

use fs2::FileExt;
use sb_core::{BusEvent, RunStatus};
use sb_engine::{ChatPaths, Engine, EventBus, WorkerLauncher};
use sb_storage::Store;
use thiserror::Error;

use crate::config::ServerConfig;

/// The reason written onto runs orphaned by a restart.
pub const RESTART_FAIL_REASON: &str = "Server restarted; run aborted.";

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("another server already holds the lock at {path}")]
    LockHeld { path: String },

    #[error("storage error: {0}")]
    Storage(#[from] sb_storage::StoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct StartupResult {
    pub engine: Engine,
    /// Held for the server's lifetime; dropping releases the singleton lock.
    pub lock_file: File,
}

impl std::fmt::Debug for StartupResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StartupResult").finish_non_exhaustive()
    }
}

/// Bring the server up: directories, exclusive lock, store, engine, and the
/// optional mark-orphans-failed pass.
pub fn startup(config: &ServerConfig) -> Result<StartupResult, LifecycleError> {
    let paths = ChatPaths::new(&config.portfolio);
    std::fs::create_dir_all(paths.chat_dir())?;
    std::fs::create_dir_all(paths.worktrees_dir())?;

    // Lock before anything else touches shared state. Open without
    // truncating so a losing contender does not wipe the holder's pid.
    let lock_path = paths.state_dir().join("sbd.lock");
    let mut lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(|_| LifecycleError::LockHeld { path: lock_path.display().to_string() })?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    let store = Store::open(&paths.db_path())?;
    let bus = EventBus::new();

    // Operator-toggled clean slate: detached workers may still be running
    // their turns, but environments that want queued/running rows cleared on
    // restart get exactly the running ones failed.
    if config.fail_running_on_start {
        let failed = store.fail_running_runs(RESTART_FAIL_REASON)?;
        for (run_id, thread_id) in &failed {
            bus.publish(BusEvent::RunStatus {
                thread_id: thread_id.clone(),
                run_id: run_id.clone(),
                status: RunStatus::Failed,
                error: Some(RESTART_FAIL_REASON.to_string()),
            });
        }
        if !failed.is_empty() {
            tracing::info!(count = failed.len(), "marked orphaned running runs as failed");
        }
    }

    let launcher = WorkerLauncher::new(config.worker_launch.clone(), config.worker_envs());
    let engine = Engine::new(store, bus, launcher, config.engine_config());

    Ok(StartupResult { engine, lock_file })
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
