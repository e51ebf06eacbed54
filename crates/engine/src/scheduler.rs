// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker launch: every run executes in a detached subprocess so the server
//! and in-flight runs can outlive each other.
//!
//! The launch strategy is resolved once at startup into an explicit
//! configuration value; nothing here inspects ambient process state at spawn
//! time.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use sb_core::{RunId, ThreadId};
use sb_storage::Store;

use crate::EngineError;

/// How to start a worker for a run.
#[derive(Debug, Clone)]
pub enum WorkerLaunch {
    /// Compiled worker binary.
    Binary(PathBuf),
    /// Source-level fallback: `cargo run --bin sb-worker` from a manifest
    /// directory. Used in development checkouts without an installed binary.
    Source { manifest_dir: PathBuf },
    /// No spawning (tests and embedded use run turns in-process).
    Disabled,
}

#[derive(Clone)]
pub struct WorkerLauncher {
    launch: WorkerLaunch,
    /// Environment handed to every worker (portfolio root and friends).
    envs: Vec<(String, String)>,
}

impl WorkerLauncher {
    pub fn new(launch: WorkerLaunch, envs: Vec<(String, String)>) -> Self {
        Self { launch, envs }
    }

    pub fn disabled() -> Self {
        Self { launch: WorkerLaunch::Disabled, envs: Vec::new() }
    }

    /// Spawn a detached worker for `run_id`. Returns false when spawning is
    /// disabled.
    pub fn spawn(&self, run_id: &RunId) -> Result<bool, EngineError> {
        let mut command = match &self.launch {
            WorkerLaunch::Disabled => return Ok(false),
            WorkerLaunch::Binary(bin) => {
                let mut c = Command::new(bin);
                c.arg("--run-id").arg(run_id.as_str());
                c
            }
            WorkerLaunch::Source { manifest_dir } => {
                let mut c = Command::new("cargo");
                c.args(["run", "--quiet", "--bin", "sb-worker", "--"])
                    .arg("--run-id")
                    .arg(run_id.as_str())
                    .current_dir(manifest_dir);
                c
            }
        };
        command.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
        for (key, value) in &self.envs {
            command.env(key, value);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // New process group: the worker survives a server exit.
            command.process_group(0);
        }
        let child = command
            .spawn()
            .map_err(|e| EngineError::Internal(format!("worker spawn failed: {e}")))?;
        tracing::info!(run_id = run_id.as_str(), pid = child.id(), "worker spawned");
        Ok(true)
    }
}

/// The at-most-one enqueue chain: look up the next queued run for the thread
/// and hand it to a worker. Returns the id that was attempted, if any.
pub fn chain_next(
    store: &Store,
    launcher: &WorkerLauncher,
    thread_id: &ThreadId,
) -> Result<Option<RunId>, EngineError> {
    let Some(next) = store.next_queued_run_id(thread_id)? else {
        return Ok(None);
    };
    launcher.spawn(&next)?;
    Ok(Some(next))
}
