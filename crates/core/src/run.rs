// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runs: one agent invocation for one user message.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::access::AccessTriple;
use crate::message::MessageId;
use crate::thread::{ContextDepth, ThreadId};

crate::define_id! {
    /// Unique identifier for one agent invocation.
    pub struct RunId;
}

/// Run lifecycle. Transitions are driven exclusively by the store's claim
/// statement (queued→running) and the worker's terminal update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    Running,
    Done,
    Failed,
}

crate::simple_display! {
    RunStatus {
        Queued => "queued",
        Running => "running",
        Done => "done",
        Failed => "failed",
    }
}

impl std::str::FromStr for RunStatus {
    type Err = crate::access::AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(Self::Queued),
            "running" => Ok(Self::Running),
            "done" => Ok(Self::Done),
            "failed" => Ok(Self::Failed),
            other => Err(crate::access::AccessError { axis: "run_status", value: other.to_string() }),
        }
    }
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub thread_id: ThreadId,
    pub user_message_id: MessageId,
    /// Set when the run completes successfully.
    pub assistant_message_id: Option<MessageId>,
    pub status: RunStatus,
    pub model: Option<String>,
    pub cli_path: PathBuf,
    /// Worktree path while isolation is active, else project path or
    /// portfolio workspace.
    pub cwd: PathBuf,
    pub log_path: PathBuf,
    pub context_depth: ContextDepth,
    /// Access snapshot taken at enqueue time. The thread's defaults may move
    /// afterwards; the run keeps what it was admitted with.
    pub access: AccessTriple,
    pub error: Option<String>,
    pub created_at_ms: u64,
    pub started_at_ms: Option<u64>,
    pub finished_at_ms: Option<u64>,
}

/// One shell command the agent attempted during a run. Append-only audit
/// record, replayed in the UI and fed to later turns as tool context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunCommand {
    pub run_id: RunId,
    /// Contiguous from 1 in the order the driver emitted the events.
    pub seq: u64,
    pub cwd: PathBuf,
    pub command: String,
    pub created_at_ms: u64,
}
