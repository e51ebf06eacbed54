// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builders and fixtures shared by other crates' tests.

use std::path::PathBuf;

use crate::access::AccessTriple;
use crate::run::{Run, RunId, RunStatus};
use crate::scope::Scope;
use crate::thread::{ContextDepth, Thread};

/// A thread with conservative defaults, rooted at the given scope.
pub fn thread_fixture(scope: Scope) -> Thread {
    Thread {
        id: scope.thread_id(),
        scope,
        name: String::new(),
        summary: String::new(),
        summarized_count: 0,
        default_access: AccessTriple::default(),
        default_context_depth: ContextDepth::Messages,
        archived: false,
        worktree_path: None,
        has_pending_changes: false,
        last_ack_ms: None,
        created_at_ms: 0,
    }
}

/// A queued run for the given thread, pointing at a throwaway agent binary.
pub fn run_fixture(thread: &Thread, id: &str, user_message_id: i64) -> Run {
    Run {
        id: RunId::new(id),
        thread_id: thread.id.clone(),
        user_message_id,
        assistant_message_id: None,
        status: RunStatus::Queued,
        model: None,
        cli_path: PathBuf::from("codex"),
        cwd: PathBuf::from("."),
        log_path: PathBuf::from(format!("/tmp/{id}.jsonl")),
        context_depth: ContextDepth::Messages,
        access: AccessTriple::default(),
        error: None,
        created_at_ms: 0,
        started_at_ms: None,
        finished_at_ms: None,
    }
}
