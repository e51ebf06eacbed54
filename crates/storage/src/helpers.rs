// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Row ↔ domain-type mapping helpers.

use std::path::PathBuf;
use std::str::FromStr;

use rusqlite::Row;
use sb_core::{
    AccessTriple, ContextDepth, Message, PendingSend, Requires, Role, Run, RunStatus, Scope,
    ScopeKind, Thread,
};

use crate::StoreError;

/// Parse a TEXT column into anything with a `FromStr` whose error displays.
pub(crate) fn parse_col<T>(value: String) -> Result<T, StoreError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(StoreError::corrupt)
}

pub(crate) fn parse_allowlist(json: String) -> Result<Vec<String>, StoreError> {
    serde_json::from_str(&json).map_err(StoreError::corrupt)
}

pub(crate) fn allowlist_json(allowlist: &[String]) -> String {
    serde_json::to_string(allowlist).unwrap_or_else(|_| "[]".to_string())
}

/// Column order must match the `thread_columns` SELECT lists.
pub(crate) const THREAD_COLUMNS: &str = "id, scope, project_id, workorder_id, name, summary, \
     summarized_count, fs_access, cli_access, net_access, net_allowlist, context_depth, \
     archived, worktree_path, has_pending_changes, last_ack_ms, created_at_ms";

pub(crate) fn row_to_thread(row: &Row<'_>) -> Result<RawThread, rusqlite::Error> {
    Ok(RawThread {
        id: row.get(0)?,
        scope: row.get(1)?,
        project_id: row.get(2)?,
        workorder_id: row.get(3)?,
        name: row.get(4)?,
        summary: row.get(5)?,
        summarized_count: row.get(6)?,
        fs_access: row.get(7)?,
        cli_access: row.get(8)?,
        net_access: row.get(9)?,
        net_allowlist: row.get(10)?,
        context_depth: row.get(11)?,
        archived: row.get(12)?,
        worktree_path: row.get(13)?,
        has_pending_changes: row.get(14)?,
        last_ack_ms: row.get(15)?,
        created_at_ms: row.get(16)?,
    })
}

/// Intermediate shape so `rusqlite::Error` stays at the row boundary and
/// enum parsing surfaces as `StoreError::Corrupt`.
pub(crate) struct RawThread {
    id: String,
    scope: String,
    project_id: Option<String>,
    workorder_id: Option<String>,
    name: String,
    summary: String,
    summarized_count: i64,
    fs_access: String,
    cli_access: String,
    net_access: String,
    net_allowlist: String,
    context_depth: String,
    archived: bool,
    worktree_path: Option<String>,
    has_pending_changes: bool,
    last_ack_ms: Option<i64>,
    created_at_ms: i64,
}

impl RawThread {
    pub(crate) fn into_thread(self) -> Result<Thread, StoreError> {
        let kind: ScopeKind = parse_col(self.scope)?;
        Ok(Thread {
            id: self.id.into(),
            scope: Scope {
                kind,
                project_id: self.project_id,
                workorder_id: self.workorder_id,
            },
            name: self.name,
            summary: self.summary,
            summarized_count: self.summarized_count as u64,
            default_access: AccessTriple {
                filesystem: parse_col(self.fs_access)?,
                cli: parse_col(self.cli_access)?,
                network: parse_col(self.net_access)?,
                network_allowlist: parse_allowlist(self.net_allowlist)?,
            },
            default_context_depth: parse_col(self.context_depth)?,
            archived: self.archived,
            worktree_path: self.worktree_path.map(PathBuf::from),
            has_pending_changes: self.has_pending_changes,
            last_ack_ms: self.last_ack_ms.map(|v| v as u64),
            created_at_ms: self.created_at_ms as u64,
        })
    }
}

pub(crate) const RUN_COLUMNS: &str = "id, thread_id, user_message_id, assistant_message_id, \
     status, model, cli_path, cwd, log_path, context_depth, fs_access, cli_access, net_access, \
     net_allowlist, error, created_at_ms, started_at_ms, finished_at_ms";

pub(crate) struct RawRun {
    pub id: String,
    pub thread_id: String,
    pub user_message_id: i64,
    pub assistant_message_id: Option<i64>,
    pub status: String,
    pub model: Option<String>,
    pub cli_path: String,
    pub cwd: String,
    pub log_path: String,
    pub context_depth: String,
    pub fs_access: String,
    pub cli_access: String,
    pub net_access: String,
    pub net_allowlist: String,
    pub error: Option<String>,
    pub created_at_ms: i64,
    pub started_at_ms: Option<i64>,
    pub finished_at_ms: Option<i64>,
}

pub(crate) fn row_to_run(row: &Row<'_>) -> Result<RawRun, rusqlite::Error> {
    Ok(RawRun {
        id: row.get(0)?,
        thread_id: row.get(1)?,
        user_message_id: row.get(2)?,
        assistant_message_id: row.get(3)?,
        status: row.get(4)?,
        model: row.get(5)?,
        cli_path: row.get(6)?,
        cwd: row.get(7)?,
        log_path: row.get(8)?,
        context_depth: row.get(9)?,
        fs_access: row.get(10)?,
        cli_access: row.get(11)?,
        net_access: row.get(12)?,
        net_allowlist: row.get(13)?,
        error: row.get(14)?,
        created_at_ms: row.get(15)?,
        started_at_ms: row.get(16)?,
        finished_at_ms: row.get(17)?,
    })
}

impl RawRun {
    pub(crate) fn into_run(self) -> Result<Run, StoreError> {
        let status: RunStatus = parse_col(self.status)?;
        Ok(Run {
            id: self.id.into(),
            thread_id: self.thread_id.into(),
            user_message_id: self.user_message_id,
            assistant_message_id: self.assistant_message_id,
            status,
            model: self.model,
            cli_path: PathBuf::from(self.cli_path),
            cwd: PathBuf::from(self.cwd),
            log_path: PathBuf::from(self.log_path),
            context_depth: parse_col(self.context_depth)?,
            access: AccessTriple {
                filesystem: parse_col(self.fs_access)?,
                cli: parse_col(self.cli_access)?,
                network: parse_col(self.net_access)?,
                network_allowlist: parse_allowlist(self.net_allowlist)?,
            },
            error: self.error,
            created_at_ms: self.created_at_ms as u64,
            started_at_ms: self.started_at_ms.map(|v| v as u64),
            finished_at_ms: self.finished_at_ms.map(|v| v as u64),
        })
    }
}

pub(crate) struct RawMessage {
    pub id: i64,
    pub thread_id: String,
    pub seq: i64,
    pub role: String,
    pub content: String,
    pub actions: String,
    pub run_id: Option<String>,
    pub needs_user_input: bool,
    pub created_at_ms: i64,
}

pub(crate) const MESSAGE_COLUMNS: &str =
    "id, thread_id, seq, role, content, actions, run_id, needs_user_input, created_at_ms";

pub(crate) fn row_to_message(row: &Row<'_>) -> Result<RawMessage, rusqlite::Error> {
    Ok(RawMessage {
        id: row.get(0)?,
        thread_id: row.get(1)?,
        seq: row.get(2)?,
        role: row.get(3)?,
        content: row.get(4)?,
        actions: row.get(5)?,
        run_id: row.get(6)?,
        needs_user_input: row.get(7)?,
        created_at_ms: row.get(8)?,
    })
}

impl RawMessage {
    pub(crate) fn into_message(self) -> Result<Message, StoreError> {
        let role: Role = parse_col(self.role)?;
        Ok(Message {
            id: self.id,
            thread_id: self.thread_id.into(),
            seq: self.seq as u64,
            role,
            content: self.content,
            actions: serde_json::from_str(&self.actions).map_err(StoreError::corrupt)?,
            run_id: self.run_id.map(Into::into),
            needs_user_input: self.needs_user_input,
            created_at_ms: self.created_at_ms as u64,
        })
    }
}

pub(crate) const PENDING_COLUMNS: &str = "id, thread_id, content, context_depth, fs_access, \
     cli_access, net_access, net_allowlist, requires_write, requires_network, created_at_ms, \
     resolved_at_ms, canceled_at_ms";

pub(crate) struct RawPending {
    pub id: String,
    pub thread_id: String,
    pub content: String,
    pub context_depth: String,
    pub fs_access: String,
    pub cli_access: String,
    pub net_access: String,
    pub net_allowlist: String,
    pub requires_write: bool,
    pub requires_network: bool,
    pub created_at_ms: i64,
    pub resolved_at_ms: Option<i64>,
    pub canceled_at_ms: Option<i64>,
}

pub(crate) fn row_to_pending(row: &Row<'_>) -> Result<RawPending, rusqlite::Error> {
    Ok(RawPending {
        id: row.get(0)?,
        thread_id: row.get(1)?,
        content: row.get(2)?,
        context_depth: row.get(3)?,
        fs_access: row.get(4)?,
        cli_access: row.get(5)?,
        net_access: row.get(6)?,
        net_allowlist: row.get(7)?,
        requires_write: row.get(8)?,
        requires_network: row.get(9)?,
        created_at_ms: row.get(10)?,
        resolved_at_ms: row.get(11)?,
        canceled_at_ms: row.get(12)?,
    })
}

impl RawPending {
    pub(crate) fn into_pending(self) -> Result<PendingSend, StoreError> {
        let depth: ContextDepth = parse_col(self.context_depth)?;
        Ok(PendingSend {
            id: self.id.into(),
            thread_id: self.thread_id.into(),
            content: self.content,
            context_depth: depth,
            access: AccessTriple {
                filesystem: parse_col(self.fs_access)?,
                cli: parse_col(self.cli_access)?,
                network: parse_col(self.net_access)?,
                network_allowlist: parse_allowlist(self.net_allowlist)?,
            },
            requires: Requires {
                write: self.requires_write,
                network_allowlist: self.requires_network,
            },
            created_at_ms: self.created_at_ms as u64,
            resolved_at_ms: self.resolved_at_ms.map(|v| v as u64),
            canceled_at_ms: self.canceled_at_ms.map(|v| v as u64),
        })
    }
}
