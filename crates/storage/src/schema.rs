// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema and migrations. The baseline schema is idempotent; later changes
//! gate on `schema_version`.

use rusqlite::Connection;

use crate::StoreError;

pub(crate) const SCHEMA_VERSION: i64 = 1;

pub(crate) const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS threads (
    id TEXT PRIMARY KEY,
    scope TEXT NOT NULL,
    project_id TEXT,
    workorder_id TEXT,
    name TEXT NOT NULL DEFAULT '',
    summary TEXT NOT NULL DEFAULT '',
    summarized_count INTEGER NOT NULL DEFAULT 0,
    fs_access TEXT NOT NULL,
    cli_access TEXT NOT NULL,
    net_access TEXT NOT NULL,
    net_allowlist TEXT NOT NULL DEFAULT '[]',
    context_depth TEXT NOT NULL,
    archived INTEGER NOT NULL DEFAULT 0,
    worktree_path TEXT,
    has_pending_changes INTEGER NOT NULL DEFAULT 0,
    last_ack_ms INTEGER,
    created_at_ms INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    thread_id TEXT NOT NULL REFERENCES threads(id),
    seq INTEGER NOT NULL,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    actions TEXT NOT NULL DEFAULT '[]',
    run_id TEXT,
    needs_user_input INTEGER NOT NULL DEFAULT 0,
    created_at_ms INTEGER NOT NULL,
    UNIQUE (thread_id, seq)
);
CREATE INDEX IF NOT EXISTS idx_messages_thread ON messages(thread_id, seq);

CREATE TABLE IF NOT EXISTS runs (
    id TEXT PRIMARY KEY,
    thread_id TEXT NOT NULL REFERENCES threads(id),
    user_message_id INTEGER NOT NULL,
    assistant_message_id INTEGER,
    status TEXT NOT NULL,
    model TEXT,
    cli_path TEXT NOT NULL,
    cwd TEXT NOT NULL,
    log_path TEXT NOT NULL,
    context_depth TEXT NOT NULL,
    fs_access TEXT NOT NULL,
    cli_access TEXT NOT NULL,
    net_access TEXT NOT NULL,
    net_allowlist TEXT NOT NULL DEFAULT '[]',
    error TEXT,
    created_at_ms INTEGER NOT NULL,
    started_at_ms INTEGER,
    finished_at_ms INTEGER
);
CREATE INDEX IF NOT EXISTS idx_runs_thread ON runs(thread_id, status, created_at_ms);

CREATE TABLE IF NOT EXISTS run_commands (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id TEXT NOT NULL REFERENCES runs(id),
    seq INTEGER NOT NULL,
    cwd TEXT NOT NULL,
    command TEXT NOT NULL,
    created_at_ms INTEGER NOT NULL,
    UNIQUE (run_id, seq)
);

CREATE TABLE IF NOT EXISTS pending_sends (
    id TEXT PRIMARY KEY,
    thread_id TEXT NOT NULL REFERENCES threads(id),
    content TEXT NOT NULL,
    context_depth TEXT NOT NULL,
    fs_access TEXT NOT NULL,
    cli_access TEXT NOT NULL,
    net_access TEXT NOT NULL,
    net_allowlist TEXT NOT NULL DEFAULT '[]',
    requires_write INTEGER NOT NULL,
    requires_network INTEGER NOT NULL,
    created_at_ms INTEGER NOT NULL,
    resolved_at_ms INTEGER,
    canceled_at_ms INTEGER
);
CREATE INDEX IF NOT EXISTS idx_pending_thread ON pending_sends(thread_id);

CREATE TABLE IF NOT EXISTS action_ledger (
    id TEXT PRIMARY KEY,
    thread_id TEXT NOT NULL REFERENCES threads(id),
    run_id TEXT,
    message_id INTEGER,
    action_index INTEGER NOT NULL,
    action_type TEXT NOT NULL,
    payload_json TEXT NOT NULL,
    applied_at_ms INTEGER NOT NULL,
    undo_payload_json TEXT,
    undone_at_ms INTEGER,
    undo_reason TEXT,
    error TEXT
);
CREATE INDEX IF NOT EXISTS idx_ledger_thread ON action_ledger(thread_id, applied_at_ms);

CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    starred INTEGER NOT NULL DEFAULT 0,
    hidden INTEGER NOT NULL DEFAULT 0,
    success_note TEXT
);

CREATE TABLE IF NOT EXISTS work_orders (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'open',
    created_at_ms INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_work_orders_project ON work_orders(project_id);

CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
INSERT OR IGNORE INTO schema_version VALUES (1);
"#;

/// Apply migrations past the baseline. None yet; the gate stays so the first
/// real migration only has to add its block.
pub(crate) fn migrate(conn: &Connection) -> Result<(), StoreError> {
    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;
    if version > SCHEMA_VERSION {
        tracing::warn!(version, supported = SCHEMA_VERSION, "database is newer than this build");
    }
    Ok(())
}
