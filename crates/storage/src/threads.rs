// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thread rows: idempotent ensure, listing, and the PATCH surface.

use std::path::Path;

use rusqlite::{params, OptionalExtension};
use sb_core::{epoch_ms_now, AccessTriple, ContextDepth, Scope, Thread, ThreadId};

use crate::helpers::{allowlist_json, row_to_thread, THREAD_COLUMNS};
use crate::{Store, StoreError};

impl Store {
    /// Idempotent upsert keyed by the scope-derived thread id. Returns the
    /// existing row unchanged when present.
    pub fn ensure_thread(&self, scope: &Scope) -> Result<Thread, StoreError> {
        scope.validate()?;
        let id = scope.thread_id();
        if let Some(existing) = self.get_thread(&id)? {
            return Ok(existing);
        }
        let defaults = AccessTriple::default();
        let conn = self.conn();
        conn.execute(
            "INSERT OR IGNORE INTO threads \
             (id, scope, project_id, workorder_id, fs_access, cli_access, net_access, \
              net_allowlist, context_depth, created_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                id.as_str(),
                scope.kind.to_string(),
                scope.project_id,
                scope.workorder_id,
                defaults.filesystem.to_string(),
                defaults.cli.to_string(),
                defaults.network.to_string(),
                allowlist_json(&defaults.network_allowlist),
                ContextDepth::default().to_string(),
                epoch_ms_now() as i64,
            ],
        )?;
        drop(conn);
        self.get_thread(&id)?.ok_or_else(|| StoreError::NotFound {
            entity: "thread",
            id: id.to_string(),
        })
    }

    pub fn get_thread(&self, id: &ThreadId) -> Result<Option<Thread>, StoreError> {
        let conn = self.conn();
        let raw = conn
            .query_row(
                &format!("SELECT {THREAD_COLUMNS} FROM threads WHERE id = ?1"),
                params![id.as_str()],
                row_to_thread,
            )
            .optional()?;
        raw.map(|r| r.into_thread()).transpose()
    }

    pub fn list_threads(&self, include_archived: bool) -> Result<Vec<Thread>, StoreError> {
        let conn = self.conn();
        let sql = if include_archived {
            format!("SELECT {THREAD_COLUMNS} FROM threads ORDER BY created_at_ms")
        } else {
            format!("SELECT {THREAD_COLUMNS} FROM threads WHERE archived = 0 ORDER BY created_at_ms")
        };
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], row_to_thread)?;
        let mut threads = Vec::new();
        for raw in rows {
            threads.push(raw?.into_thread()?);
        }
        Ok(threads)
    }

    pub fn rename_thread(&self, id: &ThreadId, name: &str) -> Result<(), StoreError> {
        self.update_thread(id, "UPDATE threads SET name = ?2 WHERE id = ?1", params![
            id.as_str(),
            name
        ])
    }

    pub fn set_thread_archived(&self, id: &ThreadId, archived: bool) -> Result<(), StoreError> {
        self.update_thread(id, "UPDATE threads SET archived = ?2 WHERE id = ?1", params![
            id.as_str(),
            archived
        ])
    }

    pub fn set_thread_defaults(
        &self,
        id: &ThreadId,
        access: &AccessTriple,
        depth: ContextDepth,
    ) -> Result<(), StoreError> {
        self.update_thread(
            id,
            "UPDATE threads SET fs_access = ?2, cli_access = ?3, net_access = ?4, \
             net_allowlist = ?5, context_depth = ?6 WHERE id = ?1",
            params![
                id.as_str(),
                access.filesystem.to_string(),
                access.cli.to_string(),
                access.network.to_string(),
                allowlist_json(&access.network_allowlist),
                depth.to_string(),
            ],
        )
    }

    pub fn set_thread_worktree(
        &self,
        id: &ThreadId,
        path: Option<&Path>,
    ) -> Result<(), StoreError> {
        self.update_thread(
            id,
            "UPDATE threads SET worktree_path = ?2 WHERE id = ?1",
            params![id.as_str(), path.map(|p| p.display().to_string())],
        )
    }

    pub fn set_thread_pending_changes(
        &self,
        id: &ThreadId,
        pending: bool,
    ) -> Result<(), StoreError> {
        self.update_thread(
            id,
            "UPDATE threads SET has_pending_changes = ?2 WHERE id = ?1",
            params![id.as_str(), pending],
        )
    }

    pub fn ack_thread(&self, id: &ThreadId, now_ms: u64) -> Result<(), StoreError> {
        self.update_thread(
            id,
            "UPDATE threads SET last_ack_ms = ?2 WHERE id = ?1",
            params![id.as_str(), now_ms as i64],
        )
    }

    /// Replace the rolling summary and advance the summarized count in one
    /// statement, refusing to ever move the count backwards.
    pub fn set_thread_summary(
        &self,
        id: &ThreadId,
        summary: &str,
        summarized_count: u64,
    ) -> Result<(), StoreError> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE threads SET summary = ?2, summarized_count = ?3 \
             WHERE id = ?1 AND summarized_count <= ?3",
            params![id.as_str(), summary, summarized_count as i64],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound { entity: "thread", id: id.to_string() });
        }
        Ok(())
    }

    fn update_thread(
        &self,
        id: &ThreadId,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<(), StoreError> {
        let conn = self.conn();
        let changed = conn.execute(sql, params)?;
        if changed == 0 {
            return Err(StoreError::NotFound { entity: "thread", id: id.to_string() });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "threads_tests.rs"]
mod tests;
