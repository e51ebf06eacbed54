// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pending-send rows: parked submissions awaiting confirmation.

use rusqlite::{params, OptionalExtension};
use sb_core::{epoch_ms_now, AccessTriple, ContextDepth, PendingSend, PendingSendId, ThreadId};

use crate::helpers::{allowlist_json, row_to_pending, PENDING_COLUMNS};
use crate::{Store, StoreError};

impl Store {
    pub fn insert_pending(&self, pending: &PendingSend) -> Result<(), StoreError> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO pending_sends \
             (id, thread_id, content, context_depth, fs_access, cli_access, net_access, \
              net_allowlist, requires_write, requires_network, created_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                pending.id.as_str(),
                pending.thread_id.as_str(),
                pending.content,
                pending.context_depth.to_string(),
                pending.access.filesystem.to_string(),
                pending.access.cli.to_string(),
                pending.access.network.to_string(),
                allowlist_json(&pending.access.network_allowlist),
                pending.requires.write,
                pending.requires.network_allowlist,
                pending.created_at_ms as i64,
            ],
        )?;
        Ok(())
    }

    pub fn get_pending(&self, id: &PendingSendId) -> Result<Option<PendingSend>, StoreError> {
        let conn = self.conn();
        let raw = conn
            .query_row(
                &format!("SELECT {PENDING_COLUMNS} FROM pending_sends WHERE id = ?1"),
                params![id.as_str()],
                row_to_pending,
            )
            .optional()?;
        raw.map(|r| r.into_pending()).transpose()
    }

    pub fn list_open_pending(&self, thread_id: &ThreadId) -> Result<Vec<PendingSend>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PENDING_COLUMNS} FROM pending_sends \
             WHERE thread_id = ?1 AND resolved_at_ms IS NULL AND canceled_at_ms IS NULL \
             ORDER BY created_at_ms ASC"
        ))?;
        let rows = stmt.query_map(params![thread_id.as_str()], row_to_pending)?;
        let mut pendings = Vec::new();
        for raw in rows {
            pendings.push(raw?.into_pending()?);
        }
        Ok(pendings)
    }

    /// Resolve every open pending row matching the `(thread, content,
    /// context_depth, access)` key of a confirmed submission. One statement,
    /// so a racing duplicate confirm cannot resolve the same row twice.
    pub fn resolve_matching_pending(
        &self,
        thread_id: &ThreadId,
        content: &str,
        depth: ContextDepth,
        access: &AccessTriple,
    ) -> Result<Vec<PendingSendId>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "UPDATE pending_sends SET resolved_at_ms = ?7 \
             WHERE thread_id = ?1 AND content = ?2 AND context_depth = ?3 \
             AND fs_access = ?4 AND cli_access = ?5 AND net_access = ?6 \
             AND resolved_at_ms IS NULL AND canceled_at_ms IS NULL \
             RETURNING id",
        )?;
        let rows = stmt.query_map(
            params![
                thread_id.as_str(),
                content,
                depth.to_string(),
                access.filesystem.to_string(),
                access.cli.to_string(),
                access.network.to_string(),
                epoch_ms_now() as i64,
            ],
            |r| r.get::<_, String>(0),
        )?;
        let mut resolved = Vec::new();
        for row in rows {
            resolved.push(PendingSendId::new(row?));
        }
        Ok(resolved)
    }

    /// Cancel an open pending send. Returns false when it was already
    /// resolved or canceled.
    pub fn cancel_pending(&self, id: &PendingSendId) -> Result<bool, StoreError> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE pending_sends SET canceled_at_ms = ?2 \
             WHERE id = ?1 AND resolved_at_ms IS NULL AND canceled_at_ms IS NULL",
            params![id.as_str(), epoch_ms_now() as i64],
        )?;
        Ok(changed == 1)
    }
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
