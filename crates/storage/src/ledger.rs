// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action ledger: transactional apply, marked (never deleted) undo.
//!
//! The ledger insert and the entity mutation it records happen inside one
//! transaction; a crash between the two cannot leave an applied action
//! without its ledger row or vice versa.

use rusqlite::{params, OptionalExtension, Row, Transaction};
use sb_core::{epoch_ms_now, Action, LedgerEntry, LedgerId, ThreadId};
use serde_json::json;
use uuid::Uuid;

use crate::{Store, StoreError};

/// Where an applied action came from.
#[derive(Debug, Clone)]
pub struct LedgerContext {
    pub thread_id: ThreadId,
    pub run_id: Option<sb_core::RunId>,
    pub message_id: Option<i64>,
    pub action_index: u32,
}

const LEDGER_COLUMNS: &str = "id, thread_id, run_id, message_id, action_index, action_type, \
     payload_json, applied_at_ms, undo_payload_json, undone_at_ms, undo_reason, error";

fn row_to_entry(row: &Row<'_>) -> Result<LedgerEntry, rusqlite::Error> {
    Ok(LedgerEntry {
        id: LedgerId::new(row.get::<_, String>(0)?),
        thread_id: ThreadId::new(row.get::<_, String>(1)?),
        run_id: row.get::<_, Option<String>>(2)?.map(Into::into),
        message_id: row.get(3)?,
        action_index: row.get::<_, i64>(4)? as u32,
        action_type: row.get(5)?,
        payload_json: row.get(6)?,
        applied_at_ms: row.get::<_, i64>(7)? as u64,
        undo_payload_json: row.get(8)?,
        undone_at_ms: row.get::<_, Option<i64>>(9)?.map(|v| v as u64),
        undo_reason: row.get(10)?,
        error: row.get(11)?,
    })
}

impl Store {
    /// Apply an action: mutate the target entity and insert the ledger row
    /// atomically. Action types without a database mutation (rescan, run
    /// dispatch, worktree merge) only get the ledger row; their side effects
    /// run outside the store.
    pub fn apply_action(
        &self,
        ctx: &LedgerContext,
        action: &Action,
    ) -> Result<LedgerEntry, StoreError> {
        let payload_json = serde_json::to_string(action).map_err(StoreError::corrupt)?;
        let id = LedgerId::new(Uuid::new_v4().to_string());
        let now = epoch_ms_now();

        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let undo_payload = mutate(&tx, action)?;
        tx.execute(
            "INSERT INTO action_ledger \
             (id, thread_id, run_id, message_id, action_index, action_type, payload_json, \
              applied_at_ms, undo_payload_json) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id.as_str(),
                ctx.thread_id.as_str(),
                ctx.run_id.as_ref().map(|r| r.as_str().to_string()),
                ctx.message_id,
                ctx.action_index as i64,
                action.type_name(),
                payload_json,
                now as i64,
                undo_payload,
            ],
        )?;
        let entry = tx.query_row(
            &format!("SELECT {LEDGER_COLUMNS} FROM action_ledger WHERE id = ?1"),
            params![id.as_str()],
            row_to_entry,
        )?;
        tx.commit()?;
        Ok(entry)
    }

    /// Undo a ledger entry: restore the entity from the captured undo
    /// payload and mark the entry with a timestamp and reason. The row — its
    /// `applied_at` and `payload_json` included — is never rewritten.
    pub fn undo_action(&self, id: &LedgerId, reason: &str) -> Result<LedgerEntry, StoreError> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let entry = tx
            .query_row(
                &format!("SELECT {LEDGER_COLUMNS} FROM action_ledger WHERE id = ?1"),
                params![id.as_str()],
                row_to_entry,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound { entity: "ledger entry", id: id.to_string() })?;
        if entry.is_undone() {
            return Err(StoreError::AlreadyUndone(id.to_string()));
        }

        unmutate(&tx, &entry)?;
        tx.execute(
            "UPDATE action_ledger SET undone_at_ms = ?2, undo_reason = ?3 WHERE id = ?1",
            params![id.as_str(), epoch_ms_now() as i64, reason],
        )?;
        let updated = tx.query_row(
            &format!("SELECT {LEDGER_COLUMNS} FROM action_ledger WHERE id = ?1"),
            params![id.as_str()],
            row_to_entry,
        )?;
        tx.commit()?;
        Ok(updated)
    }

    /// Record a post-apply side-effect failure on the entry (the only column
    /// that may change besides the undo mark).
    pub fn set_ledger_error(&self, id: &LedgerId, error: &str) -> Result<(), StoreError> {
        let conn = self.conn();
        conn.execute(
            "UPDATE action_ledger SET error = ?2 WHERE id = ?1",
            params![id.as_str(), error],
        )?;
        Ok(())
    }

    pub fn get_ledger_entry(&self, id: &LedgerId) -> Result<Option<LedgerEntry>, StoreError> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {LEDGER_COLUMNS} FROM action_ledger WHERE id = ?1"),
            params![id.as_str()],
            row_to_entry,
        )
        .optional()
        .map_err(Into::into)
    }

    pub fn list_ledger(&self, thread_id: &ThreadId) -> Result<Vec<LedgerEntry>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {LEDGER_COLUMNS} FROM action_ledger WHERE thread_id = ?1 \
             ORDER BY applied_at_ms ASC, id ASC"
        ))?;
        let rows = stmt.query_map(params![thread_id.as_str()], row_to_entry)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }
}

/// Perform the entity mutation for an action, returning the captured
/// pre-apply state as the undo payload.
fn mutate(tx: &Transaction<'_>, action: &Action) -> Result<Option<String>, StoreError> {
    match action {
        Action::ProjectSetStar { project_id, starred } => {
            let old: bool = project_field(tx, project_id, "starred")?;
            tx.execute(
                "UPDATE projects SET starred = ?2 WHERE id = ?1",
                params![project_id, starred],
            )?;
            Ok(Some(json!({ "starred": old }).to_string()))
        }
        Action::ProjectSetHidden { project_id, hidden } => {
            let old: bool = project_field(tx, project_id, "hidden")?;
            tx.execute(
                "UPDATE projects SET hidden = ?2 WHERE id = ?1",
                params![project_id, hidden],
            )?;
            Ok(Some(json!({ "hidden": old }).to_string()))
        }
        Action::ProjectSetSuccess { project_id, note } => {
            let old: Option<String> = project_field(tx, project_id, "success_note")?;
            tx.execute(
                "UPDATE projects SET success_note = ?2 WHERE id = ?1",
                params![project_id, note],
            )?;
            Ok(Some(json!({ "note": old }).to_string()))
        }
        Action::WorkOrderCreate { project_id, title, description } => {
            let id = Uuid::new_v4().to_string();
            tx.execute(
                "INSERT INTO work_orders (id, project_id, title, description, status, created_at_ms) \
                 VALUES (?1, ?2, ?3, ?4, 'open', ?5)",
                params![id, project_id, title, description, epoch_ms_now() as i64],
            )?;
            Ok(Some(json!({ "created_id": id }).to_string()))
        }
        Action::WorkOrderUpdate { workorder_id, title, description } => {
            let (old_title, old_description): (String, String) = tx
                .query_row(
                    "SELECT title, description FROM work_orders WHERE id = ?1",
                    params![workorder_id],
                    |r| Ok((r.get(0)?, r.get(1)?)),
                )
                .optional()?
                .ok_or_else(|| StoreError::NotFound {
                    entity: "work order",
                    id: workorder_id.clone(),
                })?;
            tx.execute(
                "UPDATE work_orders SET title = COALESCE(?2, title), \
                 description = COALESCE(?3, description) WHERE id = ?1",
                params![workorder_id, title, description],
            )?;
            Ok(Some(json!({ "title": old_title, "description": old_description }).to_string()))
        }
        Action::WorkOrderSetStatus { workorder_id, status } => {
            let old: String = tx
                .query_row(
                    "SELECT status FROM work_orders WHERE id = ?1",
                    params![workorder_id],
                    |r| r.get(0),
                )
                .optional()?
                .ok_or_else(|| StoreError::NotFound {
                    entity: "work order",
                    id: workorder_id.clone(),
                })?;
            tx.execute(
                "UPDATE work_orders SET status = ?2 WHERE id = ?1",
                params![workorder_id, status.to_string()],
            )?;
            Ok(Some(json!({ "status": old }).to_string()))
        }
        // No database mutation; side effects dispatch outside the store.
        Action::ReposRescan {} | Action::WorkOrderStartRun { .. } | Action::WorktreeMerge { .. } => {
            Ok(None)
        }
    }
}

/// Inverse of [`mutate`], driven by the stored undo payload.
fn unmutate(tx: &Transaction<'_>, entry: &LedgerEntry) -> Result<(), StoreError> {
    let undo: serde_json::Value = match &entry.undo_payload_json {
        Some(raw) => serde_json::from_str(raw).map_err(StoreError::corrupt)?,
        // Nothing to restore; the undo is record-only.
        None => return Ok(()),
    };
    let payload: serde_json::Value =
        serde_json::from_str(&entry.payload_json).map_err(StoreError::corrupt)?;

    match entry.action_type.as_str() {
        "project_set_star" => {
            let project_id = str_field(&payload, "project_id")?;
            tx.execute(
                "UPDATE projects SET starred = ?2 WHERE id = ?1",
                params![project_id, undo["starred"].as_bool().unwrap_or(false)],
            )?;
        }
        "project_set_hidden" => {
            let project_id = str_field(&payload, "project_id")?;
            tx.execute(
                "UPDATE projects SET hidden = ?2 WHERE id = ?1",
                params![project_id, undo["hidden"].as_bool().unwrap_or(false)],
            )?;
        }
        "project_set_success" => {
            let project_id = str_field(&payload, "project_id")?;
            tx.execute(
                "UPDATE projects SET success_note = ?2 WHERE id = ?1",
                params![project_id, undo["note"].as_str()],
            )?;
        }
        "work_order_create" => {
            if let Some(created) = undo["created_id"].as_str() {
                tx.execute("DELETE FROM work_orders WHERE id = ?1", params![created])?;
            }
        }
        "work_order_update" => {
            let workorder_id = str_field(&payload, "workorder_id")?;
            tx.execute(
                "UPDATE work_orders SET title = ?2, description = ?3 WHERE id = ?1",
                params![
                    workorder_id,
                    undo["title"].as_str().unwrap_or_default(),
                    undo["description"].as_str().unwrap_or_default(),
                ],
            )?;
        }
        "work_order_set_status" => {
            let workorder_id = str_field(&payload, "workorder_id")?;
            tx.execute(
                "UPDATE work_orders SET status = ?2 WHERE id = ?1",
                params![workorder_id, undo["status"].as_str().unwrap_or("open")],
            )?;
        }
        _ => {}
    }
    Ok(())
}

fn str_field<'a>(payload: &'a serde_json::Value, key: &str) -> Result<&'a str, StoreError> {
    payload[key]
        .as_str()
        .ok_or_else(|| StoreError::Corrupt(format!("ledger payload missing {key}")))
}

fn project_field<T: rusqlite::types::FromSql>(
    tx: &Transaction<'_>,
    project_id: &str,
    column: &str,
) -> Result<T, StoreError> {
    tx.query_row(
        &format!("SELECT {column} FROM projects WHERE id = ?1"),
        params![project_id],
        |r| r.get(0),
    )
    .optional()?
    .ok_or_else(|| StoreError::NotFound { entity: "project", id: project_id.to_string() })
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
