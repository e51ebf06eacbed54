// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message rows. Insert-only; the per-thread `seq` is assigned inside the
//! insert statement so concurrent writers cannot interleave.

use rusqlite::{params, OptionalExtension};
use sb_core::{epoch_ms_now, Action, Message, Role, RunId, ThreadId};

use crate::helpers::{row_to_message, MESSAGE_COLUMNS};
use crate::{Store, StoreError};

/// Fields for a message insert.
pub struct NewMessage<'a> {
    pub thread_id: &'a ThreadId,
    pub role: Role,
    pub content: &'a str,
    pub actions: &'a [Action],
    pub run_id: Option<&'a RunId>,
    pub needs_user_input: bool,
}

impl Store {
    pub fn append_message(&self, new: NewMessage<'_>) -> Result<Message, StoreError> {
        let actions_json = serde_json::to_string(new.actions).map_err(StoreError::corrupt)?;
        let conn = self.conn();
        conn.execute(
            "INSERT INTO messages \
             (thread_id, seq, role, content, actions, run_id, needs_user_input, created_at_ms) \
             SELECT ?1, COALESCE(MAX(seq), 0) + 1, ?2, ?3, ?4, ?5, ?6, ?7 \
             FROM messages WHERE thread_id = ?1",
            params![
                new.thread_id.as_str(),
                new.role.to_string(),
                new.content,
                actions_json,
                new.run_id.map(|r| r.as_str().to_string()),
                new.needs_user_input,
                epoch_ms_now() as i64,
            ],
        )?;
        let id = conn.last_insert_rowid();
        let raw = conn.query_row(
            &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
            params![id],
            row_to_message,
        )?;
        raw.into_message()
    }

    pub fn get_message(&self, id: i64) -> Result<Option<Message>, StoreError> {
        let conn = self.conn();
        let raw = conn
            .query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                params![id],
                row_to_message,
            )
            .optional()?;
        raw.map(|r| r.into_message()).transpose()
    }

    pub fn count_messages(&self, thread_id: &ThreadId) -> Result<u64, StoreError> {
        let conn = self.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE thread_id = ?1",
            params![thread_id.as_str()],
            |r| r.get(0),
        )?;
        Ok(count as u64)
    }

    /// The most recent `limit` messages, oldest first.
    pub fn recent_messages(
        &self,
        thread_id: &ThreadId,
        limit: u64,
    ) -> Result<Vec<Message>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM ( \
                 SELECT {MESSAGE_COLUMNS} FROM messages WHERE thread_id = ?1 \
                 ORDER BY seq DESC LIMIT ?2 \
             ) ORDER BY seq ASC"
        ))?;
        let rows = stmt.query_map(params![thread_id.as_str(), limit as i64], row_to_message)?;
        let mut messages = Vec::new();
        for raw in rows {
            messages.push(raw?.into_message()?);
        }
        Ok(messages)
    }

    /// Messages with `from_seq <= seq <= to_seq`, oldest first. Used by the
    /// summarizer to walk fixed-size chunks.
    pub fn messages_in_range(
        &self,
        thread_id: &ThreadId,
        from_seq: u64,
        to_seq: u64,
    ) -> Result<Vec<Message>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE thread_id = ?1 AND seq >= ?2 AND seq <= ?3 ORDER BY seq ASC"
        ))?;
        let rows = stmt.query_map(
            params![thread_id.as_str(), from_seq as i64, to_seq as i64],
            row_to_message,
        )?;
        let mut messages = Vec::new();
        for raw in rows {
            messages.push(raw?.into_message()?);
        }
        Ok(messages)
    }

    pub fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<Message>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE thread_id = ?1 ORDER BY seq ASC"
        ))?;
        let rows = stmt.query_map(params![thread_id.as_str()], row_to_message)?;
        let mut messages = Vec::new();
        for raw in rows {
            messages.push(raw?.into_message()?);
        }
        Ok(messages)
    }
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
