// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run rows and the atomic claim primitives.
//!
//! `queued → running` happens in exactly one conditional UPDATE: the WHERE
//! clause selects the oldest queued run of the thread AND requires that no
//! sibling is already running. Evaluating both inside one statement is what
//! keeps two racing workers from double-claiming.

use std::path::Path;

use rusqlite::{params, OptionalExtension};
use sb_core::{epoch_ms_now, Run, RunCommand, RunId, RunStatus, ThreadId};

use crate::helpers::{allowlist_json, row_to_run, RUN_COLUMNS};
use crate::{Store, StoreError};

impl Store {
    /// Insert a run with `status = queued`.
    pub fn create_run(&self, run: &Run) -> Result<(), StoreError> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO runs \
             (id, thread_id, user_message_id, status, model, cli_path, cwd, log_path, \
              context_depth, fs_access, cli_access, net_access, net_allowlist, created_at_ms) \
             VALUES (?1, ?2, ?3, 'queued', ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                run.id.as_str(),
                run.thread_id.as_str(),
                run.user_message_id,
                run.model,
                run.cli_path.display().to_string(),
                run.cwd.display().to_string(),
                run.log_path.display().to_string(),
                run.context_depth.to_string(),
                run.access.filesystem.to_string(),
                run.access.cli.to_string(),
                run.access.network.to_string(),
                allowlist_json(&run.access.network_allowlist),
                run.created_at_ms as i64,
            ],
        )?;
        Ok(())
    }

    pub fn get_run(&self, id: &RunId) -> Result<Option<Run>, StoreError> {
        let conn = self.conn();
        let raw = conn
            .query_row(
                &format!("SELECT {RUN_COLUMNS} FROM runs WHERE id = ?1"),
                params![id.as_str()],
                row_to_run,
            )
            .optional()?;
        raw.map(|r| r.into_run()).transpose()
    }

    /// Promote the oldest queued run of the thread to `running`, iff nothing
    /// in the thread is running. Returns the claimed id.
    pub fn claim_next_run(&self, thread_id: &ThreadId) -> Result<Option<RunId>, StoreError> {
        let conn = self.conn();
        let claimed: Option<String> = conn
            .query_row(
                "UPDATE runs SET status = 'running', started_at_ms = ?2 \
                 WHERE id = ( \
                     SELECT id FROM runs WHERE thread_id = ?1 AND status = 'queued' \
                     ORDER BY created_at_ms ASC, id ASC LIMIT 1 \
                 ) \
                 AND NOT EXISTS ( \
                     SELECT 1 FROM runs r2 WHERE r2.thread_id = ?1 AND r2.status = 'running' \
                 ) \
                 RETURNING id",
                params![thread_id.as_str(), epoch_ms_now() as i64],
                |r| r.get(0),
            )
            .optional()?;
        Ok(claimed.map(RunId::new))
    }

    /// Worker-side claim of a specific run. Succeeds only when the run is
    /// still queued, is the oldest queued run of its thread, and no sibling
    /// is running.
    pub fn claim_run(&self, id: &RunId) -> Result<bool, StoreError> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE runs SET status = 'running', started_at_ms = ?2 \
             WHERE id = ?1 AND status = 'queued' \
             AND NOT EXISTS ( \
                 SELECT 1 FROM runs r2 \
                 WHERE r2.thread_id = runs.thread_id AND r2.status = 'running' \
             ) \
             AND NOT EXISTS ( \
                 SELECT 1 FROM runs r3 \
                 WHERE r3.thread_id = runs.thread_id AND r3.status = 'queued' \
                 AND (r3.created_at_ms < runs.created_at_ms \
                      OR (r3.created_at_ms = runs.created_at_ms AND r3.id < runs.id)) \
             )",
            params![id.as_str(), epoch_ms_now() as i64],
        )?;
        Ok(changed == 1)
    }

    /// Read-only peek at the next queued run, used to chain workers.
    pub fn next_queued_run_id(&self, thread_id: &ThreadId) -> Result<Option<RunId>, StoreError> {
        let conn = self.conn();
        let id: Option<String> = conn
            .query_row(
                "SELECT id FROM runs WHERE thread_id = ?1 AND status = 'queued' \
                 ORDER BY created_at_ms ASC, id ASC LIMIT 1",
                params![thread_id.as_str()],
                |r| r.get(0),
            )
            .optional()?;
        Ok(id.map(RunId::new))
    }

    pub fn finish_run_done(
        &self,
        id: &RunId,
        assistant_message_id: i64,
    ) -> Result<(), StoreError> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE runs SET status = 'done', assistant_message_id = ?2, finished_at_ms = ?3 \
             WHERE id = ?1 AND status = 'running'",
            params![id.as_str(), assistant_message_id, epoch_ms_now() as i64],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound { entity: "running run", id: id.to_string() });
        }
        Ok(())
    }

    pub fn finish_run_failed(&self, id: &RunId, error: &str) -> Result<(), StoreError> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE runs SET status = 'failed', error = ?2, finished_at_ms = ?3 \
             WHERE id = ?1 AND status IN ('queued', 'running')",
            params![id.as_str(), error, epoch_ms_now() as i64],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound { entity: "live run", id: id.to_string() });
        }
        Ok(())
    }

    pub fn update_run_cwd(&self, id: &RunId, cwd: &Path) -> Result<(), StoreError> {
        let conn = self.conn();
        conn.execute(
            "UPDATE runs SET cwd = ?2 WHERE id = ?1",
            params![id.as_str(), cwd.display().to_string()],
        )?;
        Ok(())
    }

    /// Restart recovery: mark every `running` row failed with the given
    /// reason. Returns the affected `(run, thread)` pairs for bus fan-out.
    pub fn fail_running_runs(
        &self,
        reason: &str,
    ) -> Result<Vec<(RunId, ThreadId)>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "UPDATE runs SET status = 'failed', error = ?1, finished_at_ms = ?2 \
             WHERE status = 'running' RETURNING id, thread_id",
        )?;
        let rows = stmt.query_map(params![reason, epoch_ms_now() as i64], |r| {
            Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
        })?;
        let mut affected = Vec::new();
        for row in rows {
            let (run, thread) = row?;
            affected.push((RunId::new(run), ThreadId::new(thread)));
        }
        Ok(affected)
    }

    /// Most recent terminal (done or failed) runs, newest first.
    pub fn recent_completed_runs(
        &self,
        thread_id: &ThreadId,
        limit: u64,
    ) -> Result<Vec<Run>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {RUN_COLUMNS} FROM runs \
             WHERE thread_id = ?1 AND status IN ('done', 'failed') \
             ORDER BY finished_at_ms DESC, created_at_ms DESC, id DESC LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![thread_id.as_str(), limit as i64], row_to_run)?;
        let mut runs = Vec::new();
        for raw in rows {
            runs.push(raw?.into_run()?);
        }
        Ok(runs)
    }

    pub fn latest_completed_run(&self, thread_id: &ThreadId) -> Result<Option<Run>, StoreError> {
        Ok(self.recent_completed_runs(thread_id, 1)?.into_iter().next())
    }

    pub fn count_runs_with_status(
        &self,
        thread_id: &ThreadId,
        status: RunStatus,
    ) -> Result<u64, StoreError> {
        let conn = self.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM runs WHERE thread_id = ?1 AND status = ?2",
            params![thread_id.as_str(), status.to_string()],
            |r| r.get(0),
        )?;
        Ok(count as u64)
    }

    /// Append a shell command observed during a run. `seq` is assigned in
    /// the statement, contiguous from 1.
    pub fn record_command(
        &self,
        run_id: &RunId,
        cwd: &Path,
        command: &str,
    ) -> Result<RunCommand, StoreError> {
        let now = epoch_ms_now();
        let conn = self.conn();
        let seq: i64 = conn.query_row(
            "INSERT INTO run_commands (run_id, seq, cwd, command, created_at_ms) \
             SELECT ?1, COALESCE(MAX(seq), 0) + 1, ?2, ?3, ?4 \
             FROM run_commands WHERE run_id = ?1 \
             RETURNING seq",
            params![run_id.as_str(), cwd.display().to_string(), command, now as i64],
            |r| r.get(0),
        )?;
        Ok(RunCommand {
            run_id: run_id.clone(),
            seq: seq as u64,
            cwd: cwd.to_path_buf(),
            command: command.to_string(),
            created_at_ms: now,
        })
    }

    pub fn list_commands(&self, run_id: &RunId) -> Result<Vec<RunCommand>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT seq, cwd, command, created_at_ms FROM run_commands \
             WHERE run_id = ?1 ORDER BY seq ASC",
        )?;
        let rows = stmt.query_map(params![run_id.as_str()], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, i64>(3)?,
            ))
        })?;
        let mut commands = Vec::new();
        for row in rows {
            let (seq, cwd, command, created_at_ms) = row?;
            commands.push(RunCommand {
                run_id: run_id.clone(),
                seq: seq as u64,
                cwd: cwd.into(),
                command,
                created_at_ms: created_at_ms as u64,
            });
        }
        Ok(commands)
    }
}

#[cfg(test)]
#[path = "runs_tests.rs"]
mod tests;
