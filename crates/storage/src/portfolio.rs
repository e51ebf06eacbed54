// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project and work-order rows the ledger mutates.

use rusqlite::{params, OptionalExtension};
use sb_core::{Project, WorkOrder};

use crate::helpers::parse_col;
use crate::{Store, StoreError};

impl Store {
    /// Register a project (idempotent; the scanner collaborator owns
    /// discovery, the store only needs the row to exist for ledger writes).
    pub fn upsert_project(&self, id: &str, name: &str) -> Result<(), StoreError> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO projects (id, name) VALUES (?1, ?2) \
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
            params![id, name],
        )?;
        Ok(())
    }

    pub fn get_project(&self, id: &str) -> Result<Option<Project>, StoreError> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, starred, hidden, success_note FROM projects WHERE id = ?1",
            params![id],
            |r| {
                Ok(Project {
                    id: r.get(0)?,
                    name: r.get(1)?,
                    starred: r.get(2)?,
                    hidden: r.get(3)?,
                    success_note: r.get(4)?,
                })
            },
        )
        .optional()
        .map_err(Into::into)
    }

    pub fn get_work_order(&self, id: &str) -> Result<Option<WorkOrder>, StoreError> {
        let conn = self.conn();
        let raw = conn
            .query_row(
                "SELECT id, project_id, title, description, status, created_at_ms \
                 FROM work_orders WHERE id = ?1",
                params![id],
                |r| {
                    Ok((
                        r.get::<_, String>(0)?,
                        r.get::<_, String>(1)?,
                        r.get::<_, String>(2)?,
                        r.get::<_, String>(3)?,
                        r.get::<_, String>(4)?,
                        r.get::<_, i64>(5)?,
                    ))
                },
            )
            .optional()?;
        raw.map(|(id, project_id, title, description, status, created_at_ms)| {
            Ok(WorkOrder {
                id,
                project_id,
                title,
                description,
                status: parse_col(status)?,
                created_at_ms: created_at_ms as u64,
            })
        })
        .transpose()
    }
}
