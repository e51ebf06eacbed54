// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Actions: structured proposals from the assistant, inert until a human
//! applies them through the ledger.
//!
//! The type set is finite and closed. Deserializing through serde doubles as
//! the structural payload validation — an unknown tag or a malformed payload
//! is a hard error, never a silently-dropped action.

use serde::{Deserialize, Serialize};

use crate::portfolio::WorkOrderStatus;
use crate::thread::ThreadId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    ProjectSetStar {
        project_id: String,
        starred: bool,
    },
    ProjectSetHidden {
        project_id: String,
        hidden: bool,
    },
    ProjectSetSuccess {
        project_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    WorkOrderCreate {
        project_id: String,
        title: String,
        #[serde(default)]
        description: String,
    },
    WorkOrderUpdate {
        workorder_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    WorkOrderSetStatus {
        workorder_id: String,
        status: WorkOrderStatus,
    },
    ReposRescan {},
    WorkOrderStartRun {
        workorder_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prompt: Option<String>,
    },
    WorktreeMerge {
        thread_id: ThreadId,
    },
}

impl Action {
    /// The wire tag, as stored in ledger rows and shown in the UI.
    pub fn type_name(&self) -> &'static str {
        match self {
            Action::ProjectSetStar { .. } => "project_set_star",
            Action::ProjectSetHidden { .. } => "project_set_hidden",
            Action::ProjectSetSuccess { .. } => "project_set_success",
            Action::WorkOrderCreate { .. } => "work_order_create",
            Action::WorkOrderUpdate { .. } => "work_order_update",
            Action::WorkOrderSetStatus { .. } => "work_order_set_status",
            Action::ReposRescan {} => "repos_rescan",
            Action::WorkOrderStartRun { .. } => "work_order_start_run",
            Action::WorktreeMerge { .. } => "worktree_merge",
        }
    }

    /// All known wire tags, in a stable order (prompt schema, docs, tests).
    pub const ALL_TYPES: &'static [&'static str] = &[
        "project_set_star",
        "project_set_hidden",
        "project_set_success",
        "work_order_create",
        "work_order_update",
        "work_order_set_status",
        "repos_rescan",
        "work_order_start_run",
        "worktree_merge",
    ];
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
