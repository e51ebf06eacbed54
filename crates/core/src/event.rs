// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events published on the in-process bus and relayed over SSE.

use serde::{Deserialize, Serialize};

use crate::ledger::LedgerId;
use crate::message::Message;
use crate::run::{RunId, RunStatus};
use crate::thread::ThreadId;

/// Bus events. Serializes with `{"type": "topic.name", ...fields}`.
/// Consumers that miss events re-read through the HTTP surface; nothing here
/// is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BusEvent {
    #[serde(rename = "message.new")]
    MessageNew { thread_id: ThreadId, message: Message },

    #[serde(rename = "run.status")]
    RunStatus {
        thread_id: ThreadId,
        run_id: RunId,
        status: RunStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    #[serde(rename = "action.applied")]
    ActionApplied { thread_id: ThreadId, ledger_id: LedgerId, action_type: String },

    #[serde(rename = "action.undone")]
    ActionUndone { thread_id: ThreadId, ledger_id: LedgerId, action_type: String },

    #[serde(rename = "thread.updated")]
    ThreadUpdated { thread_id: ThreadId },

    #[serde(rename = "attention.updated")]
    AttentionUpdated { thread_id: ThreadId, needs_attention: bool },
}

impl BusEvent {
    /// Thread the event belongs to, for consumer-side filtering.
    pub fn thread_id(&self) -> &ThreadId {
        match self {
            BusEvent::MessageNew { thread_id, .. }
            | BusEvent::RunStatus { thread_id, .. }
            | BusEvent::ActionApplied { thread_id, .. }
            | BusEvent::ActionUndone { thread_id, .. }
            | BusEvent::ThreadUpdated { thread_id }
            | BusEvent::AttentionUpdated { thread_id, .. } => thread_id,
        }
    }

    /// SSE event name.
    pub fn topic(&self) -> &'static str {
        match self {
            BusEvent::MessageNew { .. } => "message.new",
            BusEvent::RunStatus { .. } => "run.status",
            BusEvent::ActionApplied { .. } => "action.applied",
            BusEvent::ActionUndone { .. } => "action.undone",
            BusEvent::ThreadUpdated { .. } => "thread.updated",
            BusEvent::AttentionUpdated { .. } => "attention.updated",
        }
    }
}
