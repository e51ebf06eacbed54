// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action ledger: append-only record of applied actions and their undos.

use serde::{Deserialize, Serialize};

use crate::message::MessageId;
use crate::run::RunId;
use crate::thread::ThreadId;

crate::define_id! {
    /// Identifier for one ledger entry.
    pub struct LedgerId;
}

/// A human applied an action. Undo marks the entry with a timestamp and
/// reason; rows are never deleted or rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerId,
    pub thread_id: ThreadId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<MessageId>,
    /// Index of the action within the message's `actions` list.
    pub action_index: u32,
    pub action_type: String,
    /// The applied payload, verbatim. Immutable after insert.
    pub payload_json: String,
    pub applied_at_ms: u64,
    /// Captured pre-apply state, consumed by undo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub undo_payload_json: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub undone_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub undo_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LedgerEntry {
    pub fn is_undone(&self) -> bool {
        self.undone_at_ms.is_some()
    }
}
