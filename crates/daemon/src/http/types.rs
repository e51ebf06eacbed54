// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request and response bodies for the HTTP surface.

use sb_core::{
    AccessTriple, Action, Confirmations, ContextDepth, LedgerEntry, Message, MessageId,
    PendingSend, PendingSendId, Run, RunCommand, RunId, Scope, Thread, ThreadId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateThread {
    pub scope: Scope,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub access: Option<AccessTriple>,
    #[serde(default)]
    pub context_depth: Option<ContextDepth>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PatchThread {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub scope: Option<Scope>,
    #[serde(default)]
    pub archived: Option<bool>,
    #[serde(default)]
    pub access: Option<AccessTriple>,
    #[serde(default)]
    pub context_depth: Option<ContextDepth>,
}

#[derive(Debug, Deserialize)]
pub struct PostMessage {
    pub content: String,
    #[serde(default)]
    pub access: Option<AccessTriple>,
    #[serde(default)]
    pub context_depth: Option<ContextDepth>,
    #[serde(default)]
    pub confirmations: Confirmations,
}

#[derive(Debug, Deserialize)]
pub struct PostSuggestion {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ApplyActionBody {
    pub thread_id: ThreadId,
    #[serde(default)]
    pub run_id: Option<RunId>,
    #[serde(default)]
    pub message_id: Option<MessageId>,
    #[serde(default)]
    pub action_index: u32,
    pub action: Action,
}

#[derive(Debug, Default, Deserialize)]
pub struct UndoBody {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ThreadSummary {
    #[serde(flatten)]
    pub thread: Thread,
    pub needs_attention: bool,
}

#[derive(Debug, Serialize)]
pub struct ThreadDetail {
    #[serde(flatten)]
    pub thread: Thread,
    pub needs_attention: bool,
    pub messages: Vec<Message>,
    pub ledger: Vec<LedgerEntry>,
    pub pending_sends: Vec<PendingSend>,
}

#[derive(Debug, Serialize)]
pub struct EnqueuedResponse {
    pub message: Message,
    pub run: Run,
    pub resolved_pending: Vec<PendingSendId>,
}

#[derive(Debug, Serialize)]
pub struct RunDetail {
    #[serde(flatten)]
    pub run: Run,
    pub commands: Vec<RunCommand>,
    pub log_tail: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DiffResponse {
    pub diff: String,
}

#[derive(Debug, Serialize)]
pub struct CanceledResponse {
    pub canceled: bool,
}
