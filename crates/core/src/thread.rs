// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chat thread: a conversation rooted at a scope, owning runs and (optionally)
//! a git worktree.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::access::AccessTriple;
use crate::scope::Scope;

crate::define_id! {
    /// Deterministic thread identifier derived from the scope descriptor.
    pub struct ThreadId;
}

/// How much prior conversation and tool history goes into the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextDepth {
    Minimal,
    Messages,
    MessagesTools,
    MessagesToolsOutputs,
    Blended,
}

crate::simple_display! {
    ContextDepth {
        Minimal => "minimal",
        Messages => "messages",
        MessagesTools => "messages_tools",
        MessagesToolsOutputs => "messages_tools_outputs",
        Blended => "blended",
    }
}

impl std::str::FromStr for ContextDepth {
    type Err = crate::access::AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minimal" => Ok(Self::Minimal),
            "messages" => Ok(Self::Messages),
            "messages_tools" => Ok(Self::MessagesTools),
            "messages_tools_outputs" => Ok(Self::MessagesToolsOutputs),
            "blended" => Ok(Self::Blended),
            other => Err(crate::access::AccessError {
                axis: "context_depth",
                value: other.to_string(),
            }),
        }
    }
}

impl Default for ContextDepth {
    fn default() -> Self {
        Self::Messages
    }
}

/// A thread row. Messages, runs, commands, pending sends, and ledger entries
/// hang off `id`; the worktree directory is owned while `worktree_path` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
    pub scope: Scope,
    pub name: String,
    pub summary: String,
    /// Number of messages folded into `summary`. Monotonic, multiple of the
    /// summarizer chunk size.
    pub summarized_count: u64,
    pub default_access: AccessTriple,
    pub default_context_depth: ContextDepth,
    pub archived: bool,
    pub worktree_path: Option<PathBuf>,
    pub has_pending_changes: bool,
    pub last_ack_ms: Option<u64>,
    pub created_at_ms: u64,
}

impl Thread {
    /// Display name fallback when the user never renamed the thread.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }
}
