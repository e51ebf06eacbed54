// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Messages: insert-only conversation rows with per-thread sequence numbers.

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::run::RunId;
use crate::thread::ThreadId;

/// Row id assigned by the store.
pub type MessageId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

crate::simple_display! {
    Role {
        User => "user",
        Assistant => "assistant",
        System => "system",
    }
}

impl std::str::FromStr for Role {
    type Err = crate::access::AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "system" => Ok(Self::System),
            other => Err(crate::access::AccessError { axis: "role", value: other.to_string() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub thread_id: ThreadId,
    /// Monotonically increasing per thread, contiguous from 1.
    pub seq: u64,
    pub role: Role,
    pub content: String,
    /// Structured proposals attached to assistant messages.
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
    #[serde(default)]
    pub needs_user_input: bool,
    pub created_at_ms: u64,
}
