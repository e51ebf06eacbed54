// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pending sends: user messages parked until the user confirms the access
//! they asked for.

use serde::{Deserialize, Serialize};

use crate::access::AccessTriple;
use crate::thread::{ContextDepth, ThreadId};

crate::define_id! {
    /// Identifier for a parked submission.
    pub struct PendingSendId;
}

/// Which confirmations a submission is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requires {
    #[serde(default)]
    pub write: bool,
    #[serde(default)]
    pub network_allowlist: bool,
}

impl Requires {
    pub fn any(&self) -> bool {
        self.write || self.network_allowlist
    }
}

/// Confirmation flags carried on a submission request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmations {
    #[serde(default)]
    pub write: bool,
    #[serde(default)]
    pub network_allowlist: bool,
}

impl Confirmations {
    /// Whether these confirmations cover everything `requires` asks for.
    pub fn covers(&self, requires: Requires) -> bool {
        (!requires.write || self.write) && (!requires.network_allowlist || self.network_allowlist)
    }
}

/// A parked user message. The `(thread, content, context_depth, access)`
/// tuple is the matching key: a later identical confirmed send resolves
/// earlier pending copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSend {
    pub id: PendingSendId,
    pub thread_id: ThreadId,
    pub content: String,
    pub context_depth: ContextDepth,
    pub access: AccessTriple,
    pub requires: Requires,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canceled_at_ms: Option<u64>,
}

impl PendingSend {
    pub fn is_open(&self) -> bool {
        self.resolved_at_ms.is_none() && self.canceled_at_ms.is_none()
    }
}
