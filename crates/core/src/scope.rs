// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thread scope: where a conversation is rooted and who owns it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::thread::ThreadId;

/// Which level of the portfolio a thread is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Global,
    Project,
    Workorder,
}

crate::simple_display! {
    ScopeKind {
        Global => "global",
        Project => "project",
        Workorder => "workorder",
    }
}

impl std::str::FromStr for ScopeKind {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(Self::Global),
            "project" => Ok(Self::Project),
            "workorder" => Ok(Self::Workorder),
            other => Err(ScopeError::UnknownKind { value: other.to_string() }),
        }
    }
}

/// Scope descriptor. The `(kind, project_id, workorder_id)` combination must
/// be internally consistent; see [`Scope::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub kind: ScopeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workorder_id: Option<String>,
}

/// Scope consistency violations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScopeError {
    #[error("unknown scope kind: {value}")]
    UnknownKind { value: String },

    #[error("global scope must not carry project or work-order ids")]
    GlobalWithIds,

    #[error("project scope requires project_id and no workorder_id")]
    ProjectIds,

    #[error("workorder scope requires workorder_id")]
    WorkorderIds,
}

impl Scope {
    pub fn global() -> Self {
        Self { kind: ScopeKind::Global, project_id: None, workorder_id: None }
    }

    pub fn project(project_id: impl Into<String>) -> Self {
        Self {
            kind: ScopeKind::Project,
            project_id: Some(project_id.into()),
            workorder_id: None,
        }
    }

    pub fn workorder(project_id: impl Into<String>, workorder_id: impl Into<String>) -> Self {
        Self {
            kind: ScopeKind::Workorder,
            project_id: Some(project_id.into()),
            workorder_id: Some(workorder_id.into()),
        }
    }

    /// Enforce the scope↔ids invariant from the data model.
    pub fn validate(&self) -> Result<(), ScopeError> {
        match self.kind {
            ScopeKind::Global => {
                if self.project_id.is_some() || self.workorder_id.is_some() {
                    return Err(ScopeError::GlobalWithIds);
                }
            }
            ScopeKind::Project => {
                if self.project_id.is_none() || self.workorder_id.is_some() {
                    return Err(ScopeError::ProjectIds);
                }
            }
            ScopeKind::Workorder => {
                if self.workorder_id.is_none() {
                    return Err(ScopeError::WorkorderIds);
                }
            }
        }
        Ok(())
    }

    /// Deterministic thread id for this scope. Identical descriptors always
    /// map to the same thread row.
    pub fn thread_id(&self) -> ThreadId {
        let id = match self.kind {
            ScopeKind::Global => "global".to_string(),
            ScopeKind::Project => {
                format!("project-{}", slug(self.project_id.as_deref().unwrap_or("")))
            }
            ScopeKind::Workorder => {
                format!("wo-{}", slug(self.workorder_id.as_deref().unwrap_or("")))
            }
        };
        ThreadId::new(id)
    }

    /// Short slug used in branch and worktree names (`chat/thread-<slug>`).
    pub fn thread_slug(&self) -> String {
        slug(self.thread_id().as_str())
    }
}

/// Sanitize an identifier for use in git ref and directory names: lowercase
/// alphanumerics and dashes, everything else folded to a dash, capped at 48
/// chars with a stable digest suffix when truncation would cause collisions.
pub fn slug(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("thread");
    }
    if out.len() > 48 {
        let digest = Sha256::digest(raw.as_bytes());
        let tag = hex_prefix(&digest, 8);
        out.truncate(39);
        while out.ends_with('-') {
            out.pop();
        }
        out.push('-');
        out.push_str(&tag);
    }
    out
}

fn hex_prefix(bytes: &[u8], len: usize) -> String {
    let mut s = String::with_capacity(len);
    for b in bytes {
        if s.len() >= len {
            break;
        }
        s.push_str(&format!("{b:02x}"));
    }
    s.truncate(len);
    s
}

#[cfg(test)]
#[path = "scope_tests.rs"]
mod tests;
