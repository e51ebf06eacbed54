// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds shared across crate boundaries.
//!
//! Each crate keeps its own thiserror enums; this kind is the cross-cutting
//! classification the HTTP surface maps to status codes and the run record
//! stores alongside failures.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad input shape, schema mismatch, access-consistency violation.
    Validation,
    /// Missing confirmation for write/network; carries a pending-send id.
    ApprovalRequired,
    /// Runtime command inspection violated the run's access.
    PolicyDenied,
    /// Agent final message or action payload failed validation.
    SchemaViolation,
    /// Agent non-zero exit or timeout.
    SubprocessFailure,
    /// Merge produced conflicts; worktree left intact.
    WorktreeConflict,
    /// Requested entity does not exist.
    NotFound,
    /// Store, I/O, or git failure not covered above.
    Internal,
}

crate::simple_display! {
    ErrorKind {
        Validation => "validation",
        ApprovalRequired => "approval_required",
        PolicyDenied => "policy_denied",
        SchemaViolation => "schema_violation",
        SubprocessFailure => "subprocess_failure",
        WorktreeConflict => "worktree_conflict",
        NotFound => "not_found",
        Internal => "internal",
    }
}

impl ErrorKind {
    /// HTTP status the surface maps this kind to.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorKind::Validation | ErrorKind::SchemaViolation => 400,
            ErrorKind::ApprovalRequired => 409,
            ErrorKind::PolicyDenied => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::WorktreeConflict => 409,
            ErrorKind::SubprocessFailure | ErrorKind::Internal => 500,
        }
    }
}
