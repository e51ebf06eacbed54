// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worktree error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorktreeError {
    #[error("git {args} failed: {stderr}")]
    Git { args: String, stderr: String },

    #[error("merge conflict in: {}", files.join(", "))]
    MergeConflict { files: Vec<String> },

    #[error("main working tree has uncommitted changes; commit or stash before merging")]
    DirtyWorkingTree,

    #[error("repository HEAD is detached; cannot resolve a base branch")]
    DetachedHead,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorktreeError {
    pub fn kind(&self) -> sb_core::ErrorKind {
        match self {
            WorktreeError::MergeConflict { .. } => sb_core::ErrorKind::WorktreeConflict,
            WorktreeError::DirtyWorkingTree => sb_core::ErrorKind::WorktreeConflict,
            WorktreeError::DetachedHead => sb_core::ErrorKind::Validation,
            _ => sb_core::ErrorKind::Internal,
        }
    }
}
