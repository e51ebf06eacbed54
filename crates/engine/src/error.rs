// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error type, classified per the shared error kinds.

use sb_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] sb_storage::StoreError),

    #[error("access rejected: {0}")]
    Policy(#[from] sb_policy::PolicyError),

    #[error(transparent)]
    Worktree(#[from] sb_git::WorktreeError),

    #[error(transparent)]
    Driver(#[from] sb_agent::DriverError),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("schema violation: {0}")]
    Schema(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Store(e) => e.kind(),
            EngineError::Policy(e) => e.kind(),
            EngineError::Worktree(e) => e.kind(),
            EngineError::Driver(e) => e.kind(),
            EngineError::Validation(_) => ErrorKind::Validation,
            EngineError::Schema(_) => ErrorKind::SchemaViolation,
            EngineError::NotFound { .. } => ErrorKind::NotFound,
            EngineError::Io(_) | EngineError::Json(_) | EngineError::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }
}
