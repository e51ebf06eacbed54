// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("ledger entry {0} already undone")]
    AlreadyUndone(String),

    #[error("scope error: {0}")]
    Scope(#[from] sb_core::ScopeError),
}

impl StoreError {
    pub(crate) fn corrupt(err: impl std::fmt::Display) -> Self {
        Self::Corrupt(err.to_string())
    }

    pub fn kind(&self) -> sb_core::ErrorKind {
        match self {
            StoreError::NotFound { .. } => sb_core::ErrorKind::NotFound,
            StoreError::Scope(_) => sb_core::ErrorKind::Validation,
            StoreError::AlreadyUndone(_) => sb_core::ErrorKind::Validation,
            _ => sb_core::ErrorKind::Internal,
        }
    }
}
