// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Access-consistency violations.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("cli access requires filesystem access (filesystem=none forces cli=off)")]
    CliWithoutFilesystem,

    #[error("cli=read-write requires filesystem=read-write")]
    CliWriteNeedsFsWrite,

    #[error("cli=read-only with filesystem=read-write is unenforceable")]
    CliReadOnlyFsWrite,

    #[error("network=allowlist requires a non-empty allowlist")]
    EmptyAllowlist,

    #[error("network=trusted requires a configured trusted host pack")]
    NoTrustedPack,
}

impl PolicyError {
    pub fn kind(&self) -> sb_core::ErrorKind {
        sb_core::ErrorKind::Validation
    }
}
