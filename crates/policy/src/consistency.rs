// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The access-consistency table, in both reject and coerce form.
//!
//! `check_access` is the run-admission gate: inconsistent triples are
//! rejected. `sanitize_access` is the advisor path: a triple coming back from
//! an agent is coerced downwards to the nearest consistent one, with each
//! coercion recorded so the caller can surface it.

use sb_core::{AccessTriple, CliAccess, FsAccess, NetAccess};

use crate::PolicyError;

/// Validate a triple against the consistency rules. `has_trusted_pack` says
/// whether the server carries a non-empty trusted host set.
pub fn check_access(access: &AccessTriple, has_trusted_pack: bool) -> Result<(), PolicyError> {
    if access.filesystem == FsAccess::None && access.cli != CliAccess::Off {
        return Err(PolicyError::CliWithoutFilesystem);
    }
    if access.cli == CliAccess::ReadWrite && access.filesystem != FsAccess::ReadWrite {
        return Err(PolicyError::CliWriteNeedsFsWrite);
    }
    if access.cli == CliAccess::ReadOnly && access.filesystem == FsAccess::ReadWrite {
        return Err(PolicyError::CliReadOnlyFsWrite);
    }
    if access.network == NetAccess::Allowlist && access.network_allowlist.is_empty() {
        return Err(PolicyError::EmptyAllowlist);
    }
    if access.network == NetAccess::Trusted && !has_trusted_pack {
        return Err(PolicyError::NoTrustedPack);
    }
    Ok(())
}

/// Coerce a triple to consistency, never escalating a grant. Returns the
/// fixed triple and one note per coercion applied.
pub fn sanitize_access(access: &AccessTriple, has_trusted_pack: bool) -> (AccessTriple, Vec<String>) {
    let mut fixed = access.clone();
    let mut notes = Vec::new();

    if fixed.filesystem == FsAccess::None && fixed.cli != CliAccess::Off {
        fixed.cli = CliAccess::Off;
        notes.push("cli disabled because filesystem=none".to_string());
    }
    if fixed.cli == CliAccess::ReadWrite && fixed.filesystem != FsAccess::ReadWrite {
        // Downgrade the cli rather than widen the filesystem grant.
        fixed.cli = CliAccess::ReadOnly;
        notes.push("cli downgraded to read-only; filesystem is not read-write".to_string());
    }
    if fixed.cli == CliAccess::ReadOnly && fixed.filesystem == FsAccess::ReadWrite {
        fixed.filesystem = FsAccess::ReadOnly;
        notes.push("filesystem downgraded to read-only; cli=read-only cannot be enforced under a writable tree".to_string());
    }
    if fixed.network == NetAccess::Allowlist && fixed.network_allowlist.is_empty() {
        fixed.network = NetAccess::None;
        notes.push("network disabled; allowlist was empty".to_string());
    }
    if fixed.network == NetAccess::Trusted && !has_trusted_pack {
        fixed.network = NetAccess::None;
        notes.push("network disabled; no trusted host pack is configured".to_string());
    }

    debug_assert!(check_access(&fixed, has_trusted_pack).is_ok());
    (fixed, notes)
}

#[cfg(test)]
#[path = "consistency_tests.rs"]
mod tests;
