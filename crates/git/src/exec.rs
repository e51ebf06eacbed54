// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin wrapper over the system `git` binary.

use std::path::Path;
use std::process::Output;

use tokio::process::Command;

use crate::WorktreeError;

/// Run `git <args>` in `dir`, requiring exit code 0. Returns trimmed stdout.
pub(crate) async fn git(dir: &Path, args: &[&str]) -> Result<String, WorktreeError> {
    let output = run(dir, args).await?;
    if !output.status.success() {
        return Err(WorktreeError::Git {
            args: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
}

/// Run `git <args>` and report only whether it succeeded.
pub(crate) async fn git_ok(dir: &Path, args: &[&str]) -> Result<bool, WorktreeError> {
    Ok(run(dir, args).await?.status.success())
}

/// Best-effort `git <args>`; failures are logged and swallowed.
pub(crate) async fn git_best_effort(dir: &Path, args: &[&str]) {
    match run(dir, args).await {
        Ok(output) if output.status.success() => {}
        Ok(output) => {
            tracing::warn!(
                args = args.join(" "),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "git command failed (ignored)"
            );
        }
        Err(e) => tracing::warn!(args = args.join(" "), error = %e, "git spawn failed (ignored)"),
    }
}

async fn run(dir: &Path, args: &[&str]) -> Result<Output, WorktreeError> {
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .await
        .map_err(WorktreeError::Io)
}
