// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The merge protocol: land a thread's worktree onto the base branch.

use std::path::Path;

use crate::exec::{git, git_best_effort};
use crate::ops::Worktrees;
use crate::{WorktreeError, COMMIT_AUTHOR_EMAIL, COMMIT_AUTHOR_NAME};

/// What a merge call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Changes committed and merged with `--no-ff`; worktree cleaned up.
    Merged { base_branch: String },
    /// Nothing was pending; equivalent to a plain cleanup.
    NothingToMerge,
}

impl Worktrees {
    /// Merge the thread's worktree into the base branch.
    ///
    /// With no pending changes this degrades to [`Worktrees::cleanup`]. With
    /// changes: commit everything in the worktree under the fixed author
    /// identity, refuse if the main working tree is dirty, merge `--no-ff`
    /// onto the base branch, then clean up. A conflict aborts the merge,
    /// restores the previous branch, and leaves worktree and branch in place
    /// for the user to resolve by hand.
    pub async fn merge(
        &self,
        repo: &Path,
        thread_id: &str,
        worktree: &Path,
        branch: &str,
    ) -> Result<MergeOutcome, WorktreeError> {
        let status = self.status(worktree).await?;
        if !status.has_pending_changes {
            self.cleanup(repo, worktree, branch).await;
            return Ok(MergeOutcome::NothingToMerge);
        }

        git(worktree, &["add", "-A"]).await?;
        let message = format!("Chat thread {thread_id}");
        git(
            worktree,
            &[
                "-c",
                &format!("user.name={COMMIT_AUTHOR_NAME}"),
                "-c",
                &format!("user.email={COMMIT_AUTHOR_EMAIL}"),
                "commit",
                "-m",
                &message,
            ],
        )
        .await?;

        let main_status = git(repo, &["status", "--porcelain"]).await?;
        if !main_status.trim().is_empty() {
            return Err(WorktreeError::DirtyWorkingTree);
        }

        let base_branch = self.base_branch(repo).await?;
        let original_branch = git(repo, &["rev-parse", "--abbrev-ref", "HEAD"]).await?;
        if original_branch != base_branch {
            git(repo, &["checkout", &base_branch]).await?;
        }

        let merge_result = git(
            repo,
            &[
                "-c",
                &format!("user.name={COMMIT_AUTHOR_NAME}"),
                "-c",
                &format!("user.email={COMMIT_AUTHOR_EMAIL}"),
                "merge",
                "--no-ff",
                branch,
                "-m",
                &format!("Merge chat thread {thread_id}"),
            ],
        )
        .await;

        if let Err(merge_err) = merge_result {
            let unmerged = git(repo, &["diff", "--name-only", "--diff-filter=U"])
                .await
                .unwrap_or_default();
            git_best_effort(repo, &["merge", "--abort"]).await;
            if original_branch != base_branch {
                git_best_effort(repo, &["checkout", &original_branch]).await;
            }
            let files: Vec<String> = unmerged.lines().map(str::to_string).collect();
            if files.is_empty() {
                return Err(merge_err);
            }
            return Err(WorktreeError::MergeConflict { files });
        }

        if original_branch != base_branch {
            git(repo, &["checkout", &original_branch]).await?;
        }
        self.cleanup(repo, worktree, branch).await;
        Ok(MergeOutcome::Merged { base_branch })
    }
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
