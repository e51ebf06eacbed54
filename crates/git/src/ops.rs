// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worktree ensure / status / diff / cleanup.

use std::path::{Path, PathBuf};

use crate::exec::{git, git_best_effort, git_ok};
use crate::{branch_for_slug, dir_for_slug, WorktreeError};

/// Worktree operations rooted at the portfolio's worktree directory
/// (`<portfolio>/.system/chat-worktrees`).
#[derive(Debug, Clone)]
pub struct Worktrees {
    root: PathBuf,
}

/// Result of [`Worktrees::ensure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsureOutcome {
    pub worktree_path: PathBuf,
    pub branch: String,
    pub base_branch: String,
    pub created: bool,
}

/// Result of [`Worktrees::status`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    pub has_pending_changes: bool,
    pub untracked: Vec<String>,
}

impl Worktrees {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the base branch: the first of `main`, `master`, else the
    /// current (non-detached) HEAD.
    pub async fn base_branch(&self, repo: &Path) -> Result<String, WorktreeError> {
        for candidate in ["main", "master"] {
            let branch_ref = format!("refs/heads/{candidate}");
            if git_ok(repo, &["show-ref", "--verify", "--quiet", &branch_ref]).await? {
                return Ok(candidate.to_string());
            }
        }
        let head = git(repo, &["rev-parse", "--abbrev-ref", "HEAD"]).await?;
        if head == "HEAD" {
            return Err(WorktreeError::DetachedHead);
        }
        Ok(head)
    }

    /// Make sure the thread's worktree exists, creating branch and directory
    /// as needed. Reuses an already-registered worktree untouched.
    pub async fn ensure(
        &self,
        repo: &Path,
        slug: &str,
        override_path: Option<&Path>,
    ) -> Result<EnsureOutcome, WorktreeError> {
        let branch = branch_for_slug(slug);
        let path = override_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.join(dir_for_slug(slug)));
        let base_branch = self.base_branch(repo).await?;

        if self.is_registered(repo, &path).await? {
            return Ok(EnsureOutcome { worktree_path: path, branch, base_branch, created: false });
        }

        // A stale directory left behind by a crashed cleanup blocks
        // `worktree add`; clear it before registering.
        if path.exists() {
            tokio::fs::remove_dir_all(&path).await?;
        }
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let path_str = path.display().to_string();
        let branch_ref = format!("refs/heads/{branch}");
        let branch_exists = git_ok(repo, &["show-ref", "--verify", "--quiet", &branch_ref]).await?;
        if branch_exists {
            git(repo, &["worktree", "add", &path_str, &branch]).await?;
        } else {
            git(repo, &["worktree", "add", "-b", &branch, &path_str, &base_branch]).await?;
        }

        Ok(EnsureOutcome { worktree_path: path, branch, base_branch, created: true })
    }

    /// Pending-change state from `git status --porcelain`.
    pub async fn status(&self, worktree: &Path) -> Result<WorktreeStatus, WorktreeError> {
        let porcelain = git(worktree, &["status", "--porcelain"]).await?;
        let mut status = WorktreeStatus::default();
        for line in porcelain.lines() {
            status.has_pending_changes = true;
            if let Some(path) = line.strip_prefix("?? ") {
                status.untracked.push(path.to_string());
            }
        }
        Ok(status)
    }

    /// Diff of the worktree against the base branch, with untracked files
    /// appended as a list (they have no diff hunks yet).
    pub async fn diff(
        &self,
        worktree: &Path,
        base_branch: &str,
    ) -> Result<String, WorktreeError> {
        let mut text = git(worktree, &["diff", base_branch]).await?;
        let status = self.status(worktree).await?;
        if !status.untracked.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str("Untracked files:\n");
            for file in &status.untracked {
                text.push_str("  ");
                text.push_str(file);
                text.push('\n');
            }
        }
        Ok(text)
    }

    /// Drop the worktree and its branch. Best-effort: a half-removed pair
    /// still gets the other half deleted.
    pub async fn cleanup(&self, repo: &Path, worktree: &Path, branch: &str) {
        let path_str = worktree.display().to_string();
        git_best_effort(repo, &["worktree", "remove", "--force", &path_str]).await;
        if worktree.exists() {
            if let Err(e) = tokio::fs::remove_dir_all(worktree).await {
                tracing::warn!(path = %worktree.display(), error = %e, "worktree dir removal failed");
            }
        }
        git_best_effort(repo, &["branch", "-D", branch]).await;
        git_best_effort(repo, &["worktree", "prune"]).await;
    }

    async fn is_registered(&self, repo: &Path, path: &Path) -> Result<bool, WorktreeError> {
        let listing = git(repo, &["worktree", "list", "--porcelain"]).await?;
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        for line in listing.lines() {
            if let Some(registered) = line.strip_prefix("worktree ") {
                let registered = Path::new(registered);
                if registered == path || registered == canonical {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
#[path = "ops_tests.rs"]
mod tests;
