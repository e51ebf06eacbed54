//! S4 — a conflicting merge aborts cleanly and leaves the pair for manual
//! resolution; merge-with-no-changes degrades to cleanup.

use sb_git::{MergeOutcome, WorktreeError, Worktrees};
use tempfile::TempDir;

use super::prelude::*;

#[tokio::test]
async fn conflict_aborts_restores_and_keeps_the_worktree() {
    let tmp = TempDir::new().expect("tmp");
    let repo = init_project_repo(tmp.path(), "acme");
    let worktrees = Worktrees::new(tmp.path().join("chat-worktrees"));
    let wt = worktrees.ensure(&repo, "acme", None).await.expect("ensure");

    // Diverge the same file on both sides.
    std::fs::write(wt.worktree_path.join("README.md"), "agent edit\n").expect("write");
    std::fs::write(repo.join("README.md"), "user edit\n").expect("write");
    let git = |args: &[&str]| {
        assert!(std::process::Command::new("git")
            .args(args)
            .current_dir(&repo)
            .output()
            .expect("git")
            .status
            .success());
    };
    git(&["add", "-A"]);
    git(&["commit", "-q", "-m", "user edit"]);

    let err = worktrees
        .merge(&repo, "project-acme", &wt.worktree_path, &wt.branch)
        .await
        .expect_err("conflict");
    match err {
        WorktreeError::MergeConflict { files } => {
            assert_eq!(files, vec!["README.md".to_string()]);
        }
        other => panic!("expected MergeConflict, got {other:?}"),
    }

    // Merge aborted: clean main tree, back on the prior branch, both halves
    // of the pair intact for the user.
    assert_eq!(git_stdout(&repo, &["status", "--porcelain"]), "");
    assert_eq!(git_stdout(&repo, &["rev-parse", "--abbrev-ref", "HEAD"]), "main");
    assert!(wt.worktree_path.exists());
    assert!(!git_stdout(&repo, &["branch", "--list", &wt.branch]).is_empty());
}

#[tokio::test]
async fn merging_a_clean_worktree_equals_cleanup() {
    let tmp = TempDir::new().expect("tmp");
    let repo = init_project_repo(tmp.path(), "acme");
    let worktrees = Worktrees::new(tmp.path().join("chat-worktrees"));
    let wt = worktrees.ensure(&repo, "acme", None).await.expect("ensure");
    let head_before = git_stdout(&repo, &["rev-parse", "HEAD"]);

    let outcome = worktrees
        .merge(&repo, "project-acme", &wt.worktree_path, &wt.branch)
        .await
        .expect("merge");

    assert_eq!(outcome, MergeOutcome::NothingToMerge);
    assert!(!wt.worktree_path.exists());
    assert!(git_stdout(&repo, &["branch", "--list", &wt.branch]).is_empty());
    // No commit landed.
    assert_eq!(git_stdout(&repo, &["rev-parse", "HEAD"]), head_before);
}
