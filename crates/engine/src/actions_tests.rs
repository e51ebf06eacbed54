// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sb_core::{Action, BusEvent, Scope};
use tempfile::TempDir;

use super::*;
use crate::hooks::PortfolioHooks;
use crate::test_helpers::{init_project_repo, test_engine};
use crate::{Engine, EngineError};

fn request(thread: &sb_core::Thread, action: Action) -> ApplyRequest {
    ApplyRequest {
        thread_id: thread.id.clone(),
        run_id: None,
        message_id: None,
        action_index: 0,
        action,
    }
}

#[tokio::test]
async fn apply_and_undo_round_trip_through_the_engine() {
    let tmp = TempDir::new().unwrap();
    let engine = test_engine(&tmp);
    engine.store().upsert_project("p1", "Acme").unwrap();
    let thread = engine.ensure_thread(&Scope::project("p1")).unwrap();
    let mut rx = engine.bus().subscribe();

    let entry = engine
        .apply_action(request(&thread, Action::ProjectSetStar {
            project_id: "p1".into(),
            starred: true,
        }))
        .await
        .unwrap();
    assert!(engine.store().get_project("p1").unwrap().unwrap().starred);

    let undone = engine.undo_action(&entry.id, "changed my mind").unwrap();
    assert!(undone.is_undone());
    assert!(!engine.store().get_project("p1").unwrap().unwrap().starred);

    let mut topics = Vec::new();
    while let Ok(event) = rx.try_recv() {
        topics.push(event.topic().to_string());
    }
    assert!(topics.contains(&"action.applied".to_string()));
    assert!(topics.contains(&"action.undone".to_string()));
}

struct CountingHooks {
    rescans: AtomicUsize,
    runs: AtomicUsize,
}

#[async_trait]
impl PortfolioHooks for CountingHooks {
    async fn repos_rescan(&self) -> Result<(), String> {
        self.rescans.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn work_order_start_run(
        &self,
        _workorder_id: &str,
        _prompt: Option<&str>,
    ) -> Result<(), String> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn dispatch_actions_go_through_the_hooks() {
    let tmp = TempDir::new().unwrap();
    let hooks = Arc::new(CountingHooks {
        rescans: AtomicUsize::new(0),
        runs: AtomicUsize::new(0),
    });
    let engine = test_engine(&tmp).with_hooks(hooks.clone());
    let thread = engine.ensure_thread(&Scope::global()).unwrap();

    engine
        .apply_action(request(&thread, Action::ReposRescan {}))
        .await
        .unwrap();
    engine
        .apply_action(request(&thread, Action::WorkOrderStartRun {
            workorder_id: "wo-1".into(),
            prompt: Some("ship it".into()),
        }))
        .await
        .unwrap();

    assert_eq!(hooks.rescans.load(Ordering::SeqCst), 1);
    assert_eq!(hooks.runs.load(Ordering::SeqCst), 1);
}

struct FailingHooks;

#[async_trait]
impl PortfolioHooks for FailingHooks {
    async fn repos_rescan(&self) -> Result<(), String> {
        Err("scanner offline".to_string())
    }

    async fn work_order_start_run(&self, _: &str, _: Option<&str>) -> Result<(), String> {
        Ok(())
    }
}

#[tokio::test]
async fn a_failed_side_effect_is_recorded_on_the_entry() {
    let tmp = TempDir::new().unwrap();
    let engine = test_engine(&tmp).with_hooks(Arc::new(FailingHooks));
    let thread = engine.ensure_thread(&Scope::global()).unwrap();

    let err = engine
        .apply_action(request(&thread, Action::ReposRescan {}))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Internal(_)));

    let entries = engine.store().list_ledger(&thread.id).unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].error.as_deref().unwrap().contains("scanner offline"));
}

#[tokio::test]
async fn worktree_merge_action_lands_changes_and_clears_the_thread() {
    let tmp = TempDir::new().unwrap();
    let engine = test_engine(&tmp);
    let repo = init_project_repo(tmp.path(), "acme");
    let thread = engine.ensure_thread(&Scope::project("acme")).unwrap();

    // Stand in for a completed writable turn: worktree with one new file.
    let ensured = engine
        .worktrees
        .ensure(&repo, &thread.scope.thread_slug(), None)
        .await
        .unwrap();
    std::fs::write(ensured.worktree_path.join("agent.txt"), "from the agent\n").unwrap();
    engine
        .store()
        .set_thread_worktree(&thread.id, Some(&ensured.worktree_path))
        .unwrap();
    engine.store().set_thread_pending_changes(&thread.id, true).unwrap();

    engine
        .apply_action(request(&thread, Action::WorktreeMerge {
            thread_id: thread.id.clone(),
        }))
        .await
        .unwrap();

    assert!(repo.join("agent.txt").exists());
    let reloaded = engine.store().get_thread(&thread.id).unwrap().unwrap();
    assert!(reloaded.worktree_path.is_none());
    assert!(!reloaded.has_pending_changes);
    assert!(!ensured.worktree_path.exists());
}

#[tokio::test]
async fn archive_cleans_up_the_worktree_pair() {
    let tmp = TempDir::new().unwrap();
    let engine = test_engine(&tmp);
    let repo = init_project_repo(tmp.path(), "acme");
    let thread = engine.ensure_thread(&Scope::project("acme")).unwrap();
    let ensured = engine
        .worktrees
        .ensure(&repo, &thread.scope.thread_slug(), None)
        .await
        .unwrap();
    engine
        .store()
        .set_thread_worktree(&thread.id, Some(&ensured.worktree_path))
        .unwrap();

    engine.archive_thread(&thread.id).await.unwrap();

    let reloaded = engine.store().get_thread(&thread.id).unwrap().unwrap();
    assert!(reloaded.archived);
    assert!(reloaded.worktree_path.is_none());
    assert!(!ensured.worktree_path.exists());
}

#[tokio::test]
async fn bus_event_names_the_action_type() {
    let tmp = TempDir::new().unwrap();
    let engine = test_engine(&tmp);
    engine.store().upsert_project("p1", "Acme").unwrap();
    let thread = engine.ensure_thread(&Scope::project("p1")).unwrap();
    let mut rx = engine.bus().subscribe();

    engine
        .apply_action(request(&thread, Action::ProjectSetHidden {
            project_id: "p1".into(),
            hidden: true,
        }))
        .await
        .unwrap();

    loop {
        match rx.try_recv() {
            Ok(BusEvent::ActionApplied { action_type, .. }) => {
                assert_eq!(action_type, "project_set_hidden");
                break;
            }
            Ok(_) => continue,
            Err(e) => panic!("no action.applied event: {e}"),
        }
    }
}
