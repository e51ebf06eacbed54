// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Applying and undoing proposed actions.
//!
//! Database-backed actions mutate inside the store's ledger transaction.
//! Side-effect actions (merge, rescan, run dispatch) write the ledger row
//! first, run the effect, and record any effect failure on the entry.

use sb_core::{Action, BusEvent, LedgerEntry, LedgerId, MessageId, RunId, ThreadId};
use sb_storage::LedgerContext;

use crate::{Engine, EngineError};

/// An apply request from the surface: which proposal, from where.
#[derive(Debug, Clone)]
pub struct ApplyRequest {
    pub thread_id: ThreadId,
    pub run_id: Option<RunId>,
    pub message_id: Option<MessageId>,
    pub action_index: u32,
    pub action: Action,
}

impl Engine {
    /// Apply a proposed action into the ledger.
    pub async fn apply_action(&self, request: ApplyRequest) -> Result<LedgerEntry, EngineError> {
        let thread = self.thread(&request.thread_id)?;
        let ctx = LedgerContext {
            thread_id: request.thread_id.clone(),
            run_id: request.run_id.clone(),
            message_id: request.message_id,
            action_index: request.action_index,
        };
        let entry = self.store.apply_action(&ctx, &request.action)?;

        // Side effects after the ledger row exists; failures are recorded on
        // the entry and surfaced with their own kind (a merge conflict stays
        // a merge conflict, not a generic internal error).
        let effect_result = self.run_side_effect(&thread, &request.action).await;
        if let Err(e) = &effect_result {
            self.store.set_ledger_error(&entry.id, &e.to_string())?;
        }

        self.bus.publish(BusEvent::ActionApplied {
            thread_id: request.thread_id.clone(),
            ledger_id: entry.id.clone(),
            action_type: entry.action_type.clone(),
        });
        self.refresh_attention(&request.thread_id);

        effect_result?;
        self.store
            .get_ledger_entry(&entry.id)?
            .ok_or_else(|| EngineError::Internal("ledger entry vanished".to_string()))
    }

    /// Undo a ledger entry. The entry is marked, never deleted; the entity
    /// goes back to its captured pre-apply state.
    pub fn undo_action(&self, id: &LedgerId, reason: &str) -> Result<LedgerEntry, EngineError> {
        let entry = self.store.undo_action(id, reason)?;
        self.bus.publish(BusEvent::ActionUndone {
            thread_id: entry.thread_id.clone(),
            ledger_id: entry.id.clone(),
            action_type: entry.action_type.clone(),
        });
        Ok(entry)
    }

    async fn run_side_effect(
        &self,
        thread: &sb_core::Thread,
        action: &Action,
    ) -> Result<(), EngineError> {
        match action {
            Action::WorktreeMerge { thread_id } => {
                let target = if thread_id == &thread.id {
                    thread.clone()
                } else {
                    self.thread(thread_id)?
                };
                self.merge_worktree(&target).await
            }
            Action::ReposRescan {} => {
                self.hooks.repos_rescan().await.map_err(EngineError::Internal)
            }
            Action::WorkOrderStartRun { workorder_id, prompt } => self
                .hooks
                .work_order_start_run(workorder_id, prompt.as_deref())
                .await
                .map_err(EngineError::Internal),
            // Database actions already ran inside the ledger transaction.
            _ => Ok(()),
        }
    }

    async fn merge_worktree(&self, thread: &sb_core::Thread) -> Result<(), EngineError> {
        let worktree = thread.worktree_path.as_ref().ok_or_else(|| {
            EngineError::Validation(format!("thread {} has no worktree", thread.id))
        })?;
        let repo = self.paths.repo_for(&thread.scope).ok_or_else(|| {
            EngineError::Validation("global threads have no worktree".to_string())
        })?;
        let branch = sb_git::branch_for_slug(&thread.scope.thread_slug());
        self.worktrees
            .merge(&repo, thread.id.as_str(), worktree, &branch)
            .await?;

        // Merge or no-op cleanup both end with the pair gone.
        self.store.set_thread_worktree(&thread.id, None)?;
        self.store.set_thread_pending_changes(&thread.id, false)?;
        self.bus
            .publish(BusEvent::ThreadUpdated { thread_id: thread.id.clone() });
        Ok(())
    }
}

#[cfg(test)]
#[path = "actions_tests.rs"]
mod tests;
