// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The turn orchestrator: everything one worker does for one claimed run.

use sb_agent::{run_agent, AgentEvent, AgentInvocation};
use sb_core::{Action, BusEvent, CliAccess, MessageId, Role, Run, RunId, RunStatus};
use sb_storage::messages::NewMessage;

use crate::context;
use crate::prompt;
use crate::scheduler::chain_next;
use crate::schema::{response_schema, validate_response};
use crate::{Engine, EngineError};

impl Engine {
    /// Execute one run end to end. Safe to call for a run someone else owns:
    /// a lost claim exits silently.
    pub async fn run_turn(&self, run_id: &RunId) -> Result<(), EngineError> {
        if !self.store.claim_run(run_id)? {
            tracing::debug!(run_id = run_id.as_str(), "claim lost; exiting");
            return Ok(());
        }
        let mut run = self
            .store
            .get_run(run_id)?
            .ok_or_else(|| EngineError::NotFound { entity: "run", id: run_id.to_string() })?;
        self.bus.publish(BusEvent::RunStatus {
            thread_id: run.thread_id.clone(),
            run_id: run.id.clone(),
            status: RunStatus::Running,
            error: None,
        });

        let result = self.turn_inner(&mut run).await;
        match result {
            Ok(assistant_message_id) => {
                self.store.finish_run_done(&run.id, assistant_message_id)?;
                self.bus.publish(BusEvent::RunStatus {
                    thread_id: run.thread_id.clone(),
                    run_id: run.id.clone(),
                    status: RunStatus::Done,
                    error: None,
                });
            }
            Err(e) => {
                tracing::warn!(run_id = run.id.as_str(), error = %e, kind = %e.kind(), "run failed");
                self.persist_failure_message(&run, &e);
                self.store.finish_run_failed(&run.id, &e.to_string())?;
                self.bus.publish(BusEvent::RunStatus {
                    thread_id: run.thread_id.clone(),
                    run_id: run.id.clone(),
                    status: RunStatus::Failed,
                    error: Some(e.to_string()),
                });
            }
        }
        self.refresh_attention(&run.thread_id);

        // The finishing worker chains the next queued run, success or not.
        if let Some(next) = chain_next(&self.store, &self.launcher, &run.thread_id)? {
            tracing::debug!(next = next.as_str(), "chained next queued run");
        }
        Ok(())
    }

    async fn turn_inner(&self, run: &mut Run) -> Result<MessageId, EngineError> {
        // Summarization failures never block the turn.
        if let Err(e) = self.ensure_summary_current(&run.thread_id).await {
            tracing::warn!(thread = run.thread_id.as_str(), error = %e, "summarizer failed; continuing");
        }

        let mut thread = self.thread(&run.thread_id)?;

        // Worktree isolation when the run can write or the thread already
        // carries one. Global threads have no repository and stay put.
        if run.access.grants_write() || thread.worktree_path.is_some() {
            if let Some(repo) = self.paths.repo_for(&thread.scope) {
                let ensured = self
                    .worktrees
                    .ensure(&repo, &thread.scope.thread_slug(), thread.worktree_path.as_deref())
                    .await?;
                if thread.worktree_path.as_ref() != Some(&ensured.worktree_path) {
                    self.store
                        .set_thread_worktree(&thread.id, Some(&ensured.worktree_path))?;
                    thread.worktree_path = Some(ensured.worktree_path.clone());
                }
                if run.cwd != ensured.worktree_path {
                    self.store.update_run_cwd(&run.id, &ensured.worktree_path)?;
                    run.cwd = ensured.worktree_path;
                }
            }
        }

        let context = context::assemble(&self.store, run).await?;
        let workorder_runs: Vec<_> = self
            .store
            .list_ledger(&thread.id)?
            .into_iter()
            .filter(|e| e.action_type == "work_order_start_run")
            .collect();
        let prompt_text = prompt::compose(&thread, run, &context, &workorder_runs);

        let run_dir = self.paths.run_dir(&run.id);
        tokio::fs::create_dir_all(&run_dir).await?;
        let schema_path = self.paths.run_schema(&run.id);
        tokio::fs::write(&schema_path, serde_json::to_vec_pretty(&response_schema())?).await?;
        tokio::fs::write(self.paths.run_prompt(&run.id), &prompt_text).await?;

        let invocation = AgentInvocation {
            bin: run.cli_path.clone(),
            cwd: run.cwd.clone(),
            prompt: prompt_text,
            sandbox: run.access.sandbox_mode(),
            network_access: run.access.network != sb_core::NetAccess::None,
            model: run.model.clone(),
            output_schema_path: schema_path,
            output_last_message_path: self.paths.run_result(&run.id),
            log_path: run.log_path.clone(),
            skip_git_repo_check: true,
            timeout: self.config.agent_timeout,
        };

        let store = self.store.clone();
        let access = run.access.clone();
        let trusted = self.config.trusted_hosts.clone();
        let run_id = run.id.clone();
        let run_cwd = run.cwd.clone();
        let outcome = run_agent(&invocation, |event, handle| {
            let AgentEvent::ShellCommand { command, cwd } = event else { return };
            // Record first, judge second: the audit trail keeps the denied
            // command too.
            let command_cwd = cwd
                .as_ref()
                .map(std::path::PathBuf::from)
                .unwrap_or_else(|| run_cwd.clone());
            if let Err(e) = store.record_command(&run_id, &command_cwd, command) {
                tracing::warn!(run_id = run_id.as_str(), error = %e, "command audit insert failed");
            }
            if access.cli == CliAccess::Off {
                handle.abort("CLI access is disabled");
                return;
            }
            if let Some(denial) = sb_policy::enforce(command, &access, &trusted) {
                handle.abort(denial);
            }
        })
        .await?;

        let reply = validate_response(&outcome.last_message)?;
        let mut actions = reply.actions;

        // Pending-change bookkeeping, with a synthetic merge proposal so the
        // user can always land what the agent wrote.
        if let Some(worktree) = thread.worktree_path.as_ref() {
            let status = self.worktrees.status(worktree).await?;
            self.store
                .set_thread_pending_changes(&thread.id, status.has_pending_changes)?;
            let has_merge = actions
                .iter()
                .any(|a| matches!(a, Action::WorktreeMerge { .. }));
            if status.has_pending_changes && !has_merge {
                actions.push(Action::WorktreeMerge { thread_id: thread.id.clone() });
            }
        }

        let message = self.store.append_message(NewMessage {
            thread_id: &thread.id,
            role: Role::Assistant,
            content: &reply.reply,
            actions: &actions,
            run_id: Some(&run.id),
            needs_user_input: reply.needs_user_input,
        })?;
        self.bus.publish(BusEvent::MessageNew {
            thread_id: thread.id.clone(),
            message: message.clone(),
        });
        Ok(message.id)
    }

    /// Failure surface: a synthetic assistant message so the thread shows
    /// what happened, with a merge proposal when edits are stranded in the
    /// worktree.
    fn persist_failure_message(&self, run: &Run, error: &EngineError) {
        let mut actions = Vec::new();
        if let Ok(Some(thread)) = self.store.get_thread(&run.thread_id) {
            if thread.has_pending_changes {
                actions.push(Action::WorktreeMerge { thread_id: thread.id });
            }
        }
        let content = format!("Chat run failed: {error}");
        match self.store.append_message(NewMessage {
            thread_id: &run.thread_id,
            role: Role::Assistant,
            content: &content,
            actions: &actions,
            run_id: Some(&run.id),
            needs_user_input: false,
        }) {
            Ok(message) => self.bus.publish(BusEvent::MessageNew {
                thread_id: run.thread_id.clone(),
                message,
            }),
            Err(e) => {
                tracing::error!(run_id = run.id.as_str(), error = %e, "failure message insert failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "turn_tests.rs"]
mod tests;
