// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pending-send gate: submissions whose access needs confirmation are
//! parked, everything else becomes a queued run.

use sb_core::{
    epoch_ms_now, AccessTriple, BusEvent, Confirmations, ContextDepth, Message, PendingSend,
    PendingSendId, Requires, Role, Run, RunId, RunStatus, ThreadId,
};
use sb_storage::messages::NewMessage;
use uuid::Uuid;

use crate::{Engine, EngineError};

/// A user submission as it arrives from the surface.
#[derive(Debug, Clone, Default)]
pub struct SubmitRequest {
    pub content: String,
    /// Override of the thread's default access for this turn.
    pub access: Option<AccessTriple>,
    pub context_depth: Option<ContextDepth>,
    pub confirmations: Confirmations,
}

/// Explicit result at the submission boundary — no control flow by
/// exception.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Enqueued {
        run: Run,
        message: Message,
        /// Pending rows auto-resolved by this confirmed submission.
        resolved: Vec<PendingSendId>,
    },
    PendingApproval {
        id: PendingSendId,
        requires: Requires,
    },
}

impl Engine {
    /// Gate and (when clear) enqueue one user message.
    pub fn submit_message(
        &self,
        thread_id: &ThreadId,
        request: SubmitRequest,
    ) -> Result<SubmitOutcome, EngineError> {
        if request.content.trim().is_empty() {
            return Err(EngineError::Validation("message content is empty".to_string()));
        }
        let thread = self.thread(thread_id)?;
        if thread.archived {
            return Err(EngineError::Validation("thread is archived".to_string()));
        }

        let access = request.access.unwrap_or_else(|| thread.default_access.clone());
        let depth = request.context_depth.unwrap_or(thread.default_context_depth);
        sb_policy::check_access(&access, self.config.has_trusted_pack())?;

        let needed = Requires {
            write: access.grants_write(),
            network_allowlist: access.grants_network(),
        };
        if needed.any() && !request.confirmations.covers(needed) {
            let missing = Requires {
                write: needed.write && !request.confirmations.write,
                network_allowlist: needed.network_allowlist
                    && !request.confirmations.network_allowlist,
            };
            let pending = PendingSend {
                id: PendingSendId::new(Uuid::new_v4().to_string()),
                thread_id: thread_id.clone(),
                content: request.content,
                context_depth: depth,
                access,
                requires: missing,
                created_at_ms: epoch_ms_now(),
                resolved_at_ms: None,
                canceled_at_ms: None,
            };
            self.store.insert_pending(&pending)?;
            self.refresh_attention(thread_id);
            return Ok(SubmitOutcome::PendingApproval { id: pending.id, requires: missing });
        }

        // Confirmed (or harmless): earlier identical parked copies resolve now.
        let resolved =
            self.store
                .resolve_matching_pending(thread_id, &request.content, depth, &access)?;

        let message = self.store.append_message(NewMessage {
            thread_id,
            role: Role::User,
            content: &request.content,
            actions: &[],
            run_id: None,
            needs_user_input: false,
        })?;
        self.bus.publish(BusEvent::MessageNew {
            thread_id: thread_id.clone(),
            message: message.clone(),
        });

        let run = self.enqueue_run(&thread, &access, depth, message.id)?;
        Ok(SubmitOutcome::Enqueued { run, message, resolved })
    }

    fn enqueue_run(
        &self,
        thread: &sb_core::Thread,
        access: &AccessTriple,
        depth: ContextDepth,
        user_message_id: i64,
    ) -> Result<Run, EngineError> {
        let run_id = RunId::new(Uuid::new_v4().to_string());
        let cwd = thread
            .worktree_path
            .clone()
            .unwrap_or_else(|| self.paths.fallback_cwd(&thread.scope));
        let run = Run {
            id: run_id.clone(),
            thread_id: thread.id.clone(),
            user_message_id,
            assistant_message_id: None,
            status: RunStatus::Queued,
            model: self.config.model.clone(),
            cli_path: self.config.agent_bin.clone(),
            cwd,
            log_path: self.paths.run_log(&run_id),
            context_depth: depth,
            access: access.clone(),
            error: None,
            created_at_ms: epoch_ms_now(),
            started_at_ms: None,
            finished_at_ms: None,
        };
        self.store.create_run(&run)?;
        self.bus.publish(BusEvent::RunStatus {
            thread_id: thread.id.clone(),
            run_id: run.id.clone(),
            status: RunStatus::Queued,
            error: None,
        });
        // A fresh run is a claim opportunity; the worker does the claiming.
        self.launcher.spawn(&run.id)?;
        Ok(run)
    }

    /// Cancel a parked submission.
    pub fn cancel_pending(&self, id: &PendingSendId) -> Result<(), EngineError> {
        if !self.store.cancel_pending(id)? {
            return Err(EngineError::NotFound { entity: "pending send", id: id.to_string() });
        }
        if let Some(pending) = self.store.get_pending(id)? {
            self.refresh_attention(&pending.thread_id);
            self.bus
                .publish(BusEvent::ThreadUpdated { thread_id: pending.thread_id });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
