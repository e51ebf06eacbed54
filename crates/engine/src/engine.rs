// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The engine handle: store + bus + collaborators + configuration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sb_core::{BusEvent, Role, Scope, Thread, ThreadId};
use sb_git::Worktrees;
use sb_storage::Store;

use crate::bus::{AttentionCache, EventBus};
use crate::hooks::{LoggingHooks, PortfolioHooks};
use crate::paths::ChatPaths;
use crate::scheduler::WorkerLauncher;
use crate::EngineError;

/// Everything the engine needs, resolved once at startup.
#[derive(Clone)]
pub struct EngineConfig {
    pub portfolio: PathBuf,
    /// Agent CLI binary (codex or a stand-in).
    pub agent_bin: PathBuf,
    pub model: Option<String>,
    /// Server-configured trusted host pack behind `network=trusted`.
    pub trusted_hosts: Vec<String>,
    pub agent_timeout: Duration,
    pub summary_timeout: Duration,
}

impl EngineConfig {
    pub fn new(portfolio: impl Into<PathBuf>) -> Self {
        Self {
            portfolio: portfolio.into(),
            agent_bin: PathBuf::from("codex"),
            model: None,
            trusted_hosts: Vec::new(),
            agent_timeout: Duration::from_secs(600),
            summary_timeout: Duration::from_secs(120),
        }
    }

    pub fn has_trusted_pack(&self) -> bool {
        !self.trusted_hosts.is_empty()
    }
}

#[derive(Clone)]
pub struct Engine {
    pub(crate) store: Store,
    pub(crate) bus: EventBus,
    pub(crate) attention: Arc<AttentionCache>,
    pub(crate) worktrees: Worktrees,
    pub(crate) paths: ChatPaths,
    pub(crate) launcher: WorkerLauncher,
    pub(crate) hooks: Arc<dyn PortfolioHooks>,
    pub(crate) config: EngineConfig,
}

impl Engine {
    pub fn new(store: Store, bus: EventBus, launcher: WorkerLauncher, config: EngineConfig) -> Self {
        let paths = ChatPaths::new(&config.portfolio);
        Self {
            store,
            bus,
            attention: Arc::new(AttentionCache::new()),
            worktrees: Worktrees::new(paths.worktrees_dir()),
            paths,
            launcher,
            hooks: Arc::new(LoggingHooks),
            config,
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn PortfolioHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn paths(&self) -> &ChatPaths {
        &self.paths
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ensure_thread(&self, scope: &Scope) -> Result<Thread, EngineError> {
        Ok(self.store.ensure_thread(scope)?)
    }

    pub(crate) fn thread(&self, id: &ThreadId) -> Result<Thread, EngineError> {
        self.store
            .get_thread(id)?
            .ok_or_else(|| EngineError::NotFound { entity: "thread", id: id.to_string() })
    }

    /// Archive a thread: soft-delete plus worktree cleanup.
    pub async fn archive_thread(&self, id: &ThreadId) -> Result<(), EngineError> {
        let thread = self.thread(id)?;
        if let (Some(worktree), Some(repo)) =
            (thread.worktree_path.as_ref(), self.paths.repo_for(&thread.scope))
        {
            let branch = sb_git::branch_for_slug(&thread.scope.thread_slug());
            self.worktrees.cleanup(&repo, worktree, &branch).await;
        }
        self.store.set_thread_worktree(id, None)?;
        self.store.set_thread_pending_changes(id, false)?;
        self.store.set_thread_archived(id, true)?;
        self.bus.publish(BusEvent::ThreadUpdated { thread_id: id.clone() });
        Ok(())
    }

    /// Pending diff of the thread's worktree against its base branch.
    pub async fn worktree_diff(&self, id: &ThreadId) -> Result<String, EngineError> {
        let thread = self.thread(id)?;
        let Some(worktree) = thread.worktree_path.as_ref() else {
            return Ok(String::new());
        };
        let repo = self.paths.repo_for(&thread.scope).ok_or_else(|| {
            EngineError::Validation("global threads have no worktree".to_string())
        })?;
        let base = self.worktrees.base_branch(&repo).await?;
        Ok(self.worktrees.diff(worktree, &base).await?)
    }

    /// Whether the thread currently needs a human: an open pending send, an
    /// assistant turn waiting on input, or unmerged worktree changes.
    pub fn needs_attention(&self, id: &ThreadId) -> Result<bool, EngineError> {
        let thread = self.thread(id)?;
        if thread.has_pending_changes {
            return Ok(true);
        }
        if !self.store.list_open_pending(id)?.is_empty() {
            return Ok(true);
        }
        let last = self.store.recent_messages(id, 1)?;
        Ok(last
            .first()
            .map(|m| m.role == Role::Assistant && (m.needs_user_input || !m.actions.is_empty()))
            .unwrap_or(false))
    }

    /// Recompute attention and emit `attention.updated` if it changed.
    pub fn refresh_attention(&self, id: &ThreadId) {
        match self.needs_attention(id) {
            Ok(needs) => {
                self.attention.update(&self.bus, id, needs);
            }
            Err(e) => tracing::warn!(thread = id.as_str(), error = %e, "attention check failed"),
        }
    }
}
