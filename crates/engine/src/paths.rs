// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted state layout under `<portfolio>/.system`.

use std::path::{Path, PathBuf};

use sb_core::{RunId, ThreadId};

/// All on-disk locations the core owns, derived from the portfolio root.
#[derive(Debug, Clone)]
pub struct ChatPaths {
    portfolio: PathBuf,
}

impl ChatPaths {
    pub fn new(portfolio: impl Into<PathBuf>) -> Self {
        Self { portfolio: portfolio.into() }
    }

    pub fn portfolio(&self) -> &Path {
        &self.portfolio
    }

    pub fn state_dir(&self) -> PathBuf {
        self.portfolio.join(".system")
    }

    pub fn chat_dir(&self) -> PathBuf {
        self.state_dir().join("chat")
    }

    pub fn db_path(&self) -> PathBuf {
        self.chat_dir().join("chat.db")
    }

    pub fn run_dir(&self, run_id: &RunId) -> PathBuf {
        self.chat_dir().join("runs").join(run_id.as_str())
    }

    pub fn run_log(&self, run_id: &RunId) -> PathBuf {
        self.run_dir(run_id).join("codex.jsonl")
    }

    pub fn run_result(&self, run_id: &RunId) -> PathBuf {
        self.run_dir(run_id).join("result.json")
    }

    pub fn run_schema(&self, run_id: &RunId) -> PathBuf {
        self.run_dir(run_id).join("output-schema.json")
    }

    pub fn run_prompt(&self, run_id: &RunId) -> PathBuf {
        self.run_dir(run_id).join("prompt.txt")
    }

    pub fn summaries_dir(&self, thread_id: &ThreadId) -> PathBuf {
        self.chat_dir().join("summaries").join(thread_id.as_str())
    }

    pub fn suggestions_dir(&self, thread_id: &ThreadId) -> PathBuf {
        self.chat_dir().join("suggestions").join(thread_id.as_str())
    }

    pub fn worktrees_dir(&self) -> PathBuf {
        self.state_dir().join("chat-worktrees")
    }

    /// Repository a thread's worktree hangs off: the project checkout for
    /// project and work-order scopes. Global threads have none.
    pub fn repo_for(&self, scope: &sb_core::Scope) -> Option<PathBuf> {
        scope.project_id.as_ref().map(|p| self.portfolio.join(p))
    }

    /// Default cwd for a run without a worktree.
    pub fn fallback_cwd(&self, scope: &sb_core::Scope) -> PathBuf {
        self.repo_for(scope).unwrap_or_else(|| self.portfolio.clone())
    }
}
