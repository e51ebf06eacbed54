// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interfaces to the surrounding collaborators the core consumes.
//!
//! `repos_rescan` and `work_order_start_run` act outside the chat-run core
//! (the scanner and the autonomous-run surface). The core dispatches through
//! this trait and records the action in the ledger; what happens on the
//! other side is not its business.

use async_trait::async_trait;

#[async_trait]
pub trait PortfolioHooks: Send + Sync {
    async fn repos_rescan(&self) -> Result<(), String>;

    async fn work_order_start_run(
        &self,
        workorder_id: &str,
        prompt: Option<&str>,
    ) -> Result<(), String>;
}

/// Default wiring: log the dispatch and succeed. The daemon swaps in a real
/// implementation when a collaborator is attached.
#[derive(Debug, Default, Clone)]
pub struct LoggingHooks;

#[async_trait]
impl PortfolioHooks for LoggingHooks {
    async fn repos_rescan(&self) -> Result<(), String> {
        tracing::info!("repos_rescan dispatched (no scanner attached)");
        Ok(())
    }

    async fn work_order_start_run(
        &self,
        workorder_id: &str,
        prompt: Option<&str>,
    ) -> Result<(), String> {
        tracing::info!(
            workorder_id,
            has_prompt = prompt.is_some(),
            "work_order_start_run dispatched (no run surface attached)"
        );
        Ok(())
    }
}
