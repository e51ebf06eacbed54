// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Context assembly: how much history a run's prompt carries.

use sb_core::{ContextDepth, Message, Run, RunCommand};
use sb_storage::Store;

use crate::EngineError;

/// Messages injected verbatim at every non-minimal depth.
const MESSAGE_WINDOW: u64 = 50;
/// Blended tier 1: full tool history (commands + log tail).
const BLENDED_FULL: usize = 5;
/// Blended tier 2: commands only.
const BLENDED_COMMANDS: usize = 10;
/// Log tail size injected per run.
const LOG_TAIL_BYTES: u64 = 8 * 1024;

/// Tool history for one prior run.
#[derive(Debug, Clone, Default)]
pub(crate) struct ToolSection {
    pub run_id: String,
    pub commands: Vec<RunCommand>,
    pub log_tail: Option<String>,
}

/// Everything the prompt composer needs from history.
#[derive(Debug, Clone, Default)]
pub(crate) struct TurnContext {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolSection>,
}

pub(crate) async fn assemble(
    store: &Store,
    run: &Run,
) -> Result<TurnContext, EngineError> {
    let thread_id = &run.thread_id;
    let mut context = TurnContext::default();

    match run.context_depth {
        ContextDepth::Minimal => {
            // The triggering message alone; an empty fetch falls back to the
            // recent window.
            match store.get_message(run.user_message_id)? {
                Some(message) => context.messages.push(message),
                None => context.messages = store.recent_messages(thread_id, MESSAGE_WINDOW)?,
            }
        }
        ContextDepth::Messages => {
            context.messages = store.recent_messages(thread_id, MESSAGE_WINDOW)?;
        }
        ContextDepth::MessagesTools => {
            context.messages = store.recent_messages(thread_id, MESSAGE_WINDOW)?;
            if let Some(last) = store.latest_completed_run(thread_id)? {
                context.tools.push(ToolSection {
                    run_id: last.id.to_string(),
                    commands: store.list_commands(&last.id)?,
                    log_tail: None,
                });
            }
        }
        ContextDepth::MessagesToolsOutputs => {
            context.messages = store.recent_messages(thread_id, MESSAGE_WINDOW)?;
            if let Some(last) = store.latest_completed_run(thread_id)? {
                context.tools.push(ToolSection {
                    run_id: last.id.to_string(),
                    commands: store.list_commands(&last.id)?,
                    log_tail: read_log_tail(&last).await,
                });
            }
        }
        ContextDepth::Blended => {
            context.messages = store.recent_messages(thread_id, MESSAGE_WINDOW)?;
            // Tier 1 takes done and failed runs alike; a failed turn's
            // commands are exactly what the next turn needs to see.
            let recent = store
                .recent_completed_runs(thread_id, (BLENDED_FULL + BLENDED_COMMANDS) as u64)?;
            for (idx, prior) in recent.iter().enumerate() {
                let with_tail = idx < BLENDED_FULL;
                context.tools.push(ToolSection {
                    run_id: prior.id.to_string(),
                    commands: store.list_commands(&prior.id)?,
                    log_tail: if with_tail { read_log_tail(prior).await } else { None },
                });
            }
        }
    }
    Ok(context)
}

async fn read_log_tail(run: &Run) -> Option<String> {
    use tokio::io::{AsyncReadExt, AsyncSeekExt};

    let mut file = tokio::fs::File::open(&run.log_path).await.ok()?;
    let len = file.metadata().await.ok()?.len();
    let start = len.saturating_sub(LOG_TAIL_BYTES);
    file.seek(std::io::SeekFrom::Start(start)).await.ok()?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).await.ok()?;
    let text = String::from_utf8_lossy(&buf).into_owned();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
