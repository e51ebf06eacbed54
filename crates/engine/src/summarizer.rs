// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rolling summarizer: every 50 messages, fold the oldest unsummarized
//! chunk into the thread summary via a bounded, read-only agent invocation.

use std::time::Duration;

use sb_agent::{run_agent, AgentInvocation};
use sb_core::{SandboxMode, ThreadId};
use serde::Deserialize;
use serde_json::json;

use crate::{Engine, EngineError};

/// Chunk size. `summarized_count` only ever moves in these steps.
pub const SUMMARY_CHUNK: u64 = 50;

#[derive(Debug, Deserialize)]
struct SummaryReply {
    summary: String,
}

impl Engine {
    /// Bring the thread summary up to date, one chunk per invocation.
    /// Callers treat failures as non-fatal; the turn proceeds without.
    pub async fn ensure_summary_current(&self, thread_id: &ThreadId) -> Result<(), EngineError> {
        loop {
            let thread = self.thread(thread_id)?;
            let total = self.store.count_messages(thread_id)?;
            let target = (total / SUMMARY_CHUNK) * SUMMARY_CHUNK;
            if thread.summarized_count >= target {
                return Ok(());
            }

            let from = thread.summarized_count + 1;
            let to = thread.summarized_count + SUMMARY_CHUNK;
            let chunk = self.store.messages_in_range(thread_id, from, to)?;
            if chunk.len() as u64 != SUMMARY_CHUNK {
                return Err(EngineError::Internal(format!(
                    "summary chunk {from}..{to} is incomplete ({} rows)",
                    chunk.len()
                )));
            }

            let mut prompt = String::from(
                "Maintain a rolling summary of a chat thread. Fold the new messages into the \
                 existing summary. Keep decisions, open questions, file paths, and outcomes; \
                 drop pleasantries. Respond with JSON: {\"summary\": string}.\n",
            );
            if !thread.summary.is_empty() {
                prompt.push_str("\n## Existing summary\n");
                prompt.push_str(&thread.summary);
                prompt.push('\n');
            }
            prompt.push_str(&format!("\n## New messages ({from}..{to})\n"));
            for message in &chunk {
                prompt.push_str(&format!("[{}] {}\n", message.role, message.content));
            }

            let dir = self.paths.summaries_dir(thread_id).join(format!("{from}-{to}"));
            tokio::fs::create_dir_all(&dir).await?;
            let schema_path = dir.join("output-schema.json");
            let schema = json!({
                "type": "object",
                "additionalProperties": false,
                "required": ["summary"],
                "properties": { "summary": { "type": "string" } }
            });
            tokio::fs::write(&schema_path, serde_json::to_vec_pretty(&schema)?).await?;

            let invocation = AgentInvocation {
                bin: self.config.agent_bin.clone(),
                cwd: self.paths.portfolio().to_path_buf(),
                prompt,
                sandbox: SandboxMode::ReadOnly,
                network_access: false,
                model: self.config.model.clone(),
                output_schema_path: schema_path,
                output_last_message_path: dir.join("result.json"),
                log_path: dir.join("agent.jsonl"),
                skip_git_repo_check: true,
                timeout: self.summary_timeout(),
            };
            let outcome = run_agent(&invocation, |_, _| {}).await?;
            let reply: SummaryReply = serde_json::from_str(&outcome.last_message)
                .map_err(|e| EngineError::Schema(format!("summary reply invalid: {e}")))?;

            self.store.set_thread_summary(thread_id, &reply.summary, to)?;
            tracing::info!(thread = thread_id.as_str(), summarized = to, "summary chunk folded");
        }
    }

    fn summary_timeout(&self) -> Duration {
        self.config.summary_timeout
    }
}

#[cfg(test)]
#[path = "summarizer_tests.rs"]
mod tests;
