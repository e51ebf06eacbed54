// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Suggestion advisor: a read-only pre-send look at a draft message that
//! proposes context depth and access adjustments.

use sb_agent::{run_agent, AgentInvocation};
use sb_core::{AccessTriple, ContextDepth, SandboxMode, ThreadId};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{Engine, EngineError};

/// What the advisor hands back: only the deltas against the user's current
/// settings, plus the reasoning (including any policy coercions applied).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Suggestion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_depth: Option<ContextDepth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<AccessTriple>,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
struct AdvisorReply {
    context_depth: ContextDepth,
    access: AccessTriple,
    #[serde(default)]
    reason: String,
}

impl Engine {
    /// Evaluate a draft message. Read-only, network disabled, never mutates
    /// thread state.
    pub async fn suggest(
        &self,
        thread_id: &ThreadId,
        draft: &str,
    ) -> Result<Suggestion, EngineError> {
        let thread = self.thread(thread_id)?;
        let current_access = thread.default_access.clone();
        let current_depth = thread.default_context_depth;

        let mut prompt = String::from(
            "A user is about to send a chat message to a coding agent. Recommend how much \
             conversation context the turn needs and the minimal access it requires. Respond \
             with JSON: {\"context_depth\": \"minimal|messages|messages_tools|\
             messages_tools_outputs|blended\", \"access\": {\"filesystem\": \"none|read-only|\
             read-write\", \"cli\": \"off|read-only|read-write\", \"network\": \"none|localhost|\
             allowlist|trusted\", \"network_allowlist\": [..]}, \"reason\": string}.\n",
        );
        prompt.push_str(&format!("\nCurrent access: {}\n", current_access.summary()));
        prompt.push_str(&format!("Current context depth: {current_depth}\n"));
        if !thread.summary.is_empty() {
            prompt.push_str("\n## Thread summary\n");
            prompt.push_str(&thread.summary);
            prompt.push('\n');
        }
        let recent = self.store.recent_messages(thread_id, 10)?;
        if !recent.is_empty() {
            prompt.push_str("\n## Recent messages\n");
            for message in &recent {
                prompt.push_str(&format!("[{}] {}\n", message.role, message.content));
            }
        }
        if let Some(last_run) = self.store.latest_completed_run(thread_id)? {
            prompt.push_str(&format!(
                "\nMost recent run: status={}, {} commands\n",
                last_run.status,
                self.store.list_commands(&last_run.id)?.len()
            ));
        }
        prompt.push_str("\n## Draft message\n");
        prompt.push_str(draft);
        prompt.push('\n');

        let dir = self
            .paths
            .suggestions_dir(thread_id)
            .join(Uuid::new_v4().to_string());
        tokio::fs::create_dir_all(&dir).await?;
        let schema_path = dir.join("output-schema.json");
        let schema = json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["context_depth", "access", "reason"],
            "properties": {
                "context_depth": { "type": "string" },
                "access": { "type": "object" },
                "reason": { "type": "string" }
            }
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
            timeout: self.config.summary_timeout,
        };
        let outcome = run_agent(&invocation, |_, _| {}).await?;
        let reply: AdvisorReply = serde_json::from_str(&outcome.last_message)
            .map_err(|e| EngineError::Schema(format!("advisor reply invalid: {e}")))?;

        // The agent's triple goes through the same consistency rules as any
        // other; coercions are surfaced in the reason.
        let (sanitized, notes) =
            sb_policy::sanitize_access(&reply.access, self.config.has_trusted_pack());
        let mut reason = reply.reason;
        for note in notes {
            if !reason.is_empty() {
                reason.push_str("; ");
            }
            reason.push_str(&note);
        }

        Ok(Suggestion {
            context_depth: (reply.context_depth != current_depth).then_some(reply.context_depth),
            access: (sanitized != current_access).then_some(sanitized),
            reason,
        })
    }
}

#[cfg(test)]
#[path = "advisor_tests.rs"]
mod tests;
