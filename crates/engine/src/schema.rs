// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The response contract: the JSON schema handed to the agent and the
//! validation of what comes back.

use sb_core::Action;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::EngineError;

/// Validated final message from the agent.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentReply {
    pub reply: String,
    #[serde(default)]
    pub needs_user_input: bool,
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// JSON schema for the agent's final message, written to the run directory
/// and passed via `--output-schema`.
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["reply", "needs_user_input", "actions"],
        "properties": {
            "reply": { "type": "string" },
            "needs_user_input": { "type": "boolean" },
            "actions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["type"],
                    "properties": {
                        "type": { "type": "string", "enum": Action::ALL_TYPES }
                    }
                }
            }
        }
    })
}

/// Parse and validate the agent's final message. Every action payload is
/// re-validated structurally — the schema pass on the agent side is not
/// trusted.
pub fn validate_response(raw: &str) -> Result<AgentReply, EngineError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| EngineError::Schema(format!("final message is not JSON: {e}")))?;

    // Re-check each action individually so the error names the index.
    if let Some(actions) = value.get("actions").and_then(Value::as_array) {
        for (idx, action) in actions.iter().enumerate() {
            serde_json::from_value::<Action>(action.clone()).map_err(|e| {
                EngineError::Schema(format!("action[{idx}] failed validation: {e}"))
            })?;
        }
    }

    serde_json::from_value::<AgentReply>(value)
        .map_err(|e| EngineError::Schema(format!("final message failed validation: {e}")))
}

/// Plain-text description of the action types, embedded in the prompt so the
/// agent knows what it may propose.
pub fn action_schema_text() -> String {
    let mut text = String::from(
        "Respond with a single JSON object: {\"reply\": string, \"needs_user_input\": bool, \
         \"actions\": [...]}.\n\
         Each action is {\"type\": <one of the types below>, ...payload fields}:\n",
    );
    let docs = [
        ("project_set_star", "{project_id, starred: bool}"),
        ("project_set_hidden", "{project_id, hidden: bool}"),
        ("project_set_success", "{project_id, note?: string}"),
        ("work_order_create", "{project_id, title, description?}"),
        ("work_order_update", "{workorder_id, title?, description?}"),
        (
            "work_order_set_status",
            "{workorder_id, status: open|in_progress|blocked|done|canceled}",
        ),
        ("repos_rescan", "{}"),
        ("work_order_start_run", "{workorder_id, prompt?: string}"),
        ("worktree_merge", "{thread_id}"),
    ];
    for (name, payload) in docs {
        text.push_str("  - ");
        text.push_str(name);
        text.push_str(": ");
        text.push_str(payload);
        text.push('\n');
    }
    text.push_str("Actions are proposals; a human applies them. Propose only what was asked for.\n");
    text
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
